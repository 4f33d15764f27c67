use cardshift::cli::commands::Cli;
use cardshift::cli::handlers;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand → launch the board
            handlers::start_dir(cli.board_dir.as_deref())
                .and_then(|start| cardshift::tui::run(&start))
        }
        Some(_) => handlers::dispatch(cli),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
