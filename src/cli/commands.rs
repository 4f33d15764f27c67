use clap::{Args, Parser, Subcommand};

use crate::model::board::TaskId;

#[derive(Parser)]
#[command(name = "cshift", about = concat!("cardshift v", env!("CARGO_PKG_VERSION"), " - drag tasks across a kanban board"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a board in a different directory
    #[arg(short = 'C', long = "board-dir", global = true)]
    pub board_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create kanban/board.toml and kanban/board.json in the current directory
    Init(InitArgs),
    /// Print the board's columns and cards
    Show,
    /// Move a task to a column and confirm it with the backend
    Mv(MvArgs),
    /// Validate the board file
    Check,
}

#[derive(Args)]
pub struct InitArgs {
    /// Board name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Add a column: --column <key> "name" (repeatable; default todo, in_progress, done)
    #[arg(long, num_args = 2, value_names = ["KEY", "NAME"], action = clap::ArgAction::Append)]
    pub column: Vec<String>,
    /// Overwrite an existing kanban/ board
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task ID
    pub id: TaskId,
    /// Target column key
    pub column: String,
    /// Position in the target column (0-indexed; default: end)
    #[arg(long)]
    pub index: Option<usize>,
}
