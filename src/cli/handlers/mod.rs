mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::drag::drop_zone::DropTarget;
use crate::drag::manager::{DragManager, MoveReport};
use crate::drag::notice::NoticeLog;
use crate::io::backend::backend_from_config;
use crate::io::board_io::{self, BoardIoError, KANBAN_DIR};
use crate::io::config_io;
use crate::io::lock::BoardLock;
use crate::logging;
use crate::model::workspace::Workspace;
use crate::ops::check;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let start = start_dir(cli.board_dir.as_deref())?;

    // Pick up [log] level when a board is reachable; commands still run without one
    let log_config = board_io::discover_workspace(&start)
        .ok()
        .and_then(|root| config_io::read_config(&root.join(KANBAN_DIR)).ok())
        .map(|config| config.log);
    logging::init_cli_logging(log_config.as_ref());

    match cli.command {
        None => Err("no command given (try `cshift --help`)".into()),
        Some(Commands::Init(args)) => cmd_init(args, &start),
        Some(Commands::Show) => cmd_show(&start, json),
        Some(Commands::Mv(args)) => cmd_mv(args, &start, json),
        Some(Commands::Check) => cmd_check(&start, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Directory to start board discovery from: `-C` if given, else the cwd
pub fn start_dir(board_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match board_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

fn load_from(start: &Path) -> Result<Workspace, BoardIoError> {
    let root = board_io::discover_workspace(start)?;
    board_io::load_workspace(&root)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_show(start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_from(start)?;
    if json {
        let out = board_to_json(&ws.config.board.name, &ws.board);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", format_board(&ws.config.board.name, &ws.board));
    }
    Ok(())
}

fn cmd_mv(args: MvArgs, start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let root = board_io::discover_workspace(start)?;
    let kanban_dir = root.join(KANBAN_DIR);
    // Held across load, backend call and save so no other writer slips in
    let _lock = BoardLock::acquire_default(&kanban_dir)?;
    let ws = board_io::load_workspace(&root)?;

    let backend = backend_from_config(&ws.config.backend, &ws.board)?;
    let mut manager = DragManager::new(ws.board, ws.config.drag.touch_threshold);
    let mut notices = NoticeLog::default();
    let target = DropTarget::new(args.column, args.index.unwrap_or(usize::MAX));
    let report = manager.move_task(args.id, target, backend.as_ref(), &mut notices)?;

    if matches!(
        report,
        MoveReport::Committed { .. } | MoveReport::Reordered { .. }
    ) {
        board_io::write_board(&kanban_dir, manager.board())?;
    }

    if json {
        let out = MoveJson {
            task_id: args.id,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        if let MoveReport::RolledBack { reason, .. } = &report {
            return Err(reason.clone().into());
        }
    } else {
        let line = format_move(args.id, &report);
        if matches!(report, MoveReport::RolledBack { .. }) {
            return Err(line.into());
        }
        println!("{}", line);
    }
    Ok(())
}

fn cmd_check(start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let root = board_io::discover_workspace(start)?;
    let (board, duplicate_columns) = board_io::inspect_board(&root.join(KANBAN_DIR))?;
    let result = check::check_board_file(&board, &duplicate_columns);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_check(&result));
    }
    Ok(())
}
