use std::path::PathBuf;

use super::board::Board;
use super::config::BoardConfig;

/// A fully loaded board workspace
#[derive(Debug)]
pub struct Workspace {
    /// Directory containing `kanban/`
    pub root: PathBuf,
    /// Path to the `kanban/` directory
    pub kanban_dir: PathBuf,
    /// Parsed board.toml
    pub config: BoardConfig,
    /// Cached board from board.json
    pub board: Board,
}
