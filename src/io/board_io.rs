use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::io::config_io;
use crate::io::lock::{BoardLock, LockError};
use crate::model::board::{Board, Card, Column};
use crate::model::workspace::Workspace;
use crate::ops::board_ops::{self, BoardError};

pub const KANBAN_DIR: &str = "kanban";
pub const CONFIG_FILE: &str = "board.toml";
pub const BOARD_FILE: &str = "board.json";

/// Error type for board workspace I/O
#[derive(Debug, thiserror::Error)]
pub enum BoardIoError {
    #[error("not a board: no kanban/board.toml found (run `cshift init`)")]
    NotABoard,
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not parse board.toml: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("could not parse board.json: {0}")]
    BoardParse(serde_json::Error),
    #[error("could not serialize board.json: {0}")]
    BoardSerialize(serde_json::Error),
    #[error("column key \"{0}\" appears more than once in board.json")]
    DuplicateColumn(String),
    #[error("invalid board: {0}")]
    Invalid(#[from] BoardError),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("{} already exists (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),
}

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

/// board.json keeps columns as a list so ordering is explicit and duplicate
/// keys can be detected instead of silently collapsed.
#[derive(Debug, Serialize, Deserialize)]
struct BoardFile {
    #[serde(default)]
    columns: Vec<ColumnFile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ColumnFile {
    key: String,
    name: String,
    #[serde(default)]
    cards: Vec<Card>,
}

impl BoardFile {
    /// Build a board without rejecting anything. Cards of a repeated column
    /// key are merged into the first column with that key; the repeated keys
    /// are returned alongside.
    fn into_board_lenient(self) -> (Board, Vec<String>) {
        let keys: Vec<String> = self.columns.iter().map(|c| c.key.clone()).collect();
        let duplicates = duplicate_column_keys(keys.iter().map(String::as_str))
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut board = Board::default();
        for column in self.columns {
            match board.columns.get_mut(&column.key) {
                Some(existing) => existing.cards.extend(column.cards),
                None => {
                    board.columns.insert(
                        column.key,
                        Column {
                            name: column.name,
                            cards: column.cards,
                        },
                    );
                }
            }
        }
        (board, duplicates)
    }
}

impl TryFrom<BoardFile> for Board {
    type Error = BoardIoError;

    fn try_from(file: BoardFile) -> Result<Self, Self::Error> {
        let (board, duplicate_columns) = file.into_board_lenient();
        if let Some(key) = duplicate_columns.into_iter().next() {
            return Err(BoardIoError::DuplicateColumn(key));
        }
        if let Some(&id) = board_ops::duplicate_ids(&board).first() {
            return Err(BoardError::DuplicateTask(id).into());
        }
        Ok(board)
    }
}

impl From<&Board> for BoardFile {
    fn from(board: &Board) -> Self {
        BoardFile {
            columns: board
                .columns
                .iter()
                .map(|(key, column)| ColumnFile {
                    key: key.clone(),
                    name: column.name.clone(),
                    cards: column.cards.clone(),
                })
                .collect(),
        }
    }
}

/// Parse board.json text, rejecting duplicate columns and duplicate tasks
pub fn parse_board(text: &str) -> Result<Board, BoardIoError> {
    let file: BoardFile = serde_json::from_str(text).map_err(BoardIoError::BoardParse)?;
    file.try_into()
}

/// Render a board as board.json text
pub fn serialize_board(board: &Board) -> Result<String, BoardIoError> {
    let mut text =
        serde_json::to_string_pretty(&BoardFile::from(board)).map_err(BoardIoError::BoardSerialize)?;
    text.push('\n');
    Ok(text)
}

// ---------------------------------------------------------------------------
// Workspace discovery and loading
// ---------------------------------------------------------------------------

/// Walk up from `start` to the first directory holding `kanban/board.toml`
pub fn discover_workspace(start: &Path) -> Result<PathBuf, BoardIoError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(KANBAN_DIR).join(CONFIG_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(BoardIoError::NotABoard);
        }
    }
}

/// Load config and board from a workspace root
pub fn load_workspace(root: &Path) -> Result<Workspace, BoardIoError> {
    let kanban_dir = root.join(KANBAN_DIR);
    if !kanban_dir.is_dir() {
        return Err(BoardIoError::NotABoard);
    }
    let config = config_io::read_config(&kanban_dir)?;
    let board = load_board(&kanban_dir)?;
    Ok(Workspace {
        root: root.to_path_buf(),
        kanban_dir,
        config,
        board,
    })
}

/// Read board.json. A missing file is an empty board.
pub fn load_board(kanban_dir: &Path) -> Result<Board, BoardIoError> {
    let path = kanban_dir.join(BOARD_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no board.json yet, starting empty");
            return Ok(Board::default());
        }
        Err(source) => return Err(BoardIoError::Read { path, source }),
    };
    parse_board(&text)
}

/// Read board.json without validating it, for `cshift check`. Returns the
/// board and any column keys that were repeated.
pub fn inspect_board(kanban_dir: &Path) -> Result<(Board, Vec<String>), BoardIoError> {
    let path = kanban_dir.join(BOARD_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((Board::default(), Vec::new())),
        Err(source) => return Err(BoardIoError::Read { path, source }),
    };
    let file: BoardFile = serde_json::from_str(&text).map_err(BoardIoError::BoardParse)?;
    Ok(file.into_board_lenient())
}

/// Write board.json atomically while holding the board lock
pub fn save_board(kanban_dir: &Path, board: &Board) -> Result<(), BoardIoError> {
    let _lock = BoardLock::acquire_default(kanban_dir)?;
    write_board(kanban_dir, board)
}

/// Write board.json atomically. The caller must hold the [`BoardLock`].
pub fn write_board(kanban_dir: &Path, board: &Board) -> Result<(), BoardIoError> {
    let text = serialize_board(board)?;
    let path = kanban_dir.join(BOARD_FILE);
    atomic_write(&path, text.as_bytes()).map_err(|source| BoardIoError::Write {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), tasks = board.task_count(), "board saved");
    Ok(())
}

/// Write `content` to `path` via a temp file in the same directory + rename
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Column keys that appear more than once, in first-seen order
pub fn duplicate_column_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for key in keys {
        if !seen.insert(key) && !dups.contains(&key) {
            dups.push(key);
        }
    }
    dups
}
