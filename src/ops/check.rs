use serde::Serialize;

use crate::model::board::{Board, TaskId};

use super::board_ops::duplicate_ids;

/// Structured result from `cshift check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (the board violates an invariant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// A task sits in more than one slot
    #[serde(rename = "duplicate_task")]
    DuplicateTask { task_id: TaskId, columns: Vec<String> },
    /// Two columns share a key in board.json
    #[serde(rename = "duplicate_column")]
    DuplicateColumn { column: String },
    /// The board has no columns to drop into
    #[serde(rename = "no_columns")]
    NoColumns,
}

/// A validation warning (non-critical issue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    #[serde(rename = "empty_title")]
    EmptyTitle { column: String, task_id: TaskId },
    #[serde(rename = "blank_column_name")]
    BlankColumnName { column: String },
}

/// Validate a board. Read-only.
pub fn check_board(board: &Board) -> CheckResult {
    check_board_file(board, &[])
}

/// Validate a board read without validation, along with the column keys
/// that were repeated in the file (their cards merged into the first).
pub fn check_board_file(board: &Board, duplicate_columns: &[String]) -> CheckResult {
    let mut result = CheckResult::default();

    for column in duplicate_columns {
        result.errors.push(CheckError::DuplicateColumn {
            column: column.clone(),
        });
    }

    if board.columns.is_empty() {
        result.errors.push(CheckError::NoColumns);
    }

    for task_id in duplicate_ids(board) {
        let columns = board
            .columns
            .iter()
            .filter(|(_, col)| col.cards.iter().any(|c| c.id == task_id))
            .map(|(key, _)| key.clone())
            .collect();
        result
            .errors
            .push(CheckError::DuplicateTask { task_id, columns });
    }

    for (key, column) in &board.columns {
        if column.name.trim().is_empty() {
            result
                .warnings
                .push(CheckWarning::BlankColumnName { column: key.clone() });
        }
        for card in &column.cards {
            if card.title.trim().is_empty() {
                result.warnings.push(CheckWarning::EmptyTitle {
                    column: key.clone(),
                    task_id: card.id,
                });
            }
        }
    }

    result.valid = result.errors.is_empty();
    result
}
