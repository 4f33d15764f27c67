use serde::Serialize;

use crate::drag::manager::MoveReport;
use crate::model::board::{Board, TaskId};
use crate::ops::check::{CheckError, CheckResult, CheckWarning};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct CardJson {
    pub id: TaskId,
    pub title: String,
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub key: String,
    pub name: String,
    pub cards: Vec<CardJson>,
}

#[derive(Serialize)]
pub struct BoardJson {
    pub name: String,
    pub columns: Vec<ColumnJson>,
}

#[derive(Serialize)]
pub struct MoveJson<'a> {
    pub task_id: TaskId,
    #[serde(flatten)]
    pub report: &'a MoveReport,
}

pub fn board_to_json(name: &str, board: &Board) -> BoardJson {
    BoardJson {
        name: name.to_string(),
        columns: board
            .columns
            .iter()
            .map(|(key, column)| ColumnJson {
                key: key.clone(),
                name: column.name.clone(),
                cards: column
                    .cards
                    .iter()
                    .enumerate()
                    .map(|(position, card)| CardJson {
                        id: card.id,
                        title: card.title.clone(),
                        position,
                        project_id: card.project_id,
                    })
                    .collect(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// Plain-text board listing, one block per column
pub fn format_board(name: &str, board: &Board) -> String {
    let mut out = String::new();
    out.push_str(name);
    out.push('\n');
    if board.columns.is_empty() {
        out.push_str("\n(no columns)\n");
        return out;
    }
    let width = board
        .columns
        .values()
        .flat_map(|c| c.cards.iter())
        .map(|card| card.id.to_string().len())
        .max()
        .unwrap_or(1);
    for (key, column) in &board.columns {
        out.push('\n');
        out.push_str(&format!("{} ({}) [{}]\n", column.name, key, column.cards.len()));
        if column.cards.is_empty() {
            out.push_str("  (empty)\n");
        }
        for card in &column.cards {
            out.push_str(&format!("  #{:<width$}  {}\n", card.id, card.title, width = width));
        }
    }
    out
}

pub fn format_move(task_id: TaskId, report: &MoveReport) -> String {
    match report {
        MoveReport::NoChange => format!("task {}: no change", task_id),
        MoveReport::Reordered { column, index } => {
            format!("task {}: reordered to {}[{}]", task_id, column, index)
        }
        MoveReport::Committed {
            column,
            index,
            message,
        } => {
            if message.is_empty() {
                format!("task {}: moved to {}[{}]", task_id, column, index)
            } else {
                format!("task {}: moved to {}[{}] ({})", task_id, column, index, message)
            }
        }
        MoveReport::RolledBack {
            column,
            index,
            reason,
        } => format!(
            "task {}: move rejected, restored to {}[{}]: {}",
            task_id, column, index, reason
        ),
    }
}

pub fn format_check(result: &CheckResult) -> String {
    let mut out = String::new();
    if !result.errors.is_empty() {
        out.push_str("Errors:\n");
        for err in &result.errors {
            let line = match err {
                CheckError::DuplicateTask { task_id, columns } => format!(
                    "task {} appears in more than one slot: {}",
                    task_id,
                    columns.join(", ")
                ),
                CheckError::DuplicateColumn { column } => {
                    format!("column key \"{}\" is used more than once", column)
                }
                CheckError::NoColumns => "board has no columns".to_string(),
            };
            out.push_str(&format!("  {}\n", line));
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            out.push('\n');
        }
        out.push_str("Warnings:\n");
        for warning in &result.warnings {
            let line = match warning {
                CheckWarning::EmptyTitle { column, task_id } => {
                    format!("[{}] task {} has an empty title", column, task_id)
                }
                CheckWarning::BlankColumnName { column } => {
                    format!("[{}] column has a blank name", column)
                }
            };
            out.push_str(&format!("  {}\n", line));
        }
    }
    if result.valid {
        out.push_str("✓ board is valid\n");
    } else {
        out.push_str("✗ board has errors\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::board::Card;
    use crate::ops::check::check_board;
    use insta::assert_snapshot;

    fn sample_board() -> Board {
        let mut board = Board::with_columns([
            ("todo", "To Do"),
            ("in_progress", "In Progress"),
            ("done", "Done"),
        ]);
        board.columns["todo"].cards.push(Card::new(1, "Write docs"));
        board.columns["todo"].cards.push(Card::new(12, "Fix login"));
        board.columns["done"].cards.push(Card::new(3, "Set up CI"));
        board
    }

    #[test]
    fn board_listing() {
        assert_snapshot!(format_board("Sprint 12", &sample_board()), @r"
        Sprint 12

        To Do (todo) [2]
          #1   Write docs
          #12  Fix login

        In Progress (in_progress) [0]
          (empty)

        Done (done) [1]
          #3   Set up CI
        ");
    }

    #[test]
    fn board_json_has_positions() {
        let json = serde_json::to_value(board_to_json("Sprint 12", &sample_board())).unwrap();
        assert_eq!(json["name"], "Sprint 12");
        assert_eq!(json["columns"][0]["cards"][1]["id"], 12);
        assert_eq!(json["columns"][0]["cards"][1]["position"], 1);
        assert!(json["columns"][0]["cards"][0].get("project_id").is_none());
    }

    #[test]
    fn move_json_is_flat() {
        let report = MoveReport::RolledBack {
            column: "todo".into(),
            index: 2,
            reason: "Invalid status".into(),
        };
        let json = serde_json::to_value(MoveJson {
            task_id: 7,
            report: &report,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "task_id": 7,
                "result": "rolled_back",
                "column": "todo",
                "index": 2,
                "reason": "Invalid status"
            })
        );
    }

    #[test]
    fn move_text() {
        assert_eq!(format_move(4, &MoveReport::NoChange), "task 4: no change");
        assert_eq!(
            format_move(
                7,
                &MoveReport::Committed {
                    column: "done".into(),
                    index: 0,
                    message: String::new()
                }
            ),
            "task 7: moved to done[0]"
        );
    }

    #[test]
    fn check_text_for_empty_board() {
        let text = format_check(&check_board(&Board::default()));
        assert_eq!(text, "Errors:\n  board has no columns\n✗ board has errors\n");
    }
}
