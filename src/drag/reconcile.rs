use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::io::backend::{BackendError, StatusBackend, confirm};
use crate::model::board::{Board, Location, TaskId};
use crate::model::status::{StatusResponse, StatusUpdate};
use crate::ops::board_ops::{self, BoardError};

use super::notice::{NoticeKind, Notifier};
use super::session::MoveRequest;

/// Error type for reconciliation bookkeeping. Backend failures are not
/// errors here; they settle as [`Settlement::RolledBack`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("task {task_id} already has a status update in flight")]
    ConcurrentReconciliation { task_id: TaskId },
    #[error("no status update in flight for task {task_id}")]
    NotInFlight { task_id: TaskId },
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// An optimistic move awaiting the backend's verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingMove {
    pub task_id: TaskId,
    /// Exact position before the optimistic move; rollback target
    pub from: Location,
    pub to: Location,
    pub issued_at: DateTime<Utc>,
}

/// How an in-flight move ended
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    Committed {
        task_id: TaskId,
        at: Location,
        message: String,
    },
    RolledBack {
        task_id: TaskId,
        restored: Location,
        reason: BackendError,
    },
}

impl Settlement {
    pub fn task_id(&self) -> TaskId {
        match self {
            Settlement::Committed { task_id, .. } | Settlement::RolledBack { task_id, .. } => {
                *task_id
            }
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Settlement::Committed { .. })
    }
}

/// Applies moves optimistically and commits or rolls them back once the
/// backend answers. Holds at most one in-flight move per task.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    /// In the order the moves began
    in_flight: IndexMap<TaskId, PendingMove>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, task_id: TaskId) -> bool {
        self.in_flight.contains_key(&task_id)
    }

    pub fn pending(&self, task_id: TaskId) -> Option<&PendingMove> {
        self.in_flight.get(&task_id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Unanswered moves, oldest first
    pub fn pending_moves(&self) -> impl DoubleEndedIterator<Item = &PendingMove> {
        self.in_flight.values()
    }

    /// Move the card now and record where it came from. Returns the
    /// status update the caller must deliver to the backend.
    pub fn begin(
        &mut self,
        board: &mut Board,
        request: &MoveRequest,
    ) -> Result<StatusUpdate, ReconcileError> {
        let task_id = request.task_id;
        if self.in_flight.contains_key(&task_id) {
            warn!(task_id, "status update already in flight, rejecting");
            return Err(ReconcileError::ConcurrentReconciliation { task_id });
        }

        let from = board_ops::move_card(board, task_id, &request.to_column, request.to_index)?;
        if from.column != request.from_column {
            // Roll back to where the card really was, not where the caller thought.
            warn!(
                task_id,
                expected = %request.from_column,
                actual = %from.column,
                "task was not in the expected column"
            );
        }
        let to = board
            .locate(task_id)
            .ok_or(BoardError::TaskNotFound(task_id))?;

        debug!(
            task_id,
            from = %from.column,
            to = %to.column,
            index = to.index,
            "optimistic move applied"
        );
        self.in_flight.insert(
            task_id,
            PendingMove {
                task_id,
                from,
                to,
                issued_at: Utc::now(),
            },
        );
        Ok(StatusUpdate::new(task_id, request.to_column.clone()))
    }

    /// Apply the backend's verdict for `task_id`. Success keeps the card
    /// where it is; anything else puts it back at its exact prior position.
    pub fn settle(
        &mut self,
        board: &mut Board,
        task_id: TaskId,
        outcome: Result<StatusResponse, BackendError>,
        notifier: &mut dyn Notifier,
    ) -> Result<Settlement, ReconcileError> {
        let pending = self
            .in_flight
            .shift_remove(&task_id)
            .ok_or(ReconcileError::NotInFlight { task_id })?;

        match confirm(outcome) {
            Ok(message) => {
                let at = board.locate(task_id).unwrap_or(pending.to);
                info!(task_id, column = %at.column, index = at.index, "status update committed");
                let text = if message.is_empty() {
                    format!("Task {} moved to {}", task_id, at.column)
                } else {
                    message.clone()
                };
                notifier.notify(&text, NoticeKind::Success);
                Ok(Settlement::Committed {
                    task_id,
                    at,
                    message,
                })
            }
            Err(reason) => {
                board_ops::move_card(board, task_id, &pending.from.column, pending.from.index)?;
                warn!(
                    task_id,
                    column = %pending.from.column,
                    index = pending.from.index,
                    error = %reason,
                    "status update failed, rolled back"
                );
                notifier.notify(
                    &format!("Could not move task {}: {}", task_id, reason),
                    NoticeKind::Error,
                );
                Ok(Settlement::RolledBack {
                    task_id,
                    restored: pending.from,
                    reason,
                })
            }
        }
    }

    /// `begin`, a blocking backend call, then `settle`.
    pub fn reconcile(
        &mut self,
        board: &mut Board,
        request: &MoveRequest,
        backend: &dyn StatusBackend,
        notifier: &mut dyn Notifier,
    ) -> Result<Settlement, ReconcileError> {
        let update = self.begin(board, request)?;
        let outcome = backend.update_status(&update);
        self.settle(board, request.task_id, outcome, notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::notice::NoticeLog;
    use crate::model::board::Card;
    use pretty_assertions::assert_eq;

    fn board() -> Board {
        let mut board = Board::with_columns([("todo", "To Do"), ("done", "Done")]);
        for id in [1, 2, 7, 4] {
            board.columns["todo"].cards.push(Card::new(id, format!("task {}", id)));
        }
        for id in [10, 11, 12] {
            board.columns["done"].cards.push(Card::new(id, format!("task {}", id)));
        }
        board
    }

    fn request(task_id: TaskId, from: &str, to: &str, index: usize) -> MoveRequest {
        MoveRequest {
            task_id,
            from_column: from.into(),
            to_column: to.into(),
            to_index: index,
        }
    }

    #[test]
    fn begin_moves_optimistically_and_marks_pending() {
        let mut board = board();
        let mut rec = Reconciler::new();
        let update = rec.begin(&mut board, &request(7, "todo", "done", 1)).unwrap();
        assert_eq!(update, StatusUpdate::new(7, "done"));
        assert_eq!(board.locate(7), Some(Location::new("done", 1)));
        assert!(rec.is_pending(7));
        assert_eq!(rec.pending(7).unwrap().from, Location::new("todo", 2));
    }

    #[test]
    fn second_begin_for_same_task_is_rejected() {
        let mut board = board();
        let mut rec = Reconciler::new();
        rec.begin(&mut board, &request(7, "todo", "done", 1)).unwrap();
        let snapshot = board.clone();
        let err = rec
            .begin(&mut board, &request(7, "done", "todo", 0))
            .unwrap_err();
        assert_eq!(err, ReconcileError::ConcurrentReconciliation { task_id: 7 });
        assert_eq!(board, snapshot);
    }

    #[test]
    fn success_keeps_target_and_notifies() {
        let mut board = board();
        let mut rec = Reconciler::new();
        let mut log = NoticeLog::default();
        rec.begin(&mut board, &request(7, "todo", "done", 1)).unwrap();
        let settlement = rec
            .settle(&mut board, 7, Ok(StatusResponse::ok("")), &mut log)
            .unwrap();
        assert!(settlement.is_committed());
        assert_eq!(board.locate(7), Some(Location::new("done", 1)));
        assert!(!rec.is_pending(7));
        assert_eq!(log.messages(NoticeKind::Success), vec!["Task 7 moved to done"]);
    }

    #[test]
    fn failure_restores_exact_position() {
        let mut board = board();
        let before = board.clone();
        let mut rec = Reconciler::new();
        let mut log = NoticeLog::default();
        rec.begin(&mut board, &request(7, "todo", "done", 0)).unwrap();
        let settlement = rec
            .settle(
                &mut board,
                7,
                Ok(StatusResponse::failed("Invalid status")),
                &mut log,
            )
            .unwrap();
        assert_eq!(
            settlement,
            Settlement::RolledBack {
                task_id: 7,
                restored: Location::new("todo", 2),
                reason: BackendError::Rejected {
                    message: "Invalid status".into()
                },
            }
        );
        assert_eq!(board, before);
        assert_eq!(log.messages(NoticeKind::Error).len(), 1);
    }

    #[test]
    fn transport_error_rolls_back() {
        let mut board = board();
        let before = board.clone();
        let mut rec = Reconciler::new();
        let mut log = NoticeLog::default();
        rec.begin(&mut board, &request(1, "todo", "done", 3)).unwrap();
        rec.settle(
            &mut board,
            1,
            Err(BackendError::Transport("connection refused".into())),
            &mut log,
        )
        .unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn settle_without_begin_errors() {
        let mut board = board();
        let mut rec = Reconciler::new();
        let mut log = NoticeLog::default();
        let err = rec
            .settle(&mut board, 7, Ok(StatusResponse::ok("")), &mut log)
            .unwrap_err();
        assert_eq!(err, ReconcileError::NotInFlight { task_id: 7 });
        assert!(log.is_empty());
    }

    #[test]
    fn independent_tasks_may_overlap() {
        let mut board = board();
        let mut rec = Reconciler::new();
        let mut log = NoticeLog::default();
        rec.begin(&mut board, &request(7, "todo", "done", 0)).unwrap();
        rec.begin(&mut board, &request(10, "done", "todo", 0)).unwrap();
        assert_eq!(rec.in_flight_count(), 2);
        // Settle in the opposite order they were issued
        rec.settle(&mut board, 10, Ok(StatusResponse::ok("")), &mut log)
            .unwrap();
        rec.settle(
            &mut board,
            7,
            Err(BackendError::Http {
                status: 503,
                body: String::new(),
            }),
            &mut log,
        )
        .unwrap();
        assert_eq!(board.locate(10), Some(Location::new("todo", 0)));
        // Recorded index, even though task 10 has since joined the column
        assert_eq!(board.locate(7), Some(Location::new("todo", 2)));
        assert_eq!(board.column_ids("todo"), vec![10, 1, 7, 2, 4]);
        assert_eq!(rec.in_flight_count(), 0);
    }

    #[test]
    fn pending_moves_keep_begin_order() {
        let mut board = board();
        let mut rec = Reconciler::new();
        let mut log = NoticeLog::default();
        for task_id in [4, 1, 7] {
            rec.begin(&mut board, &request(task_id, "todo", "done", 0))
                .unwrap();
        }
        rec.settle(&mut board, 1, Ok(StatusResponse::ok("")), &mut log)
            .unwrap();
        let order: Vec<TaskId> = rec.pending_moves().map(|p| p.task_id).collect();
        assert_eq!(order, vec![4, 7]);
    }

    #[test]
    fn repeated_identical_success_is_idempotent() {
        struct AlwaysOk;
        impl StatusBackend for AlwaysOk {
            fn update_status(&self, _: &StatusUpdate) -> Result<StatusResponse, BackendError> {
                Ok(StatusResponse::ok("ok"))
            }
        }
        let mut once = board();
        let mut twice = board();
        let mut rec = Reconciler::new();
        let mut log = NoticeLog::default();
        let req = request(7, "todo", "done", 1);
        rec.reconcile(&mut once, &req, &AlwaysOk, &mut log).unwrap();
        rec.reconcile(&mut twice, &req, &AlwaysOk, &mut log).unwrap();
        rec.reconcile(&mut twice, &req, &AlwaysOk, &mut log).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_target_column_is_board_error_and_not_pending() {
        let mut board = board();
        let mut rec = Reconciler::new();
        let err = rec
            .begin(&mut board, &request(7, "todo", "archive", 0))
            .unwrap_err();
        assert_eq!(
            err,
            ReconcileError::Board(BoardError::ColumnNotFound("archive".into()))
        );
        assert!(!rec.is_pending(7));
        assert_eq!(board.locate(7), Some(Location::new("todo", 2)));
    }
}
