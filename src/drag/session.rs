use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::model::board::{Location, TaskId};

use super::drop_zone::DropTarget;
use super::reconcile::ReconcileError;

/// Error type for drag lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    #[error("cannot drag task {rejected}: task {active} is already being dragged")]
    ConcurrentDrag { active: TaskId, rejected: TaskId },
    #[error("no drag in progress")]
    NotActive,
    #[error("task not found on board: {0}")]
    UnknownTask(TaskId),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// The live state of one card relocation gesture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveDrag {
    pub task_id: TaskId,
    pub source: Location,
    pub started_at: DateTime<Utc>,
    /// Current candidate drop location; `None` while outside every column
    pub hover: Option<DropTarget>,
}

/// A cross-column (or reordering) move produced by a drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRequest {
    pub task_id: TaskId,
    pub from_column: String,
    pub to_column: String,
    pub to_index: usize,
}

/// What a drop turned into
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Different column: hand to the reconciliation engine, then `complete()`
    Commit(MoveRequest),
    /// Same column, different index: local reorder only, then `complete()`
    Reorder(MoveRequest),
    /// Dropped back where it started; the session is already idle
    NoOp { task_id: TaskId },
    /// Released outside every column; the session is already idle
    Cancelled(ActiveDrag),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Active,
    Committing,
}

#[derive(Debug, Clone, Default)]
enum State {
    #[default]
    Idle,
    Active(ActiveDrag),
    Committing(ActiveDrag),
}

/// Owner of the single drag in progress.
///
/// `Idle → Active → (Committing | Cancelled) → Idle`. Starting while a drag
/// is active or committing fails, so at most one drag exists at a time.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: State,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            State::Idle => SessionPhase::Idle,
            State::Active(_) => SessionPhase::Active,
            State::Committing(_) => SessionPhase::Committing,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// The drag in progress (active or committing)
    pub fn current(&self) -> Option<&ActiveDrag> {
        match &self.state {
            State::Idle => None,
            State::Active(drag) | State::Committing(drag) => Some(drag),
        }
    }

    pub fn start(&mut self, task_id: TaskId, source: Location) -> Result<(), DragError> {
        if let Some(current) = self.current() {
            return Err(DragError::ConcurrentDrag {
                active: current.task_id,
                rejected: task_id,
            });
        }
        debug!(task_id, column = %source.column, index = source.index, "drag started");
        // Until the pointer moves, releasing drops the card where it was.
        let hover = Some(DropTarget::new(source.column.clone(), source.index));
        self.state = State::Active(ActiveDrag {
            task_id,
            source,
            started_at: Utc::now(),
            hover,
        });
        Ok(())
    }

    pub fn update_hover(&mut self, hover: Option<DropTarget>) -> Result<(), DragError> {
        match &mut self.state {
            State::Active(drag) => {
                drag.hover = hover;
                Ok(())
            }
            _ => Err(DragError::NotActive),
        }
    }

    pub fn drop(&mut self) -> Result<DropOutcome, DragError> {
        let drag = match std::mem::take(&mut self.state) {
            State::Active(drag) => drag,
            other => {
                self.state = other;
                return Err(DragError::NotActive);
            }
        };

        let Some(target) = drag.hover.clone() else {
            debug!(task_id = drag.task_id, "dropped outside any column, cancelling");
            return Ok(DropOutcome::Cancelled(drag));
        };

        let request = MoveRequest {
            task_id: drag.task_id,
            from_column: drag.source.column.clone(),
            to_column: target.column,
            to_index: target.index,
        };

        if request.to_column == drag.source.column {
            if request.to_index == drag.source.index {
                debug!(task_id = drag.task_id, "dropped at origin, nothing to do");
                return Ok(DropOutcome::NoOp {
                    task_id: drag.task_id,
                });
            }
            self.state = State::Committing(drag);
            return Ok(DropOutcome::Reorder(request));
        }

        self.state = State::Committing(drag);
        Ok(DropOutcome::Commit(request))
    }

    /// Abandon the active drag. The board was never touched, so the card is
    /// still at `source`.
    pub fn cancel(&mut self) -> Result<ActiveDrag, DragError> {
        match std::mem::take(&mut self.state) {
            State::Active(drag) => {
                debug!(task_id = drag.task_id, "drag cancelled");
                Ok(drag)
            }
            other => {
                self.state = other;
                Err(DragError::NotActive)
            }
        }
    }

    /// Finish a committing drop once it has been handed off
    pub fn complete(&mut self) -> Result<ActiveDrag, DragError> {
        match std::mem::take(&mut self.state) {
            State::Committing(drag) => Ok(drag),
            other => {
                self.state = other;
                Err(DragError::NotActive)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(task_id: TaskId, column: &str, index: usize) -> DragSession {
        let mut session = DragSession::new();
        session.start(task_id, Location::new(column, index)).unwrap();
        session
    }

    #[test]
    fn second_start_is_rejected_and_first_survives() {
        let mut session = started(7, "todo", 2);
        let err = session.start(8, Location::new("todo", 0)).unwrap_err();
        assert_eq!(
            err,
            DragError::ConcurrentDrag {
                active: 7,
                rejected: 8
            }
        );
        assert_eq!(session.current().unwrap().task_id, 7);
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn drop_to_other_column_commits() {
        let mut session = started(7, "todo", 2);
        session
            .update_hover(Some(DropTarget::new("done", 1)))
            .unwrap();
        let outcome = session.drop().unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Commit(MoveRequest {
                task_id: 7,
                from_column: "todo".into(),
                to_column: "done".into(),
                to_index: 1,
            })
        );
        assert_eq!(session.phase(), SessionPhase::Committing);
        // Still exclusive while committing
        assert!(session.start(1, Location::new("todo", 0)).is_err());
        session.complete().unwrap();
        assert!(session.is_idle());
    }

    #[test]
    fn drop_at_origin_is_noop() {
        let mut session = started(9, "todo", 1);
        session
            .update_hover(Some(DropTarget::new("done", 0)))
            .unwrap();
        session
            .update_hover(Some(DropTarget::new("todo", 1)))
            .unwrap();
        assert_eq!(session.drop().unwrap(), DropOutcome::NoOp { task_id: 9 });
        assert!(session.is_idle());
    }

    #[test]
    fn release_without_moving_is_noop() {
        let mut session = started(9, "todo", 1);
        assert_eq!(session.drop().unwrap(), DropOutcome::NoOp { task_id: 9 });
    }

    #[test]
    fn same_column_new_index_is_reorder() {
        let mut session = started(9, "todo", 1);
        session
            .update_hover(Some(DropTarget::new("todo", 0)))
            .unwrap();
        assert!(matches!(session.drop().unwrap(), DropOutcome::Reorder(_)));
        assert_eq!(session.phase(), SessionPhase::Committing);
    }

    #[test]
    fn drop_outside_cancels() {
        let mut session = started(3, "todo", 0);
        session.update_hover(None).unwrap();
        match session.drop().unwrap() {
            DropOutcome::Cancelled(drag) => assert_eq!(drag.source, Location::new("todo", 0)),
            other => panic!("expected Cancelled, got {:?}", other),
        }
        assert!(session.is_idle());
    }

    #[test]
    fn cancel_restores_idle() {
        let mut session = started(3, "todo", 0);
        let drag = session.cancel().unwrap();
        assert_eq!(drag.task_id, 3);
        assert!(session.is_idle());
        assert_eq!(session.cancel().unwrap_err(), DragError::NotActive);
    }

    #[test]
    fn operations_require_active_drag() {
        let mut session = DragSession::new();
        assert_eq!(session.update_hover(None).unwrap_err(), DragError::NotActive);
        assert_eq!(session.drop().unwrap_err(), DragError::NotActive);
        assert_eq!(session.complete().unwrap_err(), DragError::NotActive);
    }

    #[test]
    fn cancel_does_not_abort_committing_drop() {
        let mut session = started(7, "todo", 0);
        session
            .update_hover(Some(DropTarget::new("done", 0)))
            .unwrap();
        session.drop().unwrap();
        assert_eq!(session.cancel().unwrap_err(), DragError::NotActive);
        assert_eq!(session.phase(), SessionPhase::Committing);
    }
}
