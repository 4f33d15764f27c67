use serde::Serialize;
use tracing::{debug, info, warn};

use crate::io::backend::{BackendError, StatusBackend};
use crate::model::board::{Board, TaskId};
use crate::model::status::{StatusResponse, StatusUpdate};
use crate::ops::board_ops;

use super::drop_zone::{DropSurface, DropTarget, resolve_drop_target};
use super::gesture::{Gesture, GestureAdapter, PointerInput, PointerPhase, TouchInput, TouchPhase};
use super::notice::Notifier;
use super::reconcile::{ReconcileError, Reconciler, Settlement};
use super::session::{DragError, DragSession, DropOutcome, SessionPhase};

/// What a single input did to the board, for the caller to act on
#[derive(Debug, Clone, PartialEq)]
pub enum DragEffect {
    /// Nothing happened
    Ignored,
    Started { task_id: TaskId },
    Hover(Option<DropTarget>),
    NoOp { task_id: TaskId },
    /// Local reorder within a column; the board changed, no backend call
    Reordered {
        task_id: TaskId,
        column: String,
        index: usize,
    },
    /// Optimistic move applied; deliver this update and `settle` the reply
    Dispatch(StatusUpdate),
    Cancelled { task_id: TaskId },
    Rejected(DragError),
}

/// Result of a programmatic move
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MoveReport {
    NoChange,
    Reordered { column: String, index: usize },
    Committed { column: String, index: usize, message: String },
    RolledBack { column: String, index: usize, reason: String },
}

impl From<Settlement> for MoveReport {
    fn from(settlement: Settlement) -> Self {
        match settlement {
            Settlement::Committed { at, message, .. } => MoveReport::Committed {
                column: at.column,
                index: at.index,
                message,
            },
            Settlement::RolledBack {
                restored, reason, ..
            } => MoveReport::RolledBack {
                column: restored.column,
                index: restored.index,
                reason: reason.to_string(),
            },
        }
    }
}

/// The drag-and-drop engine: owns the board and routes input through the
/// gesture adapter, the drag session and the reconciler.
#[derive(Debug, Clone)]
pub struct DragManager {
    board: Board,
    adapter: GestureAdapter,
    session: DragSession,
    reconciler: Reconciler,
}

impl DragManager {
    pub fn new(board: Board, touch_threshold: f64) -> Self {
        DragManager {
            board,
            adapter: GestureAdapter::new(touch_threshold),
            session: DragSession::new(),
            reconciler: Reconciler::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn adapter(&self) -> &GestureAdapter {
        &self.adapter
    }

    /// The board as the backend has confirmed it: a copy with every
    /// unanswered move put back where it started, newest first.
    pub fn confirmed_board(&self) -> Board {
        let mut board = self.board.clone();
        for pending in self.reconciler.pending_moves().rev() {
            if let Err(e) = board_ops::move_card(
                &mut board,
                pending.task_id,
                &pending.from.column,
                pending.from.index,
            ) {
                warn!(task_id = pending.task_id, error = %e, "could not revert unconfirmed move");
            }
        }
        board
    }

    /// No drag in progress and no status update awaiting a reply
    pub fn is_idle(&self) -> bool {
        self.session.is_idle() && self.reconciler.in_flight_count() == 0
    }

    /// Swap in a freshly loaded board. Refused while anything is in flight,
    /// since rollback positions refer to the current board.
    pub fn replace_board(&mut self, board: Board) -> bool {
        if !self.is_idle() {
            debug!("board reload deferred, drag or update in flight");
            return false;
        }
        self.board = board;
        true
    }

    pub fn pointer(&mut self, surface: &dyn DropSurface, input: PointerInput) -> DragEffect {
        let input = if input.phase == PointerPhase::Down && input.target.is_none() {
            PointerInput {
                target: surface.card_at(input.pos),
                ..input
            }
        } else {
            input
        };
        let gesture = self.adapter.pointer(input);
        self.apply(surface, gesture)
    }

    pub fn touch(&mut self, surface: &dyn DropSurface, input: TouchInput) -> DragEffect {
        let input = if input.phase == TouchPhase::Start && input.target.is_none() {
            TouchInput {
                target: surface.card_at(input.pos),
                ..input
            }
        } else {
            input
        };
        let gesture = self.adapter.touch(input);
        self.apply(surface, gesture)
    }

    pub fn blur(&mut self, surface: &dyn DropSurface) -> DragEffect {
        let gesture = self.adapter.blur();
        self.apply(surface, gesture)
    }

    pub fn escape(&mut self, surface: &dyn DropSurface) -> DragEffect {
        let gesture = self.adapter.escape();
        self.apply(surface, gesture)
    }

    pub fn apply(&mut self, surface: &dyn DropSurface, gesture: Option<Gesture>) -> DragEffect {
        let Some(gesture) = gesture else {
            return DragEffect::Ignored;
        };
        match gesture {
            Gesture::Start { task_id, .. } => match self.start_drag(task_id) {
                Ok(()) => DragEffect::Started { task_id },
                Err(err) => {
                    // Only drop the adapter's drag if it was ours; a rejected
                    // second start must not end the drag that is running.
                    if self.session.is_idle() {
                        self.adapter.reset();
                    }
                    DragEffect::Rejected(err)
                }
            },
            Gesture::Move(pos) => {
                let Some(task_id) = self.active_task() else {
                    return DragEffect::Ignored;
                };
                let hover = resolve_drop_target(surface, pos, task_id);
                match self.session.update_hover(hover.clone()) {
                    Ok(()) => DragEffect::Hover(hover),
                    Err(err) => DragEffect::Rejected(err),
                }
            }
            Gesture::End(pos) => {
                let Some(task_id) = self.active_task() else {
                    return DragEffect::Ignored;
                };
                let hover = resolve_drop_target(surface, pos, task_id);
                if let Err(err) = self.session.update_hover(hover) {
                    return DragEffect::Rejected(err);
                }
                self.release()
            }
            Gesture::Cancel => match self.session.cancel() {
                Ok(drag) => DragEffect::Cancelled {
                    task_id: drag.task_id,
                },
                Err(_) => DragEffect::Ignored,
            },
        }
    }

    /// Feed the backend's reply for an update returned by `Dispatch`
    pub fn settle(
        &mut self,
        task_id: TaskId,
        outcome: Result<StatusResponse, BackendError>,
        notifier: &mut dyn Notifier,
    ) -> Result<Settlement, ReconcileError> {
        self.reconciler
            .settle(&mut self.board, task_id, outcome, notifier)
    }

    /// Move a task without any pointer input, blocking on the backend.
    /// Runs through the same session and reconciler as a drag.
    pub fn move_task(
        &mut self,
        task_id: TaskId,
        target: DropTarget,
        backend: &dyn StatusBackend,
        notifier: &mut dyn Notifier,
    ) -> Result<MoveReport, DragError> {
        self.start_drag(task_id)?;

        // Clamp so an out-of-range index at the current position is a no-op
        let siblings = self
            .board
            .column(&target.column)
            .map(|c| c.cards.iter().filter(|card| card.id != task_id).count());
        let target = match siblings {
            Some(len) => DropTarget::new(target.column, target.index.min(len)),
            None => target,
        };
        self.session.update_hover(Some(target))?;

        match self.release() {
            DragEffect::NoOp { .. } => Ok(MoveReport::NoChange),
            DragEffect::Reordered { column, index, .. } => {
                Ok(MoveReport::Reordered { column, index })
            }
            DragEffect::Dispatch(update) => {
                let outcome = backend.update_status(&update);
                let settlement = self.settle(task_id, outcome, notifier)?;
                Ok(settlement.into())
            }
            DragEffect::Rejected(err) => Err(err),
            _ => Err(DragError::NotActive),
        }
    }

    fn active_task(&self) -> Option<TaskId> {
        match self.session.phase() {
            SessionPhase::Active => self.session.current().map(|d| d.task_id),
            _ => None,
        }
    }

    fn start_drag(&mut self, task_id: TaskId) -> Result<(), DragError> {
        if let Some(active) = self.session.current() {
            return Err(DragError::ConcurrentDrag {
                active: active.task_id,
                rejected: task_id,
            });
        }
        if self.reconciler.is_pending(task_id) {
            debug!(task_id, "task has an update in flight, not draggable");
            return Err(ReconcileError::ConcurrentReconciliation { task_id }.into());
        }
        let source = self
            .board
            .locate(task_id)
            .ok_or(DragError::UnknownTask(task_id))?;
        self.session.start(task_id, source)
    }

    /// Drop at the current hover target and carry out the result
    fn release(&mut self) -> DragEffect {
        let outcome = match self.session.drop() {
            Ok(outcome) => outcome,
            Err(err) => return DragEffect::Rejected(err),
        };
        match outcome {
            DropOutcome::NoOp { task_id } => DragEffect::NoOp { task_id },
            DropOutcome::Cancelled(drag) => DragEffect::Cancelled {
                task_id: drag.task_id,
            },
            DropOutcome::Reorder(request) => {
                let result = board_ops::move_card(
                    &mut self.board,
                    request.task_id,
                    &request.to_column,
                    request.to_index,
                );
                let _ = self.session.complete();
                match result {
                    Ok(_) => {
                        info!(
                            task_id = request.task_id,
                            column = %request.to_column,
                            index = request.to_index,
                            "reordered within column"
                        );
                        DragEffect::Reordered {
                            task_id: request.task_id,
                            column: request.to_column,
                            index: request.to_index,
                        }
                    }
                    Err(err) => DragEffect::Rejected(ReconcileError::from(err).into()),
                }
            }
            DropOutcome::Commit(request) => {
                let result = self.reconciler.begin(&mut self.board, &request);
                let _ = self.session.complete();
                match result {
                    Ok(update) => DragEffect::Dispatch(update),
                    Err(err) => DragEffect::Rejected(err.into()),
                }
            }
        }
    }
}
