pub mod drop_zone;
pub mod gesture;
pub mod manager;
pub mod notice;
pub mod reconcile;
pub mod session;

pub use drop_zone::{CardSlot, DropSurface, DropTarget, compute_insertion_index, resolve_drop_target};
pub use gesture::{Gesture, GestureAdapter, Point, PointerInput, PointerPhase, TouchInput, TouchPhase};
pub use manager::{DragEffect, DragManager, MoveReport};
pub use notice::{Notice, NoticeKind, NoticeLog, Notifier};
pub use reconcile::{PendingMove, ReconcileError, Reconciler, Settlement};
pub use session::{ActiveDrag, DragError, DragSession, DropOutcome, MoveRequest, SessionPhase};
