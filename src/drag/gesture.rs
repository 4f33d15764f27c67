use tracing::debug;

use crate::model::board::TaskId;

/// Screen position in surface units (pixels, or terminal cells)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Raw pointer (mouse/pen) input. `target` is the card under the pointer,
/// resolved by the surface; only consulted on `Down`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub phase: PointerPhase,
    pub pos: Point,
    pub target: Option<TaskId>,
}

/// Raw single-finger touch input. `target` is only consulted on `Start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchInput {
    pub phase: TouchPhase,
    pub pos: Point,
    pub target: Option<TaskId>,
}

/// Device-independent gesture vocabulary consumed by the drag manager
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Start { task_id: TaskId, pos: Point },
    Move(Point),
    End(Point),
    Cancel,
}

/// Which device is driving the drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Pointer,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tracking {
    Idle,
    /// Finger is down on a card but has not moved far enough to drag
    PendingTouch { task_id: TaskId, origin: Point },
    Dragging(Source),
}

/// Translates pointer and touch input into [`Gesture`]s.
///
/// Pointer presses on a card start a drag immediately. Touches must first
/// travel more than `touch_threshold` along either axis, so a tap never
/// becomes a drag. Each input produces at most one gesture. Once a drag
/// is under way only the device that started it can move or release it.
#[derive(Debug, Clone)]
pub struct GestureAdapter {
    touch_threshold: f64,
    tracking: Tracking,
}

impl GestureAdapter {
    pub fn new(touch_threshold: f64) -> Self {
        GestureAdapter {
            touch_threshold: touch_threshold.max(0.0),
            tracking: Tracking::Idle,
        }
    }

    pub fn touch_threshold(&self) -> f64 {
        self.touch_threshold
    }

    /// True while a drag gesture is in progress
    pub fn is_dragging(&self) -> bool {
        matches!(self.tracking, Tracking::Dragging(_))
    }

    fn driven_by(&self, source: Source) -> bool {
        self.tracking == Tracking::Dragging(source)
    }

    /// A start while another drag runs still emits `Start` so the session
    /// can reject it, but the running drag keeps its owner.
    fn start_from(&mut self, source: Source, task_id: TaskId, pos: Point) -> Option<Gesture> {
        if !self.is_dragging() {
            self.tracking = Tracking::Dragging(source);
        }
        Some(Gesture::Start { task_id, pos })
    }

    /// Forget any gesture in progress without emitting anything
    pub fn reset(&mut self) {
        self.tracking = Tracking::Idle;
    }

    pub fn pointer(&mut self, input: PointerInput) -> Option<Gesture> {
        match input.phase {
            PointerPhase::Down => {
                let task_id = input.target?;
                self.start_from(Source::Pointer, task_id, input.pos)
            }
            _ if !self.driven_by(Source::Pointer) => None,
            PointerPhase::Move => self.on_gesture_move(input.pos),
            PointerPhase::Up => self.on_gesture_end(input.pos),
            PointerPhase::Cancel => self.on_gesture_cancel(),
        }
    }

    pub fn touch(&mut self, input: TouchInput) -> Option<Gesture> {
        match input.phase {
            TouchPhase::Start => {
                let task_id = input.target?;
                if self.is_dragging() {
                    // A second finger while dragging; let the session reject it.
                    return self.start_from(Source::Touch, task_id, input.pos);
                }
                self.tracking = Tracking::PendingTouch {
                    task_id,
                    origin: input.pos,
                };
                None
            }
            TouchPhase::Move => match self.tracking {
                Tracking::PendingTouch { task_id, origin } => {
                    let dx = (input.pos.x - origin.x).abs();
                    let dy = (input.pos.y - origin.y).abs();
                    if dx > self.touch_threshold || dy > self.touch_threshold {
                        debug!(task_id, dx, dy, "touch promoted to drag");
                        self.start_from(Source::Touch, task_id, input.pos)
                    } else {
                        None
                    }
                }
                _ if self.driven_by(Source::Touch) => self.on_gesture_move(input.pos),
                _ => None,
            },
            TouchPhase::End => {
                if let Tracking::PendingTouch { task_id, .. } = self.tracking {
                    debug!(task_id, "touch released before threshold, treating as tap");
                    self.tracking = Tracking::Idle;
                    return None;
                }
                if !self.driven_by(Source::Touch) {
                    return None;
                }
                self.on_gesture_end(input.pos)
            }
            TouchPhase::Cancel => {
                if matches!(self.tracking, Tracking::PendingTouch { .. }) {
                    self.tracking = Tracking::Idle;
                    return None;
                }
                if !self.driven_by(Source::Touch) {
                    return None;
                }
                self.on_gesture_cancel()
            }
        }
    }

    /// Window or terminal lost focus
    pub fn blur(&mut self) -> Option<Gesture> {
        if matches!(self.tracking, Tracking::PendingTouch { .. }) {
            self.tracking = Tracking::Idle;
            return None;
        }
        self.on_gesture_cancel()
    }

    /// Escape key
    pub fn escape(&mut self) -> Option<Gesture> {
        self.blur()
    }

    /// Start a drag from a device-neutral caller. Counts as pointer input.
    pub fn on_gesture_start(&mut self, task_id: TaskId, pos: Point) -> Option<Gesture> {
        self.start_from(Source::Pointer, task_id, pos)
    }

    pub fn on_gesture_move(&mut self, pos: Point) -> Option<Gesture> {
        self.is_dragging().then_some(Gesture::Move(pos))
    }

    pub fn on_gesture_end(&mut self, pos: Point) -> Option<Gesture> {
        if !self.is_dragging() {
            return None;
        }
        self.tracking = Tracking::Idle;
        Some(Gesture::End(pos))
    }

    pub fn on_gesture_cancel(&mut self) -> Option<Gesture> {
        if !self.is_dragging() {
            return None;
        }
        self.tracking = Tracking::Idle;
        Some(Gesture::Cancel)
    }
}

impl Default for GestureAdapter {
    fn default() -> Self {
        GestureAdapter::new(10.0)
    }
}
