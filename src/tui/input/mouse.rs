use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::drag::gesture::{Point, PointerInput, PointerPhase};
use crate::model::status::StatusUpdate;
use crate::tui::app::App;

/// Left-button press, drag and release drive the pointer gesture; terminal
/// cells are the coordinate space.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) -> Option<StatusUpdate> {
    let phase = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => PointerPhase::Down,
        MouseEventKind::Drag(MouseButton::Left) => PointerPhase::Move,
        MouseEventKind::Up(MouseButton::Left) => PointerPhase::Up,
        _ => return None,
    };
    let input = PointerInput {
        phase,
        pos: Point::new(mouse.column as f64, mouse.row as f64),
        target: None,
    };
    let effect = app.manager.pointer(&app.layout, input);
    app.handle_effect(effect)
}
