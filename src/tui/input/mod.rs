mod keys;
mod mouse;

use crossterm::event::{Event, KeyCode, KeyEventKind};

use crate::model::status::StatusUpdate;

use super::app::App;

pub use keys::handle_key;
pub use mouse::handle_mouse;

/// Route one terminal event. Returns a status update to dispatch when the
/// event dropped a card on another column.
pub fn handle_event(app: &mut App, event: Event) -> Option<StatusUpdate> {
    match event {
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
            if matches!(key.code, KeyCode::Modifier(_)) {
                return None;
            }
            handle_key(app, key)
        }
        Event::FocusLost => {
            let effect = app.manager.blur(&app.layout);
            app.handle_effect(effect)
        }
        _ => None,
    }
}
