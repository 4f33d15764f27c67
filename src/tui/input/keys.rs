use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::status::StatusUpdate;
use crate::tui::app::App;

pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<StatusUpdate> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            let effect = app.manager.escape(&app.layout);
            app.handle_effect(effect)
        }
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            let effect = app.manager.escape(&app.layout);
            app.should_quit = true;
            app.handle_effect(effect)
        }
        // Ignored mid-drag; Esc cancels first
        (_, KeyCode::Char('q')) => {
            if app.manager.session().is_idle() {
                app.should_quit = true;
            }
            None
        }
        (_, KeyCode::Char('r')) => {
            app.reload();
            None
        }
        _ => None,
    }
}
