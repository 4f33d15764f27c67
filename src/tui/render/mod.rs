pub mod board_view;
pub mod status_row;
#[cfg(test)]
pub mod test_helpers;
pub mod title_bar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::App;
use super::layout::BoardLayout;

/// Main render function. Recomputes the board layout for this frame so
/// mouse hit-testing matches what is on screen.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: title bar | columns | status row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    title_bar::render_title_bar(frame, app, chunks[0]);

    app.layout = BoardLayout::compute(app.manager.board(), chunks[1], app.config.ui.card_height);
    board_view::render_board_view(frame, app, chunks[1]);

    status_row::render_status_row(frame, app, chunks[2]);
}
