use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::unicode::display_width;

/// Board name on the left; task count and syncing count on the right
pub fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let name = format!(" {}", app.config.board.name);
    let mut right = format!("{} tasks ", app.manager.board().task_count());
    let syncing = app.manager.reconciler().in_flight_count();
    if syncing > 0 {
        right = format!("{} syncing \u{00B7} {}", syncing, right);
    }

    let mut spans = vec![Span::styled(
        name.clone(),
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    let used = display_width(&name) + display_width(&right);
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        let fg = if syncing > 0 { app.theme.yellow } else { app.theme.dim };
        spans.push(Span::styled(right, Style::default().fg(fg).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
