use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

/// Render the status row (bottom of screen): the drag in progress or the
/// latest notice, with key hints on the right.
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (message, fg, hint) = match app.manager.session().current() {
        Some(drag) => {
            let message = match &drag.hover {
                Some(target) => {
                    let name = app
                        .manager
                        .board()
                        .column(&target.column)
                        .map_or(target.column.as_str(), |c| c.name.as_str());
                    format!(" Moving #{} to {} [{}]", drag.task_id, name, target.index)
                }
                None => format!(" Moving #{}, release outside a column to cancel", drag.task_id),
            };
            (message, app.theme.highlight, "Esc cancel")
        }
        None => match app.notices.latest() {
            Some(notice) => (
                format!(" {}", notice.message),
                app.theme.notice_color(notice.kind),
                "drag to move  r reload  q quit",
            ),
            None => (String::new(), app.theme.text, "drag to move  r reload  q quit"),
        },
    };

    let hint = if app.config.ui.show_key_hints { hint } else { "" };
    let hint_width = display_width(hint) + 1;
    let message = truncate_to_width(&message, width.saturating_sub(hint_width));
    let mut spans = vec![Span::styled(message.clone(), Style::default().fg(fg).bg(bg))];
    let used = display_width(&message) + hint_width;
    if !hint.is_empty() && used <= width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        spans.push(Span::styled(
            format!("{} ", hint),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
