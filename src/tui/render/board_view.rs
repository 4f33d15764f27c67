use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::board::Card;
use crate::tui::app::App;
use crate::util::unicode::{truncate_to_width, wrap_to_width};

/// Draw every column, its cards and the drop indicator of a drag in progress
pub fn render_board_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    if app.layout.columns().is_empty() {
        let empty = Paragraph::new(" No columns")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let drag = app.manager.session().current();
    let hover_column = drag
        .and_then(|d| d.hover.as_ref())
        .map(|t| t.column.as_str());

    for region in app.layout.columns() {
        let Some(column) = app.manager.board().column(&region.key) else {
            continue;
        };
        let border = if hover_column == Some(region.key.as_str()) {
            app.theme.highlight
        } else {
            app.theme.border
        };
        let title = format!(" {} [{}] ", column.name, column.cards.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border).bg(bg))
            .title(Line::styled(
                truncate_to_width(&title, region.area.width.saturating_sub(2) as usize),
                Style::default().fg(app.theme.text_bright).bg(bg),
            ));
        frame.render_widget(block, region.area);

        for card_region in app.layout.cards_in(&region.key) {
            let Some(rect) = app.layout.visible_rect(card_region) else {
                continue;
            };
            if let Some(card) = column.cards.get(card_region.index) {
                render_card(frame, app, card, rect, rect.height == card_region.height);
            }
        }
    }

    if let Some(drag) = drag
        && let Some(target) = &drag.hover
        && let Some(row) = app.layout.indicator_row(target, drag.task_id)
    {
        let indicator = Paragraph::new("\u{2501}".repeat(row.width as usize))
            .style(Style::default().fg(app.theme.highlight).bg(bg));
        frame.render_widget(indicator, row);
    }
}

/// One card. `whole` is false when the column cuts off its bottom rows.
fn render_card(frame: &mut Frame, app: &App, card: &Card, area: Rect, whole: bool) {
    let bg = app.theme.background;
    let dragged = app
        .manager
        .session()
        .current()
        .is_some_and(|d| d.task_id == card.id);
    let pending = app.manager.reconciler().is_pending(card.id);

    let (fg, border) = if dragged {
        (app.theme.text_bright, app.theme.highlight)
    } else if pending {
        (app.theme.dim, app.theme.dim)
    } else {
        (app.theme.text, app.theme.border)
    };
    let mut text_style = Style::default().fg(fg).bg(bg);
    if dragged {
        text_style = text_style.add_modifier(Modifier::BOLD);
    }
    if pending {
        text_style = text_style.add_modifier(Modifier::ITALIC);
    }

    if app.config.ui.card_height < 3 {
        // Compact: a single "#id title" line
        let label = format!("#{} {}", card.id, card.title);
        let line = truncate_to_width(&label, area.width as usize);
        frame.render_widget(Paragraph::new(line).style(text_style), area);
        return;
    }

    let borders = if whole {
        Borders::ALL
    } else {
        Borders::TOP | Borders::LEFT | Borders::RIGHT
    };
    let label = if pending {
        format!("#{} syncing", card.id)
    } else {
        format!("#{}", card.id)
    };
    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(border).bg(bg))
        .title(Line::styled(label, Style::default().fg(app.theme.dim).bg(bg)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = wrap_to_width(&card.title, inner.width as usize, inner.height as usize)
        .into_iter()
        .map(|l| Line::styled(l, text_style))
        .collect();
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
}
