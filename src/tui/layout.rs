use ratatui::layout::{Constraint, Layout, Rect};

use crate::drag::drop_zone::{CardSlot, DropSurface, DropTarget};
use crate::drag::gesture::Point;
use crate::model::board::{Board, TaskId};

/// Screen region of one column. `area` includes the border and is the drop
/// container; cards are stacked inside `inner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRegion {
    pub key: String,
    pub area: Rect,
    pub inner: Rect,
}

/// Where a card sits. `top` is unclipped, so cards scrolled past the bottom
/// of their column still have a position for drop-index purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRegion {
    pub id: TaskId,
    pub column: String,
    pub index: usize,
    pub x: u16,
    pub width: u16,
    pub top: u32,
    pub height: u16,
}

impl CardRegion {
    pub fn vertical_center(&self) -> f64 {
        self.top as f64 + self.height as f64 / 2.0
    }

    fn bottom(&self) -> u32 {
        self.top + self.height as u32
    }
}

/// Board geometry for one frame, shared by the renderer and mouse handling
#[derive(Debug, Clone, Default)]
pub struct BoardLayout {
    columns: Vec<ColumnRegion>,
    cards: Vec<CardRegion>,
}

impl BoardLayout {
    /// Columns split `area` evenly; each card takes `card_height` rows.
    pub fn compute(board: &Board, area: Rect, card_height: u16) -> Self {
        let mut layout = BoardLayout::default();
        let n = board.columns.len();
        if n == 0 || area.width == 0 || area.height == 0 {
            return layout;
        }
        let card_height = card_height.max(1);
        let rects = Layout::horizontal((0..n).map(|_| Constraint::Ratio(1, n as u32))).split(area);

        for ((key, column), &rect) in board.columns.iter().zip(rects.iter()) {
            let inner = inset(rect);
            for (index, card) in column.cards.iter().enumerate() {
                layout.cards.push(CardRegion {
                    id: card.id,
                    column: key.clone(),
                    index,
                    x: inner.x,
                    width: inner.width,
                    top: inner.y as u32 + index as u32 * card_height as u32,
                    height: card_height,
                });
            }
            layout.columns.push(ColumnRegion {
                key: key.clone(),
                area: rect,
                inner,
            });
        }
        layout
    }

    pub fn columns(&self) -> &[ColumnRegion] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&ColumnRegion> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn cards_in<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CardRegion> + 'a {
        self.cards.iter().filter(move |c| c.column == column)
    }

    /// The on-screen part of a card, clipped to its column; `None` if hidden
    pub fn visible_rect(&self, card: &CardRegion) -> Option<Rect> {
        let inner = self.column(&card.column)?.inner;
        let bottom = inner.y as u32 + inner.height as u32;
        if card.top >= bottom {
            return None;
        }
        let height = (bottom - card.top).min(card.height as u32) as u16;
        Some(Rect::new(card.x, card.top as u16, card.width, height))
    }

    /// Row to draw the drop indicator on for `target`, with the dragged
    /// card left out of the stack.
    pub fn indicator_row(&self, target: &DropTarget, dragged: TaskId) -> Option<Rect> {
        let region = self.column(&target.column)?;
        let inner = region.inner;
        if inner.height == 0 {
            return None;
        }
        let siblings: Vec<&CardRegion> = self
            .cards_in(&target.column)
            .filter(|c| c.id != dragged)
            .collect();
        let y = match siblings.get(target.index) {
            Some(card) => card.top,
            None => siblings.last().map_or(inner.y as u32, |c| c.bottom()),
        };
        let last_row = inner.y as u32 + inner.height as u32 - 1;
        Some(Rect::new(inner.x, y.min(last_row) as u16, inner.width, 1))
    }
}

fn inset(rect: Rect) -> Rect {
    Rect::new(
        rect.x.saturating_add(1),
        rect.y.saturating_add(1),
        rect.width.saturating_sub(2),
        rect.height.saturating_sub(2),
    )
}

fn contains(rect: Rect, pos: Point) -> bool {
    pos.x >= rect.x as f64
        && pos.x < rect.x as f64 + rect.width as f64
        && pos.y >= rect.y as f64
        && pos.y < rect.y as f64 + rect.height as f64
}

impl DropSurface for BoardLayout {
    fn column_at(&self, pos: Point) -> Option<String> {
        self.columns
            .iter()
            .find(|c| contains(c.area, pos))
            .map(|c| c.key.clone())
    }

    fn card_slots(&self, column: &str) -> Vec<CardSlot> {
        self.cards_in(column)
            .map(|c| CardSlot::new(c.id, c.vertical_center()))
            .collect()
    }

    fn card_at(&self, pos: Point) -> Option<TaskId> {
        self.cards
            .iter()
            .find(|c| self.visible_rect(c).is_some_and(|r| contains(r, pos)))
            .map(|c| c.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::board::Card;
    use pretty_assertions::assert_eq;

    fn board() -> Board {
        let mut board = Board::with_columns([("todo", "To Do"), ("done", "Done")]);
        board.columns["todo"].cards.push(Card::new(1, "one"));
        board.columns["todo"].cards.push(Card::new(2, "two"));
        board.columns["done"].cards.push(Card::new(3, "three"));
        board
    }

    fn layout() -> BoardLayout {
        BoardLayout::compute(&board(), Rect::new(0, 0, 40, 12), 3)
    }

    #[test]
    fn columns_split_evenly() {
        let layout = layout();
        assert_eq!(layout.columns()[0].area, Rect::new(0, 0, 20, 12));
        assert_eq!(layout.columns()[0].inner, Rect::new(1, 1, 18, 10));
        assert_eq!(layout.columns()[1].inner, Rect::new(21, 1, 18, 10));
    }

    #[test]
    fn column_hit_includes_border_and_empty_space() {
        let layout = layout();
        assert_eq!(layout.column_at(Point::new(5.0, 9.0)).as_deref(), Some("todo"));
        assert_eq!(layout.column_at(Point::new(25.0, 0.0)).as_deref(), Some("done"));
        assert_eq!(layout.column_at(Point::new(45.0, 1.0)), None);
        assert_eq!(layout.column_at(Point::new(5.0, 12.0)), None);
    }

    #[test]
    fn card_hit_test() {
        let layout = layout();
        assert_eq!(layout.card_at(Point::new(5.0, 1.0)), Some(1));
        assert_eq!(layout.card_at(Point::new(5.0, 3.0)), Some(1));
        assert_eq!(layout.card_at(Point::new(5.0, 4.0)), Some(2));
        assert_eq!(layout.card_at(Point::new(5.0, 8.0)), None);
        assert_eq!(layout.card_at(Point::new(0.0, 2.0)), None);
    }

    #[test]
    fn slots_report_centers() {
        let layout = layout();
        assert_eq!(
            layout.card_slots("todo"),
            vec![CardSlot::new(1, 2.5), CardSlot::new(2, 5.5)]
        );
    }

    #[test]
    fn indicator_sits_on_target_slot() {
        let layout = layout();
        assert_eq!(
            layout.indicator_row(&DropTarget::new("todo", 1), 3),
            Some(Rect::new(1, 4, 18, 1))
        );
        // After the only sibling once the dragged card is left out
        assert_eq!(
            layout.indicator_row(&DropTarget::new("done", 1), 1),
            Some(Rect::new(21, 4, 18, 1))
        );
        assert_eq!(
            layout.indicator_row(&DropTarget::new("todo", 0), 1),
            Some(Rect::new(1, 4, 18, 1))
        );
    }

    #[test]
    fn cards_past_the_bottom_are_hidden_but_positioned() {
        let layout = BoardLayout::compute(&board(), Rect::new(0, 0, 40, 6), 3);
        let cards: Vec<&CardRegion> = layout.cards_in("todo").collect();
        assert_eq!(layout.visible_rect(cards[0]), Some(Rect::new(1, 1, 18, 3)));
        assert_eq!(layout.visible_rect(cards[1]), Some(Rect::new(1, 4, 18, 1)));
        assert_eq!(layout.card_slots("todo")[1].vertical_center, 5.5);
    }

    #[test]
    fn empty_board_has_no_regions() {
        let layout = BoardLayout::compute(&Board::default(), Rect::new(0, 0, 40, 12), 3);
        assert!(layout.columns().is_empty());
        assert_eq!(layout.column_at(Point::new(1.0, 1.0)), None);
    }
}
