use serde::Serialize;

use crate::model::board::TaskId;

use super::gesture::Point;

/// A card's identity and vertical center, as laid out by the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSlot {
    pub id: TaskId,
    pub vertical_center: f64,
}

impl CardSlot {
    pub fn new(id: TaskId, vertical_center: f64) -> Self {
        CardSlot {
            id,
            vertical_center,
        }
    }
}

/// A candidate drop location: insertion index within a column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DropTarget {
    pub column: String,
    pub index: usize,
}

impl DropTarget {
    pub fn new(column: impl Into<String>, index: usize) -> Self {
        DropTarget {
            column: column.into(),
            index,
        }
    }
}

/// Geometry the drop-zone computation needs from whatever renders the board.
pub trait DropSurface {
    /// Key of the column whose drop container contains `pos`
    fn column_at(&self, pos: Point) -> Option<String>;
    /// Cards of a column, top to bottom
    fn card_slots(&self, column: &str) -> Vec<CardSlot>;
    /// Card under `pos`, if any
    fn card_at(&self, pos: Point) -> Option<TaskId>;
}

/// Insert before the nearest card whose center lies below the pointer.
///
/// Among cards with `pointer_y - center < 0`, the one with the smallest
/// magnitude offset wins (the earliest on ties). With no such card the
/// index is the end of the list.
pub fn compute_insertion_index(cards: &[CardSlot], pointer_y: f64) -> usize {
    let mut closest: Option<(usize, f64)> = None;
    for (i, card) in cards.iter().enumerate() {
        let offset = pointer_y - card.vertical_center;
        if offset < 0.0 && closest.is_none_or(|(_, best)| offset > best) {
            closest = Some((i, offset));
        }
    }
    closest.map_or(cards.len(), |(i, _)| i)
}

/// Resolve where a dragged card would land if released at `pos`.
/// The dragged card itself is left out of the sibling list.
pub fn resolve_drop_target(
    surface: &dyn DropSurface,
    pos: Point,
    dragged: TaskId,
) -> Option<DropTarget> {
    let column = surface.column_at(pos)?;
    let slots: Vec<CardSlot> = surface
        .card_slots(&column)
        .into_iter()
        .filter(|slot| slot.id != dragged)
        .collect();
    let index = compute_insertion_index(&slots, pos.y);
    Some(DropTarget { column, index })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(centers: &[f64]) -> Vec<CardSlot> {
        centers
            .iter()
            .enumerate()
            .map(|(i, c)| CardSlot::new(i as TaskId + 1, *c))
            .collect()
    }

    #[test]
    fn inserts_before_nearest_card_below() {
        let cards = slots(&[100.0, 200.0, 300.0]);
        assert_eq!(compute_insertion_index(&cards, 150.0), 1);
        assert_eq!(compute_insertion_index(&cards, 0.0), 0);
        assert_eq!(compute_insertion_index(&cards, 250.0), 2);
    }

    #[test]
    fn below_all_cards_is_end_of_list() {
        let cards = slots(&[100.0, 200.0, 300.0]);
        assert_eq!(compute_insertion_index(&cards, 301.0), 3);
        assert_eq!(compute_insertion_index(&[], 10.0), 0);
    }

    #[test]
    fn pointer_on_a_center_goes_after_that_card() {
        let cards = slots(&[100.0, 200.0]);
        assert_eq!(compute_insertion_index(&cards, 100.0), 1);
    }

    #[test]
    fn unsorted_centers_still_pick_nearest_below() {
        let cards = slots(&[300.0, 120.0, 200.0]);
        assert_eq!(compute_insertion_index(&cards, 110.0), 1);
    }

    #[test]
    fn equal_offsets_pick_first() {
        let cards = slots(&[200.0, 200.0]);
        assert_eq!(compute_insertion_index(&cards, 150.0), 0);
    }

    #[test]
    fn nan_pointer_goes_to_end() {
        let cards = slots(&[100.0]);
        assert_eq!(compute_insertion_index(&cards, f64::NAN), 1);
    }

    struct OneColumn(Vec<CardSlot>);

    impl DropSurface for OneColumn {
        fn column_at(&self, pos: Point) -> Option<String> {
            (pos.x >= 0.0 && pos.x < 100.0).then(|| "done".to_string())
        }
        fn card_slots(&self, _column: &str) -> Vec<CardSlot> {
            self.0.clone()
        }
        fn card_at(&self, _pos: Point) -> Option<TaskId> {
            None
        }
    }

    #[test]
    fn resolve_skips_the_dragged_card() {
        let surface = OneColumn(vec![
            CardSlot::new(7, 100.0),
            CardSlot::new(8, 200.0),
            CardSlot::new(9, 300.0),
        ]);
        assert_eq!(
            resolve_drop_target(&surface, Point::new(10.0, 250.0), 8),
            Some(DropTarget::new("done", 1))
        );
        assert_eq!(resolve_drop_target(&surface, Point::new(150.0, 250.0), 8), None);
    }
}
