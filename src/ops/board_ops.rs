use crate::model::board::{Board, Card, Location, TaskId};

/// Error type for board operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("task {0} appears more than once on the board")]
    DuplicateTask(TaskId),
}

/// Remove a card from whichever column holds it.
/// Returns where it was and the card itself.
pub fn remove_card(board: &mut Board, task_id: TaskId) -> Result<(Location, Card), BoardError> {
    let location = board
        .locate(task_id)
        .ok_or(BoardError::TaskNotFound(task_id))?;
    let column = board
        .columns
        .get_mut(&location.column)
        .ok_or_else(|| BoardError::ColumnNotFound(location.column.clone()))?;
    let card = column.cards.remove(location.index);
    Ok((location, card))
}

/// Insert a card into a column. An index past the end appends.
/// Returns the index the card landed at.
pub fn insert_card(
    board: &mut Board,
    column_key: &str,
    index: usize,
    card: Card,
) -> Result<usize, BoardError> {
    let column = board
        .columns
        .get_mut(column_key)
        .ok_or_else(|| BoardError::ColumnNotFound(column_key.to_string()))?;
    let index = index.min(column.cards.len());
    column.cards.insert(index, card);
    Ok(index)
}

/// Move a card to `index` within `to_column`.
///
/// `index` counts positions in the target column with the moved card taken
/// out, which is how drop positions are computed. Returns the card's
/// location before the move. The target column is checked before anything
/// is removed, so a failed move leaves the board untouched.
pub fn move_card(
    board: &mut Board,
    task_id: TaskId,
    to_column: &str,
    index: usize,
) -> Result<Location, BoardError> {
    if !board.columns.contains_key(to_column) {
        return Err(BoardError::ColumnNotFound(to_column.to_string()));
    }
    let (previous, card) = remove_card(board, task_id)?;
    insert_card(board, to_column, index, card)?;
    Ok(previous)
}

/// Find task ids that appear in more than one slot on the board
pub fn duplicate_ids(board: &Board) -> Vec<TaskId> {
    let mut seen = std::collections::HashSet::new();
    let mut dups = Vec::new();
    for card in board.columns.values().flat_map(|c| c.cards.iter()) {
        if !seen.insert(card.id) && !dups.contains(&card.id) {
            dups.push(card.id);
        }
    }
    dups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_board() -> Board {
        let mut board = Board::with_columns([
            ("todo", "To Do"),
            ("in_progress", "In Progress"),
            ("done", "Done"),
        ]);
        for (id, title) in [(1, "A"), (2, "B"), (7, "C"), (4, "D")] {
            board.columns["todo"].cards.push(Card::new(id, title));
        }
        for (id, title) in [(10, "X"), (11, "Y"), (12, "Z")] {
            board.columns["done"].cards.push(Card::new(id, title));
        }
        board
    }

    #[test]
    fn move_across_columns() {
        let mut board = sample_board();
        let prev = move_card(&mut board, 7, "done", 1).unwrap();
        assert_eq!(prev, Location::new("todo", 2));
        assert_eq!(board.column_ids("todo"), vec![1, 2, 4]);
        assert_eq!(board.column_ids("done"), vec![10, 7, 11, 12]);
    }

    #[test]
    fn move_within_column_uses_index_without_card() {
        let mut board = sample_board();
        move_card(&mut board, 1, "todo", 2).unwrap();
        assert_eq!(board.column_ids("todo"), vec![2, 7, 1, 4]);
    }

    #[test]
    fn index_past_end_appends() {
        let mut board = sample_board();
        move_card(&mut board, 2, "in_progress", 40).unwrap();
        assert_eq!(board.locate(2), Some(Location::new("in_progress", 0)));
        move_card(&mut board, 1, "done", usize::MAX).unwrap();
        assert_eq!(board.locate(1), Some(Location::new("done", 3)));
    }

    #[test]
    fn move_to_unknown_column_leaves_board_untouched() {
        let mut board = sample_board();
        let before = board.clone();
        let err = move_card(&mut board, 7, "archive", 0).unwrap_err();
        assert_eq!(err, BoardError::ColumnNotFound("archive".into()));
        assert_eq!(board, before);
    }

    #[test]
    fn move_unknown_task_errors() {
        let mut board = sample_board();
        let err = move_card(&mut board, 99, "done", 0).unwrap_err();
        assert_eq!(err, BoardError::TaskNotFound(99));
    }

    #[test]
    fn move_back_restores_exact_position() {
        let mut board = sample_board();
        let before = board.clone();
        let prev = move_card(&mut board, 7, "done", 0).unwrap();
        move_card(&mut board, 7, &prev.column, prev.index).unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn duplicates_are_reported_once() {
        let mut board = sample_board();
        board.columns["done"].cards.push(Card::new(1, "again"));
        board.columns["in_progress"].cards.push(Card::new(1, "and again"));
        assert_eq!(duplicate_ids(&board), vec![1]);
        assert!(duplicate_ids(&sample_board()).is_empty());
    }
}
