use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Backend task identifier
pub type TaskId = u64;

/// A card on the board. Its status is the key of the column holding it and
/// its position is its index within that column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
}

impl Card {
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Card {
            id,
            title: title.into(),
            project_id: None,
        }
    }
}

/// A named bucket of cards corresponding to a task status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            cards: Vec::new(),
        }
    }

    /// Index of the card with this id
    pub fn position(&self, task_id: TaskId) -> Option<usize> {
        self.cards.iter().position(|c| c.id == task_id)
    }
}

/// Where a task currently sits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub column: String,
    pub index: usize,
}

impl Location {
    pub fn new(column: impl Into<String>, index: usize) -> Self {
        Location {
            column: column.into(),
            index,
        }
    }
}

/// The locally cached board: columns in display order, keyed by status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub columns: IndexMap<String, Column>,
}

impl Board {
    /// Build a board with the given `(key, name)` columns, all empty
    pub fn with_columns<K, N>(columns: impl IntoIterator<Item = (K, N)>) -> Self
    where
        K: Into<String>,
        N: Into<String>,
    {
        Board {
            columns: columns
                .into_iter()
                .map(|(key, name)| (key.into(), Column::new(name)))
                .collect(),
        }
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.get(key)
    }

    pub fn column_keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// Find the column and index of a task
    pub fn locate(&self, task_id: TaskId) -> Option<Location> {
        self.columns.iter().find_map(|(key, column)| {
            column
                .position(task_id)
                .map(|index| Location::new(key.clone(), index))
        })
    }

    pub fn card(&self, task_id: TaskId) -> Option<&Card> {
        self.columns
            .values()
            .flat_map(|c| c.cards.iter())
            .find(|c| c.id == task_id)
    }

    /// Task ids of a column in display order
    pub fn column_ids(&self, key: &str) -> Vec<TaskId> {
        self.columns
            .get(key)
            .map(|c| c.cards.iter().map(|card| card.id).collect())
            .unwrap_or_default()
    }

    pub fn task_count(&self) -> usize {
        self.columns.values().map(|c| c.cards.len()).sum()
    }
}
