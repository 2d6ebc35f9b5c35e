//! Search filtering and per-column grouping of the board.
//!
//! Everything here is a projection: it is recomputed from the current
//! snapshot whenever the state or the query changes and holds no state of
//! its own.

use serde::Serialize;

use crate::model::{BoardState, Status, Task};

/// A task matches when the query is a case-insensitive substring of its
/// title or description. The empty query matches every task.
pub fn matches(task: &Task, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    task.title.to_lowercase().contains(&needle)
        || task.description.to_lowercase().contains(&needle)
}

pub fn filter_tasks<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    tasks.iter().filter(|t| matches(t, query)).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnView<'a> {
    pub status: Status,
    pub tasks: Vec<&'a Task>,
}

/// The filtered board, one column per status in column order.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView<'a> {
    pub columns: Vec<ColumnView<'a>>,
}

impl<'a> BoardView<'a> {
    pub fn build(state: &'a BoardState, query: &str) -> Self {
        let filtered = filter_tasks(&state.tasks, query);
        let columns = Status::ALL
            .iter()
            .map(|&status| ColumnView {
                status,
                tasks: filtered
                    .iter()
                    .copied()
                    .filter(|t| t.status == status)
                    .collect(),
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, status: Status) -> &ColumnView<'a> {
        &self.columns[status.index()]
    }

    pub fn count(&self, status: Status) -> usize {
        self.column(status).tasks.len()
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}
