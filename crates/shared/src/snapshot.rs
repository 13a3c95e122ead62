use serde::{Deserialize, Serialize};

use crate::domain::{Article, SortColumn, SortDirection};

/// The restore point written on every sort: ordered articles, the display
/// bound that was active, and the sort that produced the ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub articles: Vec<Article>,
    pub stop: usize,
    pub direction: Option<SortDirection>,
    pub column: Option<SortColumn>,
}

impl PersistedSnapshot {
    pub fn sorted(
        articles: Vec<Article>,
        stop: usize,
        direction: SortDirection,
        column: SortColumn,
    ) -> Self {
        Self {
            articles,
            stop,
            direction: Some(direction),
            column: Some(column),
        }
    }

    /// Both halves of the sort, or `None` when either was never recorded.
    pub fn sort_order(&self) -> Option<(SortDirection, SortColumn)> {
        self.direction.zip(self.column)
    }
}
