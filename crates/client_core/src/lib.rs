//! Paginated, sortable article list with a durable restore point.

pub mod controller;
pub mod error;
pub mod sorting;
pub mod source;

pub use controller::{
    ArticleListController, FetchTicket, ListState, LoadMoreOutcome, LoadMoreStep, PAGE_SIZE,
};
pub use error::FetchFailure;
pub use source::{parse_bundled, ArticleSource, HttpArticleSource, MORE_ARTICLES_PATH};
pub use storage::{DurableStore, SnapshotError};
