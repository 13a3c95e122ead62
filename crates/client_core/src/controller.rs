use std::sync::Arc;

use shared::{
    domain::{Article, SortColumn, SortDirection, Window},
    snapshot::PersistedSnapshot,
};
use storage::{load_snapshot, save_snapshot, DurableStore, SnapshotError};
use tracing::{debug, error, info};

use crate::{error::FetchFailure, sorting, source::ArticleSource};

/// Rows added per "load more" and width of each remote page window.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    pub articles: Vec<Article>,
    pub start: usize,
    /// Exclusive display bound. May run past `articles.len()`; readers clamp.
    pub stop: usize,
    /// Slice of the remote response merged by the next fetch.
    pub more_window: Window,
    pub words_next: SortDirection,
    pub publish_next: SortDirection,
    pub fetch_in_flight: bool,
}

impl ListState {
    pub fn initial(bundled: &[Article]) -> Self {
        Self {
            articles: bundled.to_vec(),
            start: 0,
            stop: PAGE_SIZE,
            more_window: Window::new(0, PAGE_SIZE),
            words_next: SortDirection::Asc,
            publish_next: SortDirection::Asc,
            fetch_in_flight: false,
        }
    }

    pub fn visible_window(&self) -> Window {
        Window::new(self.start, self.stop).clamped(self.articles.len())
    }

    pub fn visible(&self) -> &[Article] {
        self.visible_window().slice(&self.articles)
    }

    pub fn next_direction(&self, column: SortColumn) -> SortDirection {
        match column {
            SortColumn::Words => self.words_next,
            SortColumn::PublishAt => self.publish_next,
        }
    }

    fn set_next_direction(&mut self, column: SortColumn, direction: SortDirection) {
        match column {
            SortColumn::Words => self.words_next = direction,
            SortColumn::PublishAt => self.publish_next = direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    /// More local rows revealed.
    Advanced { stop: usize },
    /// A remote page was merged.
    Fetched { appended: usize, stop: usize },
    FetchFailed,
    /// A previous fetch has not completed; nothing was requested.
    FetchInFlight,
}

/// Proof that a fetch was started; hand it back to `finish_fetch`.
#[derive(Debug)]
pub struct FetchTicket {
    window: Window,
}

impl FetchTicket {
    pub fn window(&self) -> Window {
        self.window
    }
}

#[derive(Debug)]
#[must_use]
pub enum LoadMoreStep {
    Done(LoadMoreOutcome),
    Fetch(FetchTicket),
}

pub struct ArticleListController {
    source: Arc<dyn ArticleSource>,
    store: Arc<dyn DurableStore>,
    state: ListState,
    snapshot: Option<PersistedSnapshot>,
}

impl ArticleListController {
    pub fn new(source: Arc<dyn ArticleSource>, store: Arc<dyn DurableStore>) -> Self {
        let state = ListState::initial(source.bundled());
        Self {
            source,
            store,
            state,
            snapshot: None,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn visible(&self) -> &[Article] {
        self.state.visible()
    }

    pub fn stop(&self) -> usize {
        self.state.stop
    }

    pub fn next_direction(&self, column: SortColumn) -> SortDirection {
        self.state.next_direction(column)
    }

    pub fn snapshot(&self) -> Option<&PersistedSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn source(&self) -> &Arc<dyn ArticleSource> {
        &self.source
    }

    /// Loads the stored snapshot, if any, over the bundled defaults.
    pub async fn mount(&mut self) -> Result<bool, SnapshotError> {
        match load_snapshot(self.store.as_ref()).await? {
            Some(snapshot) => {
                self.restore(snapshot);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replaces articles and stop with the snapshot's. The remote window is
    /// left where it was, so it may not line up with what is shown.
    pub fn restore(&mut self, snapshot: PersistedSnapshot) {
        info!(
            articles = snapshot.articles.len(),
            stop = snapshot.stop,
            "restored list from snapshot"
        );
        self.state.articles = snapshot.articles.clone();
        self.state.stop = snapshot.stop;
        self.snapshot = Some(snapshot);
    }

    pub async fn load_more(&mut self) -> LoadMoreOutcome {
        match self.begin_load_more() {
            LoadMoreStep::Done(outcome) => outcome,
            LoadMoreStep::Fetch(ticket) => {
                let result = self.source.fetch_more().await;
                self.finish_fetch(ticket, result)
            }
        }
    }

    /// Synchronous half of `load_more`. Either finishes locally or asks the
    /// caller to run a fetch and report back through `finish_fetch`.
    pub fn begin_load_more(&mut self) -> LoadMoreStep {
        if self.state.stop >= self.source.bundled().len() {
            if self.state.fetch_in_flight {
                debug!("load more ignored; fetch already in flight");
                return LoadMoreStep::Done(LoadMoreOutcome::FetchInFlight);
            }
            self.state.fetch_in_flight = true;
            let window = self.state.more_window;
            debug!(
                window_start = window.start,
                window_end = window.end,
                "local articles exhausted; fetching remote page"
            );
            return LoadMoreStep::Fetch(FetchTicket { window });
        }

        match &self.snapshot {
            Some(snapshot) => {
                self.state.articles = sorting::resort(&snapshot.articles, snapshot.sort_order());
                self.state.stop = snapshot.stop + PAGE_SIZE;
            }
            None => self.state.stop += PAGE_SIZE,
        }
        debug!(stop = self.state.stop, "revealed more local articles");
        LoadMoreStep::Done(LoadMoreOutcome::Advanced {
            stop: self.state.stop,
        })
    }

    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Article>, FetchFailure>,
    ) -> LoadMoreOutcome {
        self.state.fetch_in_flight = false;
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, window = %ticket.window, "failed to load more articles");
                return LoadMoreOutcome::FetchFailed;
            }
        };

        let page = ticket.window.slice(&response);
        let mut merged = Vec::with_capacity(self.state.articles.len() + page.len());
        merged.extend_from_slice(&self.state.articles);
        merged.extend_from_slice(page);
        if let Some(snapshot) = &self.snapshot {
            merged = sorting::resort(&merged, snapshot.sort_order());
        }

        self.state.more_window = ticket.window.advanced_by(PAGE_SIZE);
        self.state.stop = if self.state.stop >= merged.len() {
            self.source.bundled().len() + response.len()
        } else {
            self.state.stop + PAGE_SIZE
        };
        self.state.articles = merged;

        info!(
            appended = page.len(),
            stop = self.state.stop,
            total = self.state.articles.len(),
            "merged remote articles"
        );
        LoadMoreOutcome::Fetched {
            appended: page.len(),
            stop: self.state.stop,
        }
    }

    /// Applies `direction` to `column`, then saves the result as the new
    /// snapshot. The column's next direction becomes the opposite. A failed
    /// save is returned, but the new snapshot is still the one held.
    pub async fn sort_by(
        &mut self,
        direction: SortDirection,
        column: SortColumn,
    ) -> Result<(), SnapshotError> {
        self.state.set_next_direction(column, direction.reversed());
        let window = Window::new(self.state.start, self.state.stop);
        self.state.articles =
            sorting::apply_sort_click(&self.state.articles, window, direction, column);

        // Held before the write so local paging follows the on-screen order
        // even when the store rejects it.
        let snapshot = self.snapshot.insert(PersistedSnapshot::sorted(
            self.state.articles.clone(),
            self.state.stop,
            direction,
            column,
        ));
        save_snapshot(self.store.as_ref(), snapshot).await?;
        info!(%direction, %column, stop = self.state.stop, "sorted articles");
        Ok(())
    }

    /// Header click: sorts with whatever direction the column is due next.
    pub async fn click_sort(&mut self, column: SortColumn) -> Result<(), SnapshotError> {
        let direction = self.next_direction(column);
        self.sort_by(direction, column).await
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
