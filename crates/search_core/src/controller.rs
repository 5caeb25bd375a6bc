//! Interaction-side state: connectivity gating, loading and empty states.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use shared::{
    domain::{Book, LoadId},
    protocol::{LoadDelivery, LoadResult, StatusMessage},
};
use tracing::{debug, info};

use crate::{
    loader::{Attachment, LoaderState, Observer, SearchLoader},
    query::QueryBuilder,
};

/// Point-in-time network availability check.
pub trait Connectivity: Send + Sync {
    fn is_connected(&self) -> bool;
}

impl<F> Connectivity for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_connected(&self) -> bool {
        self()
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchView {
    pub books: Vec<Book>,
    pub status: Option<StatusMessage>,
    pub loading: bool,
}

pub struct SearchController {
    loader: Arc<SearchLoader>,
    queries: QueryBuilder,
    connectivity: Arc<dyn Connectivity>,
    observer: Observer,
    deliveries: Receiver<LoadDelivery>,
    awaiting: Option<LoadId>,
    view: SearchView,
}

impl SearchController {
    pub fn new(
        loader: Arc<SearchLoader>,
        queries: QueryBuilder,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        let (observer, deliveries) = unbounded();
        Self {
            loader,
            queries,
            connectivity,
            observer,
            deliveries,
            awaiting: None,
            view: SearchView::default(),
        }
    }

    pub fn view(&self) -> &SearchView {
        &self.view
    }

    /// Attaches to the loader. A held result is shown without fetching, a
    /// running load is awaited, otherwise an initial search runs with `input`.
    pub fn initialize(&mut self, input: &str) {
        let attachment = self.attach();
        debug!(state = ?attachment.state, load_id = attachment.load_id.0, "controller attached");

        match attachment.state {
            LoaderState::Delivered => {
                self.awaiting = Some(attachment.load_id);
                self.poll();
            }
            LoaderState::Running => {
                self.awaiting = Some(attachment.load_id);
                self.view.status = None;
                self.view.loading = true;
            }
            LoaderState::Idle | LoaderState::Cancelled => {
                self.search(input);
            }
        }
    }

    /// Starts a load for `input` unless the device is offline.
    ///
    /// Going offline abandons whatever load was awaited; it is not cancelled
    /// but its result is no longer shown.
    pub fn search(&mut self, input: &str) -> Option<LoadId> {
        if !self.connectivity.is_connected() {
            info!("offline, search not started");
            self.awaiting = None;
            self.view.books.clear();
            self.view.loading = false;
            self.view.status = Some(StatusMessage::NoConnection);
            return None;
        }

        if !self.loader.observes(&self.observer) {
            self.attach();
        }
        self.view.status = None;
        self.view.loading = true;
        let load_id = self.loader.start(self.queries.build(input));
        self.awaiting = Some(load_id);
        Some(load_id)
    }

    /// Applies a delivery if it belongs to the load this controller waits for.
    pub fn apply(&mut self, delivery: LoadDelivery) -> bool {
        if self.awaiting != Some(delivery.load_id) {
            debug!(load_id = delivery.load_id.0, "ignoring delivery for another load");
            return false;
        }
        self.awaiting = None;
        self.view.loading = false;

        match delivery.result {
            LoadResult::Success(books) if !books.is_empty() => {
                self.view.books = books;
                self.view.status = None;
            }
            LoadResult::Success(_) | LoadResult::Empty => {
                self.view.books.clear();
                self.view.status = Some(if delivery.blank_query {
                    StatusMessage::EnterSearchTerm
                } else {
                    StatusMessage::NoBooksFound
                });
            }
            LoadResult::NetworkUnavailable => {
                self.view.books.clear();
                self.view.status = Some(StatusMessage::NoConnection);
            }
            LoadResult::Failure(err) => {
                info!(
                    load_id = delivery.load_id.0,
                    query = %delivery.query,
                    error = %err,
                    "search failed"
                );
                self.view.books.clear();
                self.view.status = Some(StatusMessage::RequestFailed);
            }
        }
        true
    }

    /// Applies every delivery already waiting. Never blocks.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(delivery) = self.deliveries.try_recv() {
            if self.apply(delivery) {
                applied += 1;
            }
        }
        applied
    }

    /// Blocks until the awaited load is applied or `timeout` passes.
    pub fn wait_for_delivery(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.deliveries.recv_timeout(remaining) {
                Ok(delivery) => {
                    if self.apply(delivery) {
                        return true;
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.view.loading
    }

    /// Stops receiving deliveries. A running load is left alone so a later
    /// controller can pick up its result.
    pub fn teardown(&mut self) {
        self.loader.detach(&self.observer);
        self.awaiting = None;
    }

    fn attach(&self) -> Attachment {
        self.loader.attach(self.observer.clone())
    }

    pub fn reset(&mut self) {
        self.loader.reset();
        self.awaiting = None;
        self.view.books.clear();
        self.view.loading = false;
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.loader.detach(&self.observer);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
