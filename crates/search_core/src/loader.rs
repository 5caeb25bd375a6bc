//! Cancellable background loads with a single current-run slot.
//!
//! `start` bumps the slot generation and aborts whatever was running. A run
//! only publishes while holding the slot lock and only if its generation is
//! still current, so a superseded run can never reach the observer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::Sender;
use shared::{
    domain::LoadId,
    protocol::{LoadDelivery, LoadResult},
};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, info};

use crate::{fetch::BookFetcher, parser::parse_volumes, query::SearchQuery};

pub type Observer = Sender<LoadDelivery>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Running,
    Delivered,
    Cancelled,
}

/// What an observer found when it attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub state: LoaderState,
    pub load_id: LoadId,
}

struct Slot {
    state: LoaderState,
    current: LoadId,
    task: Option<JoinHandle<()>>,
    held: Option<LoadDelivery>,
    observer: Option<Observer>,
}

impl Slot {
    fn abort_running(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };
        task.abort();
        self.state == LoaderState::Running
    }

    fn deliver(&mut self, delivery: &LoadDelivery) {
        let Some(observer) = &self.observer else {
            debug!(load_id = delivery.load_id.0, "no observer attached, holding result");
            return;
        };
        if observer.send(delivery.clone()).is_err() {
            debug!(load_id = delivery.load_id.0, "observer hung up, detaching");
            self.observer = None;
        }
    }
}

pub struct SearchLoader {
    fetcher: Arc<dyn BookFetcher>,
    runtime: Handle,
    slot: Arc<Mutex<Slot>>,
}

impl SearchLoader {
    pub fn new(fetcher: Arc<dyn BookFetcher>, runtime: Handle) -> Self {
        Self {
            fetcher,
            runtime,
            slot: Arc::new(Mutex::new(Slot {
                state: LoaderState::Idle,
                current: LoadId(0),
                task: None,
                held: None,
                observer: None,
            })),
        }
    }

    /// Supersedes any running load and spawns a fresh one for `query`.
    pub fn start(&self, query: SearchQuery) -> LoadId {
        let mut slot = lock(&self.slot);

        if slot.abort_running() {
            info!(load_id = slot.current.0, "cancelled superseded load");
        }

        let load_id = slot.current.next();
        slot.current = load_id;
        slot.state = LoaderState::Running;
        slot.held = None;

        let fetcher = Arc::clone(&self.fetcher);
        let shared_slot = Arc::clone(&self.slot);
        info!(load_id = load_id.0, query = query.raw_text(), "starting load");

        slot.task = Some(self.runtime.spawn(async move {
            let url = query.url();
            let result = match fetcher.fetch(&url).await {
                Ok(body) => parse_volumes(Some(&body)),
                Err(err) => {
                    info!(load_id = load_id.0, %url, error = %err, "fetch failed");
                    LoadResult::from(err)
                }
            };
            publish(
                &shared_slot,
                LoadDelivery {
                    load_id,
                    query: query.raw_text().to_string(),
                    blank_query: query.is_blank(),
                    result,
                },
            );
        }));

        load_id
    }

    /// Cancels the running load, if any. Returns whether something was cancelled.
    pub fn cancel(&self) -> bool {
        let mut slot = lock(&self.slot);
        if !slot.abort_running() {
            return false;
        }
        slot.state = LoaderState::Cancelled;
        info!(load_id = slot.current.0, "cancelled load");
        true
    }

    /// Cancels any run and forgets the held result.
    pub fn reset(&self) {
        let mut slot = lock(&self.slot);
        slot.abort_running();
        slot.held = None;
        slot.state = LoaderState::Idle;
        debug!(load_id = slot.current.0, "loader reset");
    }

    /// Registers `observer`, replacing the previous one. A held result is replayed
    /// to it right away without fetching again.
    pub fn attach(&self, observer: Observer) -> Attachment {
        let mut slot = lock(&self.slot);
        slot.observer = Some(observer);

        if slot.state == LoaderState::Delivered {
            if let Some(held) = slot.held.clone() {
                debug!(load_id = held.load_id.0, "replaying held result");
                slot.deliver(&held);
            }
        }

        Attachment {
            state: slot.state,
            load_id: slot.current,
        }
    }

    /// Removes `observer` if it is the registered one. A running load keeps going.
    pub fn detach(&self, observer: &Observer) {
        let mut slot = lock(&self.slot);
        if slot
            .observer
            .as_ref()
            .is_some_and(|current| current.same_channel(observer))
        {
            slot.observer = None;
        }
    }

    /// Whether `observer` is the channel deliveries currently go to.
    pub fn observes(&self, observer: &Observer) -> bool {
        lock(&self.slot)
            .observer
            .as_ref()
            .is_some_and(|current| current.same_channel(observer))
    }

    pub fn state(&self) -> LoaderState {
        lock(&self.slot).state
    }

    /// Identifier of the most recently started load, `LoadId(0)` before the first.
    pub fn current_load(&self) -> LoadId {
        lock(&self.slot).current
    }

    pub fn held_result(&self) -> Option<LoadResult> {
        lock(&self.slot).held.as_ref().map(|held| held.result.clone())
    }
}

impl Drop for SearchLoader {
    fn drop(&mut self) {
        lock(&self.slot).abort_running();
    }
}

fn publish(slot: &Mutex<Slot>, delivery: LoadDelivery) {
    let mut slot = lock(slot);

    if slot.current != delivery.load_id || slot.state != LoaderState::Running {
        debug!(
            load_id = delivery.load_id.0,
            current = slot.current.0,
            "discarding stale result"
        );
        return;
    }

    info!(
        load_id = delivery.load_id.0,
        books = delivery.result.books().len(),
        "load finished"
    );
    slot.state = LoaderState::Delivered;
    slot.task = None;
    slot.deliver(&delivery);
    slot.held = Some(delivery);
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
