//! Scripted fetcher shared by the loader and controller tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use url::Url;

use crate::{error::FetchError, fetch::BookFetcher};

#[derive(Clone)]
pub(crate) struct Reply {
    pub outcome: Result<String, FetchError>,
    pub delay: Duration,
}

/// Answers by the `q` parameter; unknown queries get `{}`.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    replies: Mutex<HashMap<String, Reply>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(self: &Arc<Self>, query: &str, body: &str) -> Arc<Self> {
        self.script(query, Ok(body.to_string()), Duration::ZERO)
    }

    pub fn reply_slowly(self: &Arc<Self>, query: &str, body: &str, delay: Duration) -> Arc<Self> {
        self.script(query, Ok(body.to_string()), delay)
    }

    pub fn fail(self: &Arc<Self>, query: &str, err: FetchError) -> Arc<Self> {
        self.script(query, Err(err), Duration::ZERO)
    }

    fn script(
        self: &Arc<Self>,
        query: &str,
        outcome: Result<String, FetchError>,
        delay: Duration,
    ) -> Arc<Self> {
        self.replies
            .lock()
            .expect("replies")
            .insert(query.to_string(), Reply { outcome, delay });
        Arc::clone(self)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().expect("seen").clone()
    }
}

#[async_trait]
impl BookFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let query = url
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        self.seen.lock().expect("seen").push(query.clone());

        let reply = self
            .replies
            .lock()
            .expect("replies")
            .get(&query)
            .cloned()
            .unwrap_or(Reply {
                outcome: Ok("{}".to_string()),
                delay: Duration::ZERO,
            });

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.outcome
    }
}

pub(crate) const DUNE: &str =
    r#"{"items":[{"volumeInfo":{"title":"Dune","authors":["Frank Herbert"]}}]}"#;
pub(crate) const SOLARIS: &str =
    r#"{"items":[{"volumeInfo":{"title":"Solaris","authors":["Stanislaw Lem"]}}]}"#;
