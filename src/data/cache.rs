use std::collections::HashMap;

use futures::future::{LocalBoxFuture, Shared};
use serde_json::Value;

/// A retrieval that several callers may await at once.
pub type PendingFetch = Shared<LocalBoxFuture<'static, Option<Value>>>;

/// Per-session request state: parsed documents by URL plus the retrievals
/// currently in flight.
///
/// Entries are never evicted on their own; only [`clear`](Self::clear) and
/// [`invalidate`](Self::invalidate) remove cached documents.
#[derive(Default)]
pub struct RequestCache {
    documents: HashMap<String, Value>,
    pending: HashMap<String, PendingFetch>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&Value> {
        self.documents.get(url)
    }

    pub fn insert(&mut self, url: &str, value: Value) {
        self.documents.insert(url.to_string(), value);
    }

    pub fn pending(&self, url: &str) -> Option<PendingFetch> {
        self.pending.get(url).cloned()
    }

    pub fn start(&mut self, url: &str, fetch: PendingFetch) {
        self.pending.insert(url.to_string(), fetch);
    }

    pub fn finish(&mut self, url: &str) {
        self.pending.remove(url);
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// Drop the listed URLs, or everything when `urls` is `None`.
    pub fn invalidate(&mut self, urls: Option<&[&str]>) {
        match urls {
            Some(urls) => {
                for url in urls {
                    self.documents.remove(*url);
                }
            }
            None => self.clear(),
        }
    }
}
