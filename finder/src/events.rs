//! Typed in-process publish/subscribe channel between the search engine and
//! its consumers.
//!
//! Subscribers register per event kind and run synchronously on the emitting
//! thread; emission with zero subscribers is a no-op. The bus is `Send + Sync`
//! so the walker and the content-scan workers can publish from worker threads.
//!
//! The collection-complete event carries a [`CancelToken`]: a handler may call
//! [`CancelToken::cancel`] before returning, and the coordinator reads the
//! flag exactly once after the emit, before the content phase starts. That
//! emit is the only cancellation window; scans already dispatched run to
//! completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::errors::SearchError;
use crate::results::{CollectionStats, FileRecord, Phase, ScanProgress, SearchSummary};

/// Capability to cancel the content-scan phase at the checkpoint between
/// collection and scanning. Once set, the flag is never cleared mid-search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the content-scan phase not start.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

type Handler<T> = Box<dyn Fn(&T) + Send + Sync>;
type HandlerList<T> = RwLock<Vec<Handler<T>>>;
type CollectionHandler = Box<dyn Fn(&CollectionStats, &CancelToken) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    file_found: HandlerList<FileRecord>,
    error: HandlerList<SearchError>,
    phase: HandlerList<Phase>,
    collection_complete: RwLock<Vec<CollectionHandler>>,
    content_search_started: HandlerList<usize>,
    progress: HandlerList<ScanProgress>,
    found: HandlerList<SearchSummary>,
}

/// Many-subscriber notification channel with per-event-kind registration.
///
/// Cloning is cheap and shares the subscriber lists.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Subscribers>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once for every file that passes the filters during collection.
    /// Invocations from concurrently processed entries are unordered.
    pub fn on_file_found(&self, handler: impl Fn(&FileRecord) + Send + Sync + 'static) {
        self.subscribers
            .file_found
            .write()
            .unwrap()
            .push(Box::new(handler));
    }

    /// Called for every recovered per-entry error. Fatal errors are returned
    /// from `search` instead and never appear here.
    pub fn on_error(&self, handler: impl Fn(&SearchError) + Send + Sync + 'static) {
        self.subscribers
            .error
            .write()
            .unwrap()
            .push(Box::new(handler));
    }

    /// Called when a search enters the collection or content phase.
    pub fn on_phase(&self, handler: impl Fn(&Phase) + Send + Sync + 'static) {
        self.subscribers
            .phase
            .write()
            .unwrap()
            .push(Box::new(handler));
    }

    /// Called after collection and name matching, before the content phase.
    /// This is the cancellation checkpoint: cancel the token here to stop
    /// the search from scanning contents.
    pub fn on_collection_complete(
        &self,
        handler: impl Fn(&CollectionStats, &CancelToken) + Send + Sync + 'static,
    ) {
        self.subscribers
            .collection_complete
            .write()
            .unwrap()
            .push(Box::new(handler));
    }

    /// Called with the file count when the content phase begins.
    pub fn on_content_search_started(&self, handler: impl Fn(&usize) + Send + Sync + 'static) {
        self.subscribers
            .content_search_started
            .write()
            .unwrap()
            .push(Box::new(handler));
    }

    /// Called once per completed content scan, match or not.
    pub fn on_progress(&self, handler: impl Fn(&ScanProgress) + Send + Sync + 'static) {
        self.subscribers
            .progress
            .write()
            .unwrap()
            .push(Box::new(handler));
    }

    /// Called with the final summary, exactly once per search invocation.
    pub fn on_found(&self, handler: impl Fn(&SearchSummary) + Send + Sync + 'static) {
        self.subscribers
            .found
            .write()
            .unwrap()
            .push(Box::new(handler));
    }

    /// Drops every registered subscriber.
    pub fn clear_subscribers(&self) {
        self.subscribers.file_found.write().unwrap().clear();
        self.subscribers.error.write().unwrap().clear();
        self.subscribers.phase.write().unwrap().clear();
        self.subscribers.collection_complete.write().unwrap().clear();
        self.subscribers
            .content_search_started
            .write()
            .unwrap()
            .clear();
        self.subscribers.progress.write().unwrap().clear();
        self.subscribers.found.write().unwrap().clear();
    }

    pub(crate) fn emit_file_found(&self, record: &FileRecord) {
        for handler in self.subscribers.file_found.read().unwrap().iter() {
            handler(record);
        }
    }

    pub(crate) fn emit_error(&self, error: &SearchError) {
        for handler in self.subscribers.error.read().unwrap().iter() {
            handler(error);
        }
    }

    pub(crate) fn emit_phase(&self, phase: Phase) {
        for handler in self.subscribers.phase.read().unwrap().iter() {
            handler(&phase);
        }
    }

    pub(crate) fn emit_collection_complete(&self, stats: &CollectionStats, token: &CancelToken) {
        for handler in self.subscribers.collection_complete.read().unwrap().iter() {
            handler(stats, token);
        }
    }

    pub(crate) fn emit_content_search_started(&self, total: usize) {
        for handler in self
            .subscribers
            .content_search_started
            .read()
            .unwrap()
            .iter()
        {
            handler(&total);
        }
    }

    pub(crate) fn emit_progress(&self, progress: &ScanProgress) {
        for handler in self.subscribers.progress.read().unwrap().iter() {
            handler(progress);
        }
    }

    pub(crate) fn emit_found(&self, summary: &SearchSummary) {
        for handler in self.subscribers.found.read().unwrap().iter() {
            handler(summary);
        }
    }
}
