//! Two-phase search coordination.
//!
//! A search first collects files (directory walk plus name matching), then
//! optionally scans their contents. Between the phases sits a cancellation
//! checkpoint: subscribers of the collection-complete event run to completion
//! during the emit and may cancel the token they are handed, and the flag is
//! read exactly once afterwards. Once the content phase starts, dispatched
//! scans always run to completion.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

use super::matcher::PatternMatcher;
use super::scanner;
use super::walker::FileWalker;
use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::events::{CancelToken, EventBus};
use crate::results::{CollectionStats, FileRecord, Phase, ScanProgress, SearchSummary};

/// Coordinates the collect/name-match and content-scan phases of a search.
///
/// A `Finder` may be reused: each call to [`Finder::search`] fully resets the
/// accumulated result. Overlapping searches on one instance are ruled out by
/// the `&mut self` receiver; callers who share a finder must serialize access.
pub struct Finder {
    config: SearchConfig,
    events: EventBus,
    summary: SearchSummary,
}

impl Finder {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            events: EventBus::new(),
            summary: SearchSummary::new(),
        }
    }

    /// The notification channel consumers subscribe to.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The result of the most recent search.
    pub fn found(&self) -> &SearchSummary {
        &self.summary
    }

    /// Runs a full search for `pattern` under `directory`.
    ///
    /// Fails before any traversal if the directory is missing or the pattern
    /// does not compile; every later error is contained to the entry that
    /// raised it and reported through the event bus.
    pub fn search(
        &mut self,
        pattern: &str,
        directory: impl AsRef<Path>,
    ) -> SearchResult<SearchSummary> {
        // Resolve up front so every FileRecord carries an absolute path
        let root = directory
            .as_ref()
            .canonicalize()
            .map_err(|_| SearchError::directory_not_found(directory.as_ref()))?;
        if !root.is_dir() {
            return Err(SearchError::directory_not_found(&root));
        }
        let matcher = PatternMatcher::compile(pattern, self.config.ignore_case)?;

        self.summary = SearchSummary::new();
        let cancel = CancelToken::new();

        info!("searching for {:?} under {}", pattern, root.display());
        self.events.emit_phase(Phase::Collecting);

        let walker = FileWalker::new(&self.config)?;
        let files = walker.collect(&root, &self.events);

        if !self.config.content_only {
            self.summary.by_name = files
                .iter()
                .filter(|file| matcher.is_match(&file.name))
                .map(|file| file.path.clone())
                .collect();
        }

        let stats = CollectionStats {
            total_files: files.len(),
            total_size: files.iter().map(|file| file.size).sum(),
            name_matches: self.summary.by_name.len(),
        };
        debug!(
            "collected {} files ({} bytes), {} name matches",
            stats.total_files, stats.total_size, stats.name_matches
        );

        // Checkpoint: collection-complete subscribers run to completion inside
        // this emit, so a cancellation they request is visible when the token
        // is read below. The token is read once; it is never re-checked after
        // the content phase starts.
        self.events.emit_collection_complete(&stats, &cancel);

        if cancel.is_cancelled() || self.config.name_only || files.is_empty() {
            if cancel.is_cancelled() {
                info!("content scan cancelled at checkpoint");
            }
            self.events.emit_found(&self.summary);
            return Ok(self.summary.clone());
        }

        self.summary.by_content = self.scan_contents(&files, &matcher)?;
        self.events.emit_found(&self.summary);
        Ok(self.summary.clone())
    }

    fn scan_contents(
        &self,
        files: &[FileRecord],
        matcher: &PatternMatcher,
    ) -> SearchResult<Vec<PathBuf>> {
        self.events.emit_phase(Phase::Searching);
        self.events.emit_content_search_started(files.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_content_concurrency.get())
            .thread_name(|i| format!("finder-scan-{i}"))
            .build()
            .map_err(|e| {
                SearchError::config_error(format!("failed to build scanner pool: {e}"))
            })?;

        let total = files.len();
        let scanned = AtomicUsize::new(0);
        let events = &self.events;

        let matches: Vec<PathBuf> = pool.install(|| {
            files
                .par_iter()
                .filter_map(|file| {
                    let outcome = scanner::scan_file(&file.path, matcher);
                    // Exactly one progress tick per file, match or not
                    let current = scanned.fetch_add(1, Ordering::SeqCst) + 1;
                    events.emit_progress(&ScanProgress {
                        current,
                        total,
                        path: file.path.clone(),
                    });
                    match outcome {
                        Ok(true) => Some(file.path.clone()),
                        Ok(false) => None,
                        Err(e) => {
                            events.emit_error(&e);
                            None
                        }
                    }
                })
                .collect()
        });

        info!("content scan complete: {} of {} files matched", matches.len(), total);
        Ok(matches)
    }
}

/// Runs a one-shot search without keeping a [`Finder`] around. Useful when no
/// event subscriptions are needed.
pub fn search(
    pattern: &str,
    directory: impl AsRef<Path>,
    config: &SearchConfig,
) -> SearchResult<SearchSummary> {
    Finder::new(config.clone()).search(pattern, directory)
}
