//! Recursive directory traversal with bounded concurrency.
//!
//! Subdirectory descents run on a dedicated thread pool sized to the
//! configured cap, so fan-out into a wide tree never exceeds that many
//! simultaneous descents. Files within a single directory are stat'ed with
//! unordered parallelism. Every subtree is fault-isolated: a failure inside
//! one directory is reported and the rest of the traversal continues.

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::config::SearchConfig;
use crate::errors::{is_permission_error, SearchError, SearchResult};
use crate::events::EventBus;
use crate::filters::ExtensionFilter;
use crate::results::FileRecord;

/// Enumerates the regular files under a root directory, applying directory
/// exclusions and the extension filter, and emitting a `FileFound` event for
/// every record it produces.
pub struct FileWalker {
    exclude_dirs: Vec<String>,
    filter: Option<ExtensionFilter>,
    pool: rayon::ThreadPool,
}

impl FileWalker {
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_dir_concurrency.get())
            .thread_name(|i| format!("finder-walk-{i}"))
            .build()
            .map_err(|e| SearchError::config_error(format!("failed to build walker pool: {e}")))?;
        Ok(Self {
            exclude_dirs: config.exclude_dirs.clone(),
            filter: config.extension_filter(),
            pool,
        })
    }

    /// Collects every matching file under `root`. The returned order is
    /// unspecified.
    pub fn collect(&self, root: &Path, events: &EventBus) -> Vec<FileRecord> {
        debug!("collecting files under {}", root.display());
        let records = self.pool.install(|| self.walk(root, events));
        debug!("collected {} files", records.len());
        records
    }

    fn walk(&self, dir: &Path, events: &EventBus) -> Vec<FileRecord> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if is_permission_error(&e) => {
                trace!("skipping unreadable directory {}", dir.display());
                return Vec::new();
            }
            Err(e) => {
                events.emit_error(&SearchError::file_read(dir, e));
                return Vec::new();
            }
        };

        let mut subdirs: Vec<PathBuf> = Vec::new();
        let mut candidates: Vec<(PathBuf, String)> = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    if !is_permission_error(&e) {
                        events.emit_error(&SearchError::file_read(dir, e));
                    }
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => {
                    if self.exclude_dirs.iter().any(|d| d == &name) {
                        trace!("pruning excluded directory {}", path.display());
                    } else {
                        subdirs.push(path);
                    }
                }
                Ok(file_type) if file_type.is_file() => {
                    if self.filter.as_ref().map_or(true, |f| f.matches(&path)) {
                        candidates.push((path, name));
                    }
                }
                // Symlinks, sockets, and other non-regular entries are skipped
                Ok(_) => {}
                Err(e) => {
                    if !is_permission_error(&e) {
                        events.emit_error(&SearchError::file_read(&path, e));
                    }
                }
            }
        }

        // Unordered parallel stats for the files in this directory
        let mut records: Vec<FileRecord> = candidates
            .into_par_iter()
            .filter_map(|(path, name)| self.stat_file(path, name, events))
            .collect();

        // Bounded fan-out into subdirectories; a failing subtree never aborts
        // its siblings because every failure is contained inside walk()
        let nested: Vec<FileRecord> = subdirs
            .par_iter()
            .flat_map_iter(|subdir| self.walk(subdir, events))
            .collect();

        records.extend(nested);
        records
    }

    fn stat_file(&self, path: PathBuf, name: String, events: &EventBus) -> Option<FileRecord> {
        match fs::metadata(&path) {
            Ok(meta) => {
                let record = FileRecord {
                    path,
                    name,
                    size: meta.len(),
                };
                events.emit_file_found(&record);
                Some(record)
            }
            Err(e) if is_permission_error(&e) => None,
            Err(e) => {
                warn!("failed to stat {}: {}", path.display(), e);
                events.emit_error(&SearchError::file_read(&path, e));
                None
            }
        }
    }
}
