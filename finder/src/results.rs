use std::path::PathBuf;

/// A regular file discovered during the collection phase.
///
/// Records are only created for entries the walker could stat successfully,
/// so a `FileRecord` never represents a directory or an unreadable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Full path to the file
    pub path: PathBuf,
    /// Base name of the file
    pub name: String,
    /// File size in bytes
    pub size: u64,
}

/// Aggregated result of one search invocation.
///
/// Both lists contain each path at most once and carry no ordering guarantee;
/// files are discovered and scanned concurrently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSummary {
    /// Paths whose base name matched the pattern
    pub by_name: Vec<PathBuf>,
    /// Paths whose contents matched the pattern
    pub by_content: Vec<PathBuf>,
}

impl SearchSummary {
    /// Creates an empty summary
    pub fn new() -> Self {
        Default::default()
    }

    /// Total number of matching paths across both lists
    pub fn total_matches(&self) -> usize {
        self.by_name.len() + self.by_content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty() && self.by_content.is_empty()
    }
}

/// Statistics carried by the collection-complete event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    /// Number of files that passed the extension filter
    pub total_files: usize,
    /// Combined size of the collected files in bytes
    pub total_size: u64,
    /// Number of collected files whose name matched the pattern
    pub name_matches: usize,
}

/// Progress of the content-scan phase, emitted once per completed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    /// Monotonic counter of completed scans, `1..=total`
    pub current: usize,
    /// Number of files being scanned
    pub total: usize,
    /// The file that just finished
    pub path: PathBuf,
}

/// The lifecycle phase a search is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Walking the directory tree and matching file names
    Collecting,
    /// Scanning file contents
    Searching,
}
