//! Concurrent directory-tree file finder.
//!
//! Given a root directory, a pattern, and filters, `finder` enumerates files
//! that match by name and/or content in two phases: a bounded-concurrency
//! directory walk that collects candidates and matches their names, then an
//! optional bounded-concurrency content scan. Consumers observe both phases
//! through a typed event bus and may cancel the content scan at the
//! checkpoint between them.
//!
//! ```no_run
//! use finder::{Finder, SearchConfig};
//!
//! let mut finder = Finder::new(SearchConfig::default());
//! finder.events().on_collection_complete(|stats, token| {
//!     if stats.total_files > 100_000 {
//!         token.cancel(); // skip the content scan, keep the name matches
//!     }
//! });
//! let summary = finder.search("TODO", ".").unwrap();
//! println!("{} name matches", summary.by_name.len());
//! ```

pub mod config;
pub mod errors;
pub mod events;
pub mod filters;
pub mod results;
pub mod search;

pub use config::SearchConfig;
pub use errors::{SearchError, SearchResult};
pub use events::{CancelToken, EventBus};
pub use filters::ExtensionFilter;
pub use results::{CollectionStats, FileRecord, Phase, ScanProgress, SearchSummary};
pub use search::{search, Finder, PatternMatcher};
