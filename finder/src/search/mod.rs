//! The search engine: pattern matching, directory walking, content scanning,
//! and the coordinator that ties the phases together.

pub mod engine;
pub mod matcher;
pub mod scanner;
pub mod walker;

pub use engine::{search, Finder};
pub use matcher::PatternMatcher;
pub use walker::FileWalker;
