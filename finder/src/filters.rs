//! File-type and directory filtering.
//!
//! The extension filter is compiled once per search from a file-type spec:
//! `"source"` (or an empty spec) selects the built-in source-code extensions,
//! `"all"` disables extension filtering entirely, and anything else is read as
//! a comma-separated extension list.

use std::path::Path;

/// Extensions selected by the `"source"` file-type spec.
pub const COMMON_SOURCE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "py", "java", "c", "h", "cpp", "cc", "hpp", "cs",
    "php", "rb", "go", "rs", "scala", "kt", "swift", "dart", "vue", "html", "css", "scss", "sass",
    "less", "sql", "sh", "bash", "zsh", "pl", "lua", "r", "m", "mm",
];

/// Directory base names pruned from traversal by default: version-control
/// metadata, dependency trees, and build output.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".hg",
    ".svn",
    "dist",
    "build",
    "target",
    "coverage",
    ".next",
    ".cache",
    "vendor",
    "__pycache__",
    ".venv",
];

/// Returns the default excluded-directory list as owned strings.
pub fn default_exclude_dirs() -> Vec<String> {
    DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect()
}

/// An extension-acceptance predicate compiled from a file-type spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Compiles a file-type spec into a predicate.
    ///
    /// Returns `None` when every file should be accepted: the `"all"` spec,
    /// or a custom list that is empty after trimming.
    pub fn from_spec(spec: &str) -> Option<Self> {
        let effective = spec.trim();
        if effective.is_empty() || effective.eq_ignore_ascii_case("source") {
            return Some(Self {
                extensions: COMMON_SOURCE_EXTENSIONS
                    .iter()
                    .map(|e| e.to_string())
                    .collect(),
            });
        }
        if effective.eq_ignore_ascii_case("all") {
            return None;
        }

        let mut extensions: Vec<String> = Vec::new();
        for raw in effective.split(',') {
            let ext = raw.trim().trim_start_matches('.').to_ascii_lowercase();
            if !ext.is_empty() && !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        if extensions.is_empty() {
            return None;
        }
        Some(Self { extensions })
    }

    /// Whether the path carries one of the accepted extensions
    /// (case-insensitive).
    pub fn matches(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}
