use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

use crate::errors::{SearchError, SearchResult};

/// Characters that cause a pattern to be treated as a regular expression.
/// A pattern containing none of these matches as a literal substring.
const REGEX_METACHARACTERS: &[char] = &[
    '.', '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

static PATTERN_CACHE: Lazy<DashMap<(String, bool), MatchStrategy>> = Lazy::new(DashMap::new);

/// Strategy for pattern matching
#[derive(Debug, Clone)]
enum MatchStrategy {
    Literal(String),
    Regex(Arc<Regex>),
}

/// A compiled name/content matcher.
///
/// Patterns containing regex metacharacters are compiled with the `regex`
/// crate; everything else matches as a literal substring. Case-insensitive
/// literals are escaped and compiled case-insensitively so that case folding
/// follows the regex engine's rules.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    strategy: MatchStrategy,
}

impl PatternMatcher {
    /// Compiles a user pattern, reusing a previously compiled strategy when
    /// the same pattern and case mode were seen before.
    pub fn compile(raw: &str, ignore_case: bool) -> SearchResult<Self> {
        let key = (raw.to_string(), ignore_case);
        if let Some(entry) = PATTERN_CACHE.get(&key) {
            return Ok(Self {
                strategy: entry.clone(),
            });
        }

        let strategy = if Self::is_regex_pattern(raw) {
            MatchStrategy::Regex(Arc::new(Self::build_regex(raw, ignore_case)?))
        } else if ignore_case {
            MatchStrategy::Regex(Arc::new(Self::build_regex(&regex::escape(raw), true)?))
        } else {
            MatchStrategy::Literal(raw.to_string())
        };

        PATTERN_CACHE.insert(key, strategy.clone());
        Ok(Self { strategy })
    }

    fn build_regex(pattern: &str, ignore_case: bool) -> SearchResult<Regex> {
        RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|e| SearchError::invalid_pattern(format!("{pattern}: {e}")))
    }

    /// Whether the pattern should be interpreted as a regular expression
    fn is_regex_pattern(raw: &str) -> bool {
        raw.contains(REGEX_METACHARACTERS)
    }

    /// Tests the given text against the pattern.
    pub fn is_match(&self, text: &str) -> bool {
        match &self.strategy {
            MatchStrategy::Literal(literal) => text.contains(literal.as_str()),
            MatchStrategy::Regex(regex) => regex.is_match(text),
        }
    }
}
