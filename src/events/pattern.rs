//! # Tag patterns: compiled subscription filters.
//!
//! A [`TagPattern`] is a regex compiled once at declaration time and matched
//! against every emitted tag. Compilation failures surface immediately as
//! [`PatternError`], never at emit time.
//!
//! Matching is unanchored, mirroring the original matcher: `svc\.` matches
//! `"svc.latency"` and `"a.svc.latency"` alike. Anchor with `^`/`$` when an
//! exact position is required.

use regex::Regex;

use crate::error::PatternError;

/// Compiled matcher over tag strings.
#[derive(Clone, Debug)]
pub struct TagPattern {
    regex: Regex,
}

impl TagPattern {
    /// Compiles a pattern, failing fast on malformed input.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(pattern).map_err(|source| PatternError::Invalid {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// True when the pattern matches anywhere in `tag`.
    pub fn matches(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_are_unanchored() {
        let p = TagPattern::compile(r"svc\.").unwrap();
        assert!(p.matches("svc.latency"));
        assert!(p.matches("east.svc.latency"));
        assert!(!p.matches("svclatency"));
    }

    #[test]
    fn test_exact_match_with_anchors() {
        let p = TagPattern::compile(r"^svc\.latency$").unwrap();
        assert!(p.matches("svc.latency"));
        assert!(!p.matches("svc.latency.p99"));
    }

    #[test]
    fn test_unescaped_dot_matches_any_segment_separator() {
        // Dots in tags are segment separators; an unescaped dot in a pattern
        // is a regex wildcard, same as the original Regexp behavior.
        let p = TagPattern::compile("svc.latency").unwrap();
        assert!(p.matches("svcXlatency"));
    }

    #[test]
    fn test_compile_failure_is_immediate() {
        let err = TagPattern::compile("(unclosed").unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
    }
}
