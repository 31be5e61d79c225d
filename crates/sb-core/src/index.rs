//! Signature and pattern indices for one side (whitelist or blacklist).
//!
//! # Layout
//!
//! - `signatures`: 8-byte literal substring -> pattern. A key belongs to the
//!   first rule that produced it.
//! - `patterns`: full translated text -> pattern. Holds regexp-like rules and
//!   rules that could not claim any signature.
//!
//! Both maps hand out the same `Arc<CompiledPattern>`, so one compiled regex
//! can sit behind many signature slots.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::MatchCache;
use crate::pattern::{is_regexp_like, CompiledPattern};

/// Signature window length in bytes.
pub const SIGNATURE_SIZE: usize = 8;

/// Where a freshly inserted pattern ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexPlacement {
    /// Signatures registered for this pattern
    pub signatures: usize,
    /// Pattern index entry kept for this pattern
    pub in_pattern_index: bool,
}

/// Index + cache set for one side of the engine.
#[derive(Debug, Default)]
pub struct RuleSet {
    pub(crate) signatures: HashMap<String, Arc<CompiledPattern>>,
    pub(crate) patterns: HashMap<String, Arc<CompiledPattern>>,
    pub(crate) cache: MatchCache,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a compiled pattern under its translated `source` text.
    ///
    /// Regexp-like text goes straight to the pattern index. Everything else
    /// is cut into 8-byte windows from the end toward the start; each window
    /// free of `*` and not yet claimed becomes a signature. A pattern left
    /// without signatures keeps a single pattern index entry, and one with
    /// more than one signature never keeps one.
    pub fn insert(&mut self, source: &str, pattern: Arc<CompiledPattern>) -> IndexPlacement {
        self.cache.clear();

        if is_regexp_like(source) {
            self.patterns.insert(source.to_string(), pattern);
            return IndexPlacement {
                signatures: 0,
                in_pattern_index: true,
            };
        }

        let mut signatures = 0usize;
        let mut fallback = false;

        for sig in signature_windows(source) {
            let wildcard = sig.contains('*');
            if !wildcard && !self.signatures.contains_key(sig) {
                log::trace!("sig: {} {}", sig, source);
                self.signatures.insert(sig.to_string(), Arc::clone(&pattern));
                signatures += 1;
            } else if wildcard && !self.patterns.contains_key(source) {
                self.patterns.insert(source.to_string(), Arc::clone(&pattern));
                fallback = true;
            }
        }

        if signatures == 0 && !fallback && !self.patterns.contains_key(source) {
            if self.is_duplicate(source, pattern.options()) {
                log::trace!("duplicate pattern: {}", source);
            } else {
                self.patterns.insert(source.to_string(), Arc::clone(&pattern));
                fallback = true;
            }
        }

        if signatures > 1 && fallback {
            self.patterns.remove(source);
            fallback = false;
        }

        IndexPlacement {
            signatures,
            in_pattern_index: fallback,
        }
    }

    /// True if one of `source`'s windows already maps to an identical rule.
    fn is_duplicate(&self, source: &str, options: &str) -> bool {
        signature_windows(source).any(|sig| {
            self.signatures
                .get(sig)
                .is_some_and(|p| p.source() == source && p.options() == options)
        })
    }

    /// Drop both indices and the cache.
    pub fn clear(&mut self) {
        self.signatures.clear();
        self.patterns.clear();
        self.cache.clear();
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn has_signature(&self, sig: &str) -> bool {
        self.signatures.contains_key(sig)
    }

    pub fn has_pattern(&self, source: &str) -> bool {
        self.patterns.contains_key(source)
    }

    pub fn cache(&self) -> &MatchCache {
        &self.cache
    }
}

/// 8-byte windows of `text`, last window first. Windows that would split a
/// UTF-8 character are skipped.
pub fn signature_windows(text: &str) -> impl Iterator<Item = &str> {
    let count = (text.len() + 1).saturating_sub(SIGNATURE_SIZE);
    (0..count)
        .rev()
        .filter_map(move |pos| text.get(pos..pos + SIGNATURE_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::translate;

    fn signature_source<'a>(set: &'a RuleSet, sig: &str) -> Option<&'a str> {
        set.signatures.get(sig).map(|p| p.source())
    }

    fn has_signature_for(set: &RuleSet, source: &str) -> bool {
        set.signatures.values().any(|p| p.source() == source)
    }

    fn insert(set: &mut RuleSet, id: usize, body: &str) -> (String, IndexPlacement) {
        let source = translate("", body);
        let pattern = Arc::new(CompiledPattern::compile(id, &source, "uri").unwrap());
        let placement = set.insert(&source, pattern);
        (source, placement)
    }

    #[test]
    fn test_signature_windows() {
        let windows: Vec<&str> = signature_windows("exactlyten").collect();
        assert_eq!(windows, vec!["actlyten", "xactlyte", "exactlyt"]);
        assert_eq!(signature_windows("short").count(), 0);
        assert_eq!(signature_windows("12345678").count(), 1);
    }

    #[test]
    fn test_literal_pattern_gets_signatures_only() {
        let mut set = RuleSet::new();
        let (source, placement) = insert(&mut set, 0, "exactlyten");
        assert_eq!(placement.signatures, 3);
        assert!(!placement.in_pattern_index);
        assert!(set.has_signature("exactlyt"));
        assert!(has_signature_for(&set, &source));
        assert!(!set.has_pattern(&source));
    }

    #[test]
    fn test_regexp_like_goes_to_pattern_index() {
        let mut set = RuleSet::new();
        let (source, placement) = insert(&mut set, 0, "/^ads[0-9]*$/");
        assert!(placement.in_pattern_index);
        assert_eq!(set.signature_count(), 0);
        assert!(set.has_pattern(&source));
        assert!(!has_signature_for(&set, &source));
    }

    #[test]
    fn test_all_windows_wildcarded_falls_back() {
        let mut set = RuleSet::new();
        // "a.*b.*c.*d" has no 8-byte window without '*'
        let (source, placement) = insert(&mut set, 0, "a*b*c*d");
        assert_eq!(placement.signatures, 0);
        assert!(placement.in_pattern_index);
        assert!(set.has_pattern(&source));
    }

    #[test]
    fn test_multiple_signatures_drop_fallback() {
        let mut set = RuleSet::new();
        let (source, placement) = insert(&mut set, 0, "adserver*banners");
        assert!(placement.signatures > 1);
        assert!(!placement.in_pattern_index);
        assert!(!set.has_pattern(&source));
    }

    #[test]
    fn test_single_signature_keeps_fallback() {
        let mut set = RuleSet::new();
        // only "adserve." is free of '*'
        let (source, placement) = insert(&mut set, 0, "adserve*xy");
        assert_eq!(placement.signatures, 1);
        assert!(set.has_signature("adserve."));
        assert!(placement.in_pattern_index);
        assert!(set.has_pattern(&source));
    }

    #[test]
    fn test_short_pattern_falls_back() {
        let mut set = RuleSet::new();
        let (source, placement) = insert(&mut set, 0, "/ad.");
        assert_eq!(placement.signatures, 0);
        assert!(set.has_pattern(&source));
    }

    #[test]
    fn test_signature_keys_are_first_come() {
        let mut set = RuleSet::new();
        insert(&mut set, 0, "exactlyten");
        let (source, placement) = insert(&mut set, 1, "exactlyten");
        assert_eq!(placement.signatures, 0);
        // identical rule is already reachable through its signatures
        assert!(!set.has_pattern(&source));
        assert_eq!(set.signature_count(), 3);

        let (other, placement) = insert(&mut set, 2, "xexactlyten");
        assert_eq!(placement.signatures, 1);
        assert_eq!(signature_source(&set, "xexactly"), Some(other.as_str()));
        assert_eq!(signature_source(&set, "exactlyt"), Some(source.as_str()));
    }

    #[test]
    fn test_clear() {
        let mut set = RuleSet::new();
        insert(&mut set, 0, "exactlyten");
        insert(&mut set, 1, "/^ads[0-9]*$/");
        set.cache().insert("http://a/", true);
        set.clear();
        assert_eq!(set.signature_count(), 0);
        assert_eq!(set.pattern_count(), 0);
        assert!(set.cache().is_empty());
    }
}
