//! Core Matching Engine
//!
//! This is the hot path - every request goes through here.
//! A query never touches I/O: cache, then signature lookups, then the
//! linear pattern scan only when no signature hit.

use std::collections::HashSet;

use crate::index::{signature_windows, RuleSet};
use crate::pattern::CompiledPattern;
use crate::translate::normalize_url;
use crate::types::RuleAction;

impl RuleSet {
    /// Decide whether `url` is matched by this side, caching the verdict.
    pub fn is_matched(&self, side: RuleAction, url: &str, page_url: Option<&str>) -> bool {
        if let Some(cached) = self.cache.get(url) {
            return cached;
        }

        let matched = self.match_signatures(side, url, page_url)
            || self.match_patterns(side, url, page_url);

        self.cache.insert(url, matched);
        matched
    }

    /// Signature stage: look up every 8-byte window of the normalized URL.
    fn match_signatures(&self, side: RuleAction, url: &str, page_url: Option<&str>) -> bool {
        if self.signatures.is_empty() {
            return false;
        }

        let normalized = normalize_url(url);
        let mut rejected: HashSet<usize> = HashSet::new();

        for sig in signature_windows(&normalized) {
            let pattern = match self.signatures.get(sig) {
                Some(pattern) => pattern,
                None => continue,
            };

            if rejected.contains(&pattern.id()) {
                continue;
            }

            if check_rule(side, pattern, url, page_url) {
                return true;
            }
            rejected.insert(pattern.id());
        }

        false
    }

    /// Pattern stage: try every pattern index entry, first hit wins.
    fn match_patterns(&self, side: RuleAction, url: &str, page_url: Option<&str>) -> bool {
        self.patterns
            .values()
            .any(|pattern| check_rule(side, pattern, url, page_url))
    }
}

#[inline]
fn check_rule(side: RuleAction, pattern: &CompiledPattern, url: &str, page_url: Option<&str>) -> bool {
    if !pattern.matches_request(url, page_url) {
        return false;
    }

    match side {
        RuleAction::Allow => log::debug!("allowed by pattern regexp={} -- {}", pattern.source(), url),
        RuleAction::Block => log::debug!("blocked by pattern regexp={} -- {}", pattern.source(), url),
    }
    true
}
