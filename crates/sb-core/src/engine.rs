//! The owned filter engine: both sides plus the hiding aggregates.

use std::sync::Arc;

use crate::css::CssHideRules;
use crate::index::{IndexPlacement, RuleSet};
use crate::pattern::{CompileError, CompiledPattern};
use crate::translate::translate;
use crate::types::{FilterRule, MatchDecision, RuleAction, TestFlags};

/// Whitelist and blacklist indices, their caches, and the hiding rules.
///
/// Mutation (`add_rule`, `clear`) needs `&mut self`; queries only need
/// `&self`, so a rebuild behind a write lock excludes every query.
#[derive(Debug, Default)]
pub struct FilterEngine {
    allow: RuleSet,
    block: RuleSet,
    css: CssHideRules,
    next_id: usize,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate, compile and index one URL rule.
    ///
    /// On error nothing is inserted; the caller decides whether to log and
    /// move on.
    pub fn add_rule(&mut self, rule: &FilterRule) -> Result<IndexPlacement, CompileError> {
        let source = translate(rule.anchor.prefix(), &rule.pattern);
        let pattern = CompiledPattern::compile(self.next_id, &source, &rule.options)?;
        self.next_id += 1;

        log::trace!("{}: {} opts {}", rule.action.label(), source, rule.options);
        Ok(self.rule_set_mut(rule.action).insert(&source, Arc::new(pattern)))
    }

    /// Add a global element hiding selector.
    pub fn add_global_hide(&mut self, selector: &str) -> bool {
        self.css.add_global(selector)
    }

    /// Add a hiding selector for a comma-separated domain list.
    pub fn add_domain_hide(&mut self, domains: &str, selector: &str) -> bool {
        self.css.add_for_domains(domains, selector)
    }

    /// Drop all four indices, both caches and the hiding aggregates.
    pub fn clear(&mut self) {
        self.allow.clear();
        self.block.clear();
        self.css.clear();
        self.next_id = 0;
    }

    /// Is `url` matched on the given side?
    pub fn is_matched(&self, side: RuleAction, url: &str, page_url: Option<&str>) -> bool {
        self.rule_set(side).is_matched(side, url, page_url)
    }

    /// True if the request must be blocked. Exceptions are checked first
    /// and always win.
    pub fn test_uri(&self, url: &str, page_url: Option<&str>) -> bool {
        if self.is_matched(RuleAction::Allow, url, page_url) {
            return false;
        }
        self.is_matched(RuleAction::Block, url, page_url)
    }

    /// Query entry point honoring the request flags.
    pub fn check(&self, url: &str, page_url: Option<&str>, flags: TestFlags) -> MatchDecision {
        if flags.contains(TestFlags::ADBLOCK) && self.test_uri(url, page_url) {
            log::debug!("Request '{}' blocked (page: '{}')", url, page_url.unwrap_or(""));
            return MatchDecision::Block;
        }
        MatchDecision::Allow
    }

    pub fn rule_set(&self, side: RuleAction) -> &RuleSet {
        match side {
            RuleAction::Allow => &self.allow,
            RuleAction::Block => &self.block,
        }
    }

    fn rule_set_mut(&mut self, side: RuleAction) -> &mut RuleSet {
        match side {
            RuleAction::Allow => &mut self.allow,
            RuleAction::Block => &mut self.block,
        }
    }

    pub fn css(&self) -> &CssHideRules {
        &self.css
    }

    /// Number of rules compiled since the last clear.
    pub fn rule_count(&self) -> usize {
        self.next_id
    }
}
