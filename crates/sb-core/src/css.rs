//! Element hiding aggregates
//!
//! Hiding rules are never matched here; they are accumulated as text and
//! handed to the page-side script. Every selector passes `is_safe_selector`
//! first so nothing can break the generated script.

use std::collections::HashMap;

/// Seed of the global aggregate so it is never syntactically empty.
pub const PLACEHOLDER_SELECTOR: &str = "z-non-exist";

const GLOBAL_SEPARATOR: &str = " , ";

/// Accumulated global and per-domain hiding selectors.
#[derive(Debug, Clone)]
pub struct CssHideRules {
    global: String,
    domain_script: String,
    by_domain: HashMap<String, Vec<String>>,
}

impl Default for CssHideRules {
    fn default() -> Self {
        Self {
            global: PLACEHOLDER_SELECTOR.to_string(),
            domain_script: String::new(),
            by_domain: HashMap::new(),
        }
    }
}

impl CssHideRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a selector to the global aggregate. Returns false if rejected.
    pub fn add_global(&mut self, selector: &str) -> bool {
        if !is_safe_selector(selector) {
            log::debug!("rejected hiding selector: {}", selector);
            return false;
        }

        self.global.push_str(GLOBAL_SEPARATOR);
        self.global.push_str(selector);
        true
    }

    /// Append a selector for each domain of a comma-separated list.
    /// Returns false if the selector was rejected or no domain was usable.
    pub fn add_for_domains(&mut self, domains: &str, selector: &str) -> bool {
        if !is_safe_selector(selector) {
            log::debug!("rejected hiding selector for {}: {}", domains, selector);
            return false;
        }

        let mut added = false;
        for domain in domains.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            if domain.contains('\'') || domain.ends_with('\\') {
                log::debug!("rejected hiding domain: {}", domain);
                continue;
            }
            self.domain_script
                .push_str(&format!(";sites['{}']+=',{}'", domain, selector));
            self.by_domain
                .entry(domain.to_string())
                .or_default()
                .push(selector.to_string());
            added = true;
        }
        added
    }

    /// Global aggregate, e.g. `z-non-exist , .ad-banner , #ad`.
    pub fn global_selectors(&self) -> &str {
        &self.global
    }

    /// Global aggregate wrapped in a hiding declaration.
    pub fn stylesheet(&self) -> String {
        format!("{} {{ display: none !important; }}", self.global)
    }

    /// Per-domain script fragment.
    pub fn domain_script(&self) -> &str {
        &self.domain_script
    }

    /// Selectors recorded for one domain, in insertion order.
    pub fn selectors_for(&self, domain: &str) -> &[String] {
        self.by_domain.get(domain).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn domain_count(&self) -> usize {
        self.by_domain.len()
    }

    /// Reset to the seeded state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Selector guard. Rejects empty selectors, single quotes, a dangling
/// backslash, and any unescaped `:` outside the value of a bracketed
/// attribute matcher such as `[href^=http://ads]`.
pub fn is_safe_selector(selector: &str) -> bool {
    if selector.is_empty() || selector.contains('\'') {
        return false;
    }

    let mut depth = 0usize;
    let mut in_value = false;
    let mut escaped = false;

    for ch in selector.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '[' => {
                depth += 1;
                in_value = false;
            }
            ']' => {
                depth = depth.saturating_sub(1);
                in_value = false;
            }
            '=' if depth > 0 => in_value = true,
            ':' if depth == 0 || !in_value => return false,
            _ => {}
        }
    }

    !escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_aggregate() {
        let mut css = CssHideRules::new();
        assert_eq!(css.global_selectors(), "z-non-exist");
        assert!(css.add_global(".ad-banner"));
        assert!(css.add_global("#ad"));
        assert_eq!(css.global_selectors(), "z-non-exist , .ad-banner , #ad");
        assert!(css.global_selectors().contains(" , .ad-banner"));
        assert_eq!(
            css.stylesheet(),
            "z-non-exist , .ad-banner , #ad { display: none !important; }"
        );
    }

    #[test]
    fn test_domain_script() {
        let mut css = CssHideRules::new();
        assert!(css.add_for_domains("example.com", ".sidebar-ad"));
        assert_eq!(css.domain_script(), ";sites['example.com']+=',.sidebar-ad'");

        assert!(css.add_for_domains("a.com, b.com", "div.ad"));
        assert!(css.domain_script().ends_with(";sites['a.com']+=',div.ad';sites['b.com']+=',div.ad'"));
        assert_eq!(css.selectors_for("b.com"), ["div.ad".to_string()]);
        assert!(css.selectors_for("c.com").is_empty());
        assert_eq!(css.domain_count(), 3);
    }

    #[test]
    fn test_rejected_selectors_leave_aggregates_unchanged() {
        let mut css = CssHideRules::new();
        assert!(!css.add_global(".ad[x:y]"));
        assert!(!css.add_global("a:hover"));
        assert!(!css.add_global("a[title='x']"));
        assert!(!css.add_for_domains("example.com", ".ad:first-child"));
        assert_eq!(css.global_selectors(), "z-non-exist");
        assert_eq!(css.domain_script(), "");
    }

    #[test]
    fn test_unusable_domains_are_not_counted() {
        let mut css = CssHideRules::new();
        assert!(!css.add_for_domains("a'b.com, ,bad.com\\", ".ad"));
        assert!(!css.add_for_domains(" , ", ".ad"));
        assert_eq!(css.domain_script(), "");
        assert_eq!(css.domain_count(), 0);

        assert!(css.add_for_domains("a'b.com,good.com", ".ad"));
        assert_eq!(css.domain_script(), ";sites['good.com']+=',.ad'");
    }

    #[test]
    fn test_selector_guard() {
        assert!(is_safe_selector(".ad-banner"));
        assert!(is_safe_selector("a[href^=http://ads.example.com]"));
        assert!(is_safe_selector(".md\\:hidden"));
        assert!(is_safe_selector("div[class=\"ad\"]"));
        assert!(!is_safe_selector(""));
        assert!(!is_safe_selector(".ad[x:y]"));
        assert!(!is_safe_selector("a[href=x]:hover"));
        assert!(!is_safe_selector(".ad\\"));
    }

    #[test]
    fn test_clear() {
        let mut css = CssHideRules::new();
        css.add_global(".ad");
        css.add_for_domains("example.com", ".ad");
        css.clear();
        assert_eq!(css.global_selectors(), PLACEHOLDER_SELECTOR);
        assert_eq!(css.domain_script(), "");
        assert_eq!(css.domain_count(), 0);
    }
}
