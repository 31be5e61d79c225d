use sb_core::types::{AnchorType, FilterRule, RuleAction};

/// Why a line produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Blank line or `!` comment
    Comment,
    /// `[...]` section header
    Section,
    /// Rule carrying a `domain=` option
    DomainOption,
    /// Leading space or empty rule body
    Malformed,
    /// Single `#` hiding syntax
    LegacyHide,
    /// Rule scoped to subdocuments
    Subdocument,
}

/// Classification of one filter-list line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// URL rule for either side
    Network(FilterRule),
    /// `##selector`
    GlobalHide(String),
    /// `domain1,domain2##selector`
    DomainHide { domains: String, selector: String },
    Skipped(SkipReason),
}

pub fn parse_line(raw_line: &str) -> ParsedLine {
    parse_with_action(raw_line.trim_end(), RuleAction::Block)
}

fn parse_with_action(line: &str, action: RuleAction) -> ParsedLine {
    if line.trim().is_empty() || line.starts_with('!') {
        return ParsedLine::Skipped(SkipReason::Comment);
    }

    // [include] / [exclude] and list headers are not supported
    if line.starts_with('[') {
        return ParsedLine::Skipped(SkipReason::Section);
    }

    if let Some(rest) = line.strip_prefix("@@") {
        return parse_with_action(rest, RuleAction::Allow);
    }

    if line.contains("domain=") {
        return ParsedLine::Skipped(SkipReason::DomainOption);
    }

    if line.starts_with(' ') {
        return ParsedLine::Skipped(SkipReason::Malformed);
    }

    if let Some(selector) = line.strip_prefix("##") {
        return ParsedLine::GlobalHide(selector.to_string());
    }

    if line.starts_with('#') {
        return ParsedLine::Skipped(SkipReason::LegacyHide);
    }

    if let Some((domains, selector)) = line.split_once("##") {
        return domain_hide(domains, selector);
    }

    if let Some((domains, selector)) = line.split_once('#') {
        return domain_hide(domains, selector);
    }

    if let Some(rest) = line.strip_prefix("||") {
        return parse_url_rule(rest, AnchorType::Hostname, action);
    }

    if let Some(rest) = line.strip_prefix('|') {
        return parse_url_rule(rest, AnchorType::Left, action);
    }

    parse_url_rule(line, AnchorType::None, action)
}

fn domain_hide(domains: &str, selector: &str) -> ParsedLine {
    ParsedLine::DomainHide {
        domains: domains.to_string(),
        selector: selector.to_string(),
    }
}

fn parse_url_rule(line: &str, anchor: AnchorType, action: RuleAction) -> ParsedLine {
    let (body, extra) = split_rule_options(line);

    // An empty body would turn the anchor prefix alone into a catch-all.
    if body.is_empty() || body == "*" {
        return ParsedLine::Skipped(SkipReason::Malformed);
    }

    let mut rule = FilterRule::new(body, anchor, action);
    if let Some(extra) = extra {
        rule = rule.with_options(extra);
    }

    if rule.options.to_ascii_lowercase().contains("subdocument") {
        return ParsedLine::Skipped(SkipReason::Subdocument);
    }

    ParsedLine::Network(rule)
}

/// Body is everything before the first `$`, options the segment after it.
fn split_rule_options(line: &str) -> (&str, Option<&str>) {
    let mut parts = line.split('$');
    let body = parts.next().unwrap_or("");
    (body, parts.next())
}
