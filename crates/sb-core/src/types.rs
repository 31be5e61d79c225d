//! Core type definitions for sigblock
//!
//! These types are shared between the parser, the index builder and
//! the matching engine.

// =============================================================================
// Rule Actions
// =============================================================================

/// Which side of the engine a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleAction {
    /// Exception rule (@@...) - allows the request
    Allow,
    /// Block rule - cancels the request
    Block,
}

impl RuleAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Allow => "whitelist",
            Self::Block => "blacklist",
        }
    }
}

// =============================================================================
// Anchors
// =============================================================================

/// Fixed prefix for `||` rules: any scheme, then an optional run of
/// subdomain labels ending in a dot, right before the rule body.
pub const HOSTNAME_ANCHOR_PREFIX: &str = r"^[\w\-]+:\/+(?!\/)(?:[^\/]+\.)?";

/// How the rule body was anchored in the filter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnchorType {
    /// Plain substring rule
    #[default]
    None,
    /// `|` - anchored at the start of the URL
    Left,
    /// `||` - anchored at a domain boundary
    Hostname,
}

impl AnchorType {
    /// Regex prefix prepended to the translated body.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Left => "^",
            Self::Hostname => HOSTNAME_ANCHOR_PREFIX,
        }
    }

    /// Base option tag recorded for rules with this anchor.
    pub fn option_tag(self) -> &'static str {
        match self {
            Self::None => "uri",
            Self::Left | Self::Hostname => "fulluri",
        }
    }
}

// =============================================================================
// Filter Rule
// =============================================================================

/// A single parsed URL directive, consumed by the engine as soon as it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    /// Rule body with anchors and options stripped
    pub pattern: String,
    /// Comma-joined option tags, always starting with the anchor's base tag
    pub options: String,
    pub anchor: AnchorType,
    pub action: RuleAction,
}

impl FilterRule {
    pub fn new(pattern: &str, anchor: AnchorType, action: RuleAction) -> Self {
        Self {
            pattern: pattern.to_string(),
            options: anchor.option_tag().to_string(),
            anchor,
            action,
        }
    }

    /// Append extra option tags after the base tag.
    pub fn with_options(mut self, extra: &str) -> Self {
        self.options.push(',');
        self.options.push_str(extra);
        self
    }
}

/// True if the comma-joined options contain `tag` (ASCII case-insensitive).
pub fn has_option(options: &str, tag: &str) -> bool {
    options
        .split(',')
        .any(|opt| opt.trim().eq_ignore_ascii_case(tag))
}

// =============================================================================
// Query Flags
// =============================================================================

bitflags::bitflags! {
    /// Flag word passed along with each request query.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TestFlags: u32 {
        /// Apply ad-blocking to this request
        const ADBLOCK = 1 << 0;
    }
}

// =============================================================================
// Match Result
// =============================================================================

/// Final decision for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDecision {
    /// Request proceeds unmodified
    Allow,
    /// Request must be aborted
    Block,
}

impl MatchDecision {
    pub fn is_blocked(self) -> bool {
        self == Self::Block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_prefixes() {
        assert_eq!(AnchorType::None.prefix(), "");
        assert_eq!(AnchorType::Left.prefix(), "^");
        assert!(AnchorType::Hostname.prefix().starts_with("^[\\w\\-]+:"));
        assert_eq!(AnchorType::None.option_tag(), "uri");
        assert_eq!(AnchorType::Hostname.option_tag(), "fulluri");
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(RuleAction::Allow.label(), "whitelist");
        assert_eq!(RuleAction::Block.label(), "blacklist");
        let rule = FilterRule::new("ads", AnchorType::None, RuleAction::Allow);
        assert_eq!(rule.action.label(), "whitelist");
    }

    #[test]
    fn test_has_option() {
        assert!(has_option("uri,third-party", "third-party"));
        assert!(has_option("uri,Third-Party", "third-party"));
        assert!(!has_option("uri,~third-party", "third-party"));
        assert!(!has_option("uri", "third-party"));
    }

    #[test]
    fn test_rule_options() {
        let rule = FilterRule::new("ads", AnchorType::Left, RuleAction::Block).with_options("script");
        assert_eq!(rule.options, "fulluri,script");
    }

    #[test]
    fn test_unknown_flag_bits_are_dropped() {
        let flags = TestFlags::from_bits_truncate(0b1110);
        assert!(!flags.contains(TestFlags::ADBLOCK));
        let flags = TestFlags::from_bits_truncate(0b0101);
        assert!(flags.contains(TestFlags::ADBLOCK));
    }
}
