use sb_core::{FilterEngine, RuleAction};

use crate::parser::{parse_line, ParsedLine, SkipReason};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SkipCounts {
    pub comments: usize,
    pub sections: usize,
    pub domain_options: usize,
    pub malformed: usize,
    pub legacy_hides: usize,
    pub subdocuments: usize,
}

impl SkipCounts {
    fn record(&mut self, reason: SkipReason) {
        let slot = match reason {
            SkipReason::Comment => &mut self.comments,
            SkipReason::Section => &mut self.sections,
            SkipReason::DomainOption => &mut self.domain_options,
            SkipReason::Malformed => &mut self.malformed,
            SkipReason::LegacyHide => &mut self.legacy_hides,
            SkipReason::Subdocument => &mut self.subdocuments,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.comments
            + self.sections
            + self.domain_options
            + self.malformed
            + self.legacy_hides
            + self.subdocuments
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub lines: usize,
    pub block_rules: usize,
    pub allow_rules: usize,
    pub failed_rules: usize,
    pub hide_rules: usize,
    pub rejected_hide_rules: usize,
    pub skipped: SkipCounts,
}

impl LoadStats {
    pub fn network_rules(&self) -> usize {
        self.block_rules + self.allow_rules
    }

    /// Fold another list's counts into this one.
    pub fn merge(&mut self, other: &LoadStats) {
        self.lines += other.lines;
        self.block_rules += other.block_rules;
        self.allow_rules += other.allow_rules;
        self.failed_rules += other.failed_rules;
        self.hide_rules += other.hide_rules;
        self.rejected_hide_rules += other.rejected_hide_rules;
        self.skipped.comments += other.skipped.comments;
        self.skipped.sections += other.skipped.sections;
        self.skipped.domain_options += other.skipped.domain_options;
        self.skipped.malformed += other.skipped.malformed;
        self.skipped.legacy_hides += other.skipped.legacy_hides;
        self.skipped.subdocuments += other.skipped.subdocuments;
    }
}

/// Apply every line of a filter list to `engine`, in order.
///
/// A rule the regex engine refuses is logged and dropped; loading always
/// runs to the end of the text.
pub fn load_filter_list(engine: &mut FilterEngine, text: &str) -> LoadStats {
    let mut stats = LoadStats::default();

    for line in text.lines() {
        stats.lines += 1;
        apply_line(engine, line, &mut stats);
    }

    log::debug!(
        "loaded {} lines: {} rules ({} failed), {} hide selectors, {} skipped",
        stats.lines,
        stats.network_rules(),
        stats.failed_rules,
        stats.hide_rules,
        stats.skipped.total()
    );
    stats
}

fn apply_line(engine: &mut FilterEngine, line: &str, stats: &mut LoadStats) {
    match parse_line(line) {
        ParsedLine::Network(rule) => match engine.add_rule(&rule) {
            Ok(_) if rule.action == RuleAction::Allow => stats.allow_rules += 1,
            Ok(_) => stats.block_rules += 1,
            Err(e) => {
                log::warn!("{}: {}", line.trim_end(), e);
                stats.failed_rules += 1;
            }
        },
        ParsedLine::GlobalHide(selector) => {
            count_hide(stats, engine.add_global_hide(&selector));
        }
        ParsedLine::DomainHide { domains, selector } => {
            count_hide(stats, engine.add_domain_hide(&domains, &selector));
        }
        ParsedLine::Skipped(reason) => stats.skipped.record(reason),
    }
}

fn count_hide(stats: &mut LoadStats, accepted: bool) {
    if accepted {
        stats.hide_rules += 1;
    } else {
        stats.rejected_hide_rules += 1;
    }
}
