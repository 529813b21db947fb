//! Keyword matching
//!
//! Matching is case-insensitive and total: every text either selects a rule
//! or leaves the cell alone.

use crate::stylesheet::{MatchMode, Rule, RuleSet};

/// Find the rule that styles a cell with the given text.
///
/// All rules are checked; when several match, the last one in stylesheet
/// order wins.
///
/// # Examples
///
/// ```
/// use xlscolors::{find_rule, Color, Rule, RuleSet, StyleSpec};
///
/// let style = StyleSpec::new(Color::WHITE, Color::RED);
/// let rules: RuleSet = vec![Rule::new("++fail++", style.clone()), Rule::new("FAILED", style)]
///     .into_iter()
///     .collect();
///
/// assert_eq!(find_rule("failed", &rules).map(|r| r.keyword()), Some("FAILED"));
/// assert_eq!(find_rule("Tests failing", &rules).map(|r| r.keyword()), Some("++fail++"));
/// assert!(find_rule("passed", &rules).is_none());
/// ```
pub fn find_rule<'a>(text: &str, rules: &'a RuleSet) -> Option<&'a Rule> {
    let folded = text.to_lowercase();
    rules.iter().filter(|rule| matches_folded(rule, &folded)).last()
}

/// Check a single rule against cell text
pub fn rule_matches(rule: &Rule, text: &str) -> bool {
    matches_folded(rule, &text.to_lowercase())
}

fn matches_folded(rule: &Rule, folded: &str) -> bool {
    match rule.mode() {
        MatchMode::Exact => folded == rule.pattern(),
        MatchMode::Contains => folded.contains(rule.pattern()),
    }
}
