//! Prerequisite expressions.
//!
//! The catalog encodes prerequisites as compact strings:
//!
//! - `""` or `"NONE"` — no prerequisites
//! - `"a;FIT1045;FIT1008"` — all listed units required
//! - `"o;FIT1045;FIT1008"` — at least one listed unit required
//! - `"12"` — any 12 credit points (two completed units)
//! - `"72"` — 72 credit points (twelve completed units)
//! - anything else — a single required unit
//!
//! Parsing is total: an unrecognized expression falls back to the single-unit
//! reading rather than failing, so a new catalog entry can never take the
//! whole planner down.

use std::collections::{HashMap, HashSet};

use crate::catalog::{UnitCode, NONE_SENTINEL};
use crate::records::UnitStatus;

/// A parsed prerequisite expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrereqRule {
    None,
    All(Vec<UnitCode>),
    AnyOf(Vec<UnitCode>),
    Single(UnitCode),
    /// Minimum number of completed units, regardless of which.
    CompletedUnits(usize),
}

/// Units per credit-point floor: one unit is 6 credit points.
const UNITS_FOR_12_CP: usize = 2;
const UNITS_FOR_72_CP: usize = 12;

impl PrereqRule {
    /// Parse a catalog prerequisite string. Never fails.
    pub fn parse(expr: &str) -> Self {
        let expr = expr.trim();
        if expr.is_empty() || expr.eq_ignore_ascii_case(NONE_SENTINEL) {
            return PrereqRule::None;
        }
        if let Some(rest) = expr.strip_prefix("a;") {
            return PrereqRule::All(split_codes(rest));
        }
        if let Some(rest) = expr.strip_prefix("o;") {
            return PrereqRule::AnyOf(split_codes(rest));
        }
        // Credit-point floors may carry an informational unit list after
        // the tag; only the tag matters for evaluation.
        if expr == "12" || expr.starts_with("12;") {
            return PrereqRule::CompletedUnits(UNITS_FOR_12_CP);
        }
        if expr == "72" || expr.starts_with("72;") {
            return PrereqRule::CompletedUnits(UNITS_FOR_72_CP);
        }
        PrereqRule::Single(UnitCode::normalize(expr))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PrereqRule::None)
    }

    /// The units the rule references, in expression order.
    pub fn referenced_units(&self) -> &[UnitCode] {
        match self {
            PrereqRule::All(codes) | PrereqRule::AnyOf(codes) => codes,
            PrereqRule::Single(code) => std::slice::from_ref(code),
            PrereqRule::None | PrereqRule::CompletedUnits(_) => &[],
        }
    }

    /// One-sentence human description, used in unit detail output.
    pub fn describe(&self, unit: &UnitCode) -> String {
        match self {
            PrereqRule::None => format!("{unit} has no prerequisites."),
            PrereqRule::All(codes) => format!(
                "To take {unit}, you must have completed all of these units: {}",
                join_codes(codes)
            ),
            PrereqRule::AnyOf(codes) => format!(
                "To take {unit}, you must have completed at least one of these units: {}",
                join_codes(codes)
            ),
            PrereqRule::Single(code) => {
                format!("To take {unit}, you must have completed: {code}")
            }
            PrereqRule::CompletedUnits(n) => format!(
                "To take {unit}, you must have completed {} units",
                n
            ),
        }
    }
}

fn split_codes(rest: &str) -> Vec<UnitCode> {
    rest.split(';')
        .filter(|part| !part.trim().is_empty())
        .map(UnitCode::normalize)
        .collect()
}

fn join_codes(codes: &[UnitCode]) -> String {
    codes
        .iter()
        .map(UnitCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of evaluating a rule against a student's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrereqOutcome {
    pub fulfilled: bool,
    /// 0-100. Exactly 0 when unfulfilled; grade-history average otherwise.
    pub strength: u32,
    pub detail: String,
}

impl PrereqOutcome {
    fn unmet(detail: String) -> Self {
        Self {
            fulfilled: false,
            strength: 0,
            detail,
        }
    }

    fn met(strength: u32, detail: String) -> Self {
        Self {
            fulfilled: true,
            strength,
            detail,
        }
    }
}

/// Evaluate a rule against the set of passed units and the full grade record.
///
/// Strength is the mean grade score over the referenced units that have any
/// grade history; a fulfilled rule with no history scores 100. Pure function
/// of its arguments.
pub fn evaluate(
    rule: &PrereqRule,
    completed: &HashSet<UnitCode>,
    grades: &HashMap<UnitCode, UnitStatus>,
) -> PrereqOutcome {
    match rule {
        PrereqRule::None => PrereqOutcome::met(100, "No prerequisites required".to_string()),
        PrereqRule::CompletedUnits(needed) => {
            let have = completed.len();
            if have >= *needed {
                PrereqOutcome::met(
                    100,
                    format!("Completed {} units ({}CP met)", have, needed * 6),
                )
            } else {
                PrereqOutcome::unmet(format!(
                    "Need {} units, only completed {}",
                    needed, have
                ))
            }
        }
        PrereqRule::All(codes) => {
            if codes.iter().all(|c| completed.contains(c)) {
                graded_strength(codes, grades)
            } else {
                PrereqOutcome::unmet(missing_detail(codes, completed))
            }
        }
        PrereqRule::AnyOf(codes) => {
            if codes.iter().any(|c| completed.contains(c)) {
                graded_strength(codes, grades)
            } else {
                PrereqOutcome::unmet(missing_detail(codes, completed))
            }
        }
        PrereqRule::Single(code) => {
            if completed.contains(code) {
                graded_strength(std::slice::from_ref(code), grades)
            } else {
                PrereqOutcome::unmet(format!("Missing: {code}"))
            }
        }
    }
}

fn missing_detail(codes: &[UnitCode], completed: &HashSet<UnitCode>) -> String {
    let missing: Vec<&str> = codes
        .iter()
        .filter(|c| !completed.contains(*c))
        .map(|c| c.as_str())
        .collect();
    format!("Missing: {}", missing.join(", "))
}

fn graded_strength(codes: &[UnitCode], grades: &HashMap<UnitCode, UnitStatus>) -> PrereqOutcome {
    let mut scores = Vec::new();
    let mut lines = Vec::new();
    for code in codes {
        if let Some(status) = grades.get(code) {
            scores.push(u32::from(status.strength_score()));
            lines.push(format!("  {}: {}", code, status.as_wire()));
        }
    }
    if scores.is_empty() {
        return PrereqOutcome::met(100, "Prerequisites met".to_string());
    }
    let avg = scores.iter().sum::<u32>() / scores.len() as u32;
    PrereqOutcome::met(avg, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Grade;

    fn code(raw: &str) -> UnitCode {
        UnitCode::normalize(raw)
    }

    fn completed(raw: &[&str]) -> HashSet<UnitCode> {
        raw.iter().map(|c| code(c)).collect()
    }

    fn grades(raw: &[(&str, UnitStatus)]) -> HashMap<UnitCode, UnitStatus> {
        raw.iter().map(|(c, s)| (code(c), *s)).collect()
    }

    #[test]
    fn parse_covers_the_grammar() {
        assert_eq!(PrereqRule::parse(""), PrereqRule::None);
        assert_eq!(PrereqRule::parse("NONE"), PrereqRule::None);
        assert_eq!(
            PrereqRule::parse("a;FIT1045;FIT1008"),
            PrereqRule::All(vec![code("FIT1045"), code("FIT1008")])
        );
        assert_eq!(
            PrereqRule::parse("o;1045;1008"),
            PrereqRule::AnyOf(vec![code("FIT1045"), code("FIT1008")])
        );
        assert_eq!(PrereqRule::parse("12"), PrereqRule::CompletedUnits(2));
        assert_eq!(PrereqRule::parse("72"), PrereqRule::CompletedUnits(12));
        assert_eq!(
            PrereqRule::parse("FIT1045"),
            PrereqRule::Single(code("FIT1045"))
        );
    }

    #[test]
    fn parse_normalizes_listed_codes() {
        let rule = PrereqRule::parse("a; fit1045 ;;1008");
        assert_eq!(
            rule,
            PrereqRule::All(vec![code("FIT1045"), code("FIT1008")])
        );
    }

    #[test]
    fn no_prereq_is_fulfilled_at_full_strength() {
        let outcome = evaluate(&PrereqRule::None, &completed(&[]), &grades(&[]));
        assert!(outcome.fulfilled);
        assert_eq!(outcome.strength, 100);
    }

    #[test]
    fn all_rule_requires_every_unit() {
        let rule = PrereqRule::parse("a;FIT1045;FIT1008");
        let outcome = evaluate(&rule, &completed(&["FIT1045"]), &grades(&[]));
        assert!(!outcome.fulfilled);
        assert_eq!(outcome.strength, 0);
        assert_eq!(outcome.detail, "Missing: FIT1008");
    }

    #[test]
    fn any_of_rule_needs_one_unit() {
        let rule = PrereqRule::parse("o;FIT1045;FIT1008");
        let outcome = evaluate(
            &rule,
            &completed(&["FIT1008"]),
            &grades(&[("FIT1008", UnitStatus::Graded(Grade::C))]),
        );
        assert!(outcome.fulfilled);
        assert_eq!(outcome.strength, 70);
    }

    #[test]
    fn credit_floor_twelve_needs_two_units() {
        let rule = PrereqRule::parse("12");
        assert!(!evaluate(&rule, &completed(&["FIT1045"]), &grades(&[])).fulfilled);
        let outcome = evaluate(&rule, &completed(&["FIT1045", "FIT1008"]), &grades(&[]));
        assert!(outcome.fulfilled);
        assert_eq!(outcome.strength, 100);
        assert_eq!(outcome.detail, "Completed 2 units (12CP met)");
    }

    #[test]
    fn credit_floor_seventy_two_needs_twelve_units() {
        let rule = PrereqRule::parse("72");
        let eleven: Vec<String> = (0..11).map(|i| format!("FIT1{i:03}")).collect();
        let eleven_refs: Vec<&str> = eleven.iter().map(String::as_str).collect();
        assert!(!evaluate(&rule, &completed(&eleven_refs), &grades(&[])).fulfilled);

        let twelve: Vec<String> = (0..12).map(|i| format!("FIT1{i:03}")).collect();
        let twelve_refs: Vec<&str> = twelve.iter().map(String::as_str).collect();
        assert!(evaluate(&rule, &completed(&twelve_refs), &grades(&[])).fulfilled);
    }

    #[test]
    fn strength_averages_grade_history() {
        let rule = PrereqRule::parse("a;FIT1045;FIT1008");
        let outcome = evaluate(
            &rule,
            &completed(&["FIT1045", "FIT1008"]),
            &grades(&[
                ("FIT1045", UnitStatus::Graded(Grade::HD)),
                ("FIT1008", UnitStatus::Graded(Grade::P)),
            ]),
        );
        assert!(outcome.fulfilled);
        assert_eq!(outcome.strength, 75);
    }

    #[test]
    fn fulfilled_without_history_scores_full_strength() {
        // Unit passed elsewhere with no grade on file.
        let rule = PrereqRule::parse("FIT1045");
        let outcome = evaluate(&rule, &completed(&["FIT1045"]), &grades(&[]));
        assert!(outcome.fulfilled);
        assert_eq!(outcome.strength, 100);
        assert_eq!(outcome.detail, "Prerequisites met");
    }

    #[test]
    fn describe_reads_naturally() {
        let unit = code("FIT2004");
        assert_eq!(
            PrereqRule::parse("NONE").describe(&unit),
            "FIT2004 has no prerequisites."
        );
        assert_eq!(
            PrereqRule::parse("a;FIT1045;FIT1008").describe(&unit),
            "To take FIT2004, you must have completed all of these units: FIT1045, FIT1008"
        );
        assert_eq!(
            PrereqRule::parse("72").describe(&unit),
            "To take FIT2004, you must have completed 12 units"
        );
    }
}
