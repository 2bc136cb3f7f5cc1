//! Unit codes and catalog records.
//!
//! [`UnitCode`] is the key type shared across the whole engine. Prerequisite
//! expressions and user input often carry short-form codes ("1045"), so
//! normalization prepends the default subject prefix before comparison.
//! [`UnitRecord`] mirrors the persisted catalog-snapshot shape exactly and is
//! immutable once loaded; only the external importer ever rewrites it.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::calendar::TeachingPeriod;
use crate::error::{CompassError, Result};

/// Subject prefix assumed for short-form codes in catalog data.
pub const DEFAULT_SUBJECT_PREFIX: &str = "FIT";

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{3}\d{4}$").expect("valid unit-code pattern"))
}

/// Canonical unit code, e.g. `FIT1045`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitCode(String);

impl UnitCode {
    /// Parse a code, requiring the canonical `[A-Z]{3}\d{4}` shape.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::InvalidUnitCode`] when the normalized string
    /// still does not match the pattern.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = Self::normalize(raw);
        if code_pattern().is_match(normalized.as_str()) {
            Ok(normalized)
        } else {
            Err(CompassError::InvalidUnitCode {
                code: raw.trim().to_string(),
            })
        }
    }

    /// Normalize a raw code: trim, uppercase, prepend the default subject
    /// prefix when the 3-letter prefix is missing. Never fails; prerequisite
    /// expressions rely on this being total.
    pub fn normalize(raw: &str) -> Self {
        let mut code = raw.trim().to_uppercase();
        let has_prefix = code.len() >= 3 && code.chars().take(3).all(|c| c.is_ascii_alphabetic());
        if !has_prefix {
            code = format!("{}{}", DEFAULT_SUBJECT_PREFIX, code);
        }
        UnitCode(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The year digit embedded in the code (`FIT2004` -> 2), used to match
    /// electives to a requested level.
    pub fn level(&self) -> Option<u8> {
        self.0
            .chars()
            .nth(3)
            .and_then(|c| c.to_digit(10))
            .map(|d| d as u8)
    }
}

impl fmt::Display for UnitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sentinel used by catalog fields that hold no data.
pub const NONE_SENTINEL: &str = "NONE";

/// One catalog entry, in the persisted snapshot shape.
///
/// Assessment fields (`assign`, `test`, `final`) are semicolon-joined
/// percentage strings or the literal `"NONE"`; `sem_available` is `"1"`,
/// `"2"` or `"1;2"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub unit_name: String,
    pub sem_available: String,
    pub description: String,
    pub prereq: String,
    pub assign: String,
    pub test: String,
    #[serde(rename = "final")]
    pub final_exam: String,
    /// Present only for electives; the approving course authority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_elective: Option<String>,
}

impl UnitRecord {
    /// Teaching periods this unit runs in. Non-numeric fragments are ignored.
    pub fn semesters(&self) -> Vec<TeachingPeriod> {
        self.sem_available
            .split(';')
            .filter_map(|s| s.trim().parse::<u8>().ok())
            .filter_map(|n| TeachingPeriod::try_from(n).ok())
            .collect()
    }

    pub fn available_in(&self, period: TeachingPeriod) -> bool {
        self.semesters().contains(&period)
    }

    /// Number of assignments: the cardinality of the weight list, regardless
    /// of the weight values. `"NONE"` contributes zero.
    pub fn assignment_count(&self) -> usize {
        count_weights(&self.assign)
    }

    /// Number of tests, same counting rule as assignments.
    pub fn test_count(&self) -> usize {
        count_weights(&self.test)
    }

    pub fn has_final(&self) -> bool {
        let trimmed = self.final_exam.trim();
        !trimmed.is_empty() && trimmed != NONE_SENTINEL
    }

    /// Human form of the semester availability, e.g.
    /// `["February Semester", "July Semester"]`.
    pub fn semester_names(&self) -> Vec<String> {
        self.semesters()
            .iter()
            .map(|p| p.display_name().to_string())
            .collect()
    }

    /// Formatted workload strings, e.g. `"20%, 30%"` or `"None"`.
    pub fn workload_display(&self) -> WorkloadDisplay {
        WorkloadDisplay {
            assign: format_weights(&self.assign),
            test: format_weights(&self.test),
            final_exam: format_weights(&self.final_exam),
        }
    }
}

/// Display-ready assessment weights for one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadDisplay {
    pub assign: String,
    pub test: String,
    #[serde(rename = "final")]
    pub final_exam: String,
}

fn count_weights(field: &str) -> usize {
    let trimmed = field.trim();
    if trimmed.is_empty() || trimmed == NONE_SENTINEL {
        return 0;
    }
    trimmed.split(';').filter(|s| !s.trim().is_empty()).count()
}

fn format_weights(field: &str) -> String {
    let parts: Vec<String> = field
        .split(';')
        .map(str::trim)
        .filter(|s| s.chars().all(|c| c.is_ascii_digit()) && !s.is_empty())
        .map(|s| format!("{}%", s))
        .collect();
    if parts.is_empty() {
        "None".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(assign: &str, test: &str, final_exam: &str) -> UnitRecord {
        UnitRecord {
            unit_name: "Test Unit".into(),
            sem_available: "1;2".into(),
            description: String::new(),
            prereq: "NONE".into(),
            assign: assign.into(),
            test: test.into(),
            final_exam: final_exam.into(),
            approved_elective: None,
        }
    }

    #[test]
    fn parse_accepts_canonical_code() {
        let code = UnitCode::parse("FIT1045").unwrap();
        assert_eq!(code.as_str(), "FIT1045");
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let code = UnitCode::parse("  fit1045 ").unwrap();
        assert_eq!(code.as_str(), "FIT1045");
    }

    #[test]
    fn normalize_prepends_default_prefix() {
        assert_eq!(UnitCode::normalize("1045").as_str(), "FIT1045");
        assert_eq!(UnitCode::normalize("MAT1830").as_str(), "MAT1830");
    }

    #[test]
    fn parse_rejects_malformed_code() {
        assert!(UnitCode::parse("FIT10").is_err());
        assert!(UnitCode::parse("FITFIT1").is_err());
    }

    #[test]
    fn level_reads_year_digit() {
        assert_eq!(UnitCode::normalize("FIT2004").level(), Some(2));
        assert_eq!(UnitCode::normalize("FIT3155").level(), Some(3));
    }

    #[test]
    fn semesters_parse_wire_field() {
        let both = record("NONE", "NONE", "NONE");
        assert_eq!(
            both.semesters(),
            vec![TeachingPeriod::February, TeachingPeriod::July]
        );

        let mut feb_only = both.clone();
        feb_only.sem_available = "1".into();
        assert!(feb_only.available_in(TeachingPeriod::February));
        assert!(!feb_only.available_in(TeachingPeriod::July));
    }

    #[test]
    fn weight_counts_are_cardinalities() {
        let r = record("20;30", "10;10;10", "60");
        assert_eq!(r.assignment_count(), 2);
        assert_eq!(r.test_count(), 3);
        assert!(r.has_final());
    }

    #[test]
    fn none_sentinel_counts_zero() {
        let r = record("NONE", "NONE", "NONE");
        assert_eq!(r.assignment_count(), 0);
        assert_eq!(r.test_count(), 0);
        assert!(!r.has_final());
    }

    #[test]
    fn workload_display_formats_percentages() {
        let r = record("20;30", "NONE", "50");
        let display = r.workload_display();
        assert_eq!(display.assign, "20%, 30%");
        assert_eq!(display.test, "None");
        assert_eq!(display.final_exam, "50%");
    }

    #[test]
    fn record_serde_uses_wire_field_names() {
        let r = record("20", "NONE", "60");
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"final\""));
        assert!(json.contains("\"sem_available\""));
        assert!(!json.contains("approved_elective"));
    }
}
