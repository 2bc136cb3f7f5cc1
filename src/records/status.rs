//! Unit statuses and grades.
//!
//! A persisted plan maps each unit to either `"planned"` or a letter grade.
//! The grade table here also drives prerequisite strength scoring.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade for a completed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    HD,
    D,
    C,
    P,
    F,
}

impl Grade {
    /// Fixed grade-to-score table used for prerequisite strength.
    pub fn score(&self) -> u8 {
        match self {
            Grade::HD => 100,
            Grade::D => 80,
            Grade::C => 70,
            Grade::P => 50,
            Grade::F => 0,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "HD" => Some(Grade::HD),
            "D" => Some(Grade::D),
            "C" => Some(Grade::C),
            "P" => Some(Grade::P),
            "F" => Some(Grade::F),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::HD => "HD",
            Grade::D => "D",
            Grade::C => "C",
            Grade::P => "P",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one unit inside a semester record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UnitStatus {
    /// Selected into a plan, result not yet entered.
    Planned,
    Graded(Grade),
}

impl UnitStatus {
    /// Whether this status counts toward the completed-unit set.
    /// Planned and failed units do not.
    pub fn is_passed(&self) -> bool {
        matches!(self, UnitStatus::Graded(g) if *g != Grade::F)
    }

    /// Strength contribution for prerequisite scoring; planned counts as 0.
    pub fn strength_score(&self) -> u8 {
        match self {
            UnitStatus::Planned => 0,
            UnitStatus::Graded(g) => g.score(),
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            UnitStatus::Planned => "planned",
            UnitStatus::Graded(g) => g.as_str(),
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl TryFrom<String> for UnitStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim() == "planned" {
            return Ok(UnitStatus::Planned);
        }
        Grade::parse(&value)
            .map(UnitStatus::Graded)
            .ok_or_else(|| format!("unknown unit status: {}", value))
    }
}

impl From<UnitStatus> for String {
    fn from(status: UnitStatus) -> String {
        status.as_wire().to_string()
    }
}
