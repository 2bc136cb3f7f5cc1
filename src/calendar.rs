//! Intake-relative calendar resolution.
//!
//! The institution runs two fixed teaching periods a year. A student's own
//! "semester 1" does not always line up with the institutional calendar: the
//! July-intake cohort experiences its first semester during the July period
//! and its second during the following February period. Every availability
//! check must go through [`resolve`] first; getting the flip backwards
//! silently unlocks units in the wrong half of the year.

use serde::{Deserialize, Serialize};

use crate::profile::Intake;

/// One of the two fixed institutional teaching periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TeachingPeriod {
    February,
    July,
}

impl TeachingPeriod {
    /// Wire number used by the catalog's `sem_available` field.
    pub fn number(&self) -> u8 {
        u8::from(*self)
    }

    /// Display name used across unit-detail output.
    pub fn display_name(&self) -> &'static str {
        match self {
            TeachingPeriod::February => "February Semester",
            TeachingPeriod::July => "July Semester",
        }
    }
}

impl TryFrom<u8> for TeachingPeriod {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TeachingPeriod::February),
            2 => Ok(TeachingPeriod::July),
            other => Err(format!("teaching period must be 1 or 2, got {}", other)),
        }
    }
}

impl From<TeachingPeriod> for u8 {
    fn from(period: TeachingPeriod) -> u8 {
        match period {
            TeachingPeriod::February => 1,
            TeachingPeriod::July => 2,
        }
    }
}

/// Map a student's own semester number to the institutional teaching period.
///
/// February-intake cohorts map identically (1 -> February, 2 -> July); the
/// July-intake mapping flips (1 -> July, 2 -> February).
pub fn resolve(intake: Intake, semester: u8) -> TeachingPeriod {
    match (intake, semester) {
        (Intake::February, 1) => TeachingPeriod::February,
        (Intake::February, _) => TeachingPeriod::July,
        (Intake::July, 1) => TeachingPeriod::July,
        (Intake::July, _) => TeachingPeriod::February,
    }
}

/// Whether (year, semester) is the student's very first planning period.
///
/// No prior record can exist for Y1S1, so completeness checks short-circuit.
pub fn is_first_period(year: u8, semester: u8) -> bool {
    year == 1 && semester == 1
}
