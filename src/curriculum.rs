//! Course-map rules: which core units belong to a period, which electives a
//! student may take, and how many elective slots a period carries.
//!
//! Core selection slices the fixed-order sequence in each per-year catalog
//! file. The slice boundaries come from the published course maps and are
//! encoded as an explicit table per (stream, year, semester, intake) rather
//! than derived, because the maps are institutional data with no pattern to
//! exploit. The February-intake year-2 cohort runs the two halves of its year
//! in the opposite order; that swap lives in this table too.

use std::collections::HashSet;

use crate::calendar;
use crate::catalog::{Catalog, UnitCode, UnitRecord};
use crate::profile::{Intake, Stream, StudentProfile};

/// How one (stream, year, semester, intake) tuple slices its core sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreSelection {
    /// The first `n` units of the sequence.
    FirstHalf(usize),
    /// Everything after the first `n` units.
    SecondHalf(usize),
    /// Explicit positions in the sequence.
    Indices(&'static [usize]),
}

impl CoreSelection {
    /// Apply the selection to an ordered sequence, preserving order.
    /// Out-of-range positions are ignored rather than panicking, so a
    /// short catalog file degrades to fewer units.
    pub fn apply(&self, order: &[UnitCode]) -> Vec<UnitCode> {
        match self {
            CoreSelection::FirstHalf(n) => order.iter().take(*n).cloned().collect(),
            CoreSelection::SecondHalf(n) => order.iter().skip(*n).cloned().collect(),
            CoreSelection::Indices(positions) => positions
                .iter()
                .filter_map(|&i| order.get(i).cloned())
                .collect(),
        }
    }
}

// Split points in the per-year core files.
const YEAR_1_SPLIT: usize = 3;
const YEAR_2_SPLIT_DS: usize = 2;
const YEAR_2_SPLIT_AS: usize = 3;
const YEAR_3_SPLIT_DS_FEB: usize = 2;
const YEAR_3_SPLIT_DS_JUL: usize = 1;
const YEAR_3_SPLIT_AS_JUL: usize = 2;

// The Algorithms year-3 February cohort interleaves its four cores.
const YEAR_3_AS_FEB_S1: &[usize] = &[0, 3];
const YEAR_3_AS_FEB_S2: &[usize] = &[1, 2];

/// Core selection for one student period.
pub fn core_selection(
    stream: Stream,
    year: u8,
    semester: u8,
    intake: Intake,
) -> CoreSelection {
    // Year 2 runs its halves in intake order: the February cohort takes the
    // second half of the file first.
    let semester = if year == 2 && intake == Intake::February {
        3 - semester
    } else {
        semester
    };

    match (stream, year, semester) {
        (_, 1, 1) => CoreSelection::FirstHalf(YEAR_1_SPLIT),
        (_, 1, _) => CoreSelection::SecondHalf(YEAR_1_SPLIT),
        (Stream::DataScience, 2, 1) => CoreSelection::FirstHalf(YEAR_2_SPLIT_DS),
        (Stream::DataScience, 2, _) => CoreSelection::SecondHalf(YEAR_2_SPLIT_DS),
        (Stream::AlgorithmsSoftware, 2, 1) => CoreSelection::FirstHalf(YEAR_2_SPLIT_AS),
        (Stream::AlgorithmsSoftware, 2, _) => CoreSelection::SecondHalf(YEAR_2_SPLIT_AS),
        (Stream::DataScience, _, 1) => match intake {
            Intake::February => CoreSelection::FirstHalf(YEAR_3_SPLIT_DS_FEB),
            Intake::July => CoreSelection::FirstHalf(YEAR_3_SPLIT_DS_JUL),
        },
        (Stream::DataScience, _, _) => match intake {
            Intake::February => CoreSelection::SecondHalf(YEAR_3_SPLIT_DS_FEB),
            Intake::July => CoreSelection::SecondHalf(YEAR_3_SPLIT_DS_JUL),
        },
        (Stream::AlgorithmsSoftware, _, 1) => match intake {
            Intake::February => CoreSelection::Indices(YEAR_3_AS_FEB_S1),
            Intake::July => CoreSelection::FirstHalf(YEAR_3_SPLIT_AS_JUL),
        },
        (Stream::AlgorithmsSoftware, _, _) => match intake {
            Intake::February => CoreSelection::Indices(YEAR_3_AS_FEB_S2),
            Intake::July => CoreSelection::SecondHalf(YEAR_3_SPLIT_AS_JUL),
        },
    }
}

/// The default core units for a student's current period, in catalog order,
/// with anything already taken or planned in another semester removed.
pub fn core_units_for<'a>(
    catalog: &'a Catalog,
    profile: &StudentProfile,
    taken_elsewhere: &HashSet<UnitCode>,
) -> Vec<(UnitCode, &'a UnitRecord)> {
    let Some(sequence) = catalog.core_sequence(profile.stream, profile.year) else {
        return Vec::new();
    };
    let selection =
        core_selection(profile.stream, profile.year, profile.semester, profile.intake);
    selection
        .apply(sequence.order())
        .into_iter()
        .filter(|code| !taken_elsewhere.contains(code))
        .filter_map(|code| {
            let record = sequence.get(&code)?;
            Some((code, record))
        })
        .collect()
}

// Elective slots per (intake, stream, year, semester), from the published
// course maps. Row order is Y1S1, Y1S2, Y2S1, Y2S2, Y3S1, Y3S2.
const CAPACITY_FEB_DS: [usize; 6] = [1, 1, 1, 2, 2, 3];
const CAPACITY_FEB_AS: [usize; 6] = [1, 2, 1, 1, 1, 2];
const CAPACITY_JUL_DS: [usize; 6] = [1, 1, 2, 1, 3, 2];
const CAPACITY_JUL_AS: [usize; 6] = [1, 2, 1, 1, 2, 2];

/// Elective slots the course map allots to this period.
pub fn elective_capacity(profile: &StudentProfile) -> usize {
    let table = match (profile.intake, profile.stream) {
        (Intake::February, Stream::DataScience) => &CAPACITY_FEB_DS,
        (Intake::February, Stream::AlgorithmsSoftware) => &CAPACITY_FEB_AS,
        (Intake::July, Stream::DataScience) => &CAPACITY_JUL_DS,
        (Intake::July, Stream::AlgorithmsSoftware) => &CAPACITY_JUL_AS,
    };
    let row = (usize::from(profile.year) - 1) * 2 + usize::from(profile.semester) - 1;
    table[row]
}

/// Slots actually open this period: the course-map allotment less any core
/// units still deferred from earlier periods, never below zero.
pub fn elective_space(profile: &StudentProfile, outstanding_deferred: usize) -> usize {
    elective_capacity(profile).saturating_sub(outstanding_deferred)
}

/// Why an elective can or cannot be taken this period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectiveCheck {
    pub available_this_sem: bool,
    pub prereq_fulfilled: bool,
    pub is_core_for_stream: bool,
    pub already_chosen: bool,
}

impl ElectiveCheck {
    pub fn allowed(&self) -> bool {
        self.available_this_sem
            && self.prereq_fulfilled
            && !self.is_core_for_stream
            && !self.already_chosen
    }
}

/// Run the elective gate checks for one candidate unit.
///
/// Availability is judged against the resolved teaching period, not the
/// student's own semester number.
pub fn elective_check(
    unit: &UnitRecord,
    code: &UnitCode,
    profile: &StudentProfile,
    prereq_fulfilled: bool,
    stream_cores: &HashSet<UnitCode>,
    chosen: &HashSet<UnitCode>,
) -> ElectiveCheck {
    let period = calendar::resolve(profile.intake, profile.semester);
    ElectiveCheck {
        available_this_sem: unit.available_in(period),
        prereq_fulfilled,
        is_core_for_stream: stream_cores.contains(code),
        already_chosen: chosen.contains(code),
    }
}
