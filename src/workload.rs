//! Semester workload aggregation.
//!
//! Workload is measured purely by assessment counts: the number of entries in
//! a unit's assignment and test weight lists. Weight values are ignored. The
//! aggregate also carries before/after deltas so the add-a-unit flow can show
//! what one more unit costs.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::{UnitCode, UnitRecord};

/// Semester pressure classification, from total assessment counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadStatus {
    Light,
    Moderate,
    Heavy,
    Overwhelming,
}

impl WorkloadStatus {
    /// Classify totals; first matching band wins.
    pub fn classify(assignments: usize, tests: usize) -> Self {
        if assignments >= 17 || tests >= 9 {
            WorkloadStatus::Overwhelming
        } else if assignments >= 13 || tests >= 7 {
            WorkloadStatus::Heavy
        } else if assignments >= 9 || tests >= 5 {
            WorkloadStatus::Moderate
        } else {
            WorkloadStatus::Light
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkloadStatus::Light => "light",
            WorkloadStatus::Moderate => "moderate",
            WorkloadStatus::Heavy => "heavy",
            WorkloadStatus::Overwhelming => "overwhelming",
        }
    }

    /// Base contribution to the readiness score, before the unit-count
    /// penalty.
    pub fn base_score(&self) -> u32 {
        match self {
            WorkloadStatus::Light => 90,
            WorkloadStatus::Moderate => 75,
            WorkloadStatus::Heavy => 55,
            WorkloadStatus::Overwhelming => 35,
        }
    }
}

/// Assessment counts for one unit in the semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitLoad {
    pub code: UnitCode,
    pub assignments: usize,
    pub tests: usize,
    pub has_final: bool,
}

/// Aggregated workload for one semester, with before/after deltas when a
/// unit is being added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkloadSummary {
    pub total_units: usize,
    pub total_assignments: usize,
    pub total_tests: usize,
    pub base_assignments: usize,
    pub base_tests: usize,
    pub added_assignments: usize,
    pub added_tests: usize,
    pub is_adding_new: bool,
    pub status: WorkloadStatus,
    pub per_unit: Vec<UnitLoad>,
}

impl WorkloadSummary {
    /// Workload component of the readiness score: the status base, minus 10
    /// per unit beyond the standard four, never below 30.
    pub fn score(&self) -> u32 {
        let base = self.status.base_score();
        if self.total_units > 4 {
            let penalty = (self.total_units - 4) as u32 * 10;
            base.saturating_sub(penalty).max(30)
        } else {
            base
        }
    }
}

/// Aggregate the workload of `planned` with `focus` as the unit under
/// analysis.
///
/// When `focus` is not in `planned` it is treated as being added: totals
/// include it and the base counts are the semester without it. When it is
/// already planned, totals cover `planned` as-is and the base excludes the
/// focus unit for context. Units missing from `units` count as zero load.
/// Pure and order-independent.
pub fn aggregate(
    planned: &[UnitCode],
    focus: &UnitCode,
    units: &HashMap<UnitCode, UnitRecord>,
) -> WorkloadSummary {
    let is_adding_new = !planned.contains(focus);

    let mut semester: Vec<UnitCode> = planned.to_vec();
    if is_adding_new {
        semester.push(focus.clone());
    }

    let per_unit: Vec<UnitLoad> = semester
        .iter()
        .map(|code| match units.get(code) {
            Some(record) => UnitLoad {
                code: code.clone(),
                assignments: record.assignment_count(),
                tests: record.test_count(),
                has_final: record.has_final(),
            },
            None => UnitLoad {
                code: code.clone(),
                assignments: 0,
                tests: 0,
                has_final: false,
            },
        })
        .collect();

    let total_assignments: usize = per_unit.iter().map(|u| u.assignments).sum();
    let total_tests: usize = per_unit.iter().map(|u| u.tests).sum();

    let (base_assignments, base_tests) = per_unit
        .iter()
        .filter(|u| u.code != *focus)
        .fold((0, 0), |(a, t), u| (a + u.assignments, t + u.tests));

    WorkloadSummary {
        total_units: semester.len(),
        total_assignments,
        total_tests,
        base_assignments,
        base_tests,
        added_assignments: total_assignments - base_assignments,
        added_tests: total_tests - base_tests,
        is_adding_new,
        status: WorkloadStatus::classify(total_assignments, total_tests),
        per_unit,
    }
}
