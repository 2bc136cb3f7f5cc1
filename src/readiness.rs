//! Readiness scoring.
//!
//! Blends prerequisite grade strength (50%), community difficulty adjusted
//! for that strength (25%) and projected semester workload (25%) into a
//! 0-100 score, then renders a recommendation checklist. An unfulfilled
//! prerequisite is an immediate 0 regardless of the other components.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::UnitCode;
use crate::community::{DifficultySnapshot, PainPoint};
use crate::prereq::PrereqOutcome;
use crate::workload::WorkloadSummary;

/// Neutral difficulty assumed when no community data exists.
pub const DEFAULT_DIFFICULTY: u32 = 50;

/// Full readiness analysis for one unit in one semester.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub unit: UnitCode,
    pub score: u32,
    pub prereq_fulfilled: bool,
    pub prereq_strength: u32,
    pub prereq_detail: String,
    pub difficulty_score: u32,
    pub struggling_percent: String,
    pub pain_points: Vec<PainPoint>,
    pub workload: WorkloadSummary,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Difficulty component adjusted for how solid the student's prerequisite
/// grades are. A strong foundation keeps hard units viable; a weak one makes
/// even easy units risky.
fn difficulty_adjusted(strength: u32, difficulty: u32) -> u32 {
    let row: [u32; 3] = if strength >= 85 {
        [85, 90, 95]
    } else if strength >= 70 {
        [60, 75, 85]
    } else if strength >= 50 {
        [30, 50, 65]
    } else {
        [20, 40, 55]
    };
    if difficulty >= 70 {
        row[0]
    } else if difficulty >= 50 {
        row[1]
    } else {
        row[2]
    }
}

/// Composite 0-100 readiness score.
pub fn score(prereq: &PrereqOutcome, difficulty: u32, workload: &WorkloadSummary) -> u32 {
    if !prereq.fulfilled {
        return 0;
    }
    let adjusted = difficulty_adjusted(prereq.strength, difficulty);
    let total = f64::from(prereq.strength) * 0.50
        + f64::from(adjusted) * 0.25
        + f64::from(workload.score()) * 0.25;
    total as u32
}

/// Build the ordered recommendation list: a risk verdict first, then
/// independent advisory lines for whatever actually applies.
pub fn recommendations(
    score: u32,
    strength: u32,
    snapshot: Option<&DifficultySnapshot>,
    workload: &WorkloadSummary,
    unit: &UnitCode,
) -> Vec<String> {
    let mut lines = Vec::new();

    let risk = if score >= 80 {
        "READY - Strong foundation and manageable workload"
    } else if score >= 65 {
        "READY WITH PREP - Good foundation, some preparation recommended"
    } else if score >= 50 {
        "MODERATE RISK - Proceed carefully, extra study needed"
    } else if score >= 35 {
        "HIGH RISK - Consider deferring or expect significant challenge"
    } else {
        "NOT RECOMMENDED - Prerequisites or workload concerns"
    };
    lines.push(risk.to_string());

    if strength < 50 {
        lines.push(
            "CRITICAL: Your prerequisite grades are too weak. \
             Strongly consider retaking prerequisite units or defer this unit."
                .to_string(),
        );
    } else if strength < 70 {
        lines.push(
            "Prerequisite foundation is shaky. \
             Dedicate 2-3 weeks before semester starts to review key concepts."
                .to_string(),
        );
    } else if strength < 85 {
        lines.push(
            "Prerequisites met but not mastered. \
             Do a quick refresher in Week 1 to strengthen fundamentals."
                .to_string(),
        );
    }

    if let Some(snapshot) = snapshot {
        if snapshot.difficulty_score > 75 {
            lines.push(format!(
                "{unit} is rated VERY DIFFICULT by the community. \
                 Expect to spend 12-15 hours/week on this unit."
            ));
            if let Some(top) = snapshot.top_pain_points().first() {
                lines.push(format!(
                    "Students commonly struggle with {}. \
                     Find resources on this topic BEFORE Week 3.",
                    top.category
                ));
            }
        } else if snapshot.difficulty_score > 60 {
            lines.push("Moderately challenging unit. Budget 10-12 hours/week.".to_string());
        }
    }

    if workload.is_adding_new && workload.added_assignments >= 4 {
        lines.push(format!(
            "Adding {unit} will add {} assignments and {} tests to your workload.",
            workload.added_assignments, workload.added_tests
        ));
    }

    if workload.total_assignments > 16 {
        lines.push(format!(
            "WORKLOAD WARNING: {} assignments this semester is EXTREME. \
             Drop 1 unit or expect burnout.",
            workload.total_assignments
        ));
    } else if workload.total_assignments > 12 {
        lines.push(format!(
            "Heavy semester: {} assignments. Start assignments early and use a planner.",
            workload.total_assignments
        ));
    }

    if workload.total_tests > 6 {
        lines.push(format!(
            "{} tests/quizzes is demanding. Create a study schedule to avoid cramming.",
            workload.total_tests
        ));
    }

    if score < 65 && workload.total_units >= 4 {
        lines.push(
            "STRATEGY: Consider taking only 3 units this semester instead of 4 \
             to reduce pressure and improve performance."
                .to_string(),
        );
    }

    lines
}

/// Score one unit and assemble the full report.
pub fn analyze(
    unit: &UnitCode,
    prereq: PrereqOutcome,
    snapshot: Option<DifficultySnapshot>,
    workload: WorkloadSummary,
) -> ReadinessReport {
    let difficulty = snapshot
        .as_ref()
        .map_or(DEFAULT_DIFFICULTY, |s| s.difficulty_score);
    let score = score(&prereq, difficulty, &workload);
    let recommendations =
        recommendations(score, prereq.strength, snapshot.as_ref(), &workload, unit);

    ReadinessReport {
        unit: unit.clone(),
        score,
        prereq_fulfilled: prereq.fulfilled,
        prereq_strength: prereq.strength,
        prereq_detail: prereq.detail,
        difficulty_score: difficulty,
        struggling_percent: snapshot
            .as_ref()
            .map(|s| s.struggling_percent.clone())
            .unwrap_or_else(|| "0%".to_string()),
        pain_points: snapshot
            .map(|s| s.top_pain_points().to_vec())
            .unwrap_or_default(),
        workload,
        recommendations,
        generated_at: Utc::now(),
    }
}
