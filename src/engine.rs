//! The planning engine.
//!
//! [`PlannerEngine`] owns the catalog, the record store and the community
//! difficulty source, and answers every planner query: eligibility, core and
//! elective listings, interest-based recommendation, readiness analysis and
//! plan persistence. All operations are synchronous and request-scoped; no
//! state is carried between calls.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::calendar;
use crate::catalog::{Catalog, UnitCode, UnitRecord, WorkloadDisplay};
use crate::community::DifficultyProvider;
use crate::curriculum;
use crate::error::{CompassError, Result};
use crate::prereq::{self, PrereqRule};
use crate::profile::StudentProfile;
use crate::readiness::{self, ReadinessReport};
use crate::recommend;
use crate::records::{
    DeferredUnit, Grade, PeriodKey, RecordStore, SemesterPlan, SnapshotKind, UnitStatus,
};
use crate::workload;

/// Whether one unit can be taken this period, and why not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub unit: UnitCode,
    pub name: String,
    pub available_this_sem: bool,
    pub prereq_fulfilled: bool,
    pub can_take: bool,
    /// Empty when the unit can be taken.
    pub reason: String,
}

/// One unit in a listing, with its gate status for the current period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSummary {
    pub code: UnitCode,
    pub name: String,
    pub semesters: Vec<String>,
    pub prereq_fulfilled: bool,
}

/// The default core units for the student's current period.
#[derive(Debug, Clone, Serialize)]
pub struct CoreListing {
    pub period: String,
    pub semester_name: String,
    pub units: Vec<UnitSummary>,
    /// Cores pushed out of earlier periods and still unplanned.
    pub deferred: Vec<DeferredUnit>,
}

/// Electives open to the student this period.
#[derive(Debug, Clone, Serialize)]
pub struct ElectiveListing {
    pub units: Vec<UnitSummary>,
    pub elective_space: usize,
    pub current_chosen: Vec<UnitCode>,
}

/// Full catalog detail for one unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitDetail {
    pub code: UnitCode,
    pub name: String,
    pub description: String,
    pub semesters: Vec<String>,
    pub prerequisites: String,
    pub workload: WorkloadDisplay,
}

/// The planning engine; see the module docs.
pub struct PlannerEngine {
    catalog: Catalog,
    store: RecordStore,
    difficulty: Box<dyn DifficultyProvider>,
}

impl PlannerEngine {
    pub fn new(
        catalog: Catalog,
        store: RecordStore,
        difficulty: Box<dyn DifficultyProvider>,
    ) -> Self {
        Self {
            catalog,
            store,
            difficulty,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Verify the student's history supports planning this period.
    ///
    /// Every period before the one being planned must have a persisted
    /// record, and no persisted unit may still be awaiting a grade. The
    /// first period (Y1S1) has no history and always passes.
    pub fn verify_history(&self, profile: &StudentProfile) -> Result<()> {
        if calendar::is_first_period(profile.year, profile.semester) {
            return Ok(());
        }
        let period = PeriodKey::new(profile.year, profile.semester);
        let missing = self.store.missing_prior_periods(&profile.username, period);
        if !missing.is_empty() {
            let labels: Vec<String> = missing.iter().map(PeriodKey::label).collect();
            return Err(CompassError::PlanRejected {
                reason: format!("no saved record for {}", labels.join(", ")),
            });
        }
        if self.store.has_pending_results(&profile.username) {
            return Err(CompassError::PlanRejected {
                reason: "results not yet entered for previously planned units".to_string(),
            });
        }
        Ok(())
    }

    /// Can this student take this unit right now?
    pub fn check_eligibility(&self, profile: &StudentProfile, code: &UnitCode) -> Result<Eligibility> {
        let record = self.lookup(code)?;
        let period = calendar::resolve(profile.intake, profile.semester);
        let available_this_sem = record.available_in(period);

        let outcome = self.evaluate_prereq(&profile.username, record);
        let prereq_fulfilled = outcome.fulfilled;

        let reason = if !available_this_sem && !prereq_fulfilled {
            "Not available this semester and prerequisites not met"
        } else if !available_this_sem {
            "Not available this semester"
        } else if !prereq_fulfilled {
            "Prerequisites not met"
        } else {
            ""
        };

        debug!(
            unit = code.as_str(),
            available = available_this_sem,
            prereq = prereq_fulfilled,
            "eligibility checked"
        );

        Ok(Eligibility {
            unit: code.clone(),
            name: record.unit_name.clone(),
            available_this_sem,
            prereq_fulfilled,
            can_take: available_this_sem && prereq_fulfilled,
            reason: reason.to_string(),
        })
    }

    /// The default core units for the student's current period, with
    /// per-unit prerequisite status and outstanding deferrals alongside.
    pub fn list_core_units(&self, profile: &StudentProfile) -> Result<CoreListing> {
        self.verify_history(profile)?;

        let period = PeriodKey::new(profile.year, profile.semester);
        let taken = self
            .store
            .units_taken_elsewhere(&profile.username, period);
        let cores = curriculum::core_units_for(&self.catalog, profile, &taken);

        let units = cores
            .iter()
            .map(|(code, record)| self.summarize(&profile.username, code, record))
            .collect();

        Ok(CoreListing {
            period: profile.period_label(),
            semester_name: calendar::resolve(profile.intake, profile.semester)
                .display_name()
                .to_string(),
            units,
            deferred: self.store.outstanding_deferred(&profile.username),
        })
    }

    /// Electives the student may take this period, with the open slot count.
    pub fn list_elective_candidates(&self, profile: &StudentProfile) -> Result<ElectiveListing> {
        let period = PeriodKey::new(profile.year, profile.semester);
        let stream_cores: HashSet<UnitCode> = self
            .catalog
            .stream_core_codes(profile.stream)
            .into_iter()
            .collect();
        let current_plan = self
            .store
            .load_plan(&profile.username, period)
            .unwrap_or_default();
        let chosen: HashSet<UnitCode> = current_plan
            .keys()
            .filter(|c| !stream_cores.contains(*c))
            .cloned()
            .collect();

        let mut units = Vec::new();
        for (code, record) in self.catalog.electives() {
            let outcome = self.evaluate_prereq(&profile.username, record);
            let check = curriculum::elective_check(
                record,
                code,
                profile,
                outcome.fulfilled,
                &stream_cores,
                &chosen,
            );
            if check.allowed() {
                units.push(self.summarize(&profile.username, code, record));
            }
        }

        let deferred = self.store.outstanding_deferred(&profile.username);
        let mut current_chosen: Vec<UnitCode> = chosen.into_iter().collect();
        current_chosen.sort();

        Ok(ElectiveListing {
            units,
            elective_space: curriculum::elective_space(profile, deferred.len()),
            current_chosen,
        })
    }

    /// Rank level-matched electives by similarity to the stated interest.
    pub fn recommend_electives(
        &self,
        profile: &StudentProfile,
        level: u8,
        interest: &str,
        limit: usize,
    ) -> Result<Vec<UnitSummary>> {
        let stream_cores: HashSet<UnitCode> = self
            .catalog
            .stream_core_codes(profile.stream)
            .into_iter()
            .collect();
        let period = PeriodKey::new(profile.year, profile.semester);
        let chosen = self
            .store
            .load_plan(&profile.username, period)
            .unwrap_or_default();

        let pool: Vec<(UnitCode, String)> = self
            .catalog
            .electives()
            .filter(|(code, _)| code.level() == Some(level))
            .filter(|(code, _)| !stream_cores.contains(*code) && !chosen.contains_key(*code))
            .map(|(code, record)| (code.clone(), record.description.clone()))
            .collect();

        let ranked = recommend::rank_by_interest(&pool, interest, limit);
        info!(level, candidates = pool.len(), returned = ranked.len(), "electives ranked");

        Ok(ranked
            .into_iter()
            .filter_map(|code| {
                let record = self.catalog.elective(&code)?;
                Some(self.summarize(&profile.username, &code, record))
            })
            .collect())
    }

    /// Readiness analysis of one unit against a planned semester.
    pub fn analyze_readiness(
        &self,
        profile: &StudentProfile,
        code: &UnitCode,
        planned: &[UnitCode],
    ) -> Result<ReadinessReport> {
        let record = self.lookup(code)?;
        let outcome = self.evaluate_prereq(&profile.username, record);
        let snapshot = self.difficulty.difficulty(code);
        let summary = workload::aggregate(planned, code, &self.catalog.all_units());
        Ok(readiness::analyze(code, outcome, snapshot, summary))
    }

    /// Readiness analysis of adding one more unit to an existing plan.
    ///
    /// Same scoring as [`analyze_readiness`](Self::analyze_readiness); the
    /// workload summary carries before/after deltas because the unit is not
    /// in `existing`.
    pub fn analyze_adding_unit(
        &self,
        profile: &StudentProfile,
        code: &UnitCode,
        existing: &[UnitCode],
    ) -> Result<ReadinessReport> {
        let without: Vec<UnitCode> = existing.iter().filter(|c| *c != code).cloned().collect();
        self.analyze_readiness(profile, code, &without)
    }

    /// Persist a semester plan.
    ///
    /// Rejects without touching any file when the selection is not exactly
    /// four units or a selected core has unmet prerequisites. On success,
    /// writes the semester record with every unit `planned`, logs explicit
    /// deferrals under this period's label, clears deferrals for reselected
    /// units, and refreshes the student's catalog snapshots.
    pub fn save_plan(
        &self,
        profile: &StudentProfile,
        cores: &[UnitCode],
        electives: &[UnitCode],
        deferred: &[UnitCode],
    ) -> Result<String> {
        if cores.len() + electives.len() != 4 {
            return Err(CompassError::PlanRejected {
                reason: "exactly 4 units required".to_string(),
            });
        }

        let mut unmet = Vec::new();
        for code in cores {
            let record = self.lookup(code)?;
            if !self.evaluate_prereq(&profile.username, record).fulfilled {
                unmet.push(code.as_str().to_string());
            }
        }
        if !unmet.is_empty() {
            return Err(CompassError::PlanRejected {
                reason: format!("Prerequisites not met for: {}", unmet.join(", ")),
            });
        }

        let period = PeriodKey::new(profile.year, profile.semester);
        let plan: SemesterPlan = cores
            .iter()
            .chain(electives)
            .map(|code| (code.clone(), UnitStatus::Planned))
            .collect();
        self.store.save_plan(&profile.username, period, &plan)?;

        let mut log = self.store.load_deferred(&profile.username);
        for code in deferred {
            log.insert(code.clone(), period.label());
        }
        for code in cores {
            log.remove(code);
        }
        self.store.save_deferred(&profile.username, &log)?;

        self.refresh_snapshots(profile)?;

        info!(
            student = profile.username.as_str(),
            period = period.label().as_str(),
            "plan saved"
        );
        Ok(period.label())
    }

    /// Enter grades for planned units in one semester record.
    pub fn record_results(
        &self,
        username: &str,
        period: PeriodKey,
        grades: &BTreeMap<UnitCode, Grade>,
    ) -> Result<usize> {
        self.store.record_results(username, period, grades)
    }

    /// Full catalog detail for one unit, formatted for display.
    pub fn unit_detail(&self, code: &UnitCode) -> Result<UnitDetail> {
        let record = self.lookup(code)?;
        let rule = PrereqRule::parse(&record.prereq);
        Ok(UnitDetail {
            code: code.clone(),
            name: record.unit_name.clone(),
            description: record.description.clone(),
            semesters: record.semester_names(),
            prerequisites: rule.describe(code),
            workload: record.workload_display(),
        })
    }

    fn lookup(&self, code: &UnitCode) -> Result<&UnitRecord> {
        self.catalog
            .unit(code)
            .ok_or_else(|| CompassError::UnitNotFound {
                code: code.as_str().to_string(),
            })
    }

    fn evaluate_prereq(&self, username: &str, record: &UnitRecord) -> prereq::PrereqOutcome {
        let rule = PrereqRule::parse(&record.prereq);
        let completed = self.store.passed_units(username);
        let grades = self.store.all_statuses(username);
        prereq::evaluate(&rule, &completed, &grades)
    }

    fn summarize(&self, username: &str, code: &UnitCode, record: &UnitRecord) -> UnitSummary {
        UnitSummary {
            code: code.clone(),
            name: record.unit_name.clone(),
            semesters: record.semester_names(),
            prereq_fulfilled: self.evaluate_prereq(username, record).fulfilled,
        }
    }

    /// Keep the student's snapshot files in step with the catalog: add-only,
    /// existing entries are never rewritten.
    fn refresh_snapshots(&self, profile: &StudentProfile) -> Result<()> {
        let mut cores = Vec::new();
        for year in 1..=3u8 {
            if let Some(seq) = self.catalog.core_sequence(profile.stream, year) {
                for (code, record) in seq.iter() {
                    cores.push((code.clone(), record.clone()));
                }
            }
        }
        self.store
            .merge_snapshot(&profile.username, SnapshotKind::Core, &cores)?;

        let electives: Vec<(UnitCode, UnitRecord)> = self
            .catalog
            .electives()
            .map(|(code, record)| (code.clone(), record.clone()))
            .collect();
        self.store
            .merge_snapshot(&profile.username, SnapshotKind::Elective, &electives)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::NoCommunityData;
    use crate::profile::{Intake, Stream};
    use tempfile::TempDir;

    fn code(raw: &str) -> UnitCode {
        UnitCode::normalize(raw)
    }

    fn record(name: &str, sems: &str, prereq: &str) -> UnitRecord {
        UnitRecord {
            unit_name: name.into(),
            sem_available: sems.into(),
            description: format!("{name} description"),
            prereq: prereq.into(),
            assign: "20;30".into(),
            test: "10".into(),
            final_exam: "40".into(),
            approved_elective: None,
        }
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::empty();
        catalog.insert_core_sequence(
            Stream::DataScience,
            1,
            vec![
                (code("FIT1045"), record("Algorithms", "1;2", "NONE")),
                (code("FIT1047"), record("Systems", "1;2", "NONE")),
                (code("FIT1008"), record("Fundamentals", "1;2", "NONE")),
                (code("FIT1043"), record("Data intro", "1;2", "NONE")),
                (code("FIT1049"), record("Writing", "1;2", "NONE")),
                (code("FIT2014"), record("Theory", "1;2", "FIT1045")),
            ],
        );
        catalog.insert_electives(vec![
            (code("FIT2081"), record("Mobile", "1", "FIT1045")),
            (code("FIT2102"), record("Paradigms", "2", "NONE")),
        ]);
        catalog
    }

    fn engine(temp: &TempDir) -> PlannerEngine {
        PlannerEngine::new(
            catalog(),
            RecordStore::new(temp.path()),
            Box::new(NoCommunityData),
        )
    }

    fn profile(year: u8, semester: u8, intake: Intake) -> StudentProfile {
        StudentProfile {
            username: "alice".into(),
            stream: Stream::DataScience,
            intake,
            year,
            semester,
        }
    }

    fn pass(engine: &PlannerEngine, period: PeriodKey, codes: &[&str]) {
        let plan: SemesterPlan = codes
            .iter()
            .map(|c| (code(c), UnitStatus::Graded(Grade::C)))
            .collect();
        engine.store().save_plan("alice", period, &plan).unwrap();
    }

    #[test]
    fn eligibility_reasons_compose() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        // July intake semester 1 is the July teaching period; FIT2081 only
        // runs in February and needs FIT1045.
        let p = profile(2, 1, Intake::July);
        let result = engine.check_eligibility(&p, &code("FIT2081")).unwrap();
        assert!(!result.can_take);
        assert_eq!(
            result.reason,
            "Not available this semester and prerequisites not met"
        );

        pass(&engine, PeriodKey::new(1, 1), &["FIT1045"]);
        let result = engine.check_eligibility(&p, &code("FIT2081")).unwrap();
        assert_eq!(result.reason, "Not available this semester");

        let result = engine.check_eligibility(&p, &code("FIT2014")).unwrap();
        assert!(result.can_take);
        assert_eq!(result.reason, "");
    }

    #[test]
    fn unknown_unit_is_an_error() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let p = profile(1, 1, Intake::February);
        assert!(matches!(
            engine.check_eligibility(&p, &code("FIT9999")),
            Err(CompassError::UnitNotFound { .. })
        ));
    }

    #[test]
    fn first_period_needs_no_history() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let listing = engine
            .list_core_units(&profile(1, 1, Intake::February))
            .unwrap();
        assert_eq!(listing.period, "Y1S1");
        assert_eq!(listing.semester_name, "February Semester");
        assert_eq!(listing.units.len(), 3);
    }

    #[test]
    fn later_period_requires_complete_history() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let err = engine
            .list_core_units(&profile(1, 2, Intake::February))
            .unwrap_err();
        assert!(err.to_string().contains("Y1S1"));
    }

    #[test]
    fn pending_results_block_planning() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let plan: SemesterPlan = [(code("FIT1045"), UnitStatus::Planned)].into_iter().collect();
        engine
            .store()
            .save_plan("alice", PeriodKey::new(1, 1), &plan)
            .unwrap();

        let err = engine
            .list_core_units(&profile(1, 2, Intake::February))
            .unwrap_err();
        assert!(err.to_string().contains("results"));
    }

    #[test]
    fn save_plan_rejects_wrong_unit_count() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let p = profile(1, 1, Intake::February);
        let err = engine
            .save_plan(&p, &[code("FIT1045")], &[], &[])
            .unwrap_err();
        assert!(err.to_string().contains("exactly 4 units required"));
        // Nothing written.
        assert!(engine.store().load_plan("alice", PeriodKey::new(1, 1)).is_none());
    }

    #[test]
    fn save_plan_rejects_unmet_core_prereqs() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let p = profile(1, 1, Intake::February);
        let err = engine
            .save_plan(
                &p,
                &[code("FIT2014"), code("FIT1047"), code("FIT1008")],
                &[code("FIT2102")],
                &[],
            )
            .unwrap_err();
        assert!(err.to_string().contains("FIT2014"));
        assert!(engine.store().load_plan("alice", PeriodKey::new(1, 1)).is_none());
    }

    #[test]
    fn save_plan_writes_planned_statuses_and_deferrals() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let p = profile(1, 1, Intake::February);
        let label = engine
            .save_plan(
                &p,
                &[code("FIT1045"), code("FIT1047"), code("FIT1008")],
                &[code("FIT2102")],
                &[code("FIT1043")],
            )
            .unwrap();
        assert_eq!(label, "Y1S1");

        let plan = engine
            .store()
            .load_plan("alice", PeriodKey::new(1, 1))
            .unwrap();
        assert_eq!(plan.len(), 4);
        assert!(plan.values().all(|s| *s == UnitStatus::Planned));

        let deferred = engine.store().outstanding_deferred("alice");
        assert_eq!(deferred.len(), 1);
        assert_eq!(deferred[0].code, code("FIT1043"));
        assert_eq!(deferred[0].from_semester, "Y1S1");

        // Snapshots were refreshed.
        let snapshot = engine.store().load_snapshot("alice", SnapshotKind::Core);
        assert_eq!(snapshot.len(), 6);
    }

    #[test]
    fn reselecting_a_deferred_core_clears_it() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let mut log = BTreeMap::new();
        log.insert(code("FIT1045"), "Y1S1".to_string());
        engine.store().save_deferred("alice", &log).unwrap();

        let p = profile(1, 1, Intake::February);
        engine
            .save_plan(
                &p,
                &[code("FIT1045"), code("FIT1047"), code("FIT1008")],
                &[code("FIT2102")],
                &[],
            )
            .unwrap();
        assert!(engine.store().load_deferred("alice").is_empty());
    }

    #[test]
    fn deferred_cores_reduce_elective_space() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let mut log = BTreeMap::new();
        log.insert(code("FIT1043"), "Y1S1".to_string());
        engine.store().save_deferred("alice", &log).unwrap();

        let listing = engine
            .list_elective_candidates(&profile(1, 1, Intake::February))
            .unwrap();
        // Capacity 1 for DS Y1S1 February, minus one outstanding deferral.
        assert_eq!(listing.elective_space, 0);
    }

    #[test]
    fn elective_listing_excludes_unavailable_and_cores() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        pass(&engine, PeriodKey::new(1, 1), &["FIT1045"]);

        // February period: FIT2081 runs and its prereq is passed; FIT2102
        // only runs in July.
        let listing = engine
            .list_elective_candidates(&profile(2, 1, Intake::February))
            .unwrap();
        let codes: Vec<&UnitCode> = listing.units.iter().map(|u| &u.code).collect();
        assert!(codes.contains(&&code("FIT2081")));
        assert!(!codes.contains(&&code("FIT2102")));
    }

    #[test]
    fn recommendations_filter_by_level() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let ranked = engine
            .recommend_electives(&profile(2, 1, Intake::February), 2, "mobile", 5)
            .unwrap();
        let codes: Vec<&UnitCode> = ranked.iter().map(|u| &u.code).collect();
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0], &code("FIT2081"));
    }

    #[test]
    fn readiness_is_zero_with_unmet_prereqs() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let p = profile(2, 1, Intake::February);
        let report = engine
            .analyze_readiness(&p, &code("FIT2014"), &[code("FIT2014")])
            .unwrap();
        assert_eq!(report.score, 0);
        assert!(!report.prereq_fulfilled);
    }

    #[test]
    fn adding_unit_reports_workload_delta() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        pass(&engine, PeriodKey::new(1, 1), &["FIT1045"]);
        let p = profile(1, 2, Intake::February);
        let report = engine
            .analyze_adding_unit(&p, &code("FIT2014"), &[code("FIT1043"), code("FIT1049")])
            .unwrap();
        assert!(report.workload.is_adding_new);
        assert_eq!(report.workload.total_units, 3);
        assert_eq!(report.workload.added_assignments, 2);
    }

    #[test]
    fn unit_detail_formats_prereq_text() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let detail = engine.unit_detail(&code("FIT2014")).unwrap();
        assert_eq!(
            detail.prerequisites,
            "To take FIT2014, you must have completed: FIT1045"
        );
        assert_eq!(detail.workload.assign, "20%, 30%");
    }
}
