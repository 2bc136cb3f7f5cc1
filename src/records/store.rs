//! Persistent per-student academic records.
//!
//! Each student owns one directory under the data root:
//!
//! - `Y{year}S{sem}_units.json` — one semester plan, `code -> status`
//! - `deferred_units.json` — deferred core log, `code -> "Y{y}S{s}"`
//! - `core_units.json` / `elective_units.json` — catalog snapshots
//!
//! Pure data access, no business rules. Saves use the write-to-temp-then-
//! rename pattern so records are never partially written. Reads of malformed
//! files skip the file with a warning and continue; a broken semester file
//! never fails the whole request. The store provides no locking; callers
//! serialize writes per student (one in-flight planning session per username).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::status::{Grade, UnitStatus};
use crate::catalog::{read_unit_map, UnitCode, UnitRecord};
use crate::error::{CompassError, Result};

/// Key for one academic period, in the student's own numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    pub year: u8,
    pub semester: u8,
}

impl PeriodKey {
    pub fn new(year: u8, semester: u8) -> Self {
        Self { year, semester }
    }

    /// The "Y{year}S{sem}" label used in filenames and the deferred log.
    pub fn label(&self) -> String {
        format!("Y{}S{}", self.year, self.semester)
    }

    pub fn file_name(&self) -> String {
        format!("{}_units.json", self.label())
    }

    /// Parse "Y2S1_units.json" or "Y2S1" back into a key.
    pub fn parse(name: &str) -> Option<Self> {
        let label = name.strip_suffix("_units.json").unwrap_or(name);
        let rest = label.strip_prefix('Y')?;
        let (year, sem) = rest.split_once('S')?;
        Some(Self {
            year: year.parse().ok()?,
            semester: sem.parse().ok()?,
        })
    }

    /// The period immediately before this one, or None at Y1S1.
    pub fn prev(&self) -> Option<Self> {
        match (self.year, self.semester) {
            (1, 1) => None,
            (y, 1) => Some(Self::new(y - 1, 2)),
            (y, _) => Some(Self::new(y, 1)),
        }
    }
}

/// One persisted semester plan.
pub type SemesterPlan = BTreeMap<UnitCode, UnitStatus>;

/// A deferred core unit and the period it was pushed out of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeferredUnit {
    pub code: UnitCode,
    pub from_semester: String,
}

/// Which catalog snapshot a read or merge targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Core,
    Elective,
}

impl SnapshotKind {
    fn file_name(&self) -> &'static str {
        match self {
            SnapshotKind::Core => "core_units.json",
            SnapshotKind::Elective => "elective_units.json",
        }
    }
}

/// File-backed record store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn student_dir(&self, username: &str) -> PathBuf {
        self.root.join(username)
    }

    fn plan_path(&self, username: &str, period: PeriodKey) -> PathBuf {
        self.student_dir(username).join(period.file_name())
    }

    fn deferred_path(&self, username: &str) -> PathBuf {
        self.student_dir(username).join("deferred_units.json")
    }

    // --- Semester plans ---

    /// Load one semester plan; missing or malformed files read as None.
    pub fn load_plan(&self, username: &str, period: PeriodKey) -> Option<SemesterPlan> {
        read_json_or_skip(&self.plan_path(username, period))
    }

    /// Persist one semester plan atomically.
    pub fn save_plan(
        &self,
        username: &str,
        period: PeriodKey,
        plan: &SemesterPlan,
    ) -> Result<()> {
        write_json_atomic(&self.plan_path(username, period), plan)
    }

    /// All persisted semester plans, ordered by period.
    pub fn all_plans(&self, username: &str) -> Vec<(PeriodKey, SemesterPlan)> {
        let dir = self.student_dir(username);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut plans = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(period) = PeriodKey::parse(&name) else {
                continue;
            };
            if !name.ends_with("_units.json") {
                continue;
            }
            if let Some(plan) = read_json_or_skip(&entry.path()) {
                plans.push((period, plan));
            }
        }
        plans.sort_by_key(|(period, _)| *period);
        plans
    }

    /// Every recorded unit status across all semesters.
    pub fn all_statuses(&self, username: &str) -> HashMap<UnitCode, UnitStatus> {
        let mut statuses = HashMap::new();
        for (_, plan) in self.all_plans(username) {
            statuses.extend(plan);
        }
        statuses
    }

    /// Units with a passing grade; planned and failed units are excluded.
    pub fn passed_units(&self, username: &str) -> HashSet<UnitCode> {
        self.all_statuses(username)
            .into_iter()
            .filter_map(|(code, status)| status.is_passed().then_some(code))
            .collect()
    }

    /// Units appearing in any semester plan other than `current`.
    ///
    /// Core filtering removes these so a unit taken or planned elsewhere
    /// never reappears.
    pub fn units_taken_elsewhere(&self, username: &str, current: PeriodKey) -> HashSet<UnitCode> {
        self.all_plans(username)
            .into_iter()
            .filter(|(period, _)| *period != current)
            .flat_map(|(_, plan)| plan.into_keys())
            .collect()
    }

    /// Units appearing in any semester plan at all.
    pub fn units_planned_anywhere(&self, username: &str) -> HashSet<UnitCode> {
        self.all_plans(username)
            .into_iter()
            .flat_map(|(_, plan)| plan.into_keys())
            .collect()
    }

    /// Prior periods with no persisted plan, walking back from the period
    /// before `period` to Y1S1. Empty for the first planning period.
    pub fn missing_prior_periods(&self, username: &str, period: PeriodKey) -> Vec<PeriodKey> {
        let mut missing = Vec::new();
        let mut cursor = period.prev();
        while let Some(p) = cursor {
            if !self.plan_path(username, p).exists() {
                missing.push(p);
            }
            cursor = p.prev();
        }
        missing
    }

    /// Whether any persisted unit still has a `planned` status, meaning
    /// grade entry is outstanding before a later period can be planned.
    pub fn has_pending_results(&self, username: &str) -> bool {
        self.all_plans(username)
            .iter()
            .any(|(_, plan)| plan.values().any(|s| *s == UnitStatus::Planned))
    }

    /// Enter grades for planned units in one semester record.
    ///
    /// Only units currently `planned` are updated; grades already on record
    /// are left alone. Returns how many units were updated.
    pub fn record_results(
        &self,
        username: &str,
        period: PeriodKey,
        grades: &BTreeMap<UnitCode, Grade>,
    ) -> Result<usize> {
        let Some(mut plan) = self.load_plan(username, period) else {
            return Ok(0);
        };

        let mut updated = 0;
        for (code, grade) in grades {
            if plan.get(code) == Some(&UnitStatus::Planned) {
                plan.insert(code.clone(), UnitStatus::Graded(*grade));
                updated += 1;
            }
        }
        if updated > 0 {
            self.save_plan(username, period, &plan)?;
        }
        Ok(updated)
    }

    // --- Deferred log ---

    /// Load the deferred-unit log; missing or malformed reads as empty.
    pub fn load_deferred(&self, username: &str) -> BTreeMap<UnitCode, String> {
        read_json_or_skip(&self.deferred_path(username)).unwrap_or_default()
    }

    pub fn save_deferred(
        &self,
        username: &str,
        deferred: &BTreeMap<UnitCode, String>,
    ) -> Result<()> {
        write_json_atomic(&self.deferred_path(username), deferred)
    }

    /// Deferred units not yet re-selected into any semester plan.
    pub fn outstanding_deferred(&self, username: &str) -> Vec<DeferredUnit> {
        let planned = self.units_planned_anywhere(username);
        self.load_deferred(username)
            .into_iter()
            .filter(|(code, _)| !planned.contains(code))
            .map(|(code, from_semester)| DeferredUnit {
                code,
                from_semester,
            })
            .collect()
    }

    // --- Catalog snapshots ---

    /// Read a per-student catalog snapshot, preserving entry order.
    pub fn load_snapshot(&self, username: &str, kind: SnapshotKind) -> Vec<(UnitCode, UnitRecord)> {
        read_unit_map(&self.student_dir(username).join(kind.file_name()))
    }

    /// Merge new units into a snapshot, keeping existing entries untouched.
    /// Returns how many units were added.
    pub fn merge_snapshot(
        &self,
        username: &str,
        kind: SnapshotKind,
        units: &[(UnitCode, UnitRecord)],
    ) -> Result<usize> {
        let mut existing = self.load_snapshot(username, kind);
        let known: HashSet<UnitCode> = existing.iter().map(|(c, _)| c.clone()).collect();

        let mut added = 0;
        for (code, record) in units {
            if !known.contains(code) {
                existing.push((code.clone(), record.clone()));
                added += 1;
            }
        }
        if added > 0 {
            let path = self.student_dir(username).join(kind.file_name());
            let mut map = serde_json::Map::new();
            for (code, record) in &existing {
                let value = serde_json::to_value(record).map_err(|e| {
                    CompassError::RecordWriteError {
                        path: path.clone(),
                        message: e.to_string(),
                    }
                })?;
                map.insert(code.as_str().to_string(), value);
            }
            write_json_atomic(&path, &map)?;
        }
        Ok(added)
    }
}

fn read_json_or_skip<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Skipping malformed record {}: {}", path.display(), e);
            None
        }
    }
}

/// Atomic write: write to temp file, then rename.
/// Prevents corruption if the process dies mid-write.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let content =
        serde_json::to_string_pretty(value).map_err(|e| CompassError::RecordWriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
