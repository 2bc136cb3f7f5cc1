//! Catalog loading.
//!
//! The catalog directory holds one ordered JSON object per (stream, year)
//! core curriculum (`d_y1_core_units.json`, `a_y3_core_units.json`, ...) plus
//! `elective_units.json`. Object order is curriculum order and is preserved
//! on load; the slice tables in [`crate::curriculum`] index into it.
//!
//! Missing or malformed files degrade to an empty section with a warning,
//! never an error; a single bad entry is skipped without dropping the file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::unit::{UnitCode, UnitRecord};
use crate::profile::Stream;

/// Fixed-order core curriculum for one (stream, year).
#[derive(Debug, Clone, Default)]
pub struct CoreSequence {
    order: Vec<UnitCode>,
    units: HashMap<UnitCode, UnitRecord>,
}

impl CoreSequence {
    pub fn new(entries: Vec<(UnitCode, UnitRecord)>) -> Self {
        let mut order = Vec::with_capacity(entries.len());
        let mut units = HashMap::with_capacity(entries.len());
        for (code, record) in entries {
            order.push(code.clone());
            units.insert(code, record);
        }
        Self { order, units }
    }

    /// Unit codes in curriculum order.
    pub fn order(&self) -> &[UnitCode] {
        &self.order
    }

    pub fn get(&self, code: &UnitCode) -> Option<&UnitRecord> {
        self.units.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UnitCode, &UnitRecord)> {
        self.order.iter().filter_map(|c| self.units.get(c).map(|r| (c, r)))
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// The shared, read-only unit catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    core: HashMap<(Stream, u8), CoreSequence>,
    elective_order: Vec<UnitCode>,
    electives: HashMap<UnitCode, UnitRecord>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every curriculum file found under `dir`.
    pub fn load(dir: &Path) -> Self {
        let mut catalog = Self::default();
        for stream in [Stream::DataScience, Stream::AlgorithmsSoftware] {
            for year in 1..=3u8 {
                let name = format!("{}_y{}_core_units.json", stream.file_prefix(), year);
                let entries = read_unit_map(&dir.join(name));
                if !entries.is_empty() {
                    catalog.insert_core_sequence(stream, year, entries);
                }
            }
        }
        catalog.insert_electives(read_unit_map(&dir.join("elective_units.json")));
        catalog
    }

    pub fn insert_core_sequence(
        &mut self,
        stream: Stream,
        year: u8,
        entries: Vec<(UnitCode, UnitRecord)>,
    ) {
        self.core.insert((stream, year), CoreSequence::new(entries));
    }

    pub fn insert_electives(&mut self, entries: Vec<(UnitCode, UnitRecord)>) {
        for (code, record) in entries {
            if !self.electives.contains_key(&code) {
                self.elective_order.push(code.clone());
            }
            self.electives.insert(code, record);
        }
    }

    pub fn core_sequence(&self, stream: Stream, year: u8) -> Option<&CoreSequence> {
        self.core.get(&(stream, year))
    }

    /// Every core code for a stream across all years. Cores and electives are
    /// disjoint by construction; this is the exclusion set.
    pub fn stream_core_codes(&self, stream: Stream) -> Vec<UnitCode> {
        let mut codes = Vec::new();
        for year in 1..=3u8 {
            if let Some(seq) = self.core.get(&(stream, year)) {
                codes.extend(seq.order().iter().cloned());
            }
        }
        codes
    }

    /// Electives in catalog order; this order is the recommender's tie-break.
    pub fn electives(&self) -> impl Iterator<Item = (&UnitCode, &UnitRecord)> {
        self.elective_order
            .iter()
            .filter_map(|c| self.electives.get(c).map(|r| (c, r)))
    }

    pub fn elective(&self, code: &UnitCode) -> Option<&UnitRecord> {
        self.electives.get(code)
    }

    /// Owned map of every unit in the catalog, cores and electives.
    pub fn all_units(&self) -> HashMap<UnitCode, UnitRecord> {
        let mut map = HashMap::new();
        for seq in self.core.values() {
            for (code, record) in seq.iter() {
                map.insert(code.clone(), record.clone());
            }
        }
        for (code, record) in &self.electives {
            map.entry(code.clone()).or_insert_with(|| record.clone());
        }
        map
    }

    /// Look a unit up anywhere in the catalog, cores first.
    pub fn unit(&self, code: &UnitCode) -> Option<&UnitRecord> {
        self.core
            .values()
            .find_map(|seq| seq.get(code))
            .or_else(|| self.electives.get(code))
    }
}

/// Read an ordered `code -> record` JSON object, preserving object order.
///
/// Returns an empty vec when the file is missing; logs and returns empty when
/// the file fails to parse; skips individual entries that do not match the
/// record shape.
pub fn read_unit_map(path: &Path) -> Vec<(UnitCode, UnitRecord)> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };
    let map: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(&content) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!("Skipping malformed unit file {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (raw_code, value) in map {
        match serde_json::from_value::<UnitRecord>(value) {
            Ok(record) => entries.push((UnitCode::normalize(&raw_code), record)),
            Err(e) => {
                tracing::warn!(
                    "Skipping malformed entry {} in {}: {}",
                    raw_code,
                    path.display(),
                    e
                );
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str, prereq: &str) -> UnitRecord {
        UnitRecord {
            unit_name: name.into(),
            sem_available: "1;2".into(),
            description: String::new(),
            prereq: prereq.into(),
            assign: "20;30".into(),
            test: "NONE".into(),
            final_exam: "50".into(),
            approved_elective: None,
        }
    }

    #[test]
    fn core_sequence_preserves_order() {
        let seq = CoreSequence::new(vec![
            (UnitCode::normalize("FIT1045"), record("Algo", "NONE")),
            (UnitCode::normalize("FIT1008"), record("Intro", "NONE")),
        ]);
        let order: Vec<&str> = seq.order().iter().map(|c| c.as_str()).collect();
        assert_eq!(order, vec!["FIT1045", "FIT1008"]);
    }

    #[test]
    fn load_reads_core_and_elective_files() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("d_y1_core_units.json"),
            r#"{
                "FIT1045": {"unit_name": "Algorithms", "sem_available": "1",
                            "description": "", "prereq": "NONE",
                            "assign": "20;30", "test": "10", "final": "40"},
                "FIT1008": {"unit_name": "Intro CS", "sem_available": "2",
                            "description": "", "prereq": "FIT1045",
                            "assign": "25;25", "test": "NONE", "final": "50"}
            }"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("elective_units.json"),
            r#"{
                "FIT2086": {"unit_name": "Statistics", "sem_available": "1;2",
                            "description": "data", "prereq": "12",
                            "assign": "30", "test": "NONE", "final": "60",
                            "approved_elective": "yes"}
            }"#,
        )
        .unwrap();

        let catalog = Catalog::load(temp.path());
        let seq = catalog.core_sequence(Stream::DataScience, 1).unwrap();
        assert_eq!(seq.order().len(), 2);
        assert_eq!(seq.order()[0].as_str(), "FIT1045");
        assert!(catalog.elective(&UnitCode::normalize("FIT2086")).is_some());
        assert!(catalog.unit(&UnitCode::normalize("FIT1008")).is_some());
    }

    #[test]
    fn load_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog::load(&temp.path().join("nope"));
        assert!(catalog.core_sequence(Stream::DataScience, 1).is_none());
        assert_eq!(catalog.electives().count(), 0);
    }

    #[test]
    fn malformed_file_degrades_to_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("d_y1_core_units.json"), "not json").unwrap();
        let catalog = Catalog::load(temp.path());
        assert!(catalog.core_sequence(Stream::DataScience, 1).is_none());
    }

    #[test]
    fn malformed_entry_is_skipped_not_fatal() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("elective_units.json"),
            r#"{
                "FIT2086": {"unit_name": "Statistics", "sem_available": "1",
                            "description": "", "prereq": "NONE",
                            "assign": "30", "test": "NONE", "final": "60"},
                "FIT9999": {"wrong": "shape"}
            }"#,
        )
        .unwrap();
        let catalog = Catalog::load(temp.path());
        assert_eq!(catalog.electives().count(), 1);
    }

    #[test]
    fn stream_core_codes_collects_all_years() {
        let mut catalog = Catalog::empty();
        catalog.insert_core_sequence(
            Stream::DataScience,
            1,
            vec![(UnitCode::normalize("FIT1045"), record("Algo", "NONE"))],
        );
        catalog.insert_core_sequence(
            Stream::DataScience,
            2,
            vec![(UnitCode::normalize("FIT2004"), record("Algo II", "NONE"))],
        );
        let codes = catalog.stream_core_codes(Stream::DataScience);
        assert_eq!(codes.len(), 2);
    }
}
