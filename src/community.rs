//! Community difficulty data.
//!
//! A separate collaborator analyzes forum discussion and writes one snapshot
//! per unit. The planner only reads those snapshots; absent or unreadable
//! data degrades to the scorer's neutral defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::UnitCode;

/// A recurring topic students report struggling with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PainPoint {
    pub category: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub example: String,
}

/// Community-reported difficulty for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultySnapshot {
    /// 0-100; 50 is neutral.
    pub difficulty_score: u32,
    /// Share of commenters with negative sentiment, e.g. "25%".
    #[serde(default)]
    pub struggling_percent: String,
    /// Ranked most-mentioned first; at most the top three are reported.
    #[serde(default)]
    pub pain_points: Vec<PainPoint>,
}

impl DifficultySnapshot {
    /// The top three pain points, most-mentioned first.
    pub fn top_pain_points(&self) -> &[PainPoint] {
        let end = self.pain_points.len().min(3);
        &self.pain_points[..end]
    }
}

/// Source of community difficulty data, injected into the readiness scorer.
pub trait DifficultyProvider {
    /// None when no data exists for the unit.
    fn difficulty(&self, unit: &UnitCode) -> Option<DifficultySnapshot>;
}

/// Reads `{unit}_difficulty.json` snapshots from a directory.
#[derive(Debug, Clone)]
pub struct SnapshotDifficultyProvider {
    dir: PathBuf,
}

impl SnapshotDifficultyProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn snapshot_path(&self, unit: &UnitCode) -> PathBuf {
        self.dir.join(format!("{}_difficulty.json", unit.as_str()))
    }
}

impl DifficultyProvider for SnapshotDifficultyProvider {
    fn difficulty(&self, unit: &UnitCode) -> Option<DifficultySnapshot> {
        read_snapshot(&self.snapshot_path(unit))
    }
}

fn read_snapshot(path: &Path) -> Option<DifficultySnapshot> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::warn!("Skipping malformed snapshot {}: {}", path.display(), e);
            None
        }
    }
}

/// Provider with no data, for contexts without community snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCommunityData;

impl DifficultyProvider for NoCommunityData {
    fn difficulty(&self, _unit: &UnitCode) -> Option<DifficultySnapshot> {
        None
    }
}
