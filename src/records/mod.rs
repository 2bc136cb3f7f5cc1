//! Student academic records.
//!
//! - `status` — grades and the planned/graded status of a unit
//! - `store` — file-backed persistence for plans, deferrals and snapshots

mod status;
mod store;

pub use status::{Grade, UnitStatus};
pub use store::{
    DeferredUnit, PeriodKey, RecordStore, SemesterPlan, SnapshotKind,
};
