//! Shared unit catalog.
//!
//! - [`unit`] - Unit codes, catalog records, assessment formatting
//! - [`store`] - Catalog loading from ordered JSON curriculum files

pub mod store;
pub mod unit;

pub use store::{read_unit_map, Catalog, CoreSequence};
pub use unit::{UnitCode, UnitRecord, WorkloadDisplay, DEFAULT_SUBJECT_PREFIX, NONE_SENTINEL};
