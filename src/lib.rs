//! Compass - course planning and readiness analysis for IT students.
//!
//! Compass answers the questions a student faces each semester: which core
//! units their course map expects, which electives they may take, whether a
//! specific unit is open to them right now, and how prepared they are for it
//! based on past grades, community-reported difficulty and projected
//! workload.
//!
//! # Modules
//!
//! - [`calendar`] - Intake-relative teaching period resolution
//! - [`catalog`] - Unit catalog: codes, records, curriculum files
//! - [`cli`] - Command-line interface and argument parsing
//! - [`community`] - Community difficulty snapshots
//! - [`config`] - Tool configuration discovery and loading
//! - [`curriculum`] - Course-map rules: core slices, elective capacity
//! - [`engine`] - The planning engine tying everything together
//! - [`error`] - Error types and result aliases
//! - [`prereq`] - Prerequisite expression parsing and evaluation
//! - [`profile`] - Student profile and its validation
//! - [`readiness`] - Readiness scoring and recommendations
//! - [`recommend`] - Interest-based elective ranking
//! - [`records`] - Per-student academic records on disk
//! - [`workload`] - Semester workload aggregation
//!
//! # Example
//!
//! ```
//! use compass::prereq::{self, PrereqRule};
//! use std::collections::{HashMap, HashSet};
//!
//! let rule = PrereqRule::parse("a;FIT1045;FIT1008");
//! let outcome = prereq::evaluate(&rule, &HashSet::new(), &HashMap::new());
//! assert!(!outcome.fulfilled);
//! ```

pub mod calendar;
pub mod catalog;
pub mod cli;
pub mod community;
pub mod config;
pub mod curriculum;
pub mod engine;
pub mod error;
pub mod prereq;
pub mod profile;
pub mod readiness;
pub mod recommend;
pub mod records;
pub mod workload;

pub use error::{CompassError, Result};
