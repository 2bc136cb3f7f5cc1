//! Error types for Compass operations.
//!
//! This module defines [`CompassError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Malformed or missing data files never fail a whole request: the record
//!   store and catalog degrade to documented defaults and log a warning.
//! - Out-of-range profile input (`InvalidProfile`) and rejected plan saves
//!   (`PlanRejected`) are the only domain failures surfaced to callers.
//! - Use `anyhow::Error` (via `CompassError::Other`) for unexpected errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Compass operations.
#[derive(Debug, Error)]
pub enum CompassError {
    /// Student profile field outside its valid domain.
    #[error("Invalid student profile: {message}")]
    InvalidProfile { message: String },

    /// A plan save was rejected; state is left unchanged.
    #[error("Plan rejected: {reason}")]
    PlanRejected { reason: String },

    /// A unit code was requested that no loaded catalog or snapshot contains.
    #[error("Unit {code} not found in your units")]
    UnitNotFound { code: String },

    /// A unit code string does not match the expected shape.
    #[error("Invalid unit code: {code}")]
    InvalidUnitCode { code: String },

    /// Tool configuration file failed to parse.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// A persisted record could not be written.
    #[error("Failed to write record at {path}: {message}")]
    RecordWriteError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Compass operations.
pub type Result<T> = std::result::Result<T, CompassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_profile_displays_message() {
        let err = CompassError::InvalidProfile {
            message: "year must be 1-3".into(),
        };
        assert!(err.to_string().contains("year must be 1-3"));
    }

    #[test]
    fn plan_rejected_displays_reason() {
        let err = CompassError::PlanRejected {
            reason: "exactly 4 units required".into(),
        };
        assert!(err.to_string().contains("exactly 4 units required"));
    }

    #[test]
    fn unit_not_found_displays_code() {
        let err = CompassError::UnitNotFound {
            code: "FIT9999".into(),
        };
        assert!(err.to_string().contains("FIT9999"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = CompassError::ConfigParseError {
            path: PathBuf::from("/config.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/config.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: CompassError = io_err.into();
        assert!(matches!(err, CompassError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(CompassError::InvalidProfile {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
