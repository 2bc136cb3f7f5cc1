//! Student profile types.
//!
//! A [`StudentProfile`] identifies one student for the lifetime of a planning
//! session: username (the durable key for all persisted records), degree
//! stream, enrolment intake, and the academic year/semester being planned.
//! All fields are range-checked at construction so that downstream components
//! never see out-of-domain input.

use serde::{Deserialize, Serialize};

use crate::error::{CompassError, Result};

/// Degree stream.
///
/// Serialized as the wire integers used by the persisted record format
/// (1 = Data Science, 2 = Algorithms and Software).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Stream {
    DataScience,
    AlgorithmsSoftware,
}

impl Stream {
    /// Human-readable stream name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Stream::DataScience => "Data Science",
            Stream::AlgorithmsSoftware => "Algorithms and Software",
        }
    }

    /// Single-letter prefix used by the curriculum catalog files.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Stream::DataScience => "d",
            Stream::AlgorithmsSoftware => "a",
        }
    }
}

impl TryFrom<u8> for Stream {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Stream::DataScience),
            2 => Ok(Stream::AlgorithmsSoftware),
            other => Err(format!("stream must be 1 or 2, got {}", other)),
        }
    }
}

impl From<Stream> for u8 {
    fn from(stream: Stream) -> u8 {
        match stream {
            Stream::DataScience => 1,
            Stream::AlgorithmsSoftware => 2,
        }
    }
}

/// Enrolment intake cohort.
///
/// The intake offsets a student's personal semester numbering relative to the
/// institutional calendar; see [`crate::calendar`]. Serialized as the wire
/// integers 1 = February, 2 = July.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Intake {
    February,
    July,
}

impl Intake {
    pub fn display_name(&self) -> &'static str {
        match self {
            Intake::February => "February",
            Intake::July => "July",
        }
    }
}

impl TryFrom<u8> for Intake {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Intake::February),
            2 => Ok(Intake::July),
            other => Err(format!("intake must be 1 or 2, got {}", other)),
        }
    }
}

impl From<Intake> for u8 {
    fn from(intake: Intake) -> u8 {
        match intake {
            Intake::February => 1,
            Intake::July => 2,
        }
    }
}

/// One student's planning context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub username: String,
    pub stream: Stream,
    pub intake: Intake,
    /// Academic year being planned (1-3).
    pub year: u8,
    /// Academic semester being planned (1-2), in the student's own numbering.
    pub semester: u8,
}

impl StudentProfile {
    /// Build a validated profile from raw wire values.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::InvalidProfile`] when any field is outside its
    /// domain. Validation happens before any computation or file access.
    pub fn new(
        username: &str,
        stream: u8,
        year: u8,
        semester: u8,
        intake: u8,
    ) -> Result<Self> {
        if username.trim().is_empty() {
            return Err(CompassError::InvalidProfile {
                message: "username must not be empty".into(),
            });
        }
        let stream = Stream::try_from(stream)
            .map_err(|message| CompassError::InvalidProfile { message })?;
        let intake = Intake::try_from(intake)
            .map_err(|message| CompassError::InvalidProfile { message })?;
        if !(1..=3).contains(&year) {
            return Err(CompassError::InvalidProfile {
                message: format!("year must be 1-3, got {}", year),
            });
        }
        if !(1..=2).contains(&semester) {
            return Err(CompassError::InvalidProfile {
                message: format!("semester must be 1 or 2, got {}", semester),
            });
        }
        Ok(Self {
            username: username.trim().to_string(),
            stream,
            intake,
            year,
            semester,
        })
    }

    /// The "Y{year}S{sem}" label used by persisted record filenames.
    pub fn period_label(&self) -> String {
        format!("Y{}S{}", self.year, self.semester)
    }
}
