// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the timeline crate.
//!
//! The engine's notification and sampling paths never fail; these errors
//! only surface from file IO, parsing and explicit validation.

use crate::descriptor::CommandId;
use crate::entity::EntityId;
use thiserror::Error;

/// Timeline errors
#[derive(Debug, Error)]
pub enum TimelineError {
    /// IO error while reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON deserialization error
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File was written by a newer format version
    #[error("Format version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Highest version this build understands
        supported: u32,
    },

    /// A durative command ends before it starts
    #[error("Command {id:?} has an invalid time range ({start} -> {end})")]
    InvalidTimeRange {
        /// Offending command
        id: CommandId,
        /// Start time in seconds
        start: f32,
        /// End time in seconds
        end: f32,
    },

    /// Entity not found
    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityId),

    /// Command not found
    #[error("Command not found: {0:?}")]
    CommandNotFound(CommandId),
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;
