// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command descriptors: the persisted configuration of timed commands.
//!
//! A descriptor is plain data. It carries no entity reference and no
//! resolved baseline; those live on the runtime [`Command`](crate::command::Command)
//! and are rebuilt from scratch whenever the pipeline recomputes.

use crate::error::{Result, TimelineError};
use crate::value::PropertyKey;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a command descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub Uuid);

impl CommandId {
    /// Create a new random command ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind-specific payload of a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandKind {
    /// Move to an absolute position
    MoveTo {
        /// Target position
        target: [f32; 3],
    },
    /// Move by an offset from wherever the previous command left the entity
    MoveAdd {
        /// Position offset
        offset: [f32; 3],
    },
    /// Rotate to absolute Euler angles (degrees)
    RotateTo {
        /// Target Euler angles
        target: [f32; 3],
    },
    /// Rotate by an Euler offset (degrees)
    RotateAdd {
        /// Euler offset
        offset: [f32; 3],
    },
    /// Blend to a color
    SetColor {
        /// Target RGBA color
        target: [f32; 4],
    },
    /// Send a named message to the entity once
    SendMessage {
        /// Message identifier
        message: String,
    },
}

impl CommandKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveTo { .. } => "Move To",
            Self::MoveAdd { .. } => "Move Add",
            Self::RotateTo { .. } => "Rotate To",
            Self::RotateAdd { .. } => "Rotate Add",
            Self::SetColor { .. } => "Set Color",
            Self::SendMessage { .. } => "Send Message",
        }
    }

    /// Whether this kind happens at a single instant
    pub fn is_instant(&self) -> bool {
        matches!(self, Self::SendMessage { .. })
    }

    /// Property this kind animates, if any
    pub fn property_key(&self) -> Option<PropertyKey> {
        match self {
            Self::MoveTo { .. } | Self::MoveAdd { .. } => Some(PropertyKey::Position),
            Self::RotateTo { .. } | Self::RotateAdd { .. } => Some(PropertyKey::Rotation),
            Self::SetColor { .. } => Some(PropertyKey::Color),
            Self::SendMessage { .. } => None,
        }
    }
}

/// A timed command on an entity's timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCommandDescriptor")]
pub struct CommandDescriptor {
    /// Unique command ID
    pub id: CommandId,
    /// Start time in seconds (entity-local)
    start_time: f32,
    /// End time in seconds (entity-local)
    end_time: f32,
    /// Kind and payload
    pub kind: CommandKind,
}

impl CommandDescriptor {
    /// Create a new descriptor.
    ///
    /// Instant kinds ignore `end_time` and end where they start.
    pub fn new(start_time: f32, end_time: f32, kind: CommandKind) -> Self {
        let end_time = if kind.is_instant() { start_time } else { end_time };
        Self {
            id: CommandId::new(),
            start_time,
            end_time,
            kind,
        }
    }

    /// Create a move-to command
    pub fn move_to(start_time: f32, end_time: f32, target: [f32; 3]) -> Self {
        Self::new(start_time, end_time, CommandKind::MoveTo { target })
    }

    /// Create a move-add command
    pub fn move_add(start_time: f32, end_time: f32, offset: [f32; 3]) -> Self {
        Self::new(start_time, end_time, CommandKind::MoveAdd { offset })
    }

    /// Create a rotate-to command
    pub fn rotate_to(start_time: f32, end_time: f32, target: [f32; 3]) -> Self {
        Self::new(start_time, end_time, CommandKind::RotateTo { target })
    }

    /// Create a rotate-add command
    pub fn rotate_add(start_time: f32, end_time: f32, offset: [f32; 3]) -> Self {
        Self::new(start_time, end_time, CommandKind::RotateAdd { offset })
    }

    /// Create a set-color command
    pub fn set_color(start_time: f32, end_time: f32, target: [f32; 4]) -> Self {
        Self::new(start_time, end_time, CommandKind::SetColor { target })
    }

    /// Create a send-message command at a single instant
    pub fn send_message(time: f32, message: impl Into<String>) -> Self {
        Self::new(
            time,
            time,
            CommandKind::SendMessage {
                message: message.into(),
            },
        )
    }

    /// Start time in seconds
    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    /// End time in seconds
    pub fn end_time(&self) -> f32 {
        self.end_time
    }

    /// Duration in seconds (negative for an inverted range)
    pub fn duration(&self) -> f32 {
        self.end_time - self.start_time
    }

    /// Set both ends of the time range
    pub fn set_time_range(&mut self, start_time: f32, end_time: f32) {
        self.start_time = start_time;
        self.end_time = if self.kind.is_instant() {
            start_time
        } else {
            end_time
        };
    }

    /// Set the start time, keeping the end time (instant kinds move both)
    pub fn set_start_time(&mut self, start_time: f32) {
        let end_time = self.end_time;
        self.set_time_range(start_time, end_time);
    }

    /// Set the end time. No effect on instant kinds.
    pub fn set_end_time(&mut self, end_time: f32) {
        let start_time = self.start_time;
        self.set_time_range(start_time, end_time);
    }

    /// Whether this command happens at a single instant
    pub fn is_instant(&self) -> bool {
        self.kind.is_instant()
    }

    /// Whether the time range is usable as authored
    pub fn is_valid(&self) -> bool {
        self.is_instant() || self.end_time >= self.start_time
    }

    /// Whether both ends of the time range are finite numbers
    pub fn has_finite_range(&self) -> bool {
        self.start_time.is_finite() && self.end_time.is_finite()
    }

    /// Validate the time range
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(TimelineError::InvalidTimeRange {
                id: self.id,
                start: self.start_time,
                end: self.end_time,
            })
        }
    }

    /// Property this command animates, if any
    pub fn property_key(&self) -> Option<PropertyKey> {
        self.kind.property_key()
    }

    /// Get the display name
    pub fn display_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// On-disk shape; instant ranges are collapsed on load
#[derive(Deserialize)]
#[serde(rename = "CommandDescriptor")]
struct RawCommandDescriptor {
    #[serde(default)]
    id: CommandId,
    start_time: f32,
    end_time: f32,
    kind: CommandKind,
}

impl From<RawCommandDescriptor> for CommandDescriptor {
    fn from(raw: RawCommandDescriptor) -> Self {
        let mut descriptor = Self::new(raw.start_time, raw.end_time, raw.kind);
        descriptor.id = raw.id;
        descriptor
    }
}

impl Default for CommandDescriptor {
    fn default() -> Self {
        Self::new(0.0, 1.0, CommandKind::MoveTo { target: [0.0; 3] })
    }
}
