// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host-side contracts for entities driven by the timeline.
//!
//! The engine never owns entities. The host keeps them (and their command
//! descriptors) and lends them to the engine for each call.

use crate::descriptor::CommandDescriptor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for timeline entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// An entity whose properties are animated by timeline commands
pub trait TimelineEntity {
    /// Command descriptors authored on this entity, in list order
    fn commands(&self) -> &[CommandDescriptor];

    /// Mutable access to the descriptor list
    fn commands_mut(&mut self) -> &mut Vec<CommandDescriptor>;

    /// Current live position
    fn position(&self) -> [f32; 3];

    /// Write the live position
    fn set_position(&mut self, position: [f32; 3]);

    /// Current live rotation as Euler angles in degrees
    fn rotation(&self) -> [f32; 3];

    /// Write the live rotation
    fn set_rotation(&mut self, rotation: [f32; 3]);

    /// Current live color, or `None` if the entity has nothing to tint
    fn color(&self) -> Option<[f32; 4]>;

    /// Write the live color. Ignored by entities without a color channel.
    fn set_color(&mut self, color: [f32; 4]);

    /// Deliver a fire-and-forget message. No receiver is required.
    fn send_message(&mut self, message: &str);
}

/// Lookup of timeline entities by ID
pub trait EntityHost {
    /// Get an entity
    fn entity(&self, id: EntityId) -> Option<&dyn TimelineEntity>;

    /// Get a mutable entity
    fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn TimelineEntity>;

    /// IDs of every entity the host currently holds
    fn entity_ids(&self) -> Vec<EntityId>;
}
