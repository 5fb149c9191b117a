// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory scene of timeline entities.
//!
//! [`Scene`] is the reference [`EntityHost`]: it owns entities together with
//! their command descriptors and loads/saves them as RON. Hosts with their
//! own entity storage implement the traits in [`crate::entity`] instead.

use crate::descriptor::{CommandDescriptor, CommandId};
use crate::entity::{EntityHost, EntityId, TimelineEntity};
use crate::error::{Result, TimelineError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current scene format version
pub const SCENE_FORMAT_VERSION: u32 = 1;

/// Transform data for timeline entities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Position (x, y, z)
    pub position: [f32; 3],
    /// Rotation in euler angles (degrees)
    pub rotation: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
        }
    }
}

/// An entity with a transform, an optional tint and a command list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneEntity {
    /// Unique entity ID
    #[serde(default)]
    pub id: EntityId,
    /// Entity name
    pub name: String,
    /// Transform component
    #[serde(default)]
    pub transform: Transform,
    /// Tint color; `None` for entities without a renderer
    #[serde(default = "default_color")]
    pub color: Option<[f32; 4]>,
    /// Timeline commands, in authored order
    #[serde(default)]
    pub commands: Vec<CommandDescriptor>,
    /// Messages received from the timeline
    #[serde(skip)]
    pub messages: Vec<String>,
}

fn default_color() -> Option<[f32; 4]> {
    Some([1.0, 1.0, 1.0, 1.0])
}

impl SceneEntity {
    /// Create a new entity at the origin with a white tint
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            transform: Transform::default(),
            color: default_color(),
            commands: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Set the position
    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.transform.position = position;
        self
    }

    /// Set the rotation
    pub fn with_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.transform.rotation = rotation;
        self
    }

    /// Set or clear the color channel
    pub fn with_color(mut self, color: Option<[f32; 4]>) -> Self {
        self.color = color;
        self
    }

    /// Append a command
    pub fn with_command(mut self, command: CommandDescriptor) -> Self {
        self.commands.push(command);
        self
    }

    /// Latest end time among this entity's commands
    pub fn content_duration(&self) -> f32 {
        self.commands
            .iter()
            .map(|c| c.end_time().max(c.start_time()))
            .fold(0.0, f32::max)
    }

    /// Capture the current live state
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            name: self.name.clone(),
            position: self.transform.position,
            rotation: self.transform.rotation,
            color: self.color,
            messages: self.messages.clone(),
        }
    }
}

impl TimelineEntity for SceneEntity {
    fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    fn commands_mut(&mut self) -> &mut Vec<CommandDescriptor> {
        &mut self.commands
    }

    fn position(&self) -> [f32; 3] {
        self.transform.position
    }

    fn set_position(&mut self, position: [f32; 3]) {
        self.transform.position = position;
    }

    fn rotation(&self) -> [f32; 3] {
        self.transform.rotation
    }

    fn set_rotation(&mut self, rotation: [f32; 3]) {
        self.transform.rotation = rotation;
    }

    fn color(&self) -> Option<[f32; 4]> {
        self.color
    }

    fn set_color(&mut self, color: [f32; 4]) {
        if let Some(current) = self.color.as_mut() {
            *current = color;
        }
    }

    fn send_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Live state of an entity at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Entity name
    pub name: String,
    /// Position (x, y, z)
    pub position: [f32; 3],
    /// Rotation in euler angles (degrees)
    pub rotation: [f32; 3],
    /// Tint color
    pub color: Option<[f32; 4]>,
    /// Messages received so far
    pub messages: Vec<String>,
}

/// A named collection of timeline entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Scene name
    pub name: String,
    /// Entities keyed by ID, in authored order
    #[serde(with = "entity_list", default)]
    entities: IndexMap<EntityId, SceneEntity>,
}

fn default_version() -> u32 {
    SCENE_FORMAT_VERSION
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SCENE_FORMAT_VERSION,
            name: name.into(),
            entities: IndexMap::new(),
        }
    }

    /// Parse a scene from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let scene: Scene = ron::from_str(content)?;

        if scene.version > SCENE_FORMAT_VERSION {
            return Err(TimelineError::UnsupportedVersion {
                found: scene.version,
                supported: SCENE_FORMAT_VERSION,
            });
        }

        Ok(scene)
    }

    /// Load a scene from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Serialize the scene to pretty RON
    pub fn to_ron_string(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Save the scene to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Check every command's time range
    pub fn validate(&self) -> Result<()> {
        self.entities
            .values()
            .flat_map(|e| e.commands.iter())
            .try_for_each(CommandDescriptor::validate)
    }

    /// Add an entity, replacing any entity with the same ID
    pub fn add_entity(&mut self, entity: SceneEntity) -> EntityId {
        let id = entity.id;
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity
    pub fn remove_entity(&mut self, id: EntityId) -> Option<SceneEntity> {
        self.entities.shift_remove(&id)
    }

    /// Get an entity
    pub fn get(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(&id)
    }

    /// Get a mutable entity
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SceneEntity> {
        self.entities.get_mut(&id)
    }

    /// Look up a command descriptor on an entity
    pub fn find_command(&self, entity: EntityId, command: CommandId) -> Result<&CommandDescriptor> {
        let scene_entity = self
            .entities
            .get(&entity)
            .ok_or(TimelineError::EntityNotFound(entity))?;
        scene_entity
            .commands
            .iter()
            .find(|c| c.id == command)
            .ok_or(TimelineError::CommandNotFound(command))
    }

    /// Find an entity by name
    pub fn entity_by_name(&self, name: &str) -> Option<&SceneEntity> {
        self.entities.values().find(|e| e.name == name)
    }

    /// Get all entities
    pub fn entities(&self) -> impl Iterator<Item = &SceneEntity> {
        self.entities.values()
    }

    /// Get entity count
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene has no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Latest end time among all commands
    pub fn content_duration(&self) -> f32 {
        self.entities
            .values()
            .map(SceneEntity::content_duration)
            .fold(0.0, f32::max)
    }

    /// Capture the live state of every entity
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        self.entities.values().map(SceneEntity::snapshot).collect()
    }

    /// Serialize the live state of every entity as JSON
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled Scene")
    }
}

impl EntityHost for Scene {
    fn entity(&self, id: EntityId) -> Option<&dyn TimelineEntity> {
        self.entities.get(&id).map(|e| e as &dyn TimelineEntity)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn TimelineEntity> {
        self.entities
            .get_mut(&id)
            .map(|e| e as &mut dyn TimelineEntity)
    }

    fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }
}

/// Entities are written as a plain list; IDs live inside each entry
mod entity_list {
    use super::{EntityId, SceneEntity};
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        entities: &IndexMap<EntityId, SceneEntity>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(entities.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<EntityId, SceneEntity>, D::Error> {
        let list = Vec::<SceneEntity>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|e| (e.id, e)).collect())
    }
}
