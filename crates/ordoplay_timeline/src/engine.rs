// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline engine: registered entities and their pipelines.
//!
//! The engine is an explicit object owned by the host. Every call that needs
//! entity data borrows it from an [`EntityHost`]; the engine itself only
//! keeps derived state (sorted commands and resolved baselines).
//!
//! All calls are synchronous and expect the host to serialize edits and
//! sampling on one logical thread.

use crate::descriptor::{CommandDescriptor, CommandId};
use crate::editing::TimeRangeEdit;
use crate::entity::{EntityHost, EntityId};
use crate::pipeline::Pipeline;
use crate::settings::TimelineSettings;
use indexmap::IndexMap;

/// Engine mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineMode {
    /// Commands may be added, removed and retimed
    #[default]
    Editing,
    /// Command lists are frozen; only sampling and recalculation run
    Playing,
}

/// Orchestrates per-entity pipelines
#[derive(Debug, Default)]
pub struct TimelineEngine {
    /// Current mode
    mode: EngineMode,
    /// One pipeline per registered entity
    pipelines: IndexMap<EntityId, Pipeline>,
}

impl TimelineEngine {
    /// Create an empty engine in editing mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    /// Switch mode
    pub fn set_mode(&mut self, mode: EngineMode) {
        if self.mode != mode {
            tracing::info!(from = ?self.mode, to = ?mode, "Timeline engine mode changed");
            self.mode = mode;
        }
    }

    /// Check if an entity is registered
    pub fn is_registered(&self, id: EntityId) -> bool {
        self.pipelines.contains_key(&id)
    }

    /// Number of registered entities
    pub fn entity_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Get an entity's pipeline
    pub fn pipeline(&self, id: EntityId) -> Option<&Pipeline> {
        self.pipelines.get(&id)
    }

    /// Iterate over all pipelines
    pub fn pipelines(&self) -> impl Iterator<Item = &Pipeline> {
        self.pipelines.values()
    }

    /// Register an entity and build its pipeline.
    ///
    /// Returns `false` if it was already registered or the host does not
    /// know it.
    pub fn register_entity<H: EntityHost + ?Sized>(&mut self, host: &H, id: EntityId) -> bool {
        if self.pipelines.contains_key(&id) {
            return false;
        }
        let Some(entity) = host.entity(id) else {
            tracing::debug!(entity = ?id, "Cannot register entity missing from host");
            return false;
        };

        let mut pipeline = Pipeline::new(id);
        pipeline.rebuild(entity);
        self.pipelines.insert(id, pipeline);
        true
    }

    /// Drop an entity's pipeline. Live values are left as last sampled.
    pub fn unregister_entity(&mut self, id: EntityId) -> bool {
        self.pipelines.shift_remove(&id).is_some()
    }

    /// Replace the registered set and rebuild every pipeline
    pub fn initialize<H, I>(&mut self, host: &H, entities: I)
    where
        H: EntityHost + ?Sized,
        I: IntoIterator<Item = EntityId>,
    {
        self.pipelines.clear();
        for id in entities {
            self.register_entity(host, id);
        }
        tracing::info!(entities = self.pipelines.len(), "Timeline engine initialized");
    }

    /// Replace the registered set with every entity the host holds
    pub fn initialize_all<H: EntityHost + ?Sized>(&mut self, host: &H) {
        let ids = host.entity_ids();
        self.initialize(host, ids);
    }

    /// Append a command to an entity and rebuild its pipeline.
    ///
    /// Returns `false` in playing mode or for unregistered entities; the
    /// descriptor list is left untouched in that case.
    pub fn command_added<H: EntityHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: EntityId,
        descriptor: CommandDescriptor,
    ) -> bool {
        if !self.accepts_edits("add command") {
            return false;
        }
        let Some(pipeline) = self.pipelines.get_mut(&id) else {
            return false;
        };
        let Some(entity) = host.entity_mut(id) else {
            return false;
        };

        entity.commands_mut().push(descriptor);
        pipeline.rebuild(&*entity);
        true
    }

    /// Remove a command from an entity and rebuild its pipeline
    pub fn command_removed<H: EntityHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: EntityId,
        command: CommandId,
    ) -> Option<CommandDescriptor> {
        if !self.accepts_edits("remove command") {
            return None;
        }
        let pipeline = self.pipelines.get_mut(&id)?;
        let entity = host.entity_mut(id)?;

        let commands = entity.commands_mut();
        let index = commands.iter().position(|d| d.id == command)?;
        let removed = commands.remove(index);
        pipeline.rebuild(&*entity);
        Some(removed)
    }

    /// Set a command's time range directly and rebuild its pipeline
    pub fn set_command_time_range<H: EntityHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: EntityId,
        command: CommandId,
        start_time: f32,
        end_time: f32,
    ) -> bool {
        if !self.accepts_edits("retime command") {
            return false;
        }
        let Some(pipeline) = self.pipelines.get_mut(&id) else {
            return false;
        };
        let Some(entity) = host.entity_mut(id) else {
            return false;
        };
        let Some(descriptor) = entity.commands_mut().iter_mut().find(|d| d.id == command) else {
            return false;
        };

        descriptor.set_time_range(start_time, end_time);
        pipeline.rebuild(&*entity);
        true
    }

    /// Apply a drag edit to a command's time range and rebuild its pipeline.
    ///
    /// Returns the new `(start, end)` range.
    pub fn edit_time_range<H: EntityHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: EntityId,
        command: CommandId,
        edit: TimeRangeEdit,
        delta: f32,
        settings: &TimelineSettings,
    ) -> Option<(f32, f32)> {
        if !self.accepts_edits("drag command") {
            return None;
        }
        let pipeline = self.pipelines.get_mut(&id)?;
        let entity = host.entity_mut(id)?;
        let descriptor = entity.commands_mut().iter_mut().find(|d| d.id == command)?;

        let (start, end) = edit.apply(
            descriptor.start_time(),
            descriptor.end_time(),
            delta,
            descriptor.is_instant(),
            settings,
        );
        descriptor.set_time_range(start, end);
        pipeline.rebuild(&*entity);
        Some((start, end))
    }

    /// Fully rebuild one entity's pipeline
    pub fn rebuild_entity<H: EntityHost + ?Sized>(&mut self, host: &H, id: EntityId) -> bool {
        let Some(pipeline) = self.pipelines.get_mut(&id) else {
            return false;
        };
        let Some(entity) = host.entity(id) else {
            return false;
        };
        pipeline.rebuild(entity);
        true
    }

    /// Recalculate every pipeline after parameter edits
    pub fn recalculate_all<H: EntityHost + ?Sized>(&mut self, host: &H) {
        for (id, pipeline) in &mut self.pipelines {
            if let Some(entity) = host.entity(*id) {
                pipeline.recalculate(entity);
            }
        }
    }

    /// Sample every pipeline at `time`
    pub fn set_time<H: EntityHost + ?Sized>(&mut self, time: f32, host: &mut H) {
        for (id, pipeline) in &mut self.pipelines {
            if let Some(entity) = host.entity_mut(*id) {
                pipeline.evaluate(time, entity);
            }
        }
    }

    /// Write every pipeline's baseline back to its entity.
    ///
    /// Sampling never writes properties whose commands have not started, so
    /// hosts call this when rewinding to undo what later commands wrote.
    pub fn restore_baselines<H: EntityHost + ?Sized>(&self, host: &mut H) {
        for (id, pipeline) in &self.pipelines {
            if let Some(entity) = host.entity_mut(*id) {
                pipeline.restore_baseline(entity);
            }
        }
    }

    fn accepts_edits(&self, action: &str) -> bool {
        if self.mode == EngineMode::Playing {
            tracing::warn!("Cannot {action} while the timeline is playing");
            return false;
        }
        true
    }
}
