// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-entity command pipeline.
//!
//! The pipeline keeps an entity's commands sorted by start time and owns two
//! state snapshots:
//! - the baseline map, captured from the entity's live values at rebuild
//! - the working map, rebuilt from the baseline on every recalculation and
//!   threaded through the commands in time order
//!
//! Commands that fully overlap on the same property are allowed. The one
//! that sorts later (ties broken by authored list order) overwrites the
//! working map last and also writes the entity last during evaluation, so it
//! wins.

use crate::command::{apply_value, Command, CommandFactory};
use crate::descriptor::CommandId;
use crate::entity::{EntityId, TimelineEntity};
use crate::value::StateMap;

/// Ordered commands and state snapshots for one entity
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Entity this pipeline drives
    entity: EntityId,
    /// Commands sorted by start time
    commands: Vec<Command>,
    /// Property values before any command ran
    baseline: StateMap,
    /// Scratch map threaded through recalculation
    working: StateMap,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            commands: Vec::new(),
            baseline: StateMap::new(),
            working: StateMap::new(),
        }
    }

    /// Entity this pipeline drives
    pub fn entity_id(&self) -> EntityId {
        self.entity
    }

    /// Commands in evaluation order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Get a command by descriptor ID
    pub fn command(&self, id: CommandId) -> Option<&Command> {
        self.commands.iter().find(|c| c.id() == id)
    }

    /// Property values captured before any command ran
    pub fn baseline(&self) -> &StateMap {
        &self.baseline
    }

    /// Property values after the last command, from the last recalculation
    pub fn working(&self) -> &StateMap {
        &self.working
    }

    /// Get command count
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the pipeline has no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Rebuild from the entity's descriptor list.
    ///
    /// Re-sorts, recreates every command, captures a fresh baseline from the
    /// entity's live values and recalculates. Needed after commands are
    /// added or removed, and after any start time edit.
    pub fn rebuild(&mut self, entity: &dyn TimelineEntity) {
        let descriptors = entity.commands();

        // Stable sort keeps authored order for equal start times
        let mut order: Vec<usize> = (0..descriptors.len()).collect();
        order.sort_by(|&a, &b| {
            descriptors[a]
                .start_time()
                .total_cmp(&descriptors[b].start_time())
        });

        self.commands.clear();
        for index in order {
            let descriptor = &descriptors[index];
            if !descriptor.is_valid() {
                tracing::warn!(
                    entity = ?self.entity,
                    command = ?descriptor.id,
                    start = descriptor.start_time(),
                    end = descriptor.end_time(),
                    "{} command ends before it starts; treating it as an instant",
                    descriptor.display_name()
                );
            }
            if let Some(command) = CommandFactory::create(descriptor, index, entity) {
                self.commands.push(command);
            }
        }

        self.baseline.clear();
        for command in &self.commands {
            command.setup(&mut self.baseline, entity);
        }

        tracing::debug!(
            entity = ?self.entity,
            commands = self.commands.len(),
            skipped = descriptors.len() - self.commands.len(),
            "Rebuilt timeline pipeline"
        );

        self.resolve(entity);
    }

    /// Re-derive resolved baselines from the existing sorted commands.
    ///
    /// Picks up in-place parameter edits from the entity's descriptors but
    /// keeps the current order; an edit that changes ordering needs
    /// [`rebuild`](Self::rebuild).
    pub fn recalculate(&mut self, entity: &dyn TimelineEntity) {
        self.refresh_descriptors(entity);
        self.resolve(entity);
    }

    /// Sample every command at `time` and write the entity.
    ///
    /// Commands that have not started write nothing, so a property keeps
    /// whatever the host or an earlier command left in it.
    pub fn evaluate(&mut self, time: f32, entity: &mut dyn TimelineEntity) {
        for command in &mut self.commands {
            command.evaluate(time, entity);
        }
    }

    /// Write every baseline value back to the entity.
    ///
    /// Used when rewinding, to undo what later commands wrote.
    pub fn restore_baseline(&self, entity: &mut dyn TimelineEntity) {
        for (key, value) in self.baseline.iter() {
            apply_value(key, value, entity);
        }
    }

    fn refresh_descriptors(&mut self, entity: &dyn TimelineEntity) {
        let descriptors = entity.commands();
        let mut previous_start = f32::NEG_INFINITY;
        let mut out_of_order = false;

        for command in &mut self.commands {
            let source = descriptors
                .get(command.index())
                .filter(|d| d.id == command.id())
                .or_else(|| descriptors.iter().find(|d| d.id == command.id()));

            if let Some(descriptor) = source {
                command.refresh(descriptor);
            }

            if command.start_time() < previous_start {
                out_of_order = true;
            }
            previous_start = command.start_time();
        }

        if out_of_order {
            tracing::warn!(
                entity = ?self.entity,
                "Command start times changed order since the last rebuild; baselines follow the old order until the pipeline is rebuilt"
            );
        }
    }

    fn resolve(&mut self, entity: &dyn TimelineEntity) {
        self.working.reset_from(&self.baseline);
        for command in &mut self.commands {
            command.recalculate(&mut self.working, entity);
        }
    }
}
