// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runtime commands bound to a descriptor.
//!
//! A [`Command`] goes through three phases:
//! - `setup` seeds the pipeline's baseline map with the entity's live value
//!   for the property it touches, unless an earlier command already did
//! - `recalculate` reads the value the previous command left in the working
//!   map, caches it as its resolved baseline and writes its own resolved
//!   target back for the next command
//! - `evaluate` samples the command at a time and writes the live entity

use crate::descriptor::{CommandDescriptor, CommandId, CommandKind};
use crate::entity::TimelineEntity;
use crate::value::{Interpolation, PropertyKey, PropertyValue, StateMap};

/// Baseline and target a durative command interpolates between
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    /// Value the command starts from
    pub baseline: PropertyValue,
    /// Value the command ends at
    pub target: PropertyValue,
}

/// A descriptor's runtime behavior
#[derive(Debug, Clone)]
pub struct Command {
    /// Working copy of the descriptor
    descriptor: CommandDescriptor,
    /// Position of the descriptor in the entity's list
    index: usize,
    /// Derived during recalculation, never persisted
    resolved: Option<Resolved>,
    /// Instant commands fire once per recalculation
    fired: bool,
}

impl Command {
    fn new(descriptor: CommandDescriptor, index: usize) -> Self {
        Self {
            descriptor,
            index,
            resolved: None,
            fired: false,
        }
    }

    /// Get the working descriptor
    pub fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    /// Get the descriptor ID
    pub fn id(&self) -> CommandId {
        self.descriptor.id
    }

    /// Index of the descriptor in the entity's authored list
    pub fn index(&self) -> usize {
        self.index
    }

    /// Start time in seconds
    pub fn start_time(&self) -> f32 {
        self.descriptor.start_time()
    }

    /// Resolved baseline and target from the last recalculation
    pub fn resolved(&self) -> Option<Resolved> {
        self.resolved
    }

    /// Resolved baseline from the last recalculation
    pub fn resolved_baseline(&self) -> Option<PropertyValue> {
        self.resolved.map(|r| r.baseline)
    }

    /// Resolved target from the last recalculation
    pub fn resolved_target(&self) -> Option<PropertyValue> {
        self.resolved.map(|r| r.target)
    }

    /// Whether an instant command already fired since the last recalculation
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Replace the working descriptor with an edited copy
    pub(crate) fn refresh(&mut self, descriptor: &CommandDescriptor) {
        if self.descriptor != *descriptor {
            self.descriptor.clone_from(descriptor);
        }
    }

    /// Seed the baseline map for the property this command touches
    pub fn setup(&self, baseline: &mut StateMap, entity: &dyn TimelineEntity) {
        if let Some(key) = self.descriptor.property_key() {
            baseline.seed(key, || live_value(key, entity));
        }
    }

    /// Resolve this command against the working map and write its output back
    pub fn recalculate(&mut self, working: &mut StateMap, entity: &dyn TimelineEntity) {
        self.fired = false;
        self.resolved = None;

        let Some(key) = self.descriptor.property_key() else {
            return;
        };

        // The entity's live value only stands in if setup never saw this key
        let Some(baseline) = working.get(key).or_else(|| live_value(key, entity)) else {
            return;
        };
        let Some(target) = resolve_target(&self.descriptor.kind, baseline) else {
            return;
        };

        self.resolved = Some(Resolved { baseline, target });
        working.insert(key, target);
    }

    /// Sample the command at `time` and write the result to the entity.
    ///
    /// Before the start time nothing is written. At or after the end time the
    /// resolved target is pinned, which also covers inverted ranges: they act
    /// as instants at their start time.
    pub fn evaluate(&mut self, time: f32, entity: &mut dyn TimelineEntity) {
        let start = self.descriptor.start_time();
        if time < start {
            return;
        }

        if let CommandKind::SendMessage { message } = &self.descriptor.kind {
            if !self.fired {
                tracing::trace!(msg = %message, time, "Firing timeline message");
                entity.send_message(message);
                self.fired = true;
            }
            return;
        }

        let (Some(key), Some(resolved)) = (self.descriptor.property_key(), self.resolved) else {
            return;
        };

        let end = self.descriptor.end_time();
        let value = if time >= end {
            resolved.target
        } else {
            let t = Interpolation::fraction(start, end, time);
            resolved
                .baseline
                .lerp(&resolved.target, t)
                .unwrap_or(resolved.target)
        };

        apply_value(key, value, entity);
    }
}

/// Builds commands from descriptors
pub struct CommandFactory;

impl CommandFactory {
    /// Create the command for a descriptor.
    ///
    /// Returns `None` when the entity cannot host the command, e.g. a color
    /// command on an entity without a color channel, or when the time range
    /// is not finite. The descriptor stays on the entity but is inert.
    pub fn create(
        descriptor: &CommandDescriptor,
        index: usize,
        entity: &dyn TimelineEntity,
    ) -> Option<Command> {
        if !descriptor.has_finite_range() {
            tracing::warn!(
                command = ?descriptor.id,
                start = descriptor.start_time(),
                end = descriptor.end_time(),
                "Skipping {} command: time range is not finite",
                descriptor.display_name()
            );
            return None;
        }

        match &descriptor.kind {
            CommandKind::MoveTo { .. }
            | CommandKind::MoveAdd { .. }
            | CommandKind::RotateTo { .. }
            | CommandKind::RotateAdd { .. }
            | CommandKind::SendMessage { .. } => Some(Command::new(descriptor.clone(), index)),
            CommandKind::SetColor { .. } => {
                if entity.color().is_some() {
                    Some(Command::new(descriptor.clone(), index))
                } else {
                    tracing::warn!(
                        command = ?descriptor.id,
                        "Skipping {} command: entity has no {} channel",
                        descriptor.display_name(),
                        PropertyKey::Color.name()
                    );
                    None
                }
            }
        }
    }
}

fn live_value(key: PropertyKey, entity: &dyn TimelineEntity) -> Option<PropertyValue> {
    match key {
        PropertyKey::Position => Some(PropertyValue::Vec3(entity.position())),
        PropertyKey::Rotation => Some(PropertyValue::Vec3(entity.rotation())),
        PropertyKey::Color => entity.color().map(PropertyValue::Color),
    }
}

fn resolve_target(kind: &CommandKind, baseline: PropertyValue) -> Option<PropertyValue> {
    match kind {
        CommandKind::MoveTo { target } | CommandKind::RotateTo { target } => {
            Some(PropertyValue::Vec3(*target))
        }
        CommandKind::MoveAdd { offset } | CommandKind::RotateAdd { offset } => baseline
            .as_vec3()
            .map(|base| PropertyValue::Vec3(Interpolation::add_vec3(base, *offset))),
        CommandKind::SetColor { target } => Some(PropertyValue::Color(*target)),
        CommandKind::SendMessage { .. } => None,
    }
}

pub(crate) fn apply_value(key: PropertyKey, value: PropertyValue, entity: &mut dyn TimelineEntity) {
    match key {
        PropertyKey::Position => {
            if let Some(position) = value.as_vec3() {
                entity.set_position(position);
            }
        }
        PropertyKey::Rotation => {
            if let Some(rotation) = value.as_vec3() {
                entity.set_rotation(rotation);
            }
        }
        PropertyKey::Color => {
            if let Some(color) = value.as_color() {
                entity.set_color(color);
            }
        }
    }
}
