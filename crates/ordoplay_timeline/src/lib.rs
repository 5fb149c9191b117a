// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command timeline engine for OrdoPlay.
//!
//! Entities carry an ordered list of timed command descriptors (move,
//! rotate, recolor, send message). The engine sorts them per entity,
//! resolves what each command interpolates from by chaining the output of
//! earlier commands, and samples everything at a given time.
//!
//! ## Architecture
//!
//! The engine is built on:
//! - Command descriptors as plain serializable data
//! - Per-entity pipelines with baseline and working state maps
//! - An explicit engine object that borrows entities from the host
//! - A playback driver and drag-edit helpers for timeline views
//!
//! ```
//! use ordoplay_timeline::{CommandDescriptor, Scene, SceneEntity, TimelineEngine};
//!
//! let mut scene = Scene::new("Demo");
//! let cube = scene.add_entity(
//!     SceneEntity::new("Cube")
//!         .with_command(CommandDescriptor::move_to(0.0, 2.0, [4.0, 0.0, 0.0]))
//!         .with_command(CommandDescriptor::move_add(2.0, 4.0, [0.0, 2.0, 0.0])),
//! );
//!
//! let mut engine = TimelineEngine::new();
//! engine.initialize_all(&scene);
//! engine.set_time(3.0, &mut scene);
//! assert_eq!(scene.get(cube).unwrap().transform.position, [4.0, 1.0, 0.0]);
//! ```

pub mod command;
pub mod descriptor;
pub mod editing;
pub mod engine;
pub mod entity;
pub mod error;
pub mod pipeline;
pub mod playback;
pub mod scene;
pub mod settings;
pub mod value;

pub use command::{Command, CommandFactory, Resolved};
pub use descriptor::{CommandDescriptor, CommandId, CommandKind};
pub use editing::{snap, TimeRangeEdit};
pub use engine::{EngineMode, TimelineEngine};
pub use entity::{EntityHost, EntityId, TimelineEntity};
pub use error::{Result, TimelineError};
pub use pipeline::Pipeline;
pub use playback::{EndBehavior, PlaybackDriver, PlaybackState};
pub use scene::{EntitySnapshot, Scene, SceneEntity, Transform, SCENE_FORMAT_VERSION};
pub use settings::{TimelineSettings, SETTINGS_FILE_NAME, SETTINGS_FORMAT_VERSION};
pub use value::{Interpolation, PropertyKey, PropertyValue, StateMap};
