// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback driver that advances time and samples the engine.

use crate::engine::TimelineEngine;
use crate::entity::EntityHost;
use crate::settings::TimelineSettings;
use serde::{Deserialize, Serialize};

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Stopped
    #[default]
    Stopped,
    /// Playing forward
    Playing,
    /// Paused
    Paused,
}

/// What happens when playback passes the end of the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EndBehavior {
    /// Jump back to the start and stop
    #[default]
    Rewind,
    /// Stay on the last frame and stop
    Hold,
    /// Wrap around and keep playing
    Loop,
}

/// Drives an engine through time, one update per frame
#[derive(Debug, Clone)]
pub struct PlaybackDriver {
    /// Current playback time
    time: f32,
    /// Playback state
    state: PlaybackState,
    /// Timeline length, speed and end behavior
    settings: TimelineSettings,
}

impl PlaybackDriver {
    /// Create a stopped driver at time zero
    pub fn new(settings: TimelineSettings) -> Self {
        Self {
            time: 0.0,
            state: PlaybackState::Stopped,
            settings,
        }
    }

    /// Current playback time
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Settings in use
    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    /// Is currently playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Play from current position
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Toggle play/pause
    pub fn toggle(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused | PlaybackState::Stopped => self.play(),
        }
    }

    /// Stop, rewind to the beginning and sample it
    pub fn stop<H: EntityHost + ?Sized>(&mut self, engine: &mut TimelineEngine, host: &mut H) {
        self.state = PlaybackState::Stopped;
        self.time = 0.0;
        engine.restore_baselines(host);
        engine.set_time(self.time, host);
    }

    /// Jump to a time and sample it.
    ///
    /// Seeking backwards restores the baselines first, so commands that
    /// have not started at the new time no longer show their output.
    pub fn seek<H: EntityHost + ?Sized>(
        &mut self,
        time: f32,
        engine: &mut TimelineEngine,
        host: &mut H,
    ) {
        if time.is_nan() {
            tracing::warn!("Ignoring seek to NaN");
            return;
        }
        let time = time.clamp(0.0, self.settings.max_time.max(0.0));
        if time < self.time {
            engine.restore_baselines(host);
        }
        self.time = time;
        engine.set_time(self.time, host);
    }

    /// Advance by `delta_time` seconds and sample.
    ///
    /// Returns whether the engine was sampled.
    pub fn update<H: EntityHost + ?Sized>(
        &mut self,
        delta_time: f32,
        engine: &mut TimelineEngine,
        host: &mut H,
    ) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }

        self.time += delta_time * self.settings.speed;

        let max_time = self.settings.max_time;
        if self.time > max_time {
            match self.settings.end_behavior {
                EndBehavior::Rewind => {
                    self.time = 0.0;
                    self.state = PlaybackState::Stopped;
                    engine.restore_baselines(host);
                }
                EndBehavior::Hold => {
                    self.time = max_time;
                    self.state = PlaybackState::Stopped;
                }
                EndBehavior::Loop => {
                    self.time = if max_time > 0.0 {
                        self.time % max_time
                    } else {
                        0.0
                    };
                    // Re-arm instant commands for the next pass
                    engine.restore_baselines(host);
                    engine.recalculate_all(host);
                }
            }
            tracing::debug!(time = self.time, state = ?self.state, "Reached end of timeline");
        }

        engine.set_time(self.time, host);
        true
    }
}

impl Default for PlaybackDriver {
    fn default() -> Self {
        Self::new(TimelineSettings::default())
    }
}
