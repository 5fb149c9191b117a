// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time range editing for timeline commands.
//!
//! Mirrors the drag handles of a timeline view: the whole block can be
//! moved, or either edge resized. Deltas snap to the configured step and
//! the result is clamped to the timeline.

use crate::settings::TimelineSettings;
use serde::{Deserialize, Serialize};

/// Kind of drag applied to a command's time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRangeEdit {
    /// Move the whole range, keeping its duration
    Move,
    /// Drag the start edge
    ResizeStart,
    /// Drag the end edge
    ResizeEnd,
}

impl TimeRangeEdit {
    /// Apply a drag of `delta` seconds to `[start, end]`.
    ///
    /// Instant commands can only be moved, whatever edge was grabbed.
    pub fn apply(
        self,
        start: f32,
        end: f32,
        delta: f32,
        instant: bool,
        settings: &TimelineSettings,
    ) -> (f32, f32) {
        let delta = snap(delta, settings.snap_step);
        let edit = if instant { TimeRangeEdit::Move } else { self };

        match edit {
            TimeRangeEdit::ResizeStart => {
                let start = clamp(start + delta, 0.0, end - settings.min_duration);
                (start, end)
            }
            TimeRangeEdit::ResizeEnd => {
                let end = clamp(
                    end + delta,
                    start + settings.min_duration,
                    settings.max_time,
                );
                (start, end)
            }
            TimeRangeEdit::Move => {
                let duration = end - start;
                let start = clamp(start + delta, 0.0, settings.max_time - duration);
                (start, start + duration)
            }
        }
    }
}

/// Round `value` to the nearest multiple of `step`
pub fn snap(value: f32, step: f32) -> f32 {
    if step > 0.0 {
        (value / step).round() * step
    } else {
        value
    }
}

// The lower bound wins when the bounds cross
fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_snap() {
        assert!(approx_eq(snap(0.53, 0.05), 0.55));
        assert!(approx_eq(snap(-0.12, 0.05), -0.1));
        assert_eq!(snap(0.53, 0.0), 0.53);
    }

    #[test]
    fn test_move_keeps_duration_and_clamps() {
        let settings = TimelineSettings::default();

        let (start, end) = TimeRangeEdit::Move.apply(1.0, 3.0, 0.5, false, &settings);
        assert!(approx_eq(start, 1.5) && approx_eq(end, 3.5));

        let (start, end) = TimeRangeEdit::Move.apply(1.0, 3.0, -4.0, false, &settings);
        assert!(approx_eq(start, 0.0) && approx_eq(end, 2.0));

        let (start, end) = TimeRangeEdit::Move.apply(1.0, 3.0, 20.0, false, &settings);
        assert!(approx_eq(start, 8.0) && approx_eq(end, 10.0));
    }

    #[test]
    fn test_resize_respects_min_duration() {
        let settings = TimelineSettings::default();

        let (start, end) = TimeRangeEdit::ResizeStart.apply(1.0, 2.0, 5.0, false, &settings);
        assert!(approx_eq(start, 1.95) && approx_eq(end, 2.0));

        let (start, end) = TimeRangeEdit::ResizeEnd.apply(1.0, 2.0, -5.0, false, &settings);
        assert!(approx_eq(start, 1.0) && approx_eq(end, 1.05));

        let (_, end) = TimeRangeEdit::ResizeEnd.apply(1.0, 2.0, 50.0, false, &settings);
        assert!(approx_eq(end, 10.0));
    }

    #[test]
    fn test_instant_edges_move_whole_command() {
        let settings = TimelineSettings::default();
        let (start, end) = TimeRangeEdit::ResizeEnd.apply(2.0, 2.0, 1.0, true, &settings);
        assert!(approx_eq(start, 3.0) && approx_eq(end, 3.0));
    }
}
