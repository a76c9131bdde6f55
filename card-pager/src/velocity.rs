//! Release velocity estimation.
//!
//! Every pointer keeps a short history of positions. The velocity of a
//! pointer is its horizontal travel across the samples in the last
//! [`VELOCITY_WINDOW`], divided by the time those samples span.

use std::{collections::VecDeque, time::Duration, time::Instant};

use rustc_hash::FxHashMap;

use crate::gesture::{MotionEvent, PointerId};

/// How far back samples contribute to a velocity.
pub const VELOCITY_WINDOW: Duration = Duration::from_millis(100);

/// Per-pointer position history.
#[derive(Debug, Default)]
pub struct VelocityTracker {
    samples: FxHashMap<PointerId, VecDeque<(Instant, f32)>>,
}

impl VelocityTracker {
    /// Records the position of every pointer in `event`.
    pub fn add_movement(&mut self, event: &MotionEvent) {
        let now = event.timestamp;
        for pointer in &event.pointers {
            let history = self.samples.entry(pointer.id).or_default();
            history.push_back((now, pointer.position.x));
            // Drop samples older than the window.
            while let Some(&(sample_time, _)) = history.front() {
                if now.saturating_duration_since(sample_time) > VELOCITY_WINDOW {
                    history.pop_front();
                } else {
                    break;
                }
            }
        }
    }

    /// Horizontal velocity of `pointer` in pixels per second, clamped to
    /// `±max_velocity`.
    ///
    /// Positive values mean the pointer moves right. Fewer than two samples
    /// in the window yield zero.
    pub fn x_velocity(&self, pointer: PointerId, max_velocity: f32) -> f32 {
        let Some(history) = self.samples.get(&pointer) else {
            return 0.0;
        };
        let (Some(&(last_time, last_x)), Some(_)) = (history.back(), history.get(1)) else {
            return 0.0;
        };
        let Some(&(first_time, first_x)) = history
            .iter()
            .find(|(time, _)| last_time.saturating_duration_since(*time) <= VELOCITY_WINDOW)
        else {
            return 0.0;
        };
        let dt = last_time.saturating_duration_since(first_time).as_secs_f32();
        if dt <= 0.0 {
            return 0.0;
        }
        let velocity = (last_x - first_x) / dt;
        velocity.clamp(-max_velocity.abs(), max_velocity.abs())
    }

    /// Forgets every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
