//! Settle animation.
//!
//! A [`Scroller`] moves the scroll offset from where a drag was released to
//! a page's resting offset along a quintic ease-out curve. The duration
//! depends on distance and fling velocity; see [`settle_duration`].

use std::{
    f32::consts::FRAC_PI_2,
    time::{Duration, Instant},
};

use crate::{config::ResolvedConfig, px::Px};

/// Fixed duration component per page of travel when there is no velocity.
const SLOW_SETTLE_BASE_MS: f32 = 100.0;

/// Quintic ease-out, `(t - 1)^5 + 1`.
pub fn ease_out_quint(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    t * t * t * t * t + 1.0
}

/// Weight of the remaining distance on the settle duration. Centred on half
/// a page so that short and long settles feel alike.
pub fn distance_influence(fraction: f32, snap_factor: f32) -> f32 {
    ((fraction - 0.5) * snap_factor * FRAC_PI_2).sin()
}

/// Duration for settling `dx` pixels.
///
/// With a release velocity, the time it takes to cover the eased distance at
/// that speed, scaled by the smooth scroll factor. Without one, a base
/// duration grows with the number of pages travelled. Always capped at the
/// configured maximum.
pub fn settle_duration(
    dx: Px,
    client_width: Px,
    page_width_factor: f32,
    velocity: f32,
    config: &ResolvedConfig,
) -> Duration {
    if client_width <= Px::ZERO {
        return Duration::ZERO;
    }
    let width = client_width.to_f32();
    let half_width = (client_width.raw() / 2) as f32;
    let distance_ratio = (dx.abs() as f32 / width).min(1.0);
    let distance =
        half_width + half_width * distance_influence(distance_ratio, config.snap_factor);

    // Whole pixels per second.
    let velocity = velocity.abs().trunc();
    let millis = if velocity > 0.0 {
        config.smooth_scroll_factor as f32 * (1000.0 * (distance / velocity).abs()).round()
    } else {
        let page_width = width * page_width_factor;
        let page_delta = dx.abs() as f32 / page_width;
        ((page_delta + 1.0) * SLOW_SETTLE_BASE_MS).trunc()
    };

    let duration = if millis.is_finite() && millis > 0.0 {
        Duration::from_millis(millis as u64)
    } else {
        Duration::ZERO
    };
    duration.min(config.max_settle_duration)
}

/// Time-based scroll animation.
///
/// The animation clock starts on the first [`Scroller::compute_scroll_offset`]
/// after [`Scroller::start_scroll`], so a settle started between frames does
/// not skip ahead.
#[derive(Debug, Clone)]
pub struct Scroller {
    start_x: Px,
    final_x: Px,
    curr_x: Px,
    duration: Duration,
    start_time: Option<Instant>,
    elapsed: Duration,
    finished: bool,
}

impl Default for Scroller {
    fn default() -> Self {
        Self {
            start_x: Px::ZERO,
            final_x: Px::ZERO,
            curr_x: Px::ZERO,
            duration: Duration::ZERO,
            start_time: None,
            elapsed: Duration::ZERO,
            finished: true,
        }
    }
}

impl Scroller {
    /// Starts animating from `start_x` by `dx` pixels.
    pub fn start_scroll(&mut self, start_x: Px, dx: Px, duration: Duration) {
        self.start_x = start_x;
        self.final_x = start_x + dx;
        self.curr_x = start_x;
        self.duration = duration;
        self.start_time = None;
        self.elapsed = Duration::ZERO;
        self.finished = false;
    }

    /// Advances the animation to `now`.
    ///
    /// Returns `false` when the animation had already finished, `true` when
    /// it produced a new position (including the final one).
    pub fn compute_scroll_offset(&mut self, now: Instant) -> bool {
        if self.finished {
            return false;
        }
        let start = *self.start_time.get_or_insert(now);
        self.elapsed = now.saturating_duration_since(start);
        if self.elapsed < self.duration {
            let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
            let travel = (self.final_x - self.start_x).to_f32();
            let step = Px::saturating_from_f32((ease_out_quint(t) * travel).round());
            self.curr_x = self.start_x + step;
        } else {
            self.curr_x = self.final_x;
            self.finished = true;
        }
        true
    }

    /// Stops the animation at its final position.
    pub fn abort_animation(&mut self) {
        self.curr_x = self.final_x;
        self.finished = true;
    }

    /// True when there is nothing left to animate.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Position computed on the last step.
    pub fn curr_x(&self) -> Px {
        self.curr_x
    }

    /// Stops the animation at `x` instead of its planned end.
    pub fn abort_at(&mut self, x: Px) {
        self.final_x = x;
        self.abort_animation();
    }

    /// Unplayed part of the animation.
    pub fn remaining(&self) -> Duration {
        if self.finished {
            Duration::ZERO
        } else {
            self.duration.saturating_sub(self.elapsed)
        }
    }
}
