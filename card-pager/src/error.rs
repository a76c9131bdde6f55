//! Errors reported while configuring a pager.
//!
//! Runtime input is never rejected: out-of-range positions are clamped and
//! stale pointers end the gesture. Only construction can fail.

use thiserror::Error;

/// Errors produced while building or reconfiguring a [`CardPager`](crate::CardPager).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CardPagerError {
    /// A dp or duration setting was not finite and positive.
    #[error("`{field}` must be finite and positive, got {value}")]
    NonPositive {
        /// Name of the offending setting.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The minimum card scale was outside `[0, 1]`.
    #[error("`min_scale` must lie in [0, 1], got {0}")]
    MinScaleOutOfRange(f32),
    /// The off-screen page allowance was zero.
    #[error("`offscreen_page_limit` must be at least 1")]
    ZeroPageLimit,
    /// The minimum fling velocity exceeded the maximum.
    #[error("`min_fling_velocity` ({min}) exceeds `max_fling_velocity` ({max})")]
    FlingVelocityRange {
        /// Configured minimum, dp per second.
        min: f64,
        /// Configured maximum, dp per second.
        max: f64,
    },
    /// The host density was not finite and positive.
    #[error("display density must be finite and positive, got {0}")]
    InvalidDensity(f32),
}

/// Convenience alias for results carrying [`CardPagerError`].
pub type Result<T, E = CardPagerError> = std::result::Result<T, E>;
