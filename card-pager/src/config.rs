//! Pager configuration.
//!
//! ## Usage
//!
//! Tune how eager the card stack is to dismiss, then resolve the settings
//! against the display density before handing them to the pager.
//!
//! ```
//! use card_pager::{config::CardPagerConfig, dp::Dp};
//!
//! let config = CardPagerConfig::default()
//!     .min_fling_velocity(Dp(1200.0))
//!     .min_scale(0.8);
//! let resolved = config.resolve(2.0).unwrap();
//! assert_eq!(resolved.min_fling_velocity, 2400.0);
//! ```

use std::time::Duration;

use derive_setters::Setters;

use crate::{
    dp::Dp,
    error::{CardPagerError, Result},
    px::Px,
};

/// Pages kept materialised on either side of the current page.
pub const DEFAULT_OFFSCREEN_PAGES: usize = 1;
/// Longest settle animation.
pub const MAX_SETTLE_DURATION: Duration = Duration::from_millis(600);
/// Multiplier applied to velocity-derived settle durations.
pub const SMOOTH_SCROLL_FACTOR: u32 = 4;
/// Shapes how travel distance influences settle duration.
pub const SNAP_FACTOR: f32 = 0.3;
/// Smallest scale a card reaches while it is moved out of view.
pub const MIN_SCALE: f32 = 0.75;

// Dismissals cannot be undone, so the fling velocity is deliberately higher
// than a regular pager's.
const MIN_FLING_VELOCITY: Dp = Dp(800.0);
const MAX_FLING_VELOCITY: Dp = Dp(8000.0);
const MIN_DISTANCE_FOR_FLING: Dp = Dp(25.0);
const CATCH_ALLOWANCE: Dp = Dp(75.0);
const PAGING_TOUCH_SLOP: Dp = Dp(16.0);

/// Configuration arguments for a card pager.
///
/// Distances are in dp and velocities in dp per second; see
/// [`CardPagerConfig::resolve`].
#[derive(Clone, Debug, PartialEq, Setters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardPagerConfig {
    /// Number of pages materialised on either side of the current page,
    /// in addition to what is needed to fill the viewport.
    pub offscreen_page_limit: usize,
    /// Horizontal travel before a press becomes a drag.
    pub touch_slop: Dp,
    /// Release velocity a fling must exceed.
    pub min_fling_velocity: Dp,
    /// Release velocities are clamped to this magnitude.
    pub max_fling_velocity: Dp,
    /// Horizontal travel a fling must exceed.
    pub fling_distance: Dp,
    /// How close a settling card must be to its resting place for a new
    /// press to catch it.
    pub catch_allowance: Dp,
    /// Smallest scale applied to cards moving out of view.
    pub min_scale: f32,
    /// Upper bound for settle animations.
    pub max_settle_duration: Duration,
    /// Multiplier for velocity-derived settle durations.
    pub smooth_scroll_factor: u32,
    /// Shapes the distance influence on settle duration.
    pub snap_factor: f32,
}

impl Default for CardPagerConfig {
    fn default() -> Self {
        Self {
            offscreen_page_limit: DEFAULT_OFFSCREEN_PAGES,
            touch_slop: PAGING_TOUCH_SLOP,
            min_fling_velocity: MIN_FLING_VELOCITY,
            max_fling_velocity: MAX_FLING_VELOCITY,
            fling_distance: MIN_DISTANCE_FOR_FLING,
            catch_allowance: CATCH_ALLOWANCE,
            min_scale: MIN_SCALE,
            max_settle_duration: MAX_SETTLE_DURATION,
            smooth_scroll_factor: SMOOTH_SCROLL_FACTOR,
            snap_factor: SNAP_FACTOR,
        }
    }
}

impl CardPagerConfig {
    /// Checks every setting.
    pub fn validate(&self) -> Result<()> {
        if self.offscreen_page_limit == 0 {
            return Err(CardPagerError::ZeroPageLimit);
        }
        for (field, value) in [
            ("touch_slop", self.touch_slop),
            ("min_fling_velocity", self.min_fling_velocity),
            ("max_fling_velocity", self.max_fling_velocity),
            ("fling_distance", self.fling_distance),
            ("catch_allowance", self.catch_allowance),
        ] {
            if !value.is_positive() {
                return Err(CardPagerError::NonPositive {
                    field,
                    value: value.0,
                });
            }
        }
        if self.max_settle_duration.is_zero() {
            return Err(CardPagerError::NonPositive {
                field: "max_settle_duration",
                value: 0.0,
            });
        }
        if self.smooth_scroll_factor == 0 {
            return Err(CardPagerError::NonPositive {
                field: "smooth_scroll_factor",
                value: 0.0,
            });
        }
        if !(self.snap_factor.is_finite() && self.snap_factor > 0.0) {
            return Err(CardPagerError::NonPositive {
                field: "snap_factor",
                value: f64::from(self.snap_factor),
            });
        }
        if !(0.0..=1.0).contains(&self.min_scale) {
            return Err(CardPagerError::MinScaleOutOfRange(self.min_scale));
        }
        if self.min_fling_velocity > self.max_fling_velocity {
            return Err(CardPagerError::FlingVelocityRange {
                min: self.min_fling_velocity.0,
                max: self.max_fling_velocity.0,
            });
        }
        Ok(())
    }

    /// Validates the config and scales it to physical pixels.
    pub fn resolve(&self, density: f32) -> Result<ResolvedConfig> {
        if !(density.is_finite() && density > 0.0) {
            return Err(CardPagerError::InvalidDensity(density));
        }
        self.validate()?;
        Ok(ResolvedConfig {
            density,
            offscreen_page_limit: self.offscreen_page_limit,
            touch_slop: self.touch_slop.to_px(density).to_f32(),
            min_fling_velocity: self.min_fling_velocity.to_px(density).to_f32(),
            max_fling_velocity: self.max_fling_velocity.to_px(density).to_f32(),
            fling_distance: self.fling_distance.to_px(density),
            catch_allowance: self.catch_allowance.to_px(density),
            min_scale: self.min_scale,
            max_settle_duration: self.max_settle_duration,
            smooth_scroll_factor: self.smooth_scroll_factor,
            snap_factor: self.snap_factor,
        })
    }
}

/// A validated configuration in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedConfig {
    /// Density the values were resolved with.
    pub density: f32,
    /// See [`CardPagerConfig::offscreen_page_limit`].
    pub offscreen_page_limit: usize,
    /// Drag slop in whole pixels.
    pub touch_slop: f32,
    /// Pixels per second.
    pub min_fling_velocity: f32,
    /// Pixels per second.
    pub max_fling_velocity: f32,
    /// Minimum fling travel.
    pub fling_distance: Px,
    /// Catch distance from the resting offset.
    pub catch_allowance: Px,
    /// See [`CardPagerConfig::min_scale`].
    pub min_scale: f32,
    /// See [`CardPagerConfig::max_settle_duration`].
    pub max_settle_duration: Duration,
    /// See [`CardPagerConfig::smooth_scroll_factor`].
    pub smooth_scroll_factor: u32,
    /// See [`CardPagerConfig::snap_factor`].
    pub snap_factor: f32,
}
