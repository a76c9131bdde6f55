//! # Density-Independent Pixels (Dp)
//!
//! Pager thresholds such as the touch slop, the fling distance and the catch
//! allowance are declared in dp so they feel the same on every screen. The
//! host supplies its display density (physical pixels per dp) once and the
//! configuration is resolved to physical pixels with it.
//!
//! ## Usage
//!
//! ```
//! use card_pager::{dp::Dp, px::Px};
//!
//! let slop = Dp(16.0);
//! assert_eq!(slop.to_px(2.0), Px(32));
//! assert_eq!(slop.to_px_f32(1.5), 24.0);
//! ```

use crate::px::Px;

/// Density-independent pixels.
///
/// One dp is one physical pixel at density 1.0. Velocities expressed in dp
/// per second use the same scaling.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dp(pub f64);

impl Dp {
    /// Converts to physical pixels as `f32` for the given density.
    pub fn to_px_f32(self, density: f32) -> f32 {
        (self.0 * f64::from(density)) as f32
    }

    /// Converts to whole physical pixels, truncating like the host's
    /// `(int) (value * density)` scaling.
    pub fn to_px(self, density: f32) -> Px {
        Px::saturating_from_f32(self.to_px_f32(density))
    }

    /// Returns true when the value is finite and strictly positive.
    pub fn is_positive(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_by_density() {
        assert_eq!(Dp(75.0).to_px(1.0), Px(75));
        assert_eq!(Dp(75.0).to_px(2.625), Px(196));
        assert_eq!(Dp(25.0).to_px(0.75), Px(18));
    }

    #[test]
    fn positivity() {
        assert!(Dp(1.0).is_positive());
        assert!(!Dp(0.0).is_positive());
        assert!(!Dp(f64::NAN).is_positive());
        assert!(!Dp(-3.0).is_positive());
    }
}
