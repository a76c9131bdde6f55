//! Physical pixel values used by the pager.
//!
//! # Key Types
//!
//! - [`Px`] - A whole physical pixel value. Scroll positions and page edges
//!   are kept in whole pixels, negative values are allowed.
//! - [`PxPosition`] - A sub-pixel pointer position as reported by the host's
//!   touch dispatch.
//!
//! # Example
//!
//! ```
//! use card_pager::px::{Px, PxPosition};
//!
//! let scroll = Px::new(120);
//! let page = Px::new(400);
//! assert_eq!((scroll + page).raw(), 520);
//! assert_eq!(Px::saturating_from_f32(-10.7), Px(-10));
//!
//! let touch = PxPosition::new(12.5, 40.0);
//! assert_eq!(touch.x, 12.5);
//! ```

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A physical pixel value.
///
/// Conversions from floating point truncate toward zero, matching how the
/// host places content on the pixel grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Px(pub i32);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Px` from a raw value.
    pub const fn new(value: i32) -> Self {
        Px(value)
    }

    /// Returns the raw i32 value.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Returns the value as `f32`.
    pub fn to_f32(self) -> f32 {
        self.0 as f32
    }

    /// Returns the absolute value.
    pub fn abs(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// Converts a float to pixels, truncating toward zero and saturating at
    /// the `i32` range. NaN becomes zero.
    pub fn saturating_from_f32(value: f32) -> Self {
        if value.is_nan() {
            return Px::ZERO;
        }
        let clamped = value.clamp(i32::MIN as f32, i32::MAX as f32);
        Px(clamped as i32)
    }

    /// Saturating addition.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Px(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Px(self.0.saturating_sub(rhs.0))
    }

}

impl Add for Px {
    type Output = Px;

    fn add(self, rhs: Self) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub for Px {
    type Output = Px;

    fn sub(self, rhs: Self) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl Neg for Px {
    type Output = Px;

    fn neg(self) -> Self::Output {
        Px(self.0.saturating_neg())
    }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Px {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

/// A pointer position in physical pixels.
///
/// Pointer coordinates keep their fractional part, the drag tracker carries
/// it across events so slow drags do not lose motion to rounding.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PxPosition {
    /// Horizontal coordinate, increasing to the right.
    pub x: f32,
    /// Vertical coordinate, increasing downward.
    pub y: f32,
}

impl PxPosition {
    /// Creates a new position.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
