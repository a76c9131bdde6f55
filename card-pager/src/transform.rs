//! Per-card visual transform.
//!
//! Cards behind the current one stay put and scale up as the current card
//! leaves. The current card follows the drag to the left, or moves twice as
//! fast to the right so it clears the stack when dismissed in that
//! direction.

/// Opacity, translation and scale applied to a card when drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageTransform {
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Horizontal translation in pixels.
    pub translation_x: f32,
    /// Horizontal scale.
    pub scale_x: f32,
    /// Vertical scale.
    pub scale_y: f32,
}

impl PageTransform {
    /// Fully visible with no translation or scaling.
    pub const IDENTITY: Self = Self {
        alpha: 1.0,
        translation_x: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Invisible.
    pub const HIDDEN: Self = Self {
        alpha: 0.0,
        ..Self::IDENTITY
    };
}

impl Default for PageTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Transform for a card at `position` viewport widths from the scroll
/// position.
///
/// `page_width` is the card's width in pixels and `virtual_pos` the signed
/// displacement of the current card. A `min_scale` of 1 disables scaling.
pub fn transform_page(
    position: f32,
    page_width: f32,
    virtual_pos: f32,
    min_scale: f32,
) -> PageTransform {
    if !(-1.0..=1.0).contains(&position) {
        return PageTransform::HIDDEN;
    }

    let scale = min_scale + (1.0 - min_scale) * (1.0 - position.abs());
    if position <= 0.0 {
        let translation_x = if virtual_pos > 0.0 {
            page_width * -position * 2.0
        } else {
            0.0
        };
        PageTransform {
            alpha: 1.0,
            translation_x,
            scale_x: scale,
            scale_y: scale,
        }
    } else {
        PageTransform {
            alpha: 1.0 - position,
            translation_x: page_width * -position,
            scale_x: scale,
            scale_y: scale,
        }
    }
}
