//! The data-set adapter contract.
//!
//! The pager never creates card content itself. An adapter hands out opaque
//! handles for adapter positions and takes them back when a card leaves the
//! fill window. The pager only compares handles through the adapter.

/// Where a previously materialised item lives after a data-set change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemPosition {
    /// The item kept its position.
    Unchanged,
    /// The item now lives at the given position.
    Moved(usize),
    /// The item is no longer part of the data set.
    Removed,
}

/// Supplies card content for a [`CardPager`](crate::CardPager).
///
/// All calls happen on the host's UI thread. Create and destroy calls made
/// during a single population are bracketed by [`start_update`] and
/// [`finish_update`].
///
/// [`start_update`]: CardAdapter::start_update
/// [`finish_update`]: CardAdapter::finish_update
pub trait CardAdapter {
    /// Opaque reference to the content created for one position.
    type Handle;
    /// A node of the host's view tree, used for reverse lookups.
    type Child: ?Sized;

    /// Number of cards in the data set.
    fn count(&self) -> usize;

    /// Fraction of the viewport width a card occupies, in `(0, 1]`.
    fn page_width(&self, _position: usize) -> f32 {
        1.0
    }

    /// Creates the content for `position` and returns its handle.
    fn instantiate(&mut self, position: usize) -> Self::Handle;

    /// Releases the content previously created for `position`.
    fn destroy(&mut self, position: usize, handle: Self::Handle);

    /// Returns true if `child` is the content behind `handle`.
    fn is_view_for(&self, child: &Self::Child, handle: &Self::Handle) -> bool;

    /// Reports where the item behind `handle` lives after a data-set change.
    fn item_position(&self, _handle: &Self::Handle) -> ItemPosition {
        ItemPosition::Unchanged
    }

    /// Opens a batch of create/destroy calls.
    fn start_update(&mut self) {}

    /// Closes a batch of create/destroy calls.
    fn finish_update(&mut self) {}

    /// Tells the adapter which card is currently on top.
    fn set_primary_item(&mut self, _position: usize, _handle: Option<&Self::Handle>) {}

    /// Adapter-internal state to carry across a save/restore cycle.
    fn save_state(&self) -> Option<Vec<u8>> {
        None
    }

    /// Restores state produced by [`CardAdapter::save_state`].
    fn restore_state(&mut self, _state: &[u8]) {}
}

/// Clamps an adapter-reported width factor into `(0, 1]`.
pub(crate) fn sanitize_width(position: usize, width: f32) -> f32 {
    if width.is_finite() && width > 0.0 && width <= 1.0 {
        return width;
    }
    tracing::warn!("Adapter returned page width {width} for position {position}; clamping");
    if !width.is_finite() || width > 1.0 {
        1.0
    } else {
        // Non-positive widths would stall the fill loop.
        f32::EPSILON
    }
}

/// Reads a sanitised width factor from the adapter.
pub(crate) fn page_width<A: CardAdapter + ?Sized>(adapter: &A, position: usize) -> f32 {
    sanitize_width(position, adapter.page_width(position))
}
