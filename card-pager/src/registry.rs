//! Materialised pages, ordered by adapter position.
//!
//! The registry owns one [`PageRecord`] per card that currently has content.
//! Records are always sorted by position and positions are unique.

use crate::{
    adapter::{self, CardAdapter},
    px::Px,
    transform::PageTransform,
};

/// A card that currently has adapter-owned content.
#[derive(Debug, Clone)]
pub struct PageRecord<H> {
    pub(crate) position: usize,
    pub(crate) handle: H,
    pub(crate) width_factor: f32,
    pub(crate) offset: f32,
    pub(crate) scrolling: bool,
    pub(crate) left: Px,
    pub(crate) transform: PageTransform,
}

impl<H> PageRecord<H> {
    /// Adapter position of the card.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Handle returned by the adapter for this card.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Fraction of the viewport width the card occupies.
    pub fn width_factor(&self) -> f32 {
        self.width_factor
    }

    /// Horizontal offset in viewport widths.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// True while the record is protected from pruning until a settle ends.
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Left edge assigned by the last layout pass, in pixels.
    pub fn left(&self) -> Px {
        self.left
    }

    /// Visual transform computed on the last scroll.
    pub fn transform(&self) -> PageTransform {
        self.transform
    }

    pub(crate) fn slot(&self) -> PageSlot {
        PageSlot {
            position: self.position,
            offset: self.offset,
            width_factor: self.width_factor,
        }
    }
}

/// Geometry of a page, materialised or not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PageSlot {
    pub(crate) position: usize,
    pub(crate) offset: f32,
    pub(crate) width_factor: f32,
}

/// Ordered collection of [`PageRecord`]s.
#[derive(Debug, Clone)]
pub struct ItemRegistry<H> {
    items: Vec<PageRecord<H>>,
}

impl<H> Default for ItemRegistry<H> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<H> ItemRegistry<H> {
    /// Number of materialised pages.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no page is materialised.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates records in position order.
    pub fn iter(&self) -> std::slice::Iter<'_, PageRecord<H>> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, PageRecord<H>> {
        self.items.iter_mut()
    }

    /// Record at `index`.
    pub fn get(&self, index: usize) -> Option<&PageRecord<H>> {
        self.items.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut PageRecord<H>> {
        self.items.get_mut(index)
    }

    /// Lowest materialised record.
    pub fn first(&self) -> Option<&PageRecord<H>> {
        self.items.first()
    }

    /// Highest materialised record.
    pub fn last(&self) -> Option<&PageRecord<H>> {
        self.items.last()
    }

    /// Index of the record for `position`.
    pub fn index_of(&self, position: usize) -> Option<usize> {
        self.items
            .binary_search_by_key(&position, |ii| ii.position)
            .ok()
    }

    /// Record for `position`.
    pub fn find(&self, position: usize) -> Option<&PageRecord<H>> {
        self.index_of(position).map(|index| &self.items[index])
    }

    /// Creates content for `position` and stores it in sort order.
    ///
    /// Returns the index of the record. An existing record for the same
    /// position is kept and no content is created.
    pub fn insert<A>(&mut self, adapter: &mut A, position: usize) -> usize
    where
        A: CardAdapter<Handle = H> + ?Sized,
    {
        match self.items.binary_search_by_key(&position, |ii| ii.position) {
            Ok(index) => index,
            Err(index) => {
                let record = PageRecord {
                    position,
                    handle: adapter.instantiate(position),
                    width_factor: adapter::page_width(adapter, position),
                    offset: 0.0,
                    scrolling: false,
                    left: Px::ZERO,
                    transform: PageTransform::IDENTITY,
                };
                self.items.insert(index, record);
                index
            }
        }
    }

    /// Removes the record at `index` and hands its content back to the
    /// adapter.
    pub fn remove<A>(&mut self, adapter: &mut A, index: usize)
    where
        A: CardAdapter<Handle = H> + ?Sized,
    {
        if index >= self.items.len() {
            return;
        }
        let record = self.items.remove(index);
        adapter.destroy(record.position, record.handle);
    }

    /// Finds the record whose content is `child`.
    pub fn find_containing<A>(&self, adapter: &A, child: &A::Child) -> Option<&PageRecord<H>>
    where
        A: CardAdapter<Handle = H> + ?Sized,
    {
        self.items
            .iter()
            .find(|ii| adapter.is_view_for(child, &ii.handle))
    }

    /// Restores sort order after positions were rewritten, destroying any
    /// record whose position collides with an earlier one.
    pub(crate) fn sort_and_dedup<A>(&mut self, adapter: &mut A)
    where
        A: CardAdapter<Handle = H> + ?Sized,
    {
        self.items.sort_by_key(|ii| ii.position);
        let mut index = 1;
        while index < self.items.len() {
            if self.items[index].position == self.items[index - 1].position {
                tracing::warn!(
                    "Adapter reported position {} twice; dropping duplicate",
                    self.items[index].position
                );
                self.remove(adapter, index);
            } else {
                index += 1;
            }
        }
    }

    pub(crate) fn take_at(&mut self, index: usize) -> PageRecord<H> {
        self.items.remove(index)
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, PageRecord<H>> {
        self.items.drain(..)
    }

    /// Page under a scroll offset expressed in viewport widths.
    ///
    /// Gaps between materialised records are filled with temporary slots
    /// sized by the adapter.
    pub(crate) fn slot_for_scroll<A>(&self, adapter: &A, scroll_offset: f32) -> Option<PageSlot>
    where
        A: CardAdapter<Handle = H> + ?Sized,
    {
        let mut last: Option<PageSlot> = None;
        let mut index = 0;
        while index < self.items.len() {
            let mut slot = self.items[index].slot();
            let mut synthetic = false;
            if let Some(prev) = last
                && slot.position != prev.position + 1
            {
                let position = prev.position + 1;
                slot = PageSlot {
                    position,
                    offset: prev.offset + prev.width_factor,
                    width_factor: adapter::page_width(adapter, position),
                };
                synthetic = true;
            }

            let left_bound = slot.offset;
            let right_bound = slot.offset + slot.width_factor;
            if last.is_none() || scroll_offset >= left_bound {
                let is_last = !synthetic && index == self.items.len() - 1;
                if scroll_offset < right_bound || is_last {
                    return Some(slot);
                }
            } else {
                return last;
            }

            last = Some(slot);
            if !synthetic {
                index += 1;
            }
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::test::ColorAdapter;

    fn registry_with(adapter: &mut ColorAdapter, positions: &[usize]) -> ItemRegistry<u32> {
        let mut registry = ItemRegistry::default();
        for &position in positions {
            registry.insert(adapter, position);
        }
        registry
    }

    #[test]
    fn insert_keeps_order_and_uniqueness() {
        let mut adapter = ColorAdapter::new(10);
        let mut registry = registry_with(&mut adapter, &[4, 1, 7, 1]);
        let positions: Vec<_> = registry.iter().map(|ii| ii.position()).collect();
        assert_eq!(positions, vec![1, 4, 7]);
        assert_eq!(adapter.live_count(), 3);

        registry.remove(&mut adapter, 1);
        assert_eq!(registry.find(4).map(|ii| ii.position()), None);
        assert_eq!(registry.index_of(7), Some(1));
        assert_eq!(adapter.live_count(), 2);
    }

    #[test]
    fn find_containing_asks_the_adapter() {
        let mut adapter = ColorAdapter::new(5);
        let registry = registry_with(&mut adapter, &[0, 1, 2]);
        let handle = *registry.find(2).unwrap().handle();
        let found = registry.find_containing(&adapter, &handle).unwrap();
        assert_eq!(found.position(), 2);
        assert!(registry.find_containing(&adapter, &9999).is_none());
    }

    #[test]
    fn slot_for_scroll_fills_gaps() {
        let mut adapter = ColorAdapter::new(10);
        let mut registry = registry_with(&mut adapter, &[0, 3]);
        registry.get_mut(0).unwrap().offset = 0.0;
        registry.get_mut(1).unwrap().offset = 3.0;

        assert_eq!(registry.slot_for_scroll(&adapter, 0.5).unwrap().position, 0);
        let gap = registry.slot_for_scroll(&adapter, 1.25).unwrap();
        assert_eq!(gap.position, 1);
        assert_eq!(gap.offset, 1.0);
        assert_eq!(registry.slot_for_scroll(&adapter, 2.5).unwrap().position, 2);
        assert_eq!(registry.slot_for_scroll(&adapter, 3.2).unwrap().position, 3);
        // Past the last record the last record wins.
        assert_eq!(registry.slot_for_scroll(&adapter, 9.0).unwrap().position, 3);
        // Before the first record the first record wins.
        assert_eq!(registry.slot_for_scroll(&adapter, -2.0).unwrap().position, 0);
    }

    #[test]
    fn sort_and_dedup_destroys_collisions() {
        let mut adapter = ColorAdapter::new(10);
        let mut registry = registry_with(&mut adapter, &[2, 5, 8]);
        registry.get_mut(2).unwrap().position = 2;
        registry.get_mut(0).unwrap().position = 9;
        registry.sort_and_dedup(&mut adapter);
        let positions: Vec<_> = registry.iter().map(|ii| ii.position()).collect();
        assert_eq!(positions, vec![2, 5, 9]);
        assert_eq!(adapter.live_count(), 3);

        registry.get_mut(1).unwrap().position = 2;
        registry.sort_and_dedup(&mut adapter);
        let positions: Vec<_> = registry.iter().map(|ii| ii.position()).collect();
        assert_eq!(positions, vec![2, 9]);
        assert_eq!(adapter.live_count(), 2);
    }

    proptest! {
        #[test]
        fn inserts_and_removes_stay_sorted(
            ops in prop::collection::vec((any::<bool>(), 0usize..32), 0..64)
        ) {
            let mut adapter = ColorAdapter::new(32);
            let mut registry = ItemRegistry::default();
            for (is_insert, value) in ops {
                if is_insert {
                    registry.insert(&mut adapter, value);
                } else if !registry.is_empty() {
                    let index = value % registry.len();
                    registry.remove(&mut adapter, index);
                }
                let positions: Vec<_> = registry.iter().map(|ii| ii.position()).collect();
                prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
                prop_assert_eq!(adapter.live_count(), registry.len());
            }
        }
    }
}
