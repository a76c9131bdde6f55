//! Fractional page offsets.
//!
//! Offsets are measured in viewport widths. The pivot keeps the offset it
//! was laid out with and every other materialised page is placed relative to
//! it by summing the width factors of the pages in between. Pages without a
//! record contribute the width the adapter declares for them.

use crate::{
    adapter::{self, CardAdapter},
    registry::{ItemRegistry, PageSlot},
};

/// Offsets of the first and last data-set positions, when materialised.
///
/// Unknown bounds are infinite, which makes them inert as drag clamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetBounds {
    /// Offset of position 0, or negative infinity.
    pub first: f32,
    /// Resting offset of the last position, or positive infinity.
    pub last: f32,
}

impl OffsetBounds {
    /// Bounds with neither end known.
    pub const UNBOUNDED: Self = Self {
        first: f32::NEG_INFINITY,
        last: f32::INFINITY,
    };

    /// Clamps an offset into the known bounds.
    pub fn clamp(&self, offset: f32) -> f32 {
        self.first.max(offset.min(self.last))
    }
}

impl Default for OffsetBounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Recomputes every record's offset around the pivot at `cur_index`.
///
/// `old_pivot` is the previous pivot when it changed in this population.
/// The new pivot's offset is first derived from it so the layout does not
/// jump, then the sweep places every other record.
#[tracing::instrument(level = "trace", skip(items, adapter))]
pub(crate) fn calculate_page_offsets<A>(
    items: &mut ItemRegistry<A::Handle>,
    adapter: &A,
    cur_index: usize,
    old_pivot: Option<PageSlot>,
) -> OffsetBounds
where
    A: CardAdapter + ?Sized,
{
    let Some(pivot) = items.get(cur_index).map(|ii| ii.slot()) else {
        return OffsetBounds::UNBOUNDED;
    };
    let count = adapter.count();

    if let Some(old) = old_pivot {
        reconcile_from_old_pivot(items, adapter, old, pivot.position);
    }

    let pivot = items.get(cur_index).map(|ii| ii.slot()).unwrap_or(pivot);
    let mut bounds = OffsetBounds {
        first: if pivot.position == 0 {
            pivot.offset
        } else {
            f32::NEG_INFINITY
        },
        last: if pivot.position + 1 == count {
            pivot.offset + pivot.width_factor - 1.0
        } else {
            f32::INFINITY
        },
    };

    // Previous pages.
    let mut offset = pivot.offset;
    let mut pos = pivot.position;
    for index in (0..cur_index).rev() {
        let Some(ii) = items.get_mut(index) else {
            continue;
        };
        pos -= 1;
        while pos > ii.position {
            offset -= adapter::page_width(adapter, pos);
            pos -= 1;
        }
        offset -= ii.width_factor;
        ii.offset = offset;
        if ii.position == 0 {
            bounds.first = offset;
        }
    }

    // Next pages.
    let mut offset = pivot.offset + pivot.width_factor;
    let mut pos = pivot.position;
    for index in cur_index + 1..items.len() {
        let Some(ii) = items.get_mut(index) else {
            continue;
        };
        pos += 1;
        while pos < ii.position {
            offset += adapter::page_width(adapter, pos);
            pos += 1;
        }
        if ii.position + 1 == count {
            bounds.last = offset + ii.width_factor - 1.0;
        }
        ii.offset = offset;
        offset += ii.width_factor;
    }

    bounds
}

/// Walks from the old pivot toward the new one, assigning offsets to the
/// records in between and to the new pivot.
fn reconcile_from_old_pivot<A>(
    items: &mut ItemRegistry<A::Handle>,
    adapter: &A,
    old: PageSlot,
    new_position: usize,
) where
    A: CardAdapter + ?Sized,
{
    let width_at = |items: &ItemRegistry<A::Handle>, pos: usize| {
        items
            .find(pos)
            .map(|ii| ii.width_factor)
            .unwrap_or_else(|| adapter::page_width(adapter, pos))
    };

    if old.position < new_position {
        let mut offset = old.offset + old.width_factor;
        for pos in old.position + 1..=new_position {
            let width = width_at(items, pos);
            if let Some(index) = items.index_of(pos)
                && let Some(ii) = items.get_mut(index)
            {
                ii.offset = offset;
            }
            offset += width;
        }
    } else if old.position > new_position {
        let mut offset = old.offset;
        for pos in (new_position..old.position).rev() {
            offset -= width_at(items, pos);
            if let Some(index) = items.index_of(pos)
                && let Some(ii) = items.get_mut(index)
            {
                ii.offset = offset;
            }
        }
    }
}
