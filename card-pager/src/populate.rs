//! The fill window.
//!
//! Around the current page the pager keeps enough pages materialised to
//! cover two viewport widths on either side, and at least
//! `offscreen_page_limit` pages in each direction. Pages beyond both limits
//! are released unless a settle animation still needs them.

use crate::{adapter::CardAdapter, px::Px, registry::ItemRegistry};

/// Inputs for one fill pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FillWindow {
    pub(crate) current: usize,
    pub(crate) page_limit: usize,
    pub(crate) client_width: Px,
    pub(crate) padding_left: Px,
    pub(crate) padding_right: Px,
}

impl FillWindow {
    fn start_pos(&self) -> usize {
        self.current.saturating_sub(self.page_limit)
    }

    fn end_pos(&self, count: usize) -> usize {
        (count - 1).min(self.current.saturating_add(self.page_limit))
    }

    /// Width, in viewport widths, wanted to the left of the current page.
    fn left_width_needed(&self, current_width: f32) -> f32 {
        if self.client_width <= Px::ZERO {
            0.0
        } else {
            2.0 - current_width + self.padding_left.to_f32() / self.client_width.to_f32()
        }
    }

    /// Width, in viewport widths, wanted to the right of the current page.
    fn right_width_needed(&self) -> f32 {
        if self.client_width <= Px::ZERO {
            0.0
        } else {
            2.0 + self.padding_right.to_f32() / self.client_width.to_f32()
        }
    }
}

/// Materialises and prunes pages around `window.current`.
///
/// Returns the registry index of the current page, or `None` when the data
/// set is empty. Create and destroy calls are issued directly; the caller
/// brackets them in an update batch.
#[tracing::instrument(level = "trace", skip(items, adapter))]
pub(crate) fn fill_window<A>(
    items: &mut ItemRegistry<A::Handle>,
    adapter: &mut A,
    window: FillWindow,
) -> Option<usize>
where
    A: CardAdapter + ?Sized,
{
    let count = adapter.count();
    if count == 0 || window.current >= count {
        return None;
    }

    let mut cur_index = items.insert(adapter, window.current);
    let current_width = items.get(cur_index)?.width_factor;

    // Left side.
    let start_pos = window.start_pos();
    let left_needed = window.left_width_needed(current_width);
    let mut extra_left = 0.0f32;
    let mut item_index = cur_index.checked_sub(1);
    for pos in (0..window.current).rev() {
        let below = item_index.and_then(|index| {
            items
                .get(index)
                .map(|ii| (index, ii.position, ii.scrolling, ii.width_factor))
        });
        if extra_left >= left_needed && pos < start_pos {
            let Some((index, position, scrolling, _)) = below else {
                break;
            };
            if pos == position && !scrolling {
                items.remove(adapter, index);
                item_index = index.checked_sub(1);
                cur_index -= 1;
            }
        } else if let Some((index, position, _, width)) = below
            && pos == position
        {
            extra_left += width;
            item_index = index.checked_sub(1);
        } else {
            let inserted = items.insert(adapter, pos);
            extra_left += items.get(inserted).map_or(0.0, |ii| ii.width_factor);
            cur_index += 1;
        }
    }

    // Right side.
    let mut extra_right = current_width;
    let mut item_index = cur_index + 1;
    if extra_right < 2.0 {
        let end_pos = window.end_pos(count);
        let right_needed = window.right_width_needed();
        for pos in window.current + 1..count {
            let above = items
                .get(item_index)
                .map(|ii| (ii.position, ii.scrolling, ii.width_factor));
            if extra_right >= right_needed && pos > end_pos {
                let Some((position, scrolling, _)) = above else {
                    break;
                };
                if pos == position && !scrolling {
                    items.remove(adapter, item_index);
                }
            } else if let Some((position, _, width)) = above
                && pos == position
            {
                extra_right += width;
                item_index += 1;
            } else {
                let inserted = items.insert(adapter, pos);
                extra_right += items.get(inserted).map_or(0.0, |ii| ii.width_factor);
                item_index += 1;
            }
        }
    }

    Some(cur_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::ColorAdapter;

    fn window(current: usize) -> FillWindow {
        FillWindow {
            current,
            page_limit: 1,
            client_width: Px(400),
            padding_left: Px::ZERO,
            padding_right: Px::ZERO,
        }
    }

    fn positions(items: &ItemRegistry<u32>) -> Vec<usize> {
        items.iter().map(|ii| ii.position()).collect()
    }

    #[test]
    fn empty_data_set_materialises_nothing() {
        let mut adapter = ColorAdapter::new(0);
        let mut items = ItemRegistry::default();
        assert_eq!(fill_window(&mut items, &mut adapter, window(0)), None);
        assert!(items.is_empty());
    }

    #[test]
    fn fills_three_viewports_of_full_width_pages() {
        let mut adapter = ColorAdapter::new(10);
        let mut items = ItemRegistry::default();
        let cur = fill_window(&mut items, &mut adapter, window(5)).unwrap();
        // Left: one page covers the (2 - 1) width needed and the limit of 1.
        // Right: the current page plus one more reach the 2.0 width needed.
        assert_eq!(positions(&items), vec![4, 5, 6]);
        assert_eq!(items.get(cur).unwrap().position(), 5);
    }

    #[test]
    fn window_is_clipped_at_the_data_set_edges() {
        let mut adapter = ColorAdapter::new(3);
        let mut items = ItemRegistry::default();
        let cur = fill_window(&mut items, &mut adapter, window(0)).unwrap();
        assert_eq!(cur, 0);
        assert_eq!(positions(&items), vec![0, 1]);
    }

    #[test]
    fn moving_forward_releases_pages_behind() {
        let mut adapter = ColorAdapter::new(10);
        let mut items = ItemRegistry::default();
        fill_window(&mut items, &mut adapter, window(2));
        assert_eq!(positions(&items), vec![1, 2, 3]);

        let cur = fill_window(&mut items, &mut adapter, window(4)).unwrap();
        assert_eq!(positions(&items), vec![3, 4, 5]);
        assert_eq!(items.get(cur).unwrap().position(), 4);
        assert_eq!(adapter.live_count(), 3);
        assert_eq!(adapter.destroyed(), vec![2, 1]);
    }

    #[test]
    fn scrolling_pages_survive_pruning() {
        let mut adapter = ColorAdapter::new(10);
        let mut items = ItemRegistry::default();
        fill_window(&mut items, &mut adapter, window(2));
        for index in 0..items.len() {
            items.get_mut(index).unwrap().scrolling = true;
        }
        fill_window(&mut items, &mut adapter, window(6));
        assert_eq!(positions(&items), vec![1, 2, 3, 5, 6, 7]);
        assert!(adapter.destroyed().is_empty());
    }

    #[test]
    fn narrow_pages_widen_the_window() {
        let mut adapter = ColorAdapter::new(12).with_widths(vec![0.5; 12]);
        let mut items = ItemRegistry::default();
        let cur = fill_window(&mut items, &mut adapter, window(6)).unwrap();
        // Left needs 1.5 widths (three half pages). Right reaches 2.0 widths
        // counting the current half page (three more half pages).
        assert_eq!(positions(&items), vec![3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(items.get(cur).unwrap().position(), 6);
    }

    #[test]
    fn larger_page_limit_keeps_more_pages() {
        let mut adapter = ColorAdapter::new(10);
        let mut items = ItemRegistry::default();
        let window = FillWindow {
            page_limit: 3,
            ..window(5)
        };
        fill_window(&mut items, &mut adapter, window);
        assert_eq!(positions(&items), vec![2, 3, 4, 5, 6, 7, 8]);
    }
}
