//! The card pager widget core.
//!
//! [`CardPager`] owns the materialised pages, the scroll position and the
//! gesture state. The host drives it from a single thread: it forwards
//! pointer events, measure and layout passes, animation ticks and data-set
//! change notifications, and reads back the page layout, per-page transforms
//! and [`HostRequest`]s.
//!
//! ## Usage
//!
//! ```
//! use std::time::Instant;
//!
//! use card_pager::{
//!     CardAdapter, CardPager, CardPagerConfig,
//!     gesture::{MotionAction, MotionEvent, Pointer},
//!     px::Px,
//! };
//!
//! struct Colors(Vec<u32>);
//!
//! impl CardAdapter for Colors {
//!     type Handle = u32;
//!     type Child = u32;
//!
//!     fn count(&self) -> usize {
//!         self.0.len()
//!     }
//!
//!     fn instantiate(&mut self, position: usize) -> u32 {
//!         self.0[position]
//!     }
//!
//!     fn destroy(&mut self, _position: usize, _handle: u32) {}
//!
//!     fn is_view_for(&self, child: &u32, handle: &u32) -> bool {
//!         child == handle
//!     }
//! }
//!
//! let mut pager = CardPager::new(CardPagerConfig::default(), 1.0).unwrap();
//! pager.set_adapter(Colors(vec![0xff0000, 0x00ff00, 0x0000ff]));
//! pager.on_attached_to_window();
//! pager.measure(Px(400));
//! pager.layout();
//!
//! let down = MotionEvent::single(MotionAction::Down, Pointer::new(0, 10.0, 10.0), Instant::now());
//! pager.on_intercept_touch_event(&down);
//! assert!(pager.on_touch_event(&down));
//! assert_eq!(pager.current_item(), 0);
//! ```

use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::{
    adapter::{self, CardAdapter, ItemPosition},
    config::{CardPagerConfig, ResolvedConfig},
    error::Result,
    gesture::{
        self, DragDecision, DragDirection, GesturePhase, MotionAction, MotionEvent,
        PointerSession, Release,
    },
    listener::{CardChangeListener, CardEvent, ListenerId, Listeners, ScrollState},
    offsets::{OffsetBounds, calculate_page_offsets},
    populate::{FillWindow, fill_window},
    px::Px,
    registry::{ItemRegistry, PageRecord},
    settle::{Scroller, settle_duration},
    transform::transform_page,
};

/// Something the pager needs from its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostRequest {
    /// Ask ancestors to stop (or resume) intercepting the pointer stream.
    DisallowParentIntercept(bool),
    /// Call [`CardPager::compute_scroll`] on the next animation frame.
    InvalidateOnAnimation,
    /// Run a measure and layout pass.
    RequestLayout,
    /// Switch hardware layers for the pages on or off.
    EnableLayers(bool),
}

/// State carried across a save/restore cycle of the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SavedState {
    /// Position of the current card.
    pub current_item: usize,
    /// Whatever the adapter chose to save.
    pub adapter_state: Option<Vec<u8>>,
}

/// Scroll and drag state of the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportState {
    /// Position of the current (pivot) card.
    pub current_item: usize,
    /// Horizontal scroll position in pixels.
    pub scroll_x: Px,
    /// Signed displacement of the current card; positive to the right.
    pub virtual_pos: f32,
    /// True when scroll deltas move the card to the right.
    pub reversed: bool,
    /// Scroll phase reported to listeners.
    pub scroll_state: ScrollState,
    pub(crate) last_scroll: Px,
    pub(crate) locked_direction: Option<DragDirection>,
}

/// A horizontally swiped stack of cards.
///
/// Dragging the top card in either direction and releasing it far or fast
/// enough dismisses it; the next card scales up underneath.
pub struct CardPager<A: CardAdapter> {
    config: ResolvedConfig,
    adapter: Option<A>,
    items: ItemRegistry<A::Handle>,
    bounds: OffsetBounds,
    viewport: ViewportState,
    session: PointerSession,
    scroller: Scroller,
    listeners: Listeners,
    host_requests: Vec<HostRequest>,
    is_being_dragged: bool,
    is_unable_to_drag: bool,
    attached: bool,
    first_layout: bool,
    populate_pending: bool,
    end_scroll_pending: bool,
    width: Px,
    laid_out_width: Px,
    padding_left: Px,
    padding_right: Px,
    restored_state: Option<SavedState>,
}

impl<A: CardAdapter> std::fmt::Debug for CardPager<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardPager")
            .field("viewport", &self.viewport)
            .field("bounds", &self.bounds)
            .field("pages", &self.items.len())
            .field("has_adapter", &self.adapter.is_some())
            .field("is_being_dragged", &self.is_being_dragged)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

impl<A: CardAdapter> CardPager<A> {
    /// Creates a pager without an adapter.
    ///
    /// `density` is the host's pixels-per-dp factor.
    pub fn new(config: CardPagerConfig, density: f32) -> Result<Self> {
        Ok(Self {
            config: config.resolve(density)?,
            adapter: None,
            items: ItemRegistry::default(),
            bounds: OffsetBounds::UNBOUNDED,
            viewport: ViewportState::default(),
            session: PointerSession::default(),
            scroller: Scroller::default(),
            listeners: Listeners::default(),
            host_requests: Vec::new(),
            is_being_dragged: false,
            is_unable_to_drag: false,
            attached: false,
            first_layout: true,
            populate_pending: false,
            end_scroll_pending: false,
            width: Px::ZERO,
            laid_out_width: Px::ZERO,
            padding_left: Px::ZERO,
            padding_right: Px::ZERO,
            restored_state: None,
        })
    }

    /// Replaces the configuration.
    ///
    /// A changed page limit repopulates immediately.
    pub fn set_config(&mut self, config: CardPagerConfig, density: f32) -> Result<()> {
        let resolved = config.resolve(density)?;
        let limit_changed = resolved.offscreen_page_limit != self.config.offscreen_page_limit;
        self.config = resolved;
        if limit_changed {
            self.populate();
        }
        Ok(())
    }

    /// The resolved configuration.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Installs `adapter`, returning the previous one.
    ///
    /// Every page of the previous adapter is destroyed and the pager starts
    /// over at position 0, or at the position of a pending restored state.
    pub fn set_adapter(&mut self, adapter: A) -> Option<A> {
        let previous = self.take_adapter();
        self.adapter = Some(adapter);
        self.populate_pending = false;
        let was_first_layout = self.first_layout;
        self.first_layout = true;

        if let Some(state) = self.restored_state.take() {
            if let (Some(adapter), Some(bytes)) = (self.adapter.as_mut(), &state.adapter_state) {
                adapter.restore_state(bytes);
            }
            self.set_current_item_internal(state.current_item, false, true, 0.0);
        } else if !was_first_layout {
            self.populate();
        } else {
            self.request(HostRequest::RequestLayout);
        }
        debug!("Adapter installed with {} cards", self.adapter_count());
        previous
    }

    /// Removes the adapter, destroying every materialised page.
    pub fn take_adapter(&mut self) -> Option<A> {
        let mut adapter = self.adapter.take()?;
        adapter.start_update();
        for record in self.items.drain() {
            adapter.destroy(record.position, record.handle);
        }
        adapter.finish_update();
        self.viewport.current_item = 0;
        self.scroll_to(Px::ZERO);
        self.bounds = OffsetBounds::UNBOUNDED;
        Some(adapter)
    }

    /// The installed adapter.
    pub fn adapter(&self) -> Option<&A> {
        self.adapter.as_ref()
    }

    /// The installed adapter, mutably. Call [`CardPager::data_set_changed`]
    /// after changing its data.
    pub fn adapter_mut(&mut self) -> Option<&mut A> {
        self.adapter.as_mut()
    }

    /// Registers a listener.
    pub fn add_listener(&mut self, listener: Box<dyn CardChangeListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Unregisters a listener and hands it back.
    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn CardChangeListener>> {
        self.listeners.remove(id)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Position of the current card.
    pub fn current_item(&self) -> usize {
        self.viewport.current_item
    }

    /// Moves to `item`, clamped to the data set.
    pub fn set_current_item(&mut self, item: usize, smooth_scroll: bool) {
        self.populate_pending = false;
        self.set_current_item_internal(item, smooth_scroll, false, 0.0);
    }

    /// Scroll and drag state.
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Scroll phase reported to listeners.
    pub fn scroll_state(&self) -> ScrollState {
        self.viewport.scroll_state
    }

    /// Horizontal scroll position in pixels.
    pub fn scroll_x(&self) -> Px {
        self.viewport.scroll_x
    }

    /// Where the gesture state machine stands.
    pub fn gesture_phase(&self) -> GesturePhase {
        if self.is_being_dragged {
            GesturePhase::Dragging
        } else if self.session.active_pointer.is_some() && !self.is_unable_to_drag {
            GesturePhase::DeciderPending
        } else if self.viewport.scroll_state == ScrollState::Settling {
            GesturePhase::Settling
        } else {
            GesturePhase::Idle
        }
    }

    /// Materialised pages in position order.
    pub fn pages(&self) -> &ItemRegistry<A::Handle> {
        &self.items
    }

    /// Offsets of the first and last positions, when materialised.
    pub fn bounds(&self) -> OffsetBounds {
        self.bounds
    }

    /// The page whose content is `child`.
    pub fn page_for_child(&self, child: &A::Child) -> Option<&PageRecord<A::Handle>> {
        self.items.find_containing(self.adapter.as_ref()?, child)
    }

    /// Pages in the order they are drawn: highest position first, so the
    /// current card ends up on top.
    pub fn drawing_order(&self) -> impl Iterator<Item = &PageRecord<A::Handle>> {
        self.items.iter().rev()
    }

    /// The only page that receives touches, the current one.
    pub fn touch_target(&self) -> Option<&PageRecord<A::Handle>> {
        self.items.find(self.viewport.current_item)
    }

    /// Drains what the pager asked of its host since the last call.
    pub fn take_host_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.host_requests)
    }

    /// Width available to pages.
    pub fn client_width(&self) -> Px {
        (self.width - self.padding_left - self.padding_right).max(Px::ZERO)
    }

    /// Captures what is needed to restore the pager later.
    pub fn save_state(&self) -> SavedState {
        SavedState {
            current_item: self.viewport.current_item,
            adapter_state: self.adapter.as_ref().and_then(|adapter| adapter.save_state()),
        }
    }

    /// Applies a saved state now, or when the next adapter is installed.
    pub fn restore_state(&mut self, state: SavedState) {
        let Some(adapter) = self.adapter.as_mut() else {
            self.restored_state = Some(state);
            return;
        };
        if let Some(bytes) = &state.adapter_state {
            adapter.restore_state(bytes);
        }
        self.set_current_item_internal(state.current_item, false, true, 0.0);
    }

    /// The host attached the pager to a window.
    pub fn on_attached_to_window(&mut self) {
        self.attached = true;
        self.first_layout = true;
    }

    /// The host detached the pager from its window.
    pub fn on_detached_from_window(&mut self) {
        self.end_scroll_pending = false;
        self.attached = false;
    }

    /// Sets the horizontal padding around the pages.
    pub fn set_padding(&mut self, left: Px, right: Px) {
        self.padding_left = left;
        self.padding_right = right;
        self.request(HostRequest::RequestLayout);
    }

    /// Measure pass: records the pager's width and makes sure every page
    /// that should exist does.
    pub fn measure(&mut self, width: Px) {
        self.width = width.max(Px::ZERO);
        self.populate();
    }

    /// Layout pass: positions the pages.
    pub fn layout(&mut self) {
        if self.width != self.laid_out_width {
            let old_width = self.laid_out_width;
            self.laid_out_width = self.width;
            self.recompute_scroll_position(self.width, old_width);
        }

        let padding_left = self.padding_left;
        let client_width = self.client_width();
        for ii in self.items.iter_mut() {
            ii.left = page_left(padding_left, client_width, ii.offset);
        }

        if self.first_layout {
            let current = self.viewport.current_item;
            self.scroll_to_item(current, false, 0.0);
        }
        self.first_layout = false;
        self.apply_transforms();
    }

    /// Re-reads the data set after the adapter's content changed.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn data_set_changed(&mut self) {
        let limit = self.config.offscreen_page_limit;
        let Some(adapter) = self.adapter.as_mut() else {
            return;
        };
        let count = adapter.count();
        let window_size = limit.saturating_mul(2).saturating_add(1);
        let mut need_populate = self.items.len() < window_size && self.items.len() < count;
        let current = self.viewport.current_item;
        let mut new_current = current;

        let mut is_updating = false;
        let mut index = 0;
        while index < self.items.len() {
            let Some(ii) = self.items.get(index) else {
                break;
            };
            match adapter.item_position(&ii.handle) {
                ItemPosition::Unchanged => index += 1,
                ItemPosition::Removed => {
                    let record = self.items.take_at(index);
                    if !is_updating {
                        adapter.start_update();
                        is_updating = true;
                    }
                    debug!("Position {} removed from the data set", record.position);
                    if record.position == current {
                        new_current = current.min(count.saturating_sub(1));
                    }
                    adapter.destroy(record.position, record.handle);
                    need_populate = true;
                }
                ItemPosition::Moved(new_position) => {
                    if let Some(ii) = self.items.get_mut(index)
                        && ii.position != new_position
                    {
                        if ii.position == current {
                            new_current = new_position;
                        }
                        ii.position = new_position;
                        need_populate = true;
                    }
                    index += 1;
                }
            }
        }

        if count == 0 && !self.items.is_empty() {
            if !is_updating {
                adapter.start_update();
                is_updating = true;
            }
            for record in self.items.drain() {
                adapter.destroy(record.position, record.handle);
            }
        }
        if is_updating {
            adapter.finish_update();
        }
        self.items.sort_and_dedup(adapter);

        if count == 0 {
            self.clear_viewport();
            return;
        }

        if need_populate {
            for ii in self.items.iter_mut() {
                ii.width_factor = adapter::page_width(&*adapter, ii.position);
            }
            self.set_current_item_internal(new_current, false, true, 0.0);
            self.request(HostRequest::RequestLayout);
        }
    }

    /// Animation tick. Call on every frame after
    /// [`HostRequest::InvalidateOnAnimation`].
    pub fn compute_scroll(&mut self, now: Instant) {
        if self.end_scroll_pending {
            self.end_scroll_pending = false;
            self.end_scroll();
        }

        if !self.scroller.is_finished() && self.scroller.compute_scroll_offset(now) {
            let old_x = self.viewport.scroll_x;
            let x = self.scroller.curr_x();
            if old_x != x {
                if let Some(bound) = self.out_of_bounds(x) {
                    warn!("Settle target {x:?} left the data set; stopping at {bound:?}");
                    self.scroller.abort_at(bound);
                    self.scroll_to(bound);
                    self.page_scrolled(bound);
                    self.complete_scroll(false);
                    return;
                }
                self.scroll_to(x);
                if !self.page_scrolled(x) {
                    self.scroller.abort_animation();
                    self.scroll_to(Px::ZERO);
                }
            }
            // Keep drawing until the animation finished.
            self.request(HostRequest::InvalidateOnAnimation);
            return;
        }

        self.complete_scroll(true);
    }

    /// Decides whether the pager takes the pointer stream away from its
    /// children. Returns true while a drag is in progress.
    #[tracing::instrument(level = "trace", skip(self, event), fields(action = ?event.action))]
    pub fn on_intercept_touch_event(&mut self, event: &MotionEvent) -> bool {
        if self.viewport.scroll_state == ScrollState::Idle {
            self.viewport.virtual_pos = 0.0;
        }

        if matches!(event.action, MotionAction::Cancel | MotionAction::Up) {
            self.is_being_dragged = false;
            self.is_unable_to_drag = false;
            self.session.reset();
            return false;
        }

        if event.action != MotionAction::Down {
            if self.is_being_dragged {
                return true;
            }
            if self.is_unable_to_drag {
                return false;
            }
        }

        match event.action {
            MotionAction::Move => {
                if let Some(active) = self.session.active_pointer {
                    let Some(pointer) = event
                        .find_pointer_index(active)
                        .and_then(|index| event.pointer(index))
                    else {
                        self.abort_stale_pointer();
                        return false;
                    };
                    let x = pointer.position.x;
                    let y = pointer.position.y;
                    let dx = x - self.session.last_motion.x;
                    let y_diff = (y - self.session.initial_motion.y).abs();
                    match gesture::decide_intercept(dx.abs(), y_diff, self.config.touch_slop) {
                        DragDecision::Horizontal => {
                            trace!("Intercepting horizontal drag");
                            self.start_drag(dx, y);
                        }
                        DragDecision::Vertical => {
                            trace!("Vertical motion, leaving the gesture to children");
                            self.is_unable_to_drag = true;
                        }
                        DragDecision::Undecided => {}
                    }
                    if self.is_being_dragged {
                        self.perform_drag(x);
                    }
                }
            }
            MotionAction::Down => {
                if let Some(pointer) = event.pointer(0) {
                    self.session.begin(pointer);
                }
                self.is_unable_to_drag = false;
                self.viewport.locked_direction = None;

                if self.viewport.scroll_state == ScrollState::Settling && self.is_catchable() {
                    debug!("Catching the settling card");
                    self.scroller.abort_animation();
                    self.populate_pending = false;
                    self.populate();
                    self.is_being_dragged = true;
                    self.request(HostRequest::DisallowParentIntercept(true));
                    self.set_scroll_state(ScrollState::Dragging);
                } else {
                    self.is_being_dragged = false;
                }
            }
            MotionAction::PointerUp => self.on_secondary_pointer_up(event),
            MotionAction::PointerDown | MotionAction::Up | MotionAction::Cancel => {}
        }

        self.session.velocity.add_movement(event);
        self.is_being_dragged
    }

    /// Handles a pointer event delivered to the pager itself. Returns false
    /// when the pager does not want the gesture.
    #[tracing::instrument(level = "trace", skip(self, event), fields(action = ?event.action))]
    pub fn on_touch_event(&mut self, event: &MotionEvent) -> bool {
        if event.action == MotionAction::Down && event.edge_flags != 0 {
            // Edge presses may belong to a descendant.
            return false;
        }
        if self.adapter_count() == 0 {
            return false;
        }

        self.session.velocity.add_movement(event);

        match event.action {
            MotionAction::Down => {
                if self.viewport.scroll_state != ScrollState::Settling {
                    self.scroller.abort_animation();
                    self.populate_pending = false;
                    self.populate();
                }
                if self.viewport.scroll_state == ScrollState::Idle {
                    self.viewport.virtual_pos = 0.0;
                }
                if let Some(pointer) = event.pointer(0) {
                    self.session.begin(pointer);
                }
            }
            MotionAction::Move => {
                let Some(pointer) = self.active_pointer_in(event) else {
                    self.abort_stale_pointer();
                    return true;
                };
                let x = pointer.position.x;
                let y = pointer.position.y;
                if !self.is_being_dragged {
                    let x_diff = (x - self.session.last_motion.x).abs();
                    let y_diff = (y - self.session.last_motion.y).abs();
                    if gesture::decide_direct(x_diff, y_diff, self.config.touch_slop)
                        == DragDecision::Horizontal
                    {
                        trace!("Starting drag");
                        self.start_drag(x - self.session.initial_motion.x, y);
                    }
                }
                if self.is_being_dragged {
                    self.perform_drag(x);
                }
            }
            MotionAction::Up => {
                if self.is_being_dragged {
                    let Some(pointer) = self.active_pointer_in(event) else {
                        self.abort_stale_pointer();
                        return true;
                    };
                    let x = pointer.position.x;
                    self.release_drag(x);
                } else {
                    self.session.reset();
                }
            }
            MotionAction::Cancel => {
                if self.is_being_dragged {
                    let current = self.viewport.current_item;
                    self.scroll_to_item(current, true, 0.0);
                    self.session.active_pointer = None;
                    self.end_drag();
                }
            }
            MotionAction::PointerDown => {
                if let Some(pointer) = event.action_pointer() {
                    self.session.last_motion.x = pointer.position.x;
                    self.session.active_pointer = Some(pointer.id);
                }
            }
            MotionAction::PointerUp => {
                self.on_secondary_pointer_up(event);
                match self.active_pointer_in(event) {
                    Some(pointer) => self.session.last_motion.x = pointer.position.x,
                    None => self.abort_stale_pointer(),
                }
            }
        }

        true
    }

    fn adapter_count(&self) -> usize {
        self.adapter.as_ref().map_or(0, |adapter| adapter.count())
    }

    /// Queues `request`, replacing an earlier request of the same kind.
    fn request(&mut self, request: HostRequest) {
        let kind = std::mem::discriminant(&request);
        self.host_requests
            .retain(|queued| std::mem::discriminant(queued) != kind);
        self.host_requests.push(request);
    }

    /// Forgets the scroll and gesture state after the data set emptied.
    fn clear_viewport(&mut self) {
        debug!("Data set is empty");
        self.scroller.abort_animation();
        self.populate_pending = false;
        self.end_scroll_pending = false;
        if self.is_being_dragged {
            self.end_drag();
        }
        self.viewport.current_item = 0;
        self.scroll_to(Px::ZERO);
        self.viewport.last_scroll = Px::ZERO;
        self.viewport.virtual_pos = 0.0;
        self.bounds = OffsetBounds::UNBOUNDED;
        self.set_scroll_state(ScrollState::Idle);
        self.request(HostRequest::RequestLayout);
    }

    fn scroll_to(&mut self, x: Px) {
        self.viewport.scroll_x = x;
    }

    fn set_scroll_state(&mut self, state: ScrollState) {
        if self.viewport.scroll_state == state {
            return;
        }
        debug!("Scroll state {:?} -> {:?}", self.viewport.scroll_state, state);
        self.viewport.scroll_state = state;
        self.listeners.notify(CardEvent::ScrollStateChanged(state));
        self.request(HostRequest::EnableLayers(state != ScrollState::Idle));
    }

    fn populate(&mut self) {
        let current = self.viewport.current_item;
        self.populate_to(current);
    }

    #[tracing::instrument(level = "trace", skip(self))]
    fn populate_to(&mut self, new_current: usize) {
        let mut old_pivot = None;
        if self.viewport.current_item != new_current {
            old_pivot = self.items.find(self.viewport.current_item).map(PageRecord::slot);
            self.viewport.current_item = new_current;
        }

        if self.adapter.is_none() {
            return;
        }
        if self.populate_pending {
            trace!("Population deferred until the settle ends");
            return;
        }
        if !self.attached {
            return;
        }

        let count = self.adapter_count();
        if count > 0 && self.viewport.current_item >= count {
            warn!(
                "Current position {} is outside the data set of {count}; clamping",
                self.viewport.current_item
            );
            self.viewport.current_item = count - 1;
        }

        let window = FillWindow {
            current: self.viewport.current_item,
            page_limit: self.config.offscreen_page_limit,
            client_width: self.client_width(),
            padding_left: self.padding_left,
            padding_right: self.padding_right,
        };
        let Some(adapter) = self.adapter.as_mut() else {
            return;
        };
        adapter.start_update();
        let cur_index = fill_window(&mut self.items, adapter, window);
        self.bounds = match cur_index {
            Some(index) => calculate_page_offsets(&mut self.items, &*adapter, index, old_pivot),
            None => OffsetBounds::UNBOUNDED,
        };
        let primary = cur_index
            .and_then(|index| self.items.get(index))
            .map(PageRecord::handle);
        adapter.set_primary_item(window.current, primary);
        adapter.finish_update();

        debug!(
            "Populated around {} with {} pages",
            window.current,
            self.items.len()
        );
        self.apply_transforms();
    }

    fn set_current_item_internal(
        &mut self,
        item: usize,
        smooth_scroll: bool,
        always: bool,
        velocity: f32,
    ) {
        let count = self.adapter_count();
        if count == 0 {
            return;
        }
        let current = self.viewport.current_item;
        if !always && current == item && !self.items.is_empty() {
            return;
        }

        let item = if item >= count {
            warn!("Position {item} is outside the data set of {count}; clamping");
            count - 1
        } else {
            item
        };
        let page_limit = self.config.offscreen_page_limit;
        if item > current.saturating_add(page_limit) || item.saturating_add(page_limit) < current {
            // Keep every page alive until the jump finishes.
            for ii in self.items.iter_mut() {
                ii.scrolling = true;
            }
        }

        if self.first_layout {
            self.viewport.current_item = item;
            self.request(HostRequest::RequestLayout);
        } else {
            self.populate_to(item);
            self.scroll_to_item(item, smooth_scroll, velocity);
        }
    }

    /// Resting scroll position of `position`'s page, when materialised.
    fn resting_scroll(&self, position: usize) -> Option<Px> {
        let client_width = self.client_width().to_f32();
        self.items
            .find(position)
            .map(|ii| Px::saturating_from_f32(client_width * self.bounds.clamp(ii.offset)))
    }

    fn scroll_to_item(&mut self, item: usize, smooth_scroll: bool, velocity: f32) {
        if smooth_scroll {
            let dest_x = self.resting_scroll(item).unwrap_or(Px::ZERO);
            self.smooth_scroll_to(dest_x, velocity);
        } else {
            // Finishing a settle may repopulate, so look the page up after.
            self.complete_scroll(false);
            let dest_x = self.resting_scroll(item).unwrap_or(Px::ZERO);
            self.scroll_to(dest_x);
            self.page_scrolled(dest_x);
        }
    }

    fn smooth_scroll_to(&mut self, x: Px, velocity: f32) {
        if self.items.is_empty() {
            return;
        }
        let start_x = self.viewport.scroll_x;
        let dx = x - start_x;
        if dx == Px::ZERO {
            self.complete_scroll(false);
            self.populate();
            self.set_scroll_state(ScrollState::Idle);
            return;
        }

        self.set_scroll_state(ScrollState::Settling);
        let page_width = self
            .adapter
            .as_ref()
            .map_or(1.0, |adapter| adapter::page_width(adapter, self.viewport.current_item));
        let duration = settle_duration(dx, self.client_width(), page_width, velocity, &self.config);
        debug!("Settling {dx:?} over {duration:?}");
        self.scroller.start_scroll(start_x, dx, duration);
        self.request(HostRequest::InvalidateOnAnimation);
    }

    fn complete_scroll(&mut self, post_events: bool) {
        let mut need_populate = self.viewport.scroll_state == ScrollState::Settling;
        if need_populate {
            self.scroller.abort_animation();
            let old_x = self.viewport.scroll_x;
            let x = self.scroller.curr_x();
            if old_x != x {
                self.scroll_to(x);
                self.page_scrolled(x);
            }
        }
        self.populate_pending = false;
        for ii in self.items.iter_mut() {
            if ii.scrolling {
                need_populate = true;
                ii.scrolling = false;
            }
        }
        if need_populate {
            if post_events {
                self.end_scroll_pending = true;
                self.request(HostRequest::InvalidateOnAnimation);
            } else {
                self.end_scroll();
            }
        }
    }

    fn end_scroll(&mut self) {
        self.set_scroll_state(ScrollState::Idle);
        self.populate();
    }

    /// Bound the animated position would have to be clamped to, if any.
    fn out_of_bounds(&self, x: Px) -> Option<Px> {
        let width = self.client_width().to_f32();
        let x = x.to_f32();
        let first = width * self.bounds.first;
        let last = width * self.bounds.last;
        if first.is_finite() && x < first {
            Some(Px::saturating_from_f32(first))
        } else if last.is_finite() && x > last {
            Some(Px::saturating_from_f32(last))
        } else {
            None
        }
    }

    fn page_scrolled(&mut self, x: Px) -> bool {
        if self.items.is_empty() {
            return false;
        }

        let delta = (x - self.viewport.last_scroll).to_f32();
        self.viewport.virtual_pos = if self.viewport.reversed {
            self.viewport.virtual_pos + delta
        } else {
            self.viewport.virtual_pos - delta
        };
        self.viewport.last_scroll = x;
        if self.resting_scroll(self.viewport.current_item) == Some(x) {
            self.viewport.virtual_pos = 0.0;
        }

        let width = self.client_width().to_f32();
        let offset = if width > 0.0 {
            self.viewport.virtual_pos / width
        } else {
            0.0
        };
        self.listeners.notify(CardEvent::Scrolled {
            position: self.viewport.current_item,
            offset,
            offset_pixels: Px::saturating_from_f32(self.viewport.virtual_pos),
        });

        self.apply_transforms();
        true
    }

    fn apply_transforms(&mut self) {
        let client_width = self.client_width();
        let width = client_width.to_f32();
        if width <= 0.0 {
            return;
        }
        let padding_left = self.padding_left;
        let scroll_x = self.viewport.scroll_x;
        let virtual_pos = self.viewport.virtual_pos;
        let min_scale = self.config.min_scale;
        for ii in self.items.iter_mut() {
            let left = page_left(padding_left, client_width, ii.offset);
            let position = (left - scroll_x).to_f32() / width;
            ii.transform =
                transform_page(position, width * ii.width_factor, virtual_pos, min_scale);
        }
    }

    fn recompute_scroll_position(&mut self, width: Px, old_width: Px) {
        let padding = self.padding_left + self.padding_right;
        if old_width > Px::ZERO && !self.items.is_empty() {
            let client_width = width - padding;
            let old_client_width = (old_width - padding).to_f32();
            let page_offset = if old_client_width > 0.0 {
                self.viewport.scroll_x.to_f32() / old_client_width
            } else {
                0.0
            };
            let new_x = Px::saturating_from_f32(page_offset * client_width.to_f32());
            debug!("Width changed {old_width:?} -> {width:?}, scroll now {new_x:?}");
            self.scroll_to(new_x);
            self.viewport.last_scroll = new_x;
            self.viewport.virtual_pos *= if old_client_width > 0.0 {
                client_width.to_f32() / old_client_width
            } else {
                1.0
            };

            if !self.scroller.is_finished() {
                let remaining = self.scroller.remaining();
                if let Some(target) = self.items.find(self.viewport.current_item) {
                    let target_x = Px::saturating_from_f32(target.offset * client_width.to_f32());
                    self.scroller.start_scroll(new_x, target_x - new_x, remaining);
                }
            }
        } else {
            let client_width = (width - padding).to_f32();
            let scroll_offset = self
                .items
                .find(self.viewport.current_item)
                .map_or(0.0, |ii| ii.offset.min(self.bounds.last));
            let scroll_pos = Px::saturating_from_f32(scroll_offset * client_width);
            if scroll_pos != self.viewport.scroll_x {
                self.complete_scroll(false);
                self.scroll_to(scroll_pos);
                self.viewport.last_scroll = scroll_pos;
            }
        }
    }

    fn is_catchable(&self) -> bool {
        self.resting_scroll(self.viewport.current_item)
            .is_some_and(|rest| {
                (self.viewport.scroll_x - rest).abs() < self.config.catch_allowance.abs()
            })
    }

    fn start_drag(&mut self, travel: f32, y: f32) {
        // The drag takes over from a settle that was not caught.
        self.scroller.abort_animation();
        self.is_being_dragged = true;
        self.session.last_motion.x = gesture::slop_anchor(
            self.session.initial_motion.x,
            travel,
            self.config.touch_slop,
        );
        self.session.last_motion.y = y;
        self.set_scroll_state(ScrollState::Dragging);
        self.request(HostRequest::DisallowParentIntercept(true));
    }

    /// Follows the pointer to `x`, applying the one-way rule and clamping
    /// the scroll position to the materialised pages.
    fn perform_drag(&mut self, x: f32) -> bool {
        let raw_delta = self.session.last_motion.x - x;
        self.session.last_motion.x = x;

        let (delta, direction) = gesture::one_way_delta(
            self.viewport.virtual_pos,
            self.viewport.locked_direction,
            raw_delta,
        );
        self.viewport.reversed = direction == DragDirection::Right;

        let mut scroll_x = self.viewport.scroll_x.to_f32() + delta;
        let (left_bound, right_bound) = self.drag_bounds();
        if scroll_x < left_bound {
            scroll_x = left_bound;
        } else if scroll_x > right_bound {
            scroll_x = right_bound;
        }
        // Keep the fraction lost to whole pixels.
        self.session.last_motion.x += scroll_x - scroll_x.trunc();

        let scroll_x = Px::saturating_from_f32(scroll_x);
        self.scroll_to(scroll_x);
        let scrolled = self.page_scrolled(scroll_x);
        if let Some(direction) = DragDirection::from_virtual_position(self.viewport.virtual_pos) {
            self.viewport.locked_direction.get_or_insert(direction);
        }
        scrolled
    }

    /// Scroll range a drag may cover, in pixels.
    fn drag_bounds(&self) -> (f32, f32) {
        let width = self.client_width().to_f32();
        let left_bound = self
            .items
            .find(self.viewport.current_item)
            .map_or(0.0, |ii| ii.offset * width);
        let mut right_bound = width * self.bounds.last;
        if let Some(last) = self.items.last()
            && last.position + 1 != self.adapter_count()
        {
            right_bound = last.offset * width;
        }
        (left_bound, right_bound)
    }

    fn release_drag(&mut self, x: f32) {
        let velocity = self
            .session
            .active_pointer
            .map_or(0.0, |id| {
                self.session
                    .velocity
                    .x_velocity(id, self.config.max_fling_velocity)
            })
            .trunc();
        self.populate_pending = true;

        let width = self.client_width().to_f32();
        let scroll_offset = if width > 0.0 {
            self.viewport.scroll_x.to_f32() / width
        } else {
            0.0
        };
        let slot = self
            .adapter
            .as_ref()
            .and_then(|adapter| self.items.slot_for_scroll(adapter, scroll_offset));
        let target = match slot {
            Some(slot) => {
                let release = Release {
                    current_page: slot.position,
                    pivot: self.viewport.current_item,
                    page_offset: scroll_offset - slot.offset,
                    velocity,
                    delta_x: (x - self.session.initial_motion.x) as i32,
                    virtual_pos: self.viewport.virtual_pos,
                    fling_distance: self.config.fling_distance.raw(),
                    min_fling_velocity: self.config.min_fling_velocity,
                    materialised: self
                        .items
                        .first()
                        .zip(self.items.last())
                        .map(|(first, last)| (first.position, last.position)),
                };
                let target = gesture::determine_target_page(&release);
                debug!(?release, ?target, "Drag released");
                if let Some(right) = target.dismissed {
                    self.listeners.notify(CardEvent::Dismissed {
                        position: release.current_page,
                        right,
                    });
                }
                target.page
            }
            None => self.viewport.current_item,
        };

        self.set_current_item_internal(target, true, true, velocity);
        self.session.active_pointer = None;
        self.end_drag();
    }

    fn end_drag(&mut self) {
        self.is_being_dragged = false;
        self.is_unable_to_drag = false;
        self.viewport.locked_direction = None;
        self.session.reset();
    }

    fn active_pointer_in<'e>(&self, event: &'e MotionEvent) -> Option<&'e gesture::Pointer> {
        let index = event.find_pointer_index(self.session.active_pointer?)?;
        event.pointer(index)
    }

    fn on_secondary_pointer_up(&mut self, event: &MotionEvent) {
        let Some(lifted) = event.action_pointer() else {
            return;
        };
        if Some(lifted.id) != self.session.active_pointer {
            return;
        }
        // The active pointer lifted; continue with another one.
        let new_index = if event.action_index == 0 { 1 } else { 0 };
        match event.pointer(new_index) {
            Some(pointer) => {
                trace!("Active pointer handed over to {:?}", pointer.id);
                self.session.last_motion.x = pointer.position.x;
                self.session.active_pointer = Some(pointer.id);
                self.session.velocity.clear();
            }
            None => self.session.active_pointer = None,
        }
    }

    /// The active pointer vanished from the event stream.
    fn abort_stale_pointer(&mut self) {
        warn!(
            "Active pointer {:?} missing from event; aborting gesture",
            self.session.active_pointer
        );
        self.session.active_pointer = None;
        if self.is_being_dragged {
            let current = self.viewport.current_item;
            self.scroll_to_item(current, true, 0.0);
        }
        self.end_drag();
    }
}

fn page_left(padding_left: Px, client_width: Px, offset: f32) -> Px {
    padding_left + Px::saturating_from_f32(client_width.to_f32() * offset)
}
