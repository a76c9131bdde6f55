//! Pointer input and drag classification.
//!
//! The pager receives raw pointer events from the host. This module holds the
//! event types and the pure decisions made on them: whether a press turns
//! into a horizontal drag, which way a dragged card is allowed to move, and
//! which page a released drag settles on.
//!
//! # Invariants
//!
//! 1. A gesture is `Idle`, `DeciderPending`, `Dragging` or `Settling`; see
//!    [`GesturePhase`].
//! 2. Once a card has moved away from its resting place in one direction, it
//!    cannot be dragged across that place into the other direction during
//!    the same drag.
//! 3. A release only targets pages that are materialised.

use std::time::Instant;

use smallvec::{SmallVec, smallvec};

use crate::{px::PxPosition, velocity::VelocityTracker};

/// Share of horizontal travel that has to exceed vertical travel before an
/// intercepted press becomes a drag.
const INTERCEPT_HORIZONTAL_BIAS: f32 = 0.5;

/// Rounding bias toward staying on the current page when moving forward.
const FORWARD_TRUNCATOR: f32 = 0.4;
/// Rounding bias used when the page under the pointer is behind the pivot.
const BACKWARD_TRUNCATOR: f32 = 0.6;

/// Identifies a pointer for the duration of its contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u32);

/// One pointer inside a [`MotionEvent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Identifier stable across events.
    pub id: PointerId,
    /// Position relative to the pager.
    pub position: PxPosition,
}

impl Pointer {
    /// Creates a pointer.
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self {
            id: PointerId(id),
            position: PxPosition::new(x, y),
        }
    }
}

/// What happened in a [`MotionEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionAction {
    /// The first pointer touched down.
    Down,
    /// One or more pointers moved.
    Move,
    /// The last pointer lifted.
    Up,
    /// The host took the gesture away.
    Cancel,
    /// An additional pointer touched down, see [`MotionEvent::action_index`].
    PointerDown,
    /// A non-final pointer lifted, see [`MotionEvent::action_index`].
    PointerUp,
}

/// A pointer event as delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionEvent {
    /// The action.
    pub action: MotionAction,
    /// Index into `pointers` of the pointer that went down or up, for
    /// [`MotionAction::PointerDown`] and [`MotionAction::PointerUp`].
    pub action_index: usize,
    /// Every pointer currently in contact.
    pub pointers: SmallVec<[Pointer; 4]>,
    /// When the event happened.
    pub timestamp: Instant,
    /// Non-zero when the press started at a screen edge.
    pub edge_flags: u32,
}

impl MotionEvent {
    /// A single-pointer event.
    pub fn single(action: MotionAction, pointer: Pointer, timestamp: Instant) -> Self {
        Self {
            action,
            action_index: 0,
            pointers: smallvec![pointer],
            timestamp,
            edge_flags: 0,
        }
    }

    /// A multi-pointer event.
    pub fn multi(
        action: MotionAction,
        action_index: usize,
        pointers: impl IntoIterator<Item = Pointer>,
        timestamp: Instant,
    ) -> Self {
        Self {
            action,
            action_index,
            pointers: pointers.into_iter().collect(),
            timestamp,
            edge_flags: 0,
        }
    }

    /// Marks the event as starting at a screen edge.
    pub fn with_edge_flags(mut self, edge_flags: u32) -> Self {
        self.edge_flags = edge_flags;
        self
    }

    /// Index of the pointer with `id`.
    pub fn find_pointer_index(&self, id: PointerId) -> Option<usize> {
        self.pointers.iter().position(|p| p.id == id)
    }

    /// Pointer at `index`.
    pub fn pointer(&self, index: usize) -> Option<&Pointer> {
        self.pointers.get(index)
    }

    /// The pointer that went down or up.
    pub fn action_pointer(&self) -> Option<&Pointer> {
        self.pointers.get(self.action_index)
    }
}

/// Phase of the gesture state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    /// No gesture and no animation.
    #[default]
    Idle,
    /// A pointer is down but its direction is not classified yet.
    DeciderPending,
    /// A horizontal drag is moving the cards.
    Dragging,
    /// Cards are animating to a resting place.
    Settling,
}

/// Direction a dragged card moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragDirection {
    /// The card follows the pointer to the left.
    Left,
    /// The card follows the pointer to the right.
    Right,
}

impl DragDirection {
    /// Direction matching the sign of a virtual drag position.
    pub fn from_virtual_position(virtual_pos: f32) -> Option<Self> {
        if virtual_pos > 0.0 {
            Some(Self::Right)
        } else if virtual_pos < 0.0 {
            Some(Self::Left)
        } else {
            None
        }
    }
}

/// Pointer state for one gesture, from press to release.
#[derive(Debug, Default)]
pub struct PointerSession {
    /// The pointer driving the drag.
    pub active_pointer: Option<PointerId>,
    /// Where the active pointer pressed.
    pub initial_motion: PxPosition,
    /// Where the last processed motion happened.
    pub last_motion: PxPosition,
    pub(crate) velocity: VelocityTracker,
}

impl PointerSession {
    /// Starts tracking `pointer` as the active pointer.
    pub(crate) fn begin(&mut self, pointer: &Pointer) {
        self.initial_motion = pointer.position;
        self.last_motion = pointer.position;
        self.active_pointer = Some(pointer.id);
    }

    /// Forgets the active pointer and the velocity samples.
    pub(crate) fn reset(&mut self) {
        self.active_pointer = None;
        self.velocity.clear();
    }
}

/// Outcome of watching a pressed pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragDecision {
    /// Neither slop has been crossed.
    Undecided,
    /// The pointer moved far enough sideways to drag cards.
    Horizontal,
    /// The pointer moved vertically, the gesture belongs to a child.
    Vertical,
}

/// Classifies a move for an intercepted press.
///
/// `x_diff` is the horizontal distance from the last motion and `y_diff` the
/// vertical distance from the press.
pub fn decide_intercept(x_diff: f32, y_diff: f32, touch_slop: f32) -> DragDecision {
    if x_diff > touch_slop && x_diff * INTERCEPT_HORIZONTAL_BIAS > y_diff {
        DragDecision::Horizontal
    } else if y_diff > touch_slop {
        DragDecision::Vertical
    } else {
        DragDecision::Undecided
    }
}

/// Classifies a move for a press delivered to the pager directly.
///
/// Both distances are measured from the last motion. A press the pager owns
/// never hands over to a child, so there is no vertical outcome.
pub fn decide_direct(x_diff: f32, y_diff: f32, touch_slop: f32) -> DragDecision {
    if x_diff > touch_slop && x_diff > y_diff {
        DragDecision::Horizontal
    } else {
        DragDecision::Undecided
    }
}

/// Pointer x to continue the drag from once it starts, one slop away from
/// the press in the direction of travel. Starting there avoids a visible
/// jump by the slop distance.
pub fn slop_anchor(initial_x: f32, travel: f32, touch_slop: f32) -> f32 {
    if travel > 0.0 {
        initial_x + touch_slop
    } else {
        initial_x - touch_slop
    }
}

/// Applies the one-way drag rule to a raw scroll delta.
///
/// `raw_delta` is `last_x - x`, positive when the pointer moves left. The
/// returned delta always scrolls toward the next page while the card moves
/// away from its resting place, and back toward the resting place when the
/// pointer reverses. Scroll deltas add to the virtual position for a card
/// moving [`DragDirection::Right`] and subtract from it otherwise.
pub fn one_way_delta(
    virtual_pos: f32,
    locked: Option<DragDirection>,
    raw_delta: f32,
) -> (f32, DragDirection) {
    let direction = DragDirection::from_virtual_position(virtual_pos)
        .or(locked)
        .unwrap_or(if raw_delta < 0.0 {
            DragDirection::Right
        } else {
            DragDirection::Left
        });
    match direction {
        DragDirection::Right => (-raw_delta, direction),
        DragDirection::Left => (raw_delta, direction),
    }
}

/// Inputs for choosing the page a released drag settles on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    /// Page under the current scroll position.
    pub current_page: usize,
    /// The pager's current (pivot) position.
    pub pivot: usize,
    /// Scroll position past `current_page`'s offset, in viewport widths.
    pub page_offset: f32,
    /// Horizontal release velocity, pixels per second.
    pub velocity: f32,
    /// Horizontal pointer travel since the press, in whole pixels.
    pub delta_x: i32,
    /// Signed card displacement; positive to the right.
    pub virtual_pos: f32,
    /// Travel a fling must exceed.
    pub fling_distance: i32,
    /// Velocity a fling must exceed.
    pub min_fling_velocity: f32,
    /// Lowest and highest materialised positions.
    pub materialised: Option<(usize, usize)>,
}

/// The result of classifying a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseTarget {
    /// Page to settle on.
    pub page: usize,
    /// `Some(right)` when the page under the pointer was dismissed.
    pub dismissed: Option<bool>,
}

/// Picks the settle target for a released drag.
///
/// A fling dismisses the card when it moves in the direction the card is
/// already displaced. Anything slower settles on the nearest page, rounded
/// with a bias toward staying.
pub fn determine_target_page(release: &Release) -> ReleaseTarget {
    let Release {
        current_page,
        pivot,
        page_offset,
        velocity,
        delta_x,
        virtual_pos,
        fling_distance,
        min_fling_velocity,
        materialised,
    } = *release;

    let is_fling = delta_x.unsigned_abs() > fling_distance.unsigned_abs()
        && velocity.abs() > min_fling_velocity;
    let mut target = if is_fling {
        let toward_right = velocity > 0.0;
        let card_on_right = virtual_pos >= 0.0;
        if toward_right == card_on_right {
            current_page as f32 + 1.0
        } else {
            current_page as f32
        }
    } else {
        let truncator = if current_page >= pivot {
            FORWARD_TRUNCATOR
        } else {
            BACKWARD_TRUNCATOR
        };
        (current_page as f32 + page_offset + truncator).trunc()
    };

    if let Some((first, last)) = materialised {
        target = target.max(first as f32).min(last as f32);
    }
    let page = if target.is_finite() && target > 0.0 {
        target as usize
    } else {
        0
    };

    ReleaseTarget {
        page,
        dismissed: (page > current_page).then_some(virtual_pos > 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slow_release(page_offset: f32) -> Release {
        Release {
            current_page: 0,
            pivot: 0,
            page_offset,
            velocity: 0.0,
            delta_x: 0,
            virtual_pos: page_offset * 400.0,
            fling_distance: 25,
            min_fling_velocity: 800.0,
            materialised: Some((0, 2)),
        }
    }

    #[test]
    fn intercept_requires_mostly_horizontal_travel() {
        assert_eq!(decide_intercept(20.0, 5.0, 16.0), DragDecision::Horizontal);
        // Horizontal, but half of it does not beat the vertical travel.
        assert_eq!(decide_intercept(20.0, 12.0, 16.0), DragDecision::Undecided);
        assert_eq!(decide_intercept(10.0, 17.0, 16.0), DragDecision::Vertical);
        assert_eq!(decide_intercept(10.0, 10.0, 16.0), DragDecision::Undecided);
    }

    #[test]
    fn direct_presses_never_turn_vertical() {
        assert_eq!(decide_direct(20.0, 12.0, 16.0), DragDecision::Horizontal);
        assert_eq!(decide_direct(20.0, 30.0, 16.0), DragDecision::Undecided);
        assert_eq!(decide_direct(5.0, 300.0, 16.0), DragDecision::Undecided);
    }

    #[test]
    fn slop_anchor_follows_travel() {
        assert_eq!(slop_anchor(100.0, 20.0, 16.0), 116.0);
        assert_eq!(slop_anchor(100.0, -20.0, 16.0), 84.0);
    }

    #[test]
    fn one_way_delta_scrolls_forward_from_rest() {
        // Pointer moving right from rest: card moves right, scroll forward.
        assert_eq!(one_way_delta(0.0, None, -5.0), (5.0, DragDirection::Right));
        // Pointer moving left from rest: card moves left, scroll forward.
        assert_eq!(one_way_delta(0.0, None, 5.0), (5.0, DragDirection::Left));
    }

    #[test]
    fn one_way_delta_reverses_toward_rest() {
        // Card on the right, pointer moves left: scroll back toward rest.
        assert_eq!(one_way_delta(30.0, None, 5.0), (-5.0, DragDirection::Right));
        // Card on the left, pointer moves right: scroll back toward rest.
        assert_eq!(one_way_delta(-30.0, None, -5.0), (-5.0, DragDirection::Left));
        // Back at rest with a locked direction the card cannot cross over.
        assert_eq!(
            one_way_delta(0.0, Some(DragDirection::Right), 5.0),
            (-5.0, DragDirection::Right)
        );
    }

    #[test]
    fn fast_fling_dismisses_forward() {
        let release = Release {
            velocity: 2000.0,
            delta_x: 200,
            virtual_pos: 150.0,
            ..slow_release(0.3)
        };
        assert_eq!(
            determine_target_page(&release),
            ReleaseTarget {
                page: 1,
                dismissed: Some(true),
            }
        );

        let leftward = Release {
            velocity: -2000.0,
            delta_x: -200,
            virtual_pos: -150.0,
            ..slow_release(0.3)
        };
        assert_eq!(
            determine_target_page(&leftward),
            ReleaseTarget {
                page: 1,
                dismissed: Some(false),
            }
        );
    }

    #[test]
    fn fling_against_the_card_stays() {
        let release = Release {
            velocity: -2000.0,
            delta_x: 200,
            virtual_pos: 150.0,
            ..slow_release(0.3)
        };
        assert_eq!(determine_target_page(&release).page, 0);
        assert_eq!(determine_target_page(&release).dismissed, None);
    }

    #[test]
    fn short_fling_falls_back_to_rounding() {
        let release = Release {
            velocity: 5000.0,
            delta_x: 20,
            ..slow_release(0.1)
        };
        assert_eq!(determine_target_page(&release).page, 0);
    }

    #[test]
    fn slow_release_rounds_with_forward_bias() {
        assert_eq!(determine_target_page(&slow_release(0.1)).page, 0);
        assert_eq!(determine_target_page(&slow_release(0.5)).page, 0);
        let advanced = determine_target_page(&slow_release(0.61));
        assert_eq!(advanced.page, 1);
        assert_eq!(advanced.dismissed, Some(true));
    }

    #[test]
    fn backward_pages_use_the_larger_truncator() {
        let release = Release {
            current_page: 1,
            pivot: 2,
            ..slow_release(0.45)
        };
        // 1 + 0.45 + 0.6
        assert_eq!(determine_target_page(&release).page, 2);
    }

    #[test]
    fn target_is_clamped_to_materialised_pages() {
        let release = Release {
            current_page: 2,
            pivot: 2,
            velocity: 3000.0,
            delta_x: 300,
            virtual_pos: 10.0,
            ..slow_release(0.2)
        };
        let target = determine_target_page(&release);
        assert_eq!(target.page, 2);
        assert_eq!(target.dismissed, None);
    }

    #[test]
    fn finds_pointers_by_id() {
        let now = Instant::now();
        let event = MotionEvent::multi(
            MotionAction::PointerUp,
            1,
            [Pointer::new(3, 0.0, 0.0), Pointer::new(7, 10.0, 5.0)],
            now,
        );
        assert_eq!(event.find_pointer_index(PointerId(7)), Some(1));
        assert_eq!(event.find_pointer_index(PointerId(9)), None);
        assert_eq!(event.action_pointer().map(|p| p.id), Some(PointerId(7)));
    }
}
