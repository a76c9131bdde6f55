//! Observers for card movement.
//!
//! ## Usage
//!
//! Register a [`CardChangeListener`] to learn when cards are dragged,
//! dismissed, or come to rest. Every method has a no-op default, implement
//! only what you need.
//!
//! ```
//! use card_pager::listener::{CardChangeListener, ScrollState};
//!
//! struct LikeCounter {
//!     likes: usize,
//! }
//!
//! impl CardChangeListener for LikeCounter {
//!     fn on_card_dismissed(&mut self, _position: usize, right: bool) {
//!         if right {
//!             self.likes += 1;
//!         }
//!     }
//! }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::px::Px;

/// Scroll phase of the pager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollState {
    /// Settled, the current card is fully in view and nothing animates.
    #[default]
    Idle,
    /// The user is dragging a card.
    Dragging,
    /// A card is animating to its final position.
    Settling,
}

/// One notification delivered to listeners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CardEvent {
    /// The current card moved.
    Scrolled {
        /// Position of the card being displayed.
        position: usize,
        /// Signed offset in `[-1, 1)` page widths; positive to the right.
        offset: f32,
        /// Signed offset in pixels.
        offset_pixels: Px,
    },
    /// The current card was dismissed. The animation may still run.
    Dismissed {
        /// Position of the dismissed card.
        position: usize,
        /// True if it left through the right edge.
        right: bool,
    },
    /// The scroll state changed.
    ScrollStateChanged(ScrollState),
}

/// Callbacks for card movement.
pub trait CardChangeListener {
    /// Called whenever the current card is scrolled, by touch or animation.
    fn on_card_scrolled(&mut self, _position: usize, _offset: f32, _offset_pixels: Px) {}

    /// Called when the current card is dismissed.
    fn on_card_dismissed(&mut self, _position: usize, _right: bool) {}

    /// Called when the scroll state changes.
    fn on_scroll_state_changed(&mut self, _state: ScrollState) {}

    /// Routes an event record to the matching callback.
    fn on_card_event(&mut self, event: &CardEvent) {
        match *event {
            CardEvent::Scrolled {
                position,
                offset,
                offset_pixels,
            } => self.on_card_scrolled(position, offset, offset_pixels),
            CardEvent::Dismissed { position, right } => self.on_card_dismissed(position, right),
            CardEvent::ScrollStateChanged(state) => self.on_scroll_state_changed(state),
        }
    }
}

/// A listener that records every event, for hosts that poll instead of
/// reacting to callbacks.
///
/// Clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<CardEvent>>>,
}

impl EventRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the recorded events, oldest first.
    pub fn take_events(&self) -> Vec<CardEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Returns a copy of the recorded events without clearing them.
    pub fn events(&self) -> Vec<CardEvent> {
        self.events.lock().clone()
    }
}

impl CardChangeListener for EventRecorder {
    fn on_card_event(&mut self, event: &CardEvent) {
        self.events.lock().push(*event);
    }
}

new_key_type! {
    /// Identifies a registered listener.
    pub struct ListenerId;
}

/// Registered listeners.
#[derive(Default)]
pub(crate) struct Listeners {
    slots: SlotMap<ListenerId, Box<dyn CardChangeListener>>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Box<dyn CardChangeListener>) -> ListenerId {
        self.slots.insert(listener)
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> Option<Box<dyn CardChangeListener>> {
        self.slots.remove(id)
    }

    pub(crate) fn notify(&mut self, event: CardEvent) {
        for listener in self.slots.values_mut() {
            listener.on_card_event(&event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StateOnly {
        states: Vec<ScrollState>,
    }

    impl CardChangeListener for StateOnly {
        fn on_scroll_state_changed(&mut self, state: ScrollState) {
            self.states.push(state);
        }
    }

    #[test]
    fn default_methods_ignore_other_events() {
        let mut listener = StateOnly::default();
        listener.on_card_event(&CardEvent::Dismissed {
            position: 0,
            right: true,
        });
        listener.on_card_event(&CardEvent::ScrollStateChanged(ScrollState::Dragging));
        assert_eq!(listener.states, vec![ScrollState::Dragging]);
    }

    #[test]
    fn recorder_clones_share_a_log() {
        let recorder = EventRecorder::new();
        let mut listeners = Listeners::default();
        let id = listeners.add(Box::new(recorder.clone()));
        listeners.notify(CardEvent::ScrollStateChanged(ScrollState::Settling));
        assert_eq!(
            recorder.take_events(),
            vec![CardEvent::ScrollStateChanged(ScrollState::Settling)]
        );
        assert!(recorder.events().is_empty());

        assert!(listeners.remove(id).is_some());
        listeners.notify(CardEvent::ScrollStateChanged(ScrollState::Idle));
        assert!(recorder.events().is_empty());
        assert_eq!(listeners.len(), 0);
    }
}
