//! card-pager is a swipeable card stack: a horizontally paging container
//! where the top card is dragged away to dismiss it and the cards behind it
//! scale up to take its place.
//!
//! # Overview
//!
//! The crate holds the widget core only. A host toolkit owns the actual
//! views and drives a [`CardPager`] from its event loop:
//!
//! - pointer events go to [`CardPager::on_intercept_touch_event`] and
//!   [`CardPager::on_touch_event`],
//! - [`CardPager::measure`] and [`CardPager::layout`] run on layout passes,
//! - [`CardPager::compute_scroll`] runs once per animation frame.
//!
//! Pages come from a [`CardAdapter`], which creates and destroys the views
//! for positions in the data set. Only the current page and a configurable
//! number of neighbours are materialised at a time; see
//! [`CardPagerConfig::offscreen_page_limit`].
//!
//! # One-way dismissal
//!
//! Once a drag moves the top card in one direction, it can not be dragged
//! back past its resting position in the same gesture. Releasing far enough
//! or fast enough dismisses the card, which is reported to every
//! [`CardChangeListener`] as [`CardEvent::Dismissed`]. There is no way to
//! go back to a dismissed card by dragging.
//!
//! # Logging
//!
//! Page churn is logged at `debug` and per-event gesture decisions at
//! `trace` through [`tracing`]. Install any subscriber to see them.

pub mod adapter;
pub mod config;
pub mod dp;
pub mod error;
pub mod gesture;
pub mod listener;
pub mod offsets;
pub mod pager;
mod populate;
pub mod px;
pub mod registry;
pub mod settle;
pub mod transform;
pub mod velocity;

pub use adapter::{CardAdapter, ItemPosition};
pub use config::{CardPagerConfig, ResolvedConfig};
pub use error::{CardPagerError, Result};
pub use listener::{CardChangeListener, CardEvent, EventRecorder, ListenerId, ScrollState};
pub use pager::{CardPager, HostRequest, SavedState, ViewportState};
pub use registry::PageRecord;
pub use transform::PageTransform;
