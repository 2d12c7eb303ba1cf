//! A headless virtual-scroller engine for long, dynamically-measured lists.
//!
//! For adapter-level utilities (an in-memory surface, an event-pumping controller,
//! scroll anchoring), see the `virtual-scroller-adapter` crate.
//!
//! The engine decides which contiguous index range of items is materialized and
//! how much empty space stands in for the items above and below it, while item
//! heights are discovered only by measuring rendered items. It supports:
//! - multi-column (grid) layouts with row-aligned shown ranges
//! - a running-average estimate for items that were never measured
//! - a "before resize" snapshot that keeps content in place across width changes
//! - append/prepend of items without losing measured heights or scroll position
//! - persisted state for restoring after a remount
//!
//! It is UI-agnostic. A TUI/GUI layer implements [`ScrollerHost`], which provides:
//! - the visible area, container width and scroll position
//! - measurement of rendered items
//! - a `render` sink for published [`LayoutUpdate`] records
//!
//! Time is driven by the host (`now_ms`), so debounces never sleep.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod context;
mod coordinator;
mod error;
pub mod geometry;
mod heights;
mod host;
pub mod items;
mod key;
mod options;
pub mod resize;
mod scroller;
mod state;
mod types;


pub use context::LayoutContext;
pub use coordinator::{
    CoordinatorState, CoordinatorTimings, PendingUpdateFlags, ScrollCoordinator, ScrollDecision,
    Trigger,
};
pub use error::{Error, ErrorCallback, Result};
pub use geometry::{HeightLookup, RowLayout, ScanInput, ScanOutcome, shown_item_indexes};
pub use heights::ItemHeights;
pub use host::{LayoutUpdate, RenderedItems, ScrollerHost};
pub use items::{ItemsDiff, PrependOutcome};
pub use key::ItemKey;
pub use options::{ColumnsCountFn, ItemKeyFn, ScrollerOptions};
pub use scroller::VirtualScroller;
pub use state::ScrollerState;
pub use types::{
    BeforeResize, LayoutState, Revision, SetItemsOptions, ShownRange, SnapshotSegment, VisibleArea,
};
