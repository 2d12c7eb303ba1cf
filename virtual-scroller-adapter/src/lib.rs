//! Adapter utilities for the `virtual-scroller` crate.
//!
//! The `virtual-scroller` crate is UI-agnostic and only decides what to render. This crate
//! provides small, framework-neutral helpers commonly needed by adapters:
//!
//! - An in-memory rendering surface that lays out published records and measures items
//! - A controller that pumps the publish → render → acknowledge loop to a fixed point
//! - Scroll anchoring (e.g. prepend in chat/timelines without visual jumps)
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod controller;
mod surface;

#[cfg(test)]
mod tests;

pub use anchor::{ScrollAnchor, apply_anchor, capture_first_visible_anchor};
pub use controller::Controller;
pub use surface::{ItemHeightFn, MemorySurface};
