use alloc::vec::Vec;

use virtual_scroller::{ItemKey, ScrollerHost, SetItemsOptions, VirtualScroller};

use crate::{MemorySurface, ScrollAnchor, apply_anchor, capture_first_visible_anchor};

/// Upper bound on render/acknowledge round trips in one [`Controller::settle`].
const MAX_SETTLE_PASSES: usize = 64;

/// A framework-neutral controller that owns a `virtual_scroller::VirtualScroller`
/// and a [`MemorySurface`] and runs the publish → render → acknowledge loop.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `scroll_to` / `resize` when UI events occur
/// - `tick(now_ms)` each frame/timer tick (for scroll-stop and resize debouncing)
///
/// After every call the surface holds the settled layout to draw.
#[derive(Debug)]
pub struct Controller<T, K, S = ()> {
    scroller: VirtualScroller<T, K, S>,
    surface: MemorySurface<T, S>,
}

impl<T: Clone, K: ItemKey, S: Clone> Controller<T, K, S> {
    pub fn new(scroller: VirtualScroller<T, K, S>, surface: MemorySurface<T, S>) -> Self {
        Self { scroller, surface }
    }

    pub fn scroller(&self) -> &VirtualScroller<T, K, S> {
        &self.scroller
    }

    pub fn scroller_mut(&mut self) -> &mut VirtualScroller<T, K, S> {
        &mut self.scroller
    }

    pub fn surface(&self) -> &MemorySurface<T, S> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut MemorySurface<T, S> {
        &mut self.surface
    }

    pub fn into_parts(self) -> (VirtualScroller<T, K, S>, MemorySurface<T, S>) {
        (self.scroller, self.surface)
    }

    pub fn start(&mut self, now_ms: u64) {
        self.scroller.start(&mut self.surface, now_ms);
        self.settle();
    }

    pub fn stop(&mut self) {
        self.scroller.stop();
    }

    /// Acknowledges pending renders until the layout reaches a fixed point.
    ///
    /// Returns the number of renders acknowledged.
    pub fn settle(&mut self) -> usize {
        self.settle_at_most(MAX_SETTLE_PASSES)
    }

    /// Like [`Controller::settle`], giving up after `max_passes` renders.
    ///
    /// A render still pending at that point means the layout oscillates.
    pub(crate) fn settle_at_most(&mut self, max_passes: usize) -> usize {
        for passes in 0..max_passes {
            let Some(revision) = self.surface.take_pending() else {
                return passes;
            };
            self.scroller.on_rendered(&mut self.surface, revision);
        }
        let settled = !self.surface.has_pending();
        if !settled {
            vwarn!(max_passes, "Controller::settle: layout did not settle");
        }
        debug_assert!(settled, "layout did not settle after {max_passes} renders");
        max_passes
    }

    /// Scrolls the surface (clamped to the content) and forwards the scroll event.
    ///
    /// Returns the applied scroll position.
    pub fn scroll_to(&mut self, y: f64, now_ms: u64) -> f64 {
        self.surface.scroll_to_y(y);
        self.scroller.on_scroll(&mut self.surface, now_ms);
        self.settle();
        self.surface.scroll_y()
    }

    pub fn scroll_by(&mut self, delta: f64, now_ms: u64) -> f64 {
        let y = self.surface.scroll_y() + delta;
        self.scroll_to(y, now_ms)
    }

    /// Resizes the surface. The scroller reacts once the resize debounce fires in
    /// [`Controller::tick`].
    pub fn resize(&mut self, width: f64, height: f64, now_ms: u64) {
        self.surface.set_size(width, height);
        self.scroller.on_resize(now_ms);
    }

    /// Fires due timers and settles.
    pub fn tick(&mut self, now_ms: u64) {
        self.scroller.tick(&mut self.surface, now_ms);
        self.settle();
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.scroller.next_deadline()
    }

    pub fn set_items(&mut self, items: Vec<T>, options: SetItemsOptions) {
        self.scroller.set_items(&mut self.surface, items, options);
        self.settle();
    }

    pub fn item_height_did_change(&mut self, key: &K) {
        self.scroller.on_item_height_did_change(&mut self.surface, key);
        self.settle();
    }

    pub fn set_item_state(&mut self, key: &K, state: S) -> bool {
        let found = self.scroller.set_item_state(&mut self.surface, key, state);
        self.settle();
        found
    }

    /// Recomputes the layout now (e.g. after the host changed something the
    /// scroller cannot observe).
    pub fn update_layout(&mut self) {
        self.scroller.update_layout(&mut self.surface);
        self.settle();
    }

    pub fn capture_first_visible_anchor(&self) -> Option<ScrollAnchor<K>> {
        capture_first_visible_anchor(&self.scroller, &self.surface)
    }

    /// Applies a previously captured anchor by adjusting the scroll position.
    pub fn apply_anchor(&mut self, anchor: &ScrollAnchor<K>, now_ms: u64) -> bool {
        if !apply_anchor(&self.scroller, &mut self.surface, anchor) {
            return false;
        }
        self.scroller.on_scroll(&mut self.surface, now_ms);
        self.settle();
        true
    }
}
