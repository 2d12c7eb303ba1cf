use crate::{Revision, VisibleArea};

/// Markers for updates that were published but not rendered yet.
///
/// Priority: item-set replacement > resize > scroll. While a higher-priority
/// update is in flight, lower-priority triggers are suppressed or deferred.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingUpdateFlags {
    pub items_pending: bool,
    pub width_change_pending: bool,
    /// A resize debounce is armed.
    pub is_resizing: bool,
}

impl PendingUpdateFlags {
    pub fn blocks_scroll(&self) -> bool {
        self.items_pending || self.width_change_pending || self.is_resizing
    }

    pub fn blocks_resize(&self) -> bool {
        self.items_pending
    }
}

/// What the coordinator is currently waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    AwaitingScrollStop,
    AwaitingResize,
    /// A published layout has not been rendered yet.
    Recomputing,
}

/// A timer that came due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Resize,
    ScrollStop,
    LayoutShiftCheck,
}

/// What to do with a scroll event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDecision {
    /// The visible area left the window of the last layout pass.
    RecomputeNow,
    /// Recompute once scrolling stops.
    Debounced,
    /// A higher-priority update is in flight.
    Suppressed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LayoutShiftCheck {
    next_at_ms: u64,
    until_ms: u64,
}

/// Timing configuration for [`ScrollCoordinator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinatorTimings {
    pub scroll_stop_delay_ms: u64,
    pub resize_debounce_ms: u64,
    pub layout_shift_check_interval_ms: u64,
    pub layout_shift_check_duration_ms: u64,
}

impl Default for CoordinatorTimings {
    fn default() -> Self {
        Self {
            scroll_stop_delay_ms: 100,
            resize_debounce_ms: 250,
            layout_shift_check_interval_ms: 500,
            layout_shift_check_duration_ms: 3000,
        }
    }
}

/// Decides when a layout pass runs.
///
/// Time is driven by the host (`now_ms`), so the coordinator never sleeps: the
/// host calls [`crate::VirtualScroller::tick`] and may use
/// [`ScrollCoordinator::next_deadline`] to schedule the next call.
#[derive(Clone, Debug)]
pub struct ScrollCoordinator {
    timings: CoordinatorTimings,
    flags: PendingUpdateFlags,
    scroll_stop_at_ms: Option<u64>,
    resize_at_ms: Option<u64>,
    resize_deferred: bool,
    layout_shift_check: Option<LayoutShiftCheck>,
    /// Visible area plus margins used by the last layout pass.
    layout_window: Option<VisibleArea>,
    published: Revision,
    rendered: Option<Revision>,
}

impl ScrollCoordinator {
    pub fn new(timings: CoordinatorTimings) -> Self {
        Self {
            timings,
            flags: PendingUpdateFlags::default(),
            scroll_stop_at_ms: None,
            resize_at_ms: None,
            resize_deferred: false,
            layout_shift_check: None,
            layout_window: None,
            published: Revision::default(),
            rendered: None,
        }
    }

    pub fn flags(&self) -> PendingUpdateFlags {
        self.flags
    }

    pub fn state(&self) -> CoordinatorState {
        if self.resize_at_ms.is_some() {
            CoordinatorState::AwaitingResize
        } else if self.rendered != Some(self.published) && self.published != Revision::default() {
            CoordinatorState::Recomputing
        } else if self.scroll_stop_at_ms.is_some() {
            CoordinatorState::AwaitingScrollStop
        } else {
            CoordinatorState::Idle
        }
    }

    pub fn published_revision(&self) -> Revision {
        self.published
    }

    pub fn rendered_revision(&self) -> Option<Revision> {
        self.rendered
    }

    pub(crate) fn set_layout_window(&mut self, window: VisibleArea) {
        self.layout_window = Some(window);
    }

    /// Allocates the revision for a new publication.
    pub(crate) fn publish(&mut self, items_pending: bool, width_change_pending: bool) -> Revision {
        self.published = self.published.next();
        self.flags.items_pending |= items_pending;
        self.flags.width_change_pending |= width_change_pending;
        self.published
    }

    /// Records a render acknowledgement.
    ///
    /// Returns `false` for a stale revision, which must be ignored.
    pub(crate) fn acknowledge(&mut self, revision: Revision) -> bool {
        if revision != self.published {
            vtrace!(
                revision = revision.0,
                latest = self.published.0,
                "ScrollCoordinator: stale render acknowledgement"
            );
            return false;
        }
        self.rendered = Some(revision);
        self.flags.items_pending = false;
        self.flags.width_change_pending = false;
        true
    }

    /// Takes a resize that fired while an item-set update was in flight.
    pub(crate) fn take_deferred_resize(&mut self) -> bool {
        core::mem::take(&mut self.resize_deferred)
    }

    pub(crate) fn on_scroll(&mut self, visible: VisibleArea, now_ms: u64) -> ScrollDecision {
        if self.flags.blocks_scroll() {
            return ScrollDecision::Suppressed;
        }
        let within = self
            .layout_window
            .map(|window| window.contains(&visible))
            .unwrap_or(false);
        if within {
            self.scroll_stop_at_ms = Some(now_ms.saturating_add(self.timings.scroll_stop_delay_ms));
            ScrollDecision::Debounced
        } else {
            self.scroll_stop_at_ms = None;
            ScrollDecision::RecomputeNow
        }
    }

    pub(crate) fn on_resize(&mut self, now_ms: u64) {
        self.scroll_stop_at_ms = None;
        self.resize_at_ms = Some(now_ms.saturating_add(self.timings.resize_debounce_ms));
        self.flags.is_resizing = true;
    }

    /// Cancels the scroll-stop debounce (a higher-priority pass is about to run).
    pub(crate) fn cancel_scroll_stop(&mut self) {
        self.scroll_stop_at_ms = None;
    }

    pub(crate) fn start_layout_shift_check(&mut self, now_ms: u64) {
        if self.timings.layout_shift_check_duration_ms == 0 {
            return;
        }
        self.layout_shift_check = Some(LayoutShiftCheck {
            next_at_ms: now_ms.saturating_add(self.timings.layout_shift_check_interval_ms),
            until_ms: now_ms.saturating_add(self.timings.layout_shift_check_duration_ms),
        });
    }

    /// Takes the highest-priority timer that is due at `now_ms`.
    pub(crate) fn take_due(&mut self, now_ms: u64) -> Option<Trigger> {
        if let Some(at) = self.resize_at_ms {
            if now_ms >= at {
                self.resize_at_ms = None;
                self.flags.is_resizing = false;
                if self.flags.blocks_resize() {
                    vdebug!("ScrollCoordinator: resize deferred behind an item-set update");
                    self.resize_deferred = true;
                    return self.take_due(now_ms);
                }
                return Some(Trigger::Resize);
            }
        }
        if let Some(at) = self.scroll_stop_at_ms {
            if now_ms >= at {
                self.scroll_stop_at_ms = None;
                if self.flags.blocks_scroll() {
                    return self.take_due(now_ms);
                }
                return Some(Trigger::ScrollStop);
            }
        }
        if let Some(check) = self.layout_shift_check {
            if now_ms >= check.next_at_ms {
                let next_at_ms = check
                    .next_at_ms
                    .saturating_add(self.timings.layout_shift_check_interval_ms);
                self.layout_shift_check = (next_at_ms <= check.until_ms).then_some(LayoutShiftCheck {
                    next_at_ms,
                    until_ms: check.until_ms,
                });
                return Some(Trigger::LayoutShiftCheck);
            }
        }
        None
    }

    /// The earliest time at which a timer fires.
    pub fn next_deadline(&self) -> Option<u64> {
        [
            self.resize_at_ms,
            self.scroll_stop_at_ms,
            self.layout_shift_check.map(|c| c.next_at_ms),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Cancels every timer.
    pub(crate) fn stop(&mut self) {
        self.scroll_stop_at_ms = None;
        self.resize_at_ms = None;
        self.resize_deferred = false;
        self.layout_shift_check = None;
        self.flags.is_resizing = false;
        self.layout_window = None;
    }

    /// Drops the window of the last pass so the next scroll recomputes at once.
    pub(crate) fn invalidate_layout_window(&mut self) {
        self.layout_window = None;
    }
}
