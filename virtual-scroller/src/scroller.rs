use alloc::vec::Vec;

use crate::coordinator::{CoordinatorTimings, ScrollDecision, Trigger};
use crate::error::Reporter;
use crate::geometry::{self, ScanInput, ScanOutcome};
use crate::items::{self, ItemsDiff, PrependOutcome};
use crate::key::{ItemKey, KeyIndexMap};
use crate::resize;
use crate::{
    CoordinatorState, Error, ItemHeights, LayoutContext, LayoutState, LayoutUpdate,
    PendingUpdateFlags, Result, Revision, ScrollCoordinator, ScrollerHost, ScrollerOptions,
    ScrollerState, SetItemsOptions, ShownRange, VisibleArea,
};

/// Keeps the item at `index` at `top` (relative to the list) across renders,
/// until every height above it is measured.
///
/// Set by a scroll-preserving prepend: the prepended items start out estimated
/// and each measurement above the item would otherwise move it.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ItemAnchor {
    index: usize,
    top: f64,
}

/// Decides which items of a long list are materialized.
///
/// This type holds no UI objects. The host implements [`ScrollerHost`] and drives
/// the scroller with discrete events:
/// - `start` / `stop`
/// - `on_scroll`, `on_resize` and `tick(now_ms)` for timers
/// - `on_rendered(revision)` after it rendered a published [`LayoutUpdate`]
/// - `set_items`, `on_item_height_did_change`, `set_item_state`
///
/// Every event mutates the layout as one unit and, when something changed,
/// publishes the full layout record under a new [`Revision`].
pub struct VirtualScroller<T, K, S = ()> {
    options: ScrollerOptions<T, K>,
    reporter: Reporter,
    items: Vec<T>,
    keys: Vec<K>,
    key_index: KeyIndexMap<K>,
    item_states: Vec<Option<S>>,
    ctx: LayoutContext,
    coordinator: ScrollCoordinator,
    started: bool,
    bypassing: bool,
    restored: bool,
    rendered: Option<ShownRange>,
    anchor: Option<ItemAnchor>,
    container_width: Option<f64>,
    visible_height: Option<f64>,
    list_top_offset: Option<f64>,
}

impl<T, K: ItemKey, S> VirtualScroller<T, K, S> {
    /// Creates a scroller for `items`. Nothing is published until [`Self::start`].
    pub fn new(items: Vec<T>, options: ScrollerOptions<T, K>) -> Result<Self> {
        options.validate()?;
        let count = items.len();
        let mut ctx = LayoutContext::new(count, 1, options.estimated_item_height);
        ctx.layout.vertical_spacing = options.vertical_spacing;
        let mut item_states = Vec::with_capacity(count);
        item_states.resize_with(count, || None);
        vdebug!(count, "VirtualScroller::new");
        Ok(Self::assemble(items, item_states, ctx, options, false))
    }

    /// Restores a scroller from a persisted [`ScrollerState`].
    ///
    /// A malformed state is rejected. A well-formed state whose columns no longer
    /// match the container is repaired on [`Self::start`].
    pub fn restore(state: ScrollerState<T, S>, options: ScrollerOptions<T, K>) -> Result<Self> {
        options.validate()?;
        state.validate()?;
        let ScrollerState {
            items,
            item_heights,
            item_states,
            first_shown_item_index,
            last_shown_item_index,
            before_items_height,
            after_items_height,
            columns_count,
            vertical_spacing,
            before_resize,
        } = state;
        let ctx = LayoutContext {
            heights: ItemHeights::initialize(item_heights),
            layout: LayoutState {
                first_shown_index: first_shown_item_index,
                last_shown_index: last_shown_item_index,
                before_items_height,
                after_items_height,
                columns_count: columns_count.unwrap_or(1),
                vertical_spacing: options.vertical_spacing.or(vertical_spacing),
                before_resize,
            },
            estimated_item_height: options.estimated_item_height,
        };
        vdebug!(count = items.len(), "VirtualScroller::restore");
        Ok(Self::assemble(items, item_states, ctx, options, true))
    }

    fn assemble(
        items: Vec<T>,
        item_states: Vec<Option<S>>,
        ctx: LayoutContext,
        options: ScrollerOptions<T, K>,
        restored: bool,
    ) -> Self {
        let timings = CoordinatorTimings {
            scroll_stop_delay_ms: options.scroll_stop_delay_ms,
            resize_debounce_ms: options.resize_debounce_ms,
            layout_shift_check_interval_ms: options.layout_shift_check_interval_ms,
            layout_shift_check_duration_ms: options.layout_shift_check_duration_ms,
        };
        let mut scroller = Self {
            reporter: Reporter::new(options.on_error.clone()),
            options,
            keys: Vec::new(),
            key_index: KeyIndexMap::<K>::default(),
            items,
            item_states,
            ctx,
            coordinator: ScrollCoordinator::new(timings),
            started: false,
            bypassing: false,
            restored,
            rendered: None,
            anchor: None,
            container_width: None,
            visible_height: None,
            list_top_offset: None,
        };
        scroller.rebuild_keys();
        scroller
    }

    pub fn options(&self) -> &ScrollerOptions<T, K> {
        &self.options
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_count(&self) -> usize {
        self.items.len()
    }

    pub fn layout(&self) -> &LayoutState {
        &self.ctx.layout
    }

    pub fn item_heights(&self) -> &ItemHeights {
        &self.ctx.heights
    }

    pub fn item_states(&self) -> &[Option<S>] {
        &self.item_states
    }

    pub fn shown_range(&self) -> Option<ShownRange> {
        self.ctx.layout.shown_range(self.items.len())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether every item is rendered (the `bypass` option, or an unsupported host).
    pub fn is_bypassing(&self) -> bool {
        self.bypassing
    }

    pub fn coordinator_state(&self) -> CoordinatorState {
        self.coordinator.state()
    }

    pub fn pending_flags(&self) -> PendingUpdateFlags {
        self.coordinator.flags()
    }

    pub fn published_revision(&self) -> Revision {
        self.coordinator.published_revision()
    }

    /// The earliest time at which [`Self::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        if !self.started {
            return None;
        }
        self.coordinator.next_deadline()
    }

    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.key_index.get(key).copied()
    }

    fn rebuild_keys(&mut self) {
        let item_key = &self.options.item_key;
        self.keys = self.items.iter().map(|item| item_key(item)).collect();
        self.key_index.clear();
        for (i, key) in self.keys.iter().enumerate() {
            self.key_index.insert(key.clone(), i);
        }
    }

    fn margin(&self, visible: VisibleArea) -> f64 {
        visible.height() * self.options.prerender_margin_ratio
    }

    /// Starts virtualization and publishes the first layout.
    pub fn start<H: ScrollerHost<T, S> + ?Sized>(&mut self, host: &mut H, now_ms: u64) {
        if self.started {
            vdebug!("VirtualScroller::start: already started");
            return;
        }
        self.started = true;
        self.rendered = None;
        self.anchor = None;

        let supported = host.is_supported();
        if !supported {
            self.reporter.report(Error::Unsupported(
                "the host cannot measure rendered items; rendering every item".into(),
            ));
        }
        if self.options.bypass || !supported {
            self.bypassing = true;
            self.restored = false;
            self.show_everything();
            self.publish(host, false, false);
            return;
        }

        let width = host.container_width();
        let visible = host.visible_area_bounds();
        self.container_width = Some(width);
        self.visible_height = Some(visible.height());
        self.list_top_offset = Some(host.list_top_offset());
        let columns = self.options.columns_for(width);

        if core::mem::take(&mut self.restored) {
            if self.ctx.layout.columns_count != columns || !self.ctx.is_row_aligned() {
                vdebug!(
                    restored_columns = self.ctx.layout.columns_count,
                    columns,
                    "VirtualScroller::start: restored layout does not fit, recomputing"
                );
                self.reset_layout(columns, visible);
            }
        } else {
            self.reset_layout(columns, visible);
        }

        vdebug!(count = self.items.len(), columns, "VirtualScroller::start");
        self.coordinator.start_layout_shift_check(now_ms);
        self.publish(host, false, false);
    }

    /// Stops virtualization and cancels every pending timer.
    pub fn stop(&mut self) {
        vdebug!("VirtualScroller::stop");
        self.coordinator.stop();
        self.started = false;
        self.bypassing = false;
        self.rendered = None;
        self.anchor = None;
    }

    /// Exports a persisted state for restoring after a remount.
    pub fn state(&self) -> ScrollerState<T, S>
    where
        T: Clone,
        S: Clone,
    {
        let layout = &self.ctx.layout;
        ScrollerState {
            items: self.items.clone(),
            item_heights: self.ctx.heights.as_slice().to_vec(),
            item_states: self.item_states.clone(),
            first_shown_item_index: layout.first_shown_index,
            last_shown_item_index: layout.last_shown_index,
            before_items_height: layout.before_items_height,
            after_items_height: layout.after_items_height,
            columns_count: self
                .options
                .columns_count
                .as_ref()
                .map(|_| layout.columns_count),
            vertical_spacing: layout.vertical_spacing,
            before_resize: layout.before_resize.clone(),
        }
    }

    fn reset_layout(&mut self, columns: usize, visible: VisibleArea) {
        let count = self.items.len();
        let margin = self.margin(visible);
        self.ctx.heights.reset(count);
        self.ctx.layout = LayoutState {
            columns_count: columns.max(1),
            vertical_spacing: self.options.vertical_spacing,
            ..LayoutState::default()
        };
        let range = self.ctx.initial_range(visible, margin);
        self.ctx.set_shown_range(range);
    }

    fn show_everything(&mut self) {
        let count = self.items.len();
        let layout = &mut self.ctx.layout;
        layout.first_shown_index = 0;
        layout.last_shown_index = count.saturating_sub(1);
        layout.before_items_height = 0.0;
        layout.after_items_height = 0.0;
        layout.before_resize = None;
    }

    fn publish<H: ScrollerHost<T, S> + ?Sized>(
        &mut self,
        host: &mut H,
        items_pending: bool,
        width_change_pending: bool,
    ) {
        let revision = self.coordinator.publish(items_pending, width_change_pending);
        let layout = &self.ctx.layout;
        let range = layout.shown_indexes(self.items.len());
        vtrace!(
            revision = revision.0,
            first = layout.first_shown_index,
            last = layout.last_shown_index,
            before = layout.before_items_height,
            after = layout.after_items_height,
            "VirtualScroller::publish"
        );
        let update = LayoutUpdate {
            revision,
            items: &self.items[range.clone()],
            first_shown_index: layout.first_shown_index,
            last_shown_index: layout.last_shown_index,
            before_items_height: layout.before_items_height,
            after_items_height: layout.after_items_height,
            columns_count: self
                .options
                .columns_count
                .as_ref()
                .map(|_| layout.columns_count),
            item_heights: &self.ctx.heights.as_slice()[range.clone()],
            item_states: &self.item_states[range],
        };
        host.render(&update);
    }

    fn scroll_by<H: ScrollerHost<T, S> + ?Sized>(host: &mut H, delta: f64) {
        if delta == 0.0 {
            return;
        }
        let y = host.scroll_y() + delta;
        vtrace!(delta, y, "VirtualScroller: compensating scroll");
        host.scroll_to_y(y);
    }

    /// Called by the host once it rendered the layout published under `revision`.
    ///
    /// Measures the rendered items, applies pending scroll compensation, retires
    /// the before-resize snapshot where possible, and runs the next layout pass.
    /// Acknowledgements of superseded revisions are ignored.
    pub fn on_rendered<H: ScrollerHost<T, S> + ?Sized>(&mut self, host: &mut H, revision: Revision) {
        if !self.started || !self.coordinator.acknowledge(revision) {
            return;
        }
        self.rendered = self.ctx.layout.shown_range(self.items.len());
        if self.bypassing {
            return;
        }

        if let Some(range) = self.rendered {
            let newly_measured = self.ctx.heights.measure(&*host, range, &self.reporter);
            if !newly_measured.is_empty() {
                vtrace!(count = newly_measured.len(), "VirtualScroller: measured items");
            }
            if self.options.vertical_spacing.is_none() {
                if let Some(spacing) =
                    resize::measure_vertical_spacing(&*host, range, self.ctx.columns())
                {
                    self.ctx.layout.vertical_spacing = Some(spacing);
                }
            }
        }

        self.keep_anchor_in_place(host);

        let delta = resize::clean_up(&mut self.ctx);
        Self::scroll_by(host, delta);

        if self.coordinator.take_deferred_resize() {
            self.handle_resize(host);
            return;
        }
        self.layout_pass(host);
    }

    /// Scrolls so the anchored item stays where it was, then retires the anchor
    /// once nothing above the item is estimated.
    fn keep_anchor_in_place<H: ScrollerHost<T, S> + ?Sized>(&mut self, host: &mut H) {
        let Some(anchor) = self.anchor else {
            return;
        };
        if anchor.index >= self.items.len() {
            self.anchor = None;
            return;
        }
        let rows = self.ctx.row_layout();
        let top = match host.rendered_item_top_offset(anchor.index) {
            Ok(top) => top,
            Err(_) => {
                let row_start = geometry::align_down(anchor.index, self.ctx.columns());
                rows.before_items_height(row_start, &self.ctx.heights)
            }
        };
        Self::scroll_by(host, top - anchor.top);
        let exact = rows.item_top_offset(anchor.index, &self.ctx.heights).is_some();
        self.anchor = (!exact).then_some(ItemAnchor { top, ..anchor });
    }

    /// Forwards a scroll event from the host.
    pub fn on_scroll<H: ScrollerHost<T, S> + ?Sized>(&mut self, host: &mut H, now_ms: u64) {
        if !self.started || self.bypassing {
            return;
        }
        let visible = host.visible_area_bounds();
        match self.coordinator.on_scroll(visible, now_ms) {
            ScrollDecision::RecomputeNow => {
                vtrace!(top = visible.top, bottom = visible.bottom, "on_scroll: left the window");
                self.layout_pass(host);
            }
            ScrollDecision::Debounced | ScrollDecision::Suppressed => {}
        }
    }

    /// Forwards a container resize event from the host. Handled after a debounce.
    pub fn on_resize(&mut self, now_ms: u64) {
        if !self.started || self.bypassing {
            return;
        }
        self.coordinator.on_resize(now_ms);
    }

    /// Fires every timer that is due at `now_ms`.
    pub fn tick<H: ScrollerHost<T, S> + ?Sized>(&mut self, host: &mut H, now_ms: u64) {
        if !self.started {
            return;
        }
        while let Some(trigger) = self.coordinator.take_due(now_ms) {
            match trigger {
                Trigger::Resize => self.handle_resize(host),
                Trigger::ScrollStop => self.layout_pass(host),
                Trigger::LayoutShiftCheck => {
                    let top = host.list_top_offset();
                    if self.list_top_offset != Some(top) {
                        vdebug!(top, "VirtualScroller: list top offset shifted");
                        self.list_top_offset = Some(top);
                        self.coordinator.cancel_scroll_stop();
                        self.layout_pass(host);
                    }
                }
            }
        }
    }

    fn handle_resize<H: ScrollerHost<T, S> + ?Sized>(&mut self, host: &mut H) {
        if self.bypassing {
            return;
        }
        let width = host.container_width();
        let visible = host.visible_area_bounds();
        let width_changed = self.container_width != Some(width);
        let height_changed = self.visible_height != Some(visible.height());
        self.container_width = Some(width);
        self.visible_height = Some(visible.height());

        if width_changed {
            let columns = self.options.columns_for(width);
            vdebug!(width, columns, "VirtualScroller: container width changed");
            resize::on_width_change(&mut self.ctx, columns);
            self.anchor = None;
            if self.options.vertical_spacing.is_some() {
                self.ctx.layout.vertical_spacing = self.options.vertical_spacing;
                self.ctx.set_shown_range(self.ctx.layout.shown_range(self.items.len()));
            }
            self.coordinator.invalidate_layout_window();
            self.publish(host, false, true);
        } else if height_changed {
            vtrace!(height = visible.height(), "VirtualScroller: container height changed");
            self.layout_pass(host);
        }
    }

    fn layout_pass<H: ScrollerHost<T, S> + ?Sized>(&mut self, host: &mut H) {
        if !self.started || self.bypassing {
            return;
        }
        let previous = self.ctx.layout.clone();
        let count = self.items.len();
        if count == 0 {
            self.ctx.set_shown_range(None);
        } else {
            let visible = host.visible_area_bounds();
            let window = visible.expand(self.margin(visible));
            self.coordinator.set_layout_window(window);
            let input = ScanInput {
                items_count: count,
                columns_count: self.ctx.columns(),
                vertical_spacing: self.ctx.layout.spacing(),
                window,
                before_resize: self.ctx.layout.before_resize.as_ref(),
                measure_items_batch_size: self.options.measure_items_batch_size,
            };
            let outcome = geometry::shown_item_indexes(&input, &self.ctx.heights);
            let range = match outcome {
                ScanOutcome::Shown(range) | ScanOutcome::Measure { range, .. } => Some(range),
                ScanOutcome::Invisible => self.ctx.first_row(),
            };
            self.ctx.set_shown_range(range);
        }
        if self.ctx.layout != previous {
            self.publish(host, false, false);
        }
    }

    /// Recomputes the layout now, unless a higher-priority update is in flight.
    pub fn update_layout<H: ScrollerHost<T, S> + ?Sized>(&mut self, host: &mut H) {
        let flags = self.coordinator.flags();
        if flags.items_pending || flags.width_change_pending {
            return;
        }
        self.coordinator.cancel_scroll_stop();
        self.layout_pass(host);
    }

    /// Replaces the item list.
    ///
    /// Appends and prepends keep the measured heights of existing items; any
    /// other change starts over.
    pub fn set_items<H: ScrollerHost<T, S> + ?Sized>(
        &mut self,
        host: &mut H,
        items: Vec<T>,
        options: SetItemsOptions,
    ) {
        let item_key = &self.options.item_key;
        let keys: Vec<K> = items.iter().map(|item| item_key(item)).collect();
        let diff = items::classify(&self.keys, &keys);
        vdebug!(?diff, count = items.len(), "VirtualScroller::set_items");

        self.items = items;
        self.rebuild_keys();
        self.anchor = None;
        let live = self.started && !self.bypassing;

        match diff {
            ItemsDiff::Unchanged => {}
            ItemsDiff::Append { appended } => {
                items::shift_states(&mut self.item_states, 0, appended);
                items::apply_append(&mut self.ctx, appended);
            }
            ItemsDiff::Prepend {
                prepended,
                appended,
            } => {
                items::shift_states(&mut self.item_states, prepended, appended);
                let preserve = options.preserve_scroll_position_on_prepend && live;
                let old_first = self.ctx.layout.first_shown_index;
                let old_top = if preserve {
                    self.rendered
                        .filter(|r| r.first == old_first)
                        .and_then(|_| host.rendered_item_top_offset(old_first).ok())
                } else {
                    None
                };
                let show_prepended = old_first == 0 && old_top.is_some();
                match items::apply_prepend(&mut self.ctx, prepended, appended, show_prepended) {
                    PrependOutcome::ShownAll => {
                        if let Some(top) = old_top {
                            self.anchor = Some(ItemAnchor {
                                index: prepended,
                                top,
                            });
                        }
                    }
                    PrependOutcome::Shifted { before_delta } => {
                        if preserve {
                            let old_before = self.ctx.layout.before_items_height - before_delta;
                            self.anchor = Some(ItemAnchor {
                                index: old_first + prepended,
                                top: old_top.unwrap_or(old_before),
                            });
                        }
                    }
                    PrependOutcome::Reset => self.reset_for_new_items(host),
                }
            }
            ItemsDiff::Replace => {
                self.item_states.clear();
                self.item_states.resize_with(self.items.len(), || None);
                self.restored = false;
                self.reset_for_new_items(host);
            }
        }

        if !self.started {
            return;
        }
        if self.bypassing {
            self.show_everything();
        }
        self.coordinator.invalidate_layout_window();
        self.publish(host, live, false);
    }

    fn reset_for_new_items<H: ScrollerHost<T, S> + ?Sized>(&mut self, host: &H) {
        let columns = self.ctx.columns();
        let visible = if self.started {
            host.visible_area_bounds()
        } else {
            VisibleArea::default()
        };
        self.reset_layout(columns, visible);
    }

    /// Tells the scroller that the item identified by `key` changed height.
    pub fn on_item_height_did_change<H: ScrollerHost<T, S> + ?Sized>(
        &mut self,
        host: &mut H,
        key: &K,
    ) {
        let Some(index) = self.index_of(key) else {
            vwarn!("on_item_height_did_change: unknown item key");
            return;
        };
        if !self.started || self.bypassing {
            return;
        }
        match self.rendered {
            Some(rendered) if rendered.contains(index) => {
                if let Err(err) = self.ctx.heights.remeasure_one(&*host, index) {
                    self.reporter.report(err);
                    return;
                }
            }
            _ => self.ctx.heights.forget(index),
        }
        self.update_layout(host);
    }

    /// Stores a custom state for the item identified by `key` and re-publishes.
    ///
    /// Returns `false` for an unknown key.
    pub fn set_item_state<H: ScrollerHost<T, S> + ?Sized>(
        &mut self,
        host: &mut H,
        key: &K,
        state: S,
    ) -> bool {
        let Some(index) = self.index_of(key) else {
            return false;
        };
        self.item_states[index] = Some(state);
        if self.started {
            self.publish(host, false, false);
        }
        true
    }

    pub fn item_state(&self, key: &K) -> Option<&S> {
        let index = self.index_of(key)?;
        self.item_states.get(index)?.as_ref()
    }

    /// Scroll position of the item identified by `key` inside the scrollable region.
    ///
    /// Returns `None` when the item is unknown or a height above it is not
    /// measured yet.
    pub fn item_scroll_position<H: ScrollerHost<T, S> + ?Sized>(
        &self,
        host: &H,
        key: &K,
    ) -> Option<f64> {
        let index = self.index_of(key)?;
        let top = self
            .ctx
            .row_layout()
            .item_top_offset(index, &self.ctx.heights)?;
        Some(host.list_top_offset() + top)
    }
}

impl<T, K, S> core::fmt::Debug for VirtualScroller<T, K, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualScroller")
            .field("items_count", &self.items.len())
            .field("layout", &self.ctx.layout)
            .field("started", &self.started)
            .field("bypassing", &self.bypassing)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}
