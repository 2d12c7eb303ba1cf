use crate::*;

use alloc::vec::Vec;
use virtual_scroller::{
    Error, LayoutUpdate, RenderedItems, Revision, ScrollerHost, ScrollerOptions, SetItemsOptions,
    ShownRange, VirtualScroller,
};

fn ids(range: core::ops::Range<u32>) -> Vec<u32> {
    range.collect()
}

/// 9 rows of height 200 separated by 100, in a 400 × 400 viewport.
fn timeline() -> Controller<u32, u32, &'static str> {
    let scroller = VirtualScroller::new(ids(0..9), ScrollerOptions::by_value()).unwrap();
    let surface = MemorySurface::new(400.0, 400.0, |_: &u32, _| 200.0).with_vertical_spacing(100.0);
    let mut c = Controller::new(scroller, surface);
    c.start(0);
    c
}

#[test]
fn controller_settles_after_every_event() {
    let mut c = timeline();
    assert!(!c.surface().has_pending());
    assert_eq!(c.surface().rendered_range(), Some(ShownRange::new(0, 2)));
    assert_eq!(c.scroller().layout().vertical_spacing, Some(100.0));
    assert_eq!(c.surface().content_height(), 9.0 * 300.0 - 100.0);

    assert_eq!(c.scroll_to(599.0, 10), 599.0);
    assert_eq!(c.surface().rendered_range(), Some(ShownRange::new(0, 4)));

    // Clamped to the content.
    assert_eq!(c.scroll_to(10_000.0, 20), c.surface().max_scroll_y());
    assert_eq!(c.surface().rendered_range().map(|r| r.last), Some(8));

    assert!(c.set_item_state(&8, "open"));
    let states = c.surface().rendered_item_states();
    assert_eq!(states.last(), Some(&Some("open")));
}

fn started_but_unsettled() -> Controller<u32, u32> {
    let mut scroller = VirtualScroller::new(ids(0..9), ScrollerOptions::by_value()).unwrap();
    let mut surface = MemorySurface::new(400.0, 400.0, |_: &u32, _| 200.0);
    scroller.start(&mut surface, 0);
    Controller::new(scroller, surface)
}

#[test]
fn settle_acknowledges_every_pending_render() {
    let mut c = started_but_unsettled();
    assert!(c.surface().has_pending());
    let passes = c.settle_at_most(64);
    assert!(passes > 0 && passes < 64);
    assert!(!c.surface().has_pending());
    assert_eq!(c.settle(), 0);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "layout did not settle")]
fn settle_flags_a_layout_that_keeps_rendering() {
    let mut c = started_but_unsettled();
    c.settle_at_most(0);
}

#[test]
fn anchor_can_preserve_scroll_across_prepend() {
    let mut c = timeline();
    c.scroll_to(1200.0, 10);
    assert_eq!(c.surface().rendered_range(), Some(ShownRange::new(2, 6)));

    let anchor = c.capture_first_visible_anchor().unwrap();
    assert_eq!(anchor.key, 4);
    assert_eq!(anchor.offset_in_viewport, 0.0);

    // Load older items without asking the scroller to keep the position.
    let mut items = ids(100..104);
    items.extend(0..9);
    c.set_items(items, SetItemsOptions::default());
    assert_eq!(c.surface().scroll_y(), 1200.0);

    assert!(c.apply_anchor(&anchor, 20));
    assert_eq!(c.surface().scroll_y(), 2400.0);
    assert_eq!(c.capture_first_visible_anchor(), Some(anchor));

    let missing = ScrollAnchor {
        key: 42,
        offset_in_viewport: 0.0,
    };
    assert!(!c.apply_anchor(&missing, 30));
}

#[test]
fn prepend_with_scroll_preservation_keeps_the_anchor() {
    let mut c = timeline();
    let anchor = c.capture_first_visible_anchor().unwrap();
    assert_eq!(anchor.key, 0);

    let mut items = ids(100..103);
    items.extend(0..9);
    let options = SetItemsOptions {
        preserve_scroll_position_on_prepend: true,
    };
    c.set_items(items, options);
    assert_eq!(c.surface().scroll_y(), 900.0);
    assert_eq!(c.capture_first_visible_anchor(), Some(anchor));
}

#[test]
fn grid_resize_keeps_rows_above_in_place() {
    let options = ScrollerOptions::by_value()
        .with_columns_count(|width| if width < 500.0 { 2 } else { 3 });
    let scroller: VirtualScroller<u32, u32> = VirtualScroller::new(ids(0..60), options).unwrap();
    // Items wrap like text: narrower columns make taller items.
    let surface = MemorySurface::new(400.0, 400.0, |_: &u32, column_width| 16000.0 / column_width)
        .with_vertical_spacing(20.0);
    let mut c = Controller::new(scroller, surface);
    c.start(0);
    assert_eq!(c.surface().columns_count(), 2);

    c.scroll_to(1000.0, 10);
    assert_eq!(c.surface().rendered_range(), Some(ShownRange::new(12, 35)));
    assert_eq!(c.surface().before_items_height(), 600.0);

    c.resize(900.0, 400.0, 20);
    assert_eq!(c.next_deadline(), Some(270));
    c.tick(269);
    assert_eq!(c.surface().columns_count(), 2);
    c.tick(270);

    assert_eq!(c.surface().columns_count(), 3);
    let layout = c.scroller().layout();
    assert_eq!(layout.first_shown_index, 12);
    assert_eq!(layout.before_resize.as_ref().map(|s| s.len()), Some(12));
    assert_eq!(c.surface().before_items_height(), 600.0);
    assert_eq!(c.surface().rendered_item_height(12), Ok(16000.0 / 300.0));

    c.scroll_to(0.0, 300);
    let layout = c.scroller().layout();
    assert_eq!(layout.first_shown_index, 0);
    assert!(layout.before_resize.is_none());
}

#[test]
fn unsupported_surface_renders_everything() {
    let scroller: VirtualScroller<u32, u32> =
        VirtualScroller::new(ids(0..20), ScrollerOptions::by_value()).unwrap();
    let mut surface = MemorySurface::new(400.0, 100.0, |_: &u32, _| 50.0);
    surface.set_supported(false);
    let mut c = Controller::new(scroller, surface);
    c.start(0);
    assert!(c.scroller().is_bypassing());
    assert_eq!(c.surface().rendered_items(), ids(0..20).as_slice());
    assert_eq!(c.surface().content_height(), 1000.0);
}

#[test]
fn surface_lays_out_rows_and_rejects_unrendered_items() {
    let mut surface: MemorySurface<u32> =
        MemorySurface::new(300.0, 200.0, |id: &u32, _| 10.0 * (*id as f64 + 1.0)).with_vertical_spacing(5.0);
    let items = ids(4..9);
    let heights = [None; 5];
    let states = [None; 5];
    let update = LayoutUpdate {
        revision: Revision(7),
        items: &items,
        first_shown_index: 4,
        last_shown_index: 8,
        before_items_height: 100.0,
        after_items_height: 40.0,
        columns_count: Some(2),
        item_heights: &heights,
        item_states: &states,
    };
    surface.render(&update);

    assert_eq!(surface.take_pending(), Some(Revision(7)));
    assert_eq!(surface.take_pending(), None);
    assert_eq!(surface.rendered_item_height(5), Ok(60.0));
    assert_eq!(surface.rendered_item_top_offset(5), Ok(100.0));
    assert_eq!(surface.rendered_item_top_offset(6), Ok(100.0 + 60.0 + 5.0));
    assert_eq!(surface.rendered_item_top_offset(8), Ok(100.0 + 60.0 + 5.0 + 80.0 + 5.0));
    assert_eq!(surface.rendered_item_height(3), Err(Error::NotRendered { index: 3 }));
    assert_eq!(surface.rendered_item_height(9), Err(Error::NotRendered { index: 9 }));
    assert_eq!(surface.content_height(), 100.0 + 60.0 + 80.0 + 90.0 + 10.0 + 40.0);

    surface.scroll_to_y(-10.0);
    assert_eq!(surface.scroll_y(), 0.0);
    surface.scroll_to_y(1000.0);
    assert_eq!(surface.scroll_y(), surface.content_height() - 200.0);
}
