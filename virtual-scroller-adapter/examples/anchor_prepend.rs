use virtual_scroller::{ScrollerOptions, SetItemsOptions, VirtualScroller};
use virtual_scroller_adapter::{Controller, MemorySurface};

#[derive(Clone, Debug)]
struct Message {
    id: u64,
    lines: u32,
}

fn message(id: u64) -> Message {
    Message {
        id,
        lines: 1 + (id % 4) as u32,
    }
}

fn main() {
    // Example: load older messages above a chat without the visible ones jumping.
    //
    // Two ways to keep the reading position:
    // 1) let the scroller compensate (`preserve_scroll_position_on_prepend`)
    // 2) capture an anchor (key + offset_in_viewport) and apply it after the change
    let options = ScrollerOptions::new(|m: &Message| m.id);
    let scroller: VirtualScroller<Message, u64> =
        VirtualScroller::new((1000..1100).map(message).collect(), options).expect("valid options");
    let surface = MemorySurface::new(320.0, 480.0, |m: &Message, _| 18.0 * m.lines as f64 + 12.0)
        .with_vertical_spacing(8.0);
    let mut c = Controller::new(scroller, surface);
    c.start(0);
    c.scroll_to(900.0, 16);

    let anchor = c
        .capture_first_visible_anchor()
        .expect("something is visible");
    println!(
        "before: scroll_y={} anchor={anchor:?}",
        c.surface().scroll_y()
    );

    // 1) The scroller shifts the scroll position by the height added above.
    let mut items: Vec<Message> = (980..1000).map(message).collect();
    items.extend((1000..1100).map(message));
    c.set_items(
        items,
        SetItemsOptions {
            preserve_scroll_position_on_prepend: true,
        },
    );
    println!(
        "preserved: scroll_y={} anchor={:?}",
        c.surface().scroll_y(),
        c.capture_first_visible_anchor()
    );

    // 2) Without preservation, the adapter restores the position from the anchor.
    let anchor = c
        .capture_first_visible_anchor()
        .expect("something is visible");
    let mut items: Vec<Message> = (960..980).map(message).collect();
    items.extend((980..1100).map(message));
    c.set_items(items, SetItemsOptions::default());
    println!("shifted: scroll_y={}", c.surface().scroll_y());

    let ok = c.apply_anchor(&anchor, 32);
    println!(
        "anchored: ok={ok} scroll_y={} anchor={:?}",
        c.surface().scroll_y(),
        c.capture_first_visible_anchor()
    );
}
