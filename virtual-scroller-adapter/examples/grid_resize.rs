use virtual_scroller::{ScrollerOptions, VirtualScroller};
use virtual_scroller_adapter::{Controller, MemorySurface};

fn main() {
    // Example: a responsive card grid.
    //
    // The column count follows the container width. After a width change the cards
    // above the viewport keep their old heights (the "before resize" snapshot) until the
    // user scrolls back up, so the visible cards do not jump.
    let options = ScrollerOptions::by_value()
        .with_columns_count(|width| ((width / 240.0) as usize).clamp(1, 6))
        .with_vertical_spacing(Some(16.0));
    let scroller: VirtualScroller<u32, u32> =
        VirtualScroller::new((0..500).collect(), options).expect("valid options");
    // Card text wraps: narrower columns make taller cards.
    let surface = MemorySurface::new(1000.0, 700.0, |id: &u32, column_width| {
        let chars = 120.0 + (*id % 7) as f64 * 40.0;
        let per_line = (column_width / 8.0).max(1.0);
        80.0 + (chars / per_line).ceil() * 20.0
    })
    .with_vertical_spacing(16.0);
    let mut c = Controller::new(scroller, surface);

    c.start(0);
    c.scroll_to(4000.0, 16);
    report("wide", &c);

    c.resize(520.0, 700.0, 100);
    while let Some(deadline) = c.next_deadline() {
        c.tick(deadline);
        if c.surface().columns_count() == 2 {
            break;
        }
    }
    report("narrow", &c);

    c.scroll_to(0.0, 1000);
    report("back at top", &c);
}

fn report(label: &str, c: &Controller<u32, u32>) {
    let layout = c.scroller().layout();
    println!(
        "{label}: columns={} shown={:?} before={:.0} snapshot_len={}",
        layout.columns_count,
        c.surface().rendered_range(),
        layout.before_items_height,
        layout.before_resize.as_ref().map(|s| s.len()).unwrap_or(0),
    );
}
