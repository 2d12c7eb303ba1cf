// Example: a minimal host, a scroll, and a state round trip through `restore`.
use virtual_scroller::{
    Error, LayoutUpdate, RenderedItems, Result, Revision, ScrollerHost, ScrollerOptions,
    VirtualScroller, VisibleArea,
};

/// A fixed-row-height "terminal": every item is one line, no spacing.
struct Lines {
    viewport: f64,
    scroll_y: f64,
    first: usize,
    len: usize,
    before: f64,
    pending: Option<Revision>,
}

impl RenderedItems for Lines {
    fn rendered_item_height(&self, index: usize) -> Result<f64> {
        if index < self.first || index >= self.first + self.len {
            return Err(Error::NotRendered { index });
        }
        Ok(1.0)
    }

    fn rendered_item_top_offset(&self, index: usize) -> Result<f64> {
        self.rendered_item_height(index)?;
        Ok(self.before + (index - self.first) as f64)
    }
}

impl ScrollerHost<String, ()> for Lines {
    fn visible_area_bounds(&self) -> VisibleArea {
        VisibleArea::new(self.scroll_y, self.scroll_y + self.viewport)
    }

    fn container_width(&self) -> f64 {
        80.0
    }

    fn list_top_offset(&self) -> f64 {
        0.0
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to_y(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
    }

    fn render(&mut self, update: &LayoutUpdate<'_, String, ()>) {
        self.first = update.first_shown_index;
        self.len = update.items.len();
        self.before = update.before_items_height;
        self.pending = Some(update.revision);
    }
}

fn settle(scroller: &mut VirtualScroller<String, String>, host: &mut Lines) {
    while let Some(revision) = host.pending.take() {
        scroller.on_rendered(host, revision);
    }
}

fn main() {
    let items: Vec<String> = (0..10_000).map(|i| format!("line {i}")).collect();
    let mut host = Lines {
        viewport: 24.0,
        scroll_y: 0.0,
        first: 0,
        len: 0,
        before: 0.0,
        pending: None,
    };

    let mut scroller = VirtualScroller::new(items, ScrollerOptions::by_value())
        .expect("default options are valid");
    scroller.start(&mut host, 0);
    settle(&mut scroller, &mut host);
    println!("initial: {:?}", scroller.shown_range());

    host.scroll_to_y(5_000.0);
    scroller.on_scroll(&mut host, 16);
    settle(&mut scroller, &mut host);
    let layout = scroller.layout();
    println!(
        "after scroll: {:?} before={} after={}",
        scroller.shown_range(),
        layout.before_items_height,
        layout.after_items_height
    );

    // Remount: export, drop, restore. Measured heights and the shown range survive.
    let state = scroller.state();
    drop(scroller);
    let mut scroller = VirtualScroller::<_, String>::restore(state, ScrollerOptions::by_value())
        .expect("exported state is valid");
    scroller.start(&mut host, 32);
    settle(&mut scroller, &mut host);
    println!("restored: {:?}", scroller.shown_range());
}
