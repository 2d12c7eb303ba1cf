use alloc::sync::Arc;
use alloc::vec::Vec;

use virtual_scroller::{
    Error, LayoutUpdate, RenderedItems, Result, Revision, ScrollerHost, ShownRange, VisibleArea,
};

/// Computes an item's rendered height from the item and the width of its column.
pub type ItemHeightFn<T> = Arc<dyn Fn(&T, f64) -> f64 + Send + Sync>;

/// A framework-neutral, in-memory rendering surface.
///
/// It keeps the last published layout record, lays it out in rows (the tallest item
/// of a row sets its height, rows are separated by the vertical spacing), and
/// answers measurement queries for the items it holds. Renders are recorded as
/// pending until the caller acknowledges them with
/// [`virtual_scroller::VirtualScroller::on_rendered`].
///
/// Useful for TUI/headless hosts that do their own drawing, and for tests.
pub struct MemorySurface<T, S = ()> {
    item_height: ItemHeightFn<T>,
    width: f64,
    height: f64,
    vertical_spacing: f64,
    list_top_offset: f64,
    scroll_y: f64,
    supported: bool,
    first: usize,
    items: Vec<T>,
    item_states: Vec<Option<S>>,
    before_items_height: f64,
    after_items_height: f64,
    columns_count: usize,
    pending: Option<Revision>,
    renders: u64,
}

impl<T, S> MemorySurface<T, S> {
    /// Creates a surface with a `width` × `height` viewport.
    pub fn new(width: f64, height: f64, item_height: impl Fn(&T, f64) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            item_height: Arc::new(item_height),
            width,
            height,
            vertical_spacing: 0.0,
            list_top_offset: 0.0,
            scroll_y: 0.0,
            supported: true,
            first: 0,
            items: Vec::new(),
            item_states: Vec::new(),
            before_items_height: 0.0,
            after_items_height: 0.0,
            columns_count: 1,
            pending: None,
            renders: 0,
        }
    }

    /// Vertical space between rows.
    pub fn with_vertical_spacing(mut self, spacing: f64) -> Self {
        self.vertical_spacing = spacing;
        self
    }

    /// Offset of the list inside the scrollable region (e.g. a header above it).
    pub fn with_list_top_offset(mut self, offset: f64) -> Self {
        self.list_top_offset = offset;
        self
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn set_list_top_offset(&mut self, offset: f64) {
        self.list_top_offset = offset;
    }

    pub fn set_item_height(&mut self, f: impl Fn(&T, f64) -> f64 + Send + Sync + 'static) {
        self.item_height = Arc::new(f);
    }

    /// Marks the surface as unable to measure items (the scroller then renders everything).
    pub fn set_supported(&mut self, supported: bool) {
        self.supported = supported;
    }

    /// Takes the revision of the last render that was not acknowledged yet.
    pub fn take_pending(&mut self) -> Option<Revision> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of layout records rendered so far.
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn rendered_items(&self) -> &[T] {
        &self.items
    }

    pub fn rendered_item_states(&self) -> &[Option<S>] {
        &self.item_states
    }

    pub fn rendered_range(&self) -> Option<ShownRange> {
        (!self.items.is_empty()).then(|| ShownRange::new(self.first, self.first + self.items.len() - 1))
    }

    pub fn before_items_height(&self) -> f64 {
        self.before_items_height
    }

    pub fn after_items_height(&self) -> f64 {
        self.after_items_height
    }

    pub fn columns_count(&self) -> usize {
        self.columns_count
    }

    fn column_width(&self) -> f64 {
        self.width / self.columns_count.max(1) as f64
    }

    fn local(&self, index: usize) -> Result<usize> {
        index
            .checked_sub(self.first)
            .filter(|local| *local < self.items.len())
            .ok_or(Error::NotRendered { index })
    }

    fn row_height(&self, row_start: usize) -> f64 {
        let row_end = (row_start + self.columns_count.max(1)).min(self.items.len());
        let column_width = self.column_width();
        self.items[row_start..row_end]
            .iter()
            .map(|item| (self.item_height)(item, column_width))
            .fold(0.0, f64::max)
    }

    /// Height of the rendered rows, spacing included.
    fn rendered_rows_height(&self) -> f64 {
        let columns = self.columns_count.max(1);
        let rows = self.items.len().div_ceil(columns);
        let mut total = 0.0;
        for row in 0..rows {
            total += self.row_height(row * columns);
        }
        total + self.vertical_spacing * rows.saturating_sub(1) as f64
    }

    /// Total height of the list as currently laid out.
    ///
    /// The height below the shown range already includes the spacing above each
    /// hidden row.
    pub fn content_height(&self) -> f64 {
        self.before_items_height + self.rendered_rows_height() + self.after_items_height
    }

    pub fn max_scroll_y(&self) -> f64 {
        (self.list_top_offset + self.content_height() - self.height).max(0.0)
    }
}

impl<T, S> RenderedItems for MemorySurface<T, S> {
    fn rendered_item_height(&self, index: usize) -> Result<f64> {
        let local = self.local(index)?;
        Ok((self.item_height)(&self.items[local], self.column_width()))
    }

    fn rendered_item_top_offset(&self, index: usize) -> Result<f64> {
        let local = self.local(index)?;
        let columns = self.columns_count.max(1);
        let mut top = self.before_items_height;
        let mut row_start = 0;
        while row_start + columns <= local {
            top += self.row_height(row_start) + self.vertical_spacing;
            row_start += columns;
        }
        Ok(top)
    }
}

impl<T: Clone, S: Clone> ScrollerHost<T, S> for MemorySurface<T, S> {
    fn visible_area_bounds(&self) -> VisibleArea {
        let top = self.scroll_y - self.list_top_offset;
        VisibleArea::new(top, top + self.height)
    }

    fn container_width(&self) -> f64 {
        self.width
    }

    fn list_top_offset(&self) -> f64 {
        self.list_top_offset
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to_y(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll_y());
    }

    fn render(&mut self, update: &LayoutUpdate<'_, T, S>) {
        self.first = update.first_shown_index;
        self.items = update.items.to_vec();
        self.item_states = update.item_states.to_vec();
        self.before_items_height = update.before_items_height;
        self.after_items_height = update.after_items_height;
        self.columns_count = update.columns_count.unwrap_or(1).max(1);
        self.pending = Some(update.revision);
        self.renders += 1;
    }

    fn is_supported(&self) -> bool {
        self.supported
    }
}

impl<T, S> core::fmt::Debug for MemorySurface<T, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemorySurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scroll_y", &self.scroll_y)
            .field("list_top_offset", &self.list_top_offset)
            .field("rendered_range", &self.rendered_range())
            .field("columns_count", &self.columns_count)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
