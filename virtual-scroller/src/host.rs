use crate::{Result, Revision, VisibleArea};

/// Measurement access to the items the host has currently materialized.
///
/// Indexes are absolute item indexes. Both methods must fail with
/// [`crate::Error::NotRendered`] for an index outside the rendered range.
pub trait RenderedItems {
    fn rendered_item_height(&self, index: usize) -> Result<f64>;

    /// Top offset of a rendered item, relative to the top of the list.
    fn rendered_item_top_offset(&self, index: usize) -> Result<f64>;
}

/// The thin adapter a UI layer implements over its real rendering surface.
///
/// The scroller never subscribes to anything: the host forwards its scroll and
/// resize events (`on_scroll`, `on_resize`), drives time (`tick`), and reports
/// completed renders (`on_rendered`).
pub trait ScrollerHost<T, S>: RenderedItems {
    /// The visible part of the scrollable region, relative to the top of the list.
    fn visible_area_bounds(&self) -> VisibleArea;

    fn container_width(&self) -> f64;

    /// Top of the list inside the scrollable region.
    fn list_top_offset(&self) -> f64;

    fn scroll_y(&self) -> f64;

    fn scroll_to_y(&mut self, y: f64);

    /// Receives a freshly published layout record.
    ///
    /// The host may render it later; it acknowledges with
    /// [`crate::VirtualScroller::on_rendered`] and `update.revision`.
    fn render(&mut self, update: &LayoutUpdate<'_, T, S>);

    /// Whether the host can measure and scroll. When `false`, every item is rendered.
    fn is_supported(&self) -> bool {
        true
    }
}

/// A full layout record, as delivered to [`ScrollerHost::render`].
#[derive(Debug)]
pub struct LayoutUpdate<'a, T, S> {
    pub revision: Revision,
    /// The shown items, `first_shown_index..=last_shown_index`.
    pub items: &'a [T],
    pub first_shown_index: usize,
    pub last_shown_index: usize,
    /// Space to reserve above the shown items.
    pub before_items_height: f64,
    /// Space to reserve below the shown items.
    pub after_items_height: f64,
    /// Set when the list is laid out by a column-count function.
    pub columns_count: Option<usize>,
    /// Known heights of the shown items.
    pub item_heights: &'a [Option<f64>],
    /// Custom states of the shown items.
    pub item_states: &'a [Option<S>],
}

impl<T, S> LayoutUpdate<'_, T, S> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
