use alloc::sync::Arc;

use crate::{Error, ErrorCallback, Result};

/// Maps an item to its stable identity.
pub type ItemKeyFn<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;

/// Maps the container width to a column count.
pub type ColumnsCountFn = Arc<dyn Fn(f64) -> usize + Send + Sync>;

/// Configuration for [`crate::VirtualScroller`].
///
/// Closures are stored in `Arc`s so the options stay cheap to clone.
pub struct ScrollerOptions<T, K> {
    pub item_key: ItemKeyFn<T, K>,

    /// Column count for a given container width. `None` means a single column.
    pub columns_count: Option<ColumnsCountFn>,

    /// Used for unmeasured items until the running average is known. `0.0` disables it.
    pub estimated_item_height: f64,

    /// The prerender margin, as a fraction of the visible area height.
    pub prerender_margin_ratio: f64,

    /// How many unmeasured items to show at once when a layout pass needs measurements.
    pub measure_items_batch_size: usize,

    /// A fixed vertical spacing between rows. When `None`, it is measured from rendered rows.
    pub vertical_spacing: Option<f64>,

    /// Render every item and skip virtualization.
    pub bypass: bool,

    /// Scroll-stop debounce.
    pub scroll_stop_delay_ms: u64,

    /// Container resize debounce.
    pub resize_debounce_ms: u64,

    /// How often the list top offset is polled after `start` (late stylesheets).
    pub layout_shift_check_interval_ms: u64,

    /// For how long the list top offset is polled after `start`. `0` disables polling.
    pub layout_shift_check_duration_ms: u64,

    /// Observes non-fatal diagnostics.
    pub on_error: Option<ErrorCallback>,
}

impl<T, K> Clone for ScrollerOptions<T, K> {
    fn clone(&self) -> Self {
        Self {
            item_key: Arc::clone(&self.item_key),
            columns_count: self.columns_count.clone(),
            estimated_item_height: self.estimated_item_height,
            prerender_margin_ratio: self.prerender_margin_ratio,
            measure_items_batch_size: self.measure_items_batch_size,
            vertical_spacing: self.vertical_spacing,
            bypass: self.bypass,
            scroll_stop_delay_ms: self.scroll_stop_delay_ms,
            resize_debounce_ms: self.resize_debounce_ms,
            layout_shift_check_interval_ms: self.layout_shift_check_interval_ms,
            layout_shift_check_duration_ms: self.layout_shift_check_duration_ms,
            on_error: self.on_error.clone(),
        }
    }
}

impl<T: Clone + 'static> ScrollerOptions<T, T> {
    /// Creates options where each item is its own key.
    pub fn by_value() -> Self {
        Self::new(|item: &T| item.clone())
    }
}

impl<T, K> ScrollerOptions<T, K> {
    /// Creates options with a key mapping.
    ///
    /// `item_key(item)` must return a stable identity: it is how prepends and
    /// appends are told apart from a replaced list.
    pub fn new(item_key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        Self {
            item_key: Arc::new(item_key),
            columns_count: None,
            estimated_item_height: 0.0,
            prerender_margin_ratio: 1.0,
            measure_items_batch_size: 50,
            vertical_spacing: None,
            bypass: false,
            scroll_stop_delay_ms: 100,
            resize_debounce_ms: 250,
            layout_shift_check_interval_ms: 500,
            layout_shift_check_duration_ms: 3000,
            on_error: None,
        }
    }

    pub fn with_columns_count(mut self, f: impl Fn(f64) -> usize + Send + Sync + 'static) -> Self {
        self.columns_count = Some(Arc::new(f));
        self
    }

    pub fn with_estimated_item_height(mut self, height: f64) -> Self {
        self.estimated_item_height = height;
        self
    }

    pub fn with_prerender_margin_ratio(mut self, ratio: f64) -> Self {
        self.prerender_margin_ratio = ratio;
        self
    }

    pub fn with_measure_items_batch_size(mut self, size: usize) -> Self {
        self.measure_items_batch_size = size;
        self
    }

    pub fn with_vertical_spacing(mut self, spacing: Option<f64>) -> Self {
        self.vertical_spacing = spacing;
        self
    }

    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }

    pub fn with_scroll_stop_delay_ms(mut self, delay_ms: u64) -> Self {
        self.scroll_stop_delay_ms = delay_ms;
        self
    }

    pub fn with_resize_debounce_ms(mut self, delay_ms: u64) -> Self {
        self.resize_debounce_ms = delay_ms;
        self
    }

    pub fn with_layout_shift_check(mut self, interval_ms: u64, duration_ms: u64) -> Self {
        self.layout_shift_check_interval_ms = interval_ms;
        self.layout_shift_check_duration_ms = duration_ms;
        self
    }

    pub fn with_on_error(mut self, f: Option<impl Fn(&Error) + Send + Sync + 'static>) -> Self {
        self.on_error = f.map(|f| Arc::new(f) as _);
        self
    }

    /// Checks the options for values the scroller cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.estimated_item_height.is_finite() && self.estimated_item_height >= 0.0) {
            return Err(Error::misuse(alloc::format!(
                "`estimated_item_height` must be a finite non-negative number, got {}",
                self.estimated_item_height
            )));
        }
        if !(self.prerender_margin_ratio.is_finite() && self.prerender_margin_ratio >= 0.0) {
            return Err(Error::misuse(alloc::format!(
                "`prerender_margin_ratio` must be a finite non-negative number, got {}",
                self.prerender_margin_ratio
            )));
        }
        if self.measure_items_batch_size == 0 {
            return Err(Error::misuse("`measure_items_batch_size` must be at least 1"));
        }
        if let Some(spacing) = self.vertical_spacing {
            if !(spacing.is_finite() && spacing >= 0.0) {
                return Err(Error::misuse(alloc::format!(
                    "`vertical_spacing` must be a finite non-negative number, got {spacing}"
                )));
            }
        }
        if self.layout_shift_check_duration_ms > 0 && self.layout_shift_check_interval_ms == 0 {
            return Err(Error::misuse(
                "`layout_shift_check_interval_ms` must be non-zero when polling is enabled",
            ));
        }
        Ok(())
    }

    pub(crate) fn columns_for(&self, container_width: f64) -> usize {
        match &self.columns_count {
            Some(f) => f(container_width).max(1),
            None => 1,
        }
    }
}

impl<T, K> core::fmt::Debug for ScrollerOptions<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollerOptions")
            .field("columns_count", &self.columns_count.is_some())
            .field("estimated_item_height", &self.estimated_item_height)
            .field("prerender_margin_ratio", &self.prerender_margin_ratio)
            .field("measure_items_batch_size", &self.measure_items_batch_size)
            .field("vertical_spacing", &self.vertical_spacing)
            .field("bypass", &self.bypass)
            .field("scroll_stop_delay_ms", &self.scroll_stop_delay_ms)
            .field("resize_debounce_ms", &self.resize_debounce_ms)
            .field(
                "layout_shift_check_interval_ms",
                &self.layout_shift_check_interval_ms,
            )
            .field(
                "layout_shift_check_duration_ms",
                &self.layout_shift_check_duration_ms,
            )
            .finish_non_exhaustive()
    }
}
