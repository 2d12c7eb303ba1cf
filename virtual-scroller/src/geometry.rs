//! Shown-range search and hidden-space summation.
//!
//! Items are laid out in rows of `columns_count`. A row is as tall as its
//! tallest item and is followed by `vertical_spacing`, except for the last row
//! of the list. A leading prefix may instead be described by a
//! [`BeforeResize`] snapshot, whose segments carry their own columns and spacing.
//!
//! Everything here is a pure function of its inputs.

use crate::{BeforeResize, ItemHeights, ShownRange, VisibleArea};

/// Height lookup for the geometry functions. `None` means "not measured yet".
pub trait HeightLookup {
    fn item_height(&self, index: usize) -> Option<f64>;
}

impl HeightLookup for ItemHeights {
    fn item_height(&self, index: usize) -> Option<f64> {
        self.get(index)
    }
}

impl HeightLookup for [Option<f64>] {
    fn item_height(&self, index: usize) -> Option<f64> {
        self.get(index).copied().flatten()
    }
}

/// Inputs of a shown-range scan.
#[derive(Clone, Copy, Debug)]
pub struct ScanInput<'a> {
    pub items_count: usize,
    pub columns_count: usize,
    pub vertical_spacing: f64,
    /// The visible area, already expanded by the prerender margin.
    pub window: VisibleArea,
    pub before_resize: Option<&'a BeforeResize>,
    pub measure_items_batch_size: usize,
}

/// Result of a shown-range scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every item of the range is measured.
    Shown(ShownRange),
    /// An unmeasured item blocked the scan. Show `range`, measure, and scan again.
    Measure {
        range: ShownRange,
        first_unmeasured: usize,
    },
    /// The whole list lies above the window.
    Invisible,
}

impl ScanOutcome {
    pub fn range(&self) -> Option<ShownRange> {
        match self {
            Self::Shown(range) | Self::Measure { range, .. } => Some(*range),
            Self::Invisible => None,
        }
    }
}

pub(crate) fn align_down(index: usize, columns: usize) -> usize {
    index - index % columns
}

pub(crate) fn align_up(index: usize, columns: usize) -> usize {
    index.div_ceil(columns) * columns
}

/// The last index of the row containing `index`, clamped to the list.
pub(crate) fn row_end(index: usize, columns: usize, items_count: usize) -> usize {
    (align_down(index, columns) + columns).min(items_count) - 1
}

/// Finds the shown range for `input.window`.
///
/// A row enters the window once its bottom (plus trailing spacing) exceeds
/// `window.top`; the last shown row is the first one whose bottom (plus trailing
/// spacing) reaches `window.bottom`.
pub fn shown_item_indexes(input: &ScanInput<'_>, heights: &(impl HeightLookup + ?Sized)) -> ScanOutcome {
    let count = input.items_count;
    if count == 0 {
        return ScanOutcome::Invisible;
    }
    let columns = input.columns_count.max(1);
    let top = input.window.top;
    let bottom = input.window.bottom;

    let mut offset = 0.0f64;
    let mut first: Option<usize> = None;
    let mut index = 0usize;

    if let Some(snapshot) = input.before_resize {
        let len = snapshot.len().min(count);
        for row in snapshot.rows().take_while(|row| row.start < len) {
            let next = row.end.min(len);
            offset += row.height;
            if next < count {
                offset += row.spacing;
            }
            if first.is_none() && offset > top {
                first = Some(align_down(row.start, columns));
            }
            if let Some(first) = first {
                if offset >= bottom {
                    return ScanOutcome::Shown(ShownRange::new(
                        first,
                        row_end(next - 1, columns, count),
                    ));
                }
            }
            index = next;
        }
        index = align_up(index, columns);
    }

    while index < count {
        let next = (index + columns).min(count);
        let mut row_height = 0.0f64;
        for i in index..next {
            match heights.item_height(i) {
                Some(h) => row_height = row_height.max(h),
                None => {
                    let batch_rows = input.measure_items_batch_size.max(1).div_ceil(columns);
                    let last = (index + batch_rows * columns).min(count) - 1;
                    return ScanOutcome::Measure {
                        range: ShownRange::new(first.unwrap_or(index), last),
                        first_unmeasured: i,
                    };
                }
            }
        }
        offset += row_height;
        if next < count {
            offset += input.vertical_spacing;
        }
        if first.is_none() && offset > top {
            first = Some(index);
        }
        if let Some(first) = first {
            if offset >= bottom {
                return ScanOutcome::Shown(ShownRange::new(first, next - 1));
            }
        }
        index = next;
    }

    match first {
        Some(first) => ScanOutcome::Shown(ShownRange::new(first, count - 1)),
        None => ScanOutcome::Invisible,
    }
}

/// Row geometry shared by the hidden-space summations.
#[derive(Clone, Copy, Debug)]
pub struct RowLayout<'a> {
    pub items_count: usize,
    pub columns_count: usize,
    pub vertical_spacing: f64,
    pub before_resize: Option<&'a BeforeResize>,
    /// Substituted for unmeasured items.
    pub estimated_item_height: f64,
}

impl RowLayout<'_> {
    fn columns(&self) -> usize {
        self.columns_count.max(1)
    }

    /// Where rows in the current layout begin (the snapshot ends before this).
    fn current_rows_start(&self) -> usize {
        match self.before_resize {
            Some(snapshot) => align_up(snapshot.len().min(self.items_count), self.columns()),
            None => 0,
        }
    }

    fn row_height(
        &self,
        row_start: usize,
        heights: &(impl HeightLookup + ?Sized),
    ) -> f64 {
        let next = (row_start + self.columns()).min(self.items_count);
        (row_start..next)
            .map(|i| heights.item_height(i).unwrap_or(self.estimated_item_height))
            .fold(0.0, f64::max)
    }

    /// Sum of `row height + spacing` over the current-layout rows that start in `[from, to)`.
    pub fn current_rows_height(
        &self,
        from: usize,
        to: usize,
        heights: &(impl HeightLookup + ?Sized),
    ) -> f64 {
        let columns = self.columns();
        let to = to.min(self.items_count);
        let mut row_start = align_up(from.max(self.current_rows_start()), columns);
        let mut total = 0.0;
        while row_start < to {
            total += self.row_height(row_start, heights) + self.vertical_spacing;
            row_start += columns;
        }
        total
    }

    /// Height of everything above `first_shown_index`.
    pub fn before_items_height(
        &self,
        first_shown_index: usize,
        heights: &(impl HeightLookup + ?Sized),
    ) -> f64 {
        let snapshot = self
            .before_resize
            .map(|s| s.rows_height(0, first_shown_index))
            .unwrap_or(0.0);
        snapshot + self.current_rows_height(0, first_shown_index, heights)
    }

    /// Height of everything below `last_shown_index`.
    ///
    /// Each hidden row contributes the spacing above it plus its height.
    pub fn after_items_height(
        &self,
        last_shown_index: usize,
        heights: &(impl HeightLookup + ?Sized),
    ) -> f64 {
        let from = last_shown_index + 1;
        if from >= self.items_count {
            return 0.0;
        }
        let snapshot = self
            .before_resize
            .map(|s| s.rows_height(from, s.len()))
            .unwrap_or(0.0);
        snapshot + self.current_rows_height(from, self.items_count, heights)
    }

    /// Exact top offset of the row containing `index`.
    ///
    /// Returns `None` when a height above it is not measured.
    pub fn item_top_offset(
        &self,
        index: usize,
        heights: &(impl HeightLookup + ?Sized),
    ) -> Option<f64> {
        if index >= self.items_count {
            return None;
        }
        let columns = self.columns();
        let current_start = self.current_rows_start();
        let mut top = 0.0;
        if let Some(snapshot) = self.before_resize {
            if index < current_start {
                return Some(snapshot.row_top(index));
            }
            top += snapshot.rows_height(0, snapshot.len());
        }
        let target_row = align_down(index, columns);
        let mut row_start = current_start;
        while row_start < target_row {
            let next = (row_start + columns).min(self.items_count);
            let mut row_height = 0.0f64;
            for i in row_start..next {
                row_height = row_height.max(heights.item_height(i)?);
            }
            top += row_height + self.vertical_spacing;
            row_start = next;
        }
        Some(top)
    }
}
