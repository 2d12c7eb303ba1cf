use alloc::vec::Vec;

/// The visible part of the scrollable region, relative to the top of the list.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleArea {
    pub top: f64,
    pub bottom: f64,
}

impl VisibleArea {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f64 {
        (self.bottom - self.top).max(0.0)
    }

    /// Expands the area by `margin` on both sides.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            top: self.top - margin,
            bottom: self.bottom + margin,
        }
    }

    /// Whether `other` lies entirely within this area.
    pub fn contains(&self, other: &VisibleArea) -> bool {
        other.top >= self.top && other.bottom <= self.bottom
    }
}

/// An inclusive `[first, last]` range of item indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShownRange {
    pub first: usize,
    pub last: usize,
}

impl ShownRange {
    pub fn new(first: usize, last: usize) -> Self {
        debug_assert!(first <= last, "ShownRange: first > last ({first} > {last})");
        Self { first, last }
    }

    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.first && index <= self.last
    }
}

/// Marker attached to every published layout record.
///
/// Revisions only grow. A render acknowledgement for anything but the latest
/// revision is stale and ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Revision(pub u64);

impl Revision {
    pub(crate) fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Heights of a run of items laid out in rows of `columns_count`, separated by
/// `vertical_spacing`.
///
/// Every height within a row equals the row's height.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapshotSegment {
    pub item_heights: Vec<f64>,
    pub columns_count: usize,
    pub vertical_spacing: f64,
}

impl SnapshotSegment {
    pub fn new(item_heights: Vec<f64>, columns_count: usize, vertical_spacing: f64) -> Self {
        Self {
            item_heights,
            columns_count,
            vertical_spacing,
        }
    }

    /// Captures the items `[start, end)` from `height(i)`, in rows starting at `start`
    /// and equalized to their tallest item.
    ///
    /// Rows are formed up to `items_count` so a row cut by `end` keeps the height it
    /// had on screen.
    pub(crate) fn capture(
        start: usize,
        end: usize,
        items_count: usize,
        columns_count: usize,
        vertical_spacing: f64,
        mut height: impl FnMut(usize) -> f64,
    ) -> Self {
        let columns_count = columns_count.max(1);
        let mut item_heights = Vec::with_capacity(end.saturating_sub(start));
        let mut row_start = start;
        while row_start < end {
            let row_end = (row_start + columns_count).min(items_count);
            let mut row_height = 0.0f64;
            for i in row_start..row_end {
                row_height = row_height.max(height(i));
            }
            for _ in row_start..row_end.min(end) {
                item_heights.push(row_height);
            }
            row_start += columns_count;
        }
        Self {
            item_heights,
            columns_count,
            vertical_spacing,
        }
    }

    pub fn len(&self) -> usize {
        self.item_heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_heights.is_empty()
    }

    fn rows(&self, offset: usize) -> impl Iterator<Item = SnapshotRow> + '_ {
        let columns = self.columns_count.max(1);
        let len = self.len();
        (0..len).step_by(columns).map(move |local| SnapshotRow {
            start: offset + local,
            end: offset + (local + columns).min(len),
            height: self.item_heights[local],
            spacing: self.vertical_spacing,
        })
    }
}

/// One row of a [`BeforeResize`] snapshot, in absolute item indexes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SnapshotRow {
    pub start: usize,
    pub end: usize,
    pub height: f64,
    /// Spacing below the row.
    pub spacing: f64,
}

/// Heights of a leading prefix of items, frozen when the container width changed.
///
/// The prefix is the layout that was on screen before the change. Each width
/// change while a snapshot exists appends the rows laid out since the previous
/// one as a new segment, so a snapshot may hold several column counts.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeforeResize {
    /// Consecutive segments. The first one starts at item 0.
    pub segments: Vec<SnapshotSegment>,
}

impl From<SnapshotSegment> for BeforeResize {
    fn from(segment: SnapshotSegment) -> Self {
        let mut snapshot = Self::default();
        snapshot.push(segment);
        snapshot
    }
}

impl BeforeResize {
    /// A snapshot made of a single segment.
    pub fn new(item_heights: Vec<f64>, columns_count: usize, vertical_spacing: f64) -> Self {
        SnapshotSegment::new(item_heights, columns_count, vertical_spacing).into()
    }

    pub fn len(&self) -> usize {
        self.segments.iter().map(SnapshotSegment::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(SnapshotSegment::is_empty)
    }

    /// Appends a segment that starts at `self.len()`.
    pub(crate) fn push(&mut self, segment: SnapshotSegment) {
        if !segment.is_empty() {
            self.segments.push(segment);
        }
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        let mut remaining = len;
        self.segments.retain_mut(|segment| {
            let keep = segment.len().min(remaining);
            segment.item_heights.truncate(keep);
            remaining -= keep;
            keep > 0
        });
    }

    /// Every snapshot row, top to bottom.
    pub(crate) fn rows(&self) -> impl Iterator<Item = SnapshotRow> + '_ {
        let mut offset = 0;
        self.segments.iter().flat_map(move |segment| {
            let start = offset;
            offset += segment.len();
            segment.rows(start)
        })
    }

    /// Sum of `row height + spacing` over the snapshot rows that start in `[from, to)`.
    pub(crate) fn rows_height(&self, from: usize, to: usize) -> f64 {
        self.rows()
            .take_while(|row| row.start < to)
            .filter(|row| row.start >= from)
            .map(|row| row.height + row.spacing)
            .sum()
    }

    /// Top offset of the snapshot row containing `index`.
    pub(crate) fn row_top(&self, index: usize) -> f64 {
        self.rows()
            .take_while(|row| row.end <= index)
            .map(|row| row.height + row.spacing)
            .sum()
    }
}

/// The layout record the scroller publishes.
///
/// For an empty list both indexes are `0` and nothing is shown.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutState {
    pub first_shown_index: usize,
    pub last_shown_index: usize,
    pub before_items_height: f64,
    pub after_items_height: f64,
    pub columns_count: usize,
    pub vertical_spacing: Option<f64>,
    pub before_resize: Option<BeforeResize>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            first_shown_index: 0,
            last_shown_index: 0,
            before_items_height: 0.0,
            after_items_height: 0.0,
            columns_count: 1,
            vertical_spacing: None,
            before_resize: None,
        }
    }
}

impl LayoutState {
    /// The shown indexes as a half-open range (empty for an empty list).
    pub fn shown_indexes(&self, items_count: usize) -> core::ops::Range<usize> {
        if items_count == 0 {
            return 0..0;
        }
        let last = self.last_shown_index.min(items_count - 1);
        self.first_shown_index.min(last)..last + 1
    }

    pub fn shown_range(&self, items_count: usize) -> Option<ShownRange> {
        let r = self.shown_indexes(items_count);
        (!r.is_empty()).then(|| ShownRange::new(r.start, r.end - 1))
    }

    pub fn spacing(&self) -> f64 {
        self.vertical_spacing.unwrap_or(0.0)
    }
}

/// Options for [`crate::VirtualScroller::set_items`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetItemsOptions {
    /// Keep the currently visible items in place when items are prepended.
    pub preserve_scroll_position_on_prepend: bool,
}
