use crate::geometry::{RowLayout, align_down, row_end};
use crate::{ItemHeights, LayoutState, ShownRange, VisibleArea};

/// The height table and layout state, mutated as one unit per event.
#[derive(Clone, Debug, Default)]
pub struct LayoutContext {
    pub heights: ItemHeights,
    pub layout: LayoutState,
    /// Fallback for unmeasured items while nothing is measured yet.
    pub estimated_item_height: f64,
}

impl LayoutContext {
    pub fn new(items_count: usize, columns_count: usize, estimated_item_height: f64) -> Self {
        Self {
            heights: ItemHeights::new(items_count),
            layout: LayoutState {
                columns_count: columns_count.max(1),
                ..LayoutState::default()
            },
            estimated_item_height,
        }
    }

    pub fn items_count(&self) -> usize {
        self.heights.len()
    }

    pub fn columns(&self) -> usize {
        self.layout.columns_count.max(1)
    }

    /// The height used for items that are not measured yet.
    pub fn estimate(&self) -> f64 {
        let average = self.heights.average();
        if average > 0.0 {
            average
        } else {
            self.estimated_item_height
        }
    }

    pub fn row_layout(&self) -> RowLayout<'_> {
        RowLayout {
            items_count: self.items_count(),
            columns_count: self.columns(),
            vertical_spacing: self.layout.spacing(),
            before_resize: self.layout.before_resize.as_ref(),
            estimated_item_height: self.estimate(),
        }
    }

    /// Applies a shown range and recomputes the hidden heights around it.
    pub fn set_shown_range(&mut self, range: Option<ShownRange>) {
        let Some(range) = range else {
            self.layout.first_shown_index = 0;
            self.layout.last_shown_index = 0;
            self.layout.before_items_height = 0.0;
            self.layout.after_items_height = 0.0;
            return;
        };
        let rows = self.row_layout();
        let before = rows.before_items_height(range.first, &self.heights);
        let after = rows.after_items_height(range.last, &self.heights);
        self.layout.first_shown_index = range.first;
        self.layout.last_shown_index = range.last;
        self.layout.before_items_height = before;
        self.layout.after_items_height = after;
    }

    /// Recomputes only the height below the shown range.
    pub fn refresh_after_items_height(&mut self) {
        if self.items_count() == 0 {
            self.layout.after_items_height = 0.0;
            return;
        }
        let after = self
            .row_layout()
            .after_items_height(self.layout.last_shown_index, &self.heights);
        self.layout.after_items_height = after;
    }

    /// The range rendered before anything is measured.
    ///
    /// With an estimated item height, enough rows to cover the visible area plus
    /// the margin; otherwise just the first row.
    pub fn initial_range(&self, visible: VisibleArea, margin: f64) -> Option<ShownRange> {
        let count = self.items_count();
        if count == 0 {
            return None;
        }
        let columns = self.columns();
        let row_height = self.estimated_item_height + self.layout.spacing();
        let rows = if self.estimated_item_height > 0.0 {
            let covered = (visible.bottom + margin).max(0.0);
            (covered / row_height) as usize + 1
        } else {
            1
        };
        let last = (rows.saturating_mul(columns)).min(count) - 1;
        Some(ShownRange::new(0, last))
    }

    /// The first row, shown when the list lies entirely above the window.
    pub fn first_row(&self) -> Option<ShownRange> {
        let count = self.items_count();
        (count > 0).then(|| ShownRange::new(0, row_end(0, self.columns(), count)))
    }

    /// Whether the shown range obeys the row-alignment invariant.
    pub fn is_row_aligned(&self) -> bool {
        let count = self.items_count();
        if count == 0 {
            return true;
        }
        let columns = self.columns();
        let layout = &self.layout;
        align_down(layout.first_shown_index, columns) == layout.first_shown_index
            && (layout.last_shown_index == count - 1 || (layout.last_shown_index + 1) % columns == 0)
    }
}
