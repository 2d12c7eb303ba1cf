//! Keeps already-visible content in place across container width changes.
//!
//! When the width changes, every measured height becomes stale. Items above
//! the shown range keep the heights they had on screen in a [`BeforeResize`]
//! snapshot until the user scrolls up to them, at which point the snapshot is
//! trimmed and the scroll position compensated.

use crate::geometry::{align_down, row_end};
use crate::{BeforeResize, LayoutContext, RenderedItems, ShownRange, SnapshotSegment};

/// Applies a container width change.
///
/// `new_columns_count` may equal the current column count: heights are reset
/// either way.
pub fn on_width_change(ctx: &mut LayoutContext, new_columns_count: usize) {
    let count = ctx.items_count();
    let new_columns = new_columns_count.max(1);
    let prev_columns = ctx.columns();
    let prev_spacing = ctx.layout.spacing();

    let projected = ctx.layout.shown_range(count).map(|range| {
        ShownRange::new(
            align_down(range.first, new_columns),
            row_end(range.last, new_columns, count),
        )
    });
    let new_first = projected.map(|r| r.first).unwrap_or(0);

    let estimate = ctx.estimate();
    let heights = &ctx.heights;
    let capture = |start: usize| {
        SnapshotSegment::capture(start, new_first, count, prev_columns, prev_spacing, |i| {
            heights.get(i).unwrap_or(estimate)
        })
    };
    let before_resize = match ctx.layout.before_resize.take() {
        Some(mut existing) => {
            let len = existing.len();
            if new_first > len {
                // Rows laid out since the previous change are on screen too.
                existing.push(capture(len));
            } else {
                existing.truncate(new_first);
            }
            (!existing.is_empty()).then_some(existing)
        }
        None if new_first > 0 => Some(BeforeResize::from(capture(0))),
        None => None,
    };

    vdebug!(
        prev_columns,
        new_columns,
        new_first,
        snapshot_len = before_resize.as_ref().map(BeforeResize::len).unwrap_or(0),
        "resize::on_width_change"
    );

    ctx.heights.reset(count);
    ctx.layout.columns_count = new_columns;
    ctx.layout.vertical_spacing = None;
    ctx.layout.before_resize = before_resize;
    ctx.set_shown_range(projected);
}

/// Retires the part of the snapshot that is now shown in the current layout.
///
/// Call after the shown items were rendered and measured. Returns the scroll
/// delta that keeps the first item below the snapshot visually in place.
pub fn clean_up(ctx: &mut LayoutContext) -> f64 {
    let Some(snapshot) = ctx.layout.before_resize.as_ref() else {
        return 0.0;
    };
    let first = ctx.layout.first_shown_index;
    let len = snapshot.len();
    if first >= len {
        return 0.0;
    }

    let discarded = snapshot.rows_height(first, len);
    let mut trimmed = snapshot.clone();
    trimmed.truncate(first);
    let trimmed = (!trimmed.is_empty()).then_some(trimmed);

    ctx.layout.before_resize = trimmed;
    let revealed = ctx.row_layout().current_rows_height(first, len, &ctx.heights);
    let delta = revealed - discarded;
    vdebug!(first, len, revealed, discarded, delta, "resize::clean_up");

    if ctx.layout.before_resize.is_none() {
        vdebug!("resize::clean_up: snapshot retired");
    }
    delta
}

/// Measures the vertical spacing between the first two rendered rows.
pub(crate) fn measure_vertical_spacing(
    surface: &(impl RenderedItems + ?Sized),
    range: ShownRange,
    columns: usize,
) -> Option<f64> {
    let columns = columns.max(1);
    let second_row = range.first + columns;
    if second_row > range.last {
        return None;
    }
    let first_top = surface.rendered_item_top_offset(range.first).ok()?;
    let second_top = surface.rendered_item_top_offset(second_row).ok()?;
    let mut row_height = 0.0f64;
    for i in range.first..second_row {
        row_height = row_height.max(surface.rendered_item_height(i).ok()?);
    }
    Some((second_top - first_top - row_height).max(0.0))
}
