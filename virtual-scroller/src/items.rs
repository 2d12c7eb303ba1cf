//! Classifies a new item list against the current one and moves the
//! index-based bookkeeping along with it.

use alloc::vec::Vec;

use crate::geometry::row_end;
use crate::{LayoutContext, ShownRange};

/// How a new item list relates to the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemsDiff {
    Unchanged,
    /// The current list is a prefix of the new one.
    Append { appended: usize },
    /// The current list appears contiguously after `prepended` new items.
    Prepend { prepended: usize, appended: usize },
    Replace,
}

/// Compares two key sequences.
pub fn classify<K: PartialEq>(previous: &[K], next: &[K]) -> ItemsDiff {
    if previous.is_empty() {
        return if next.is_empty() {
            ItemsDiff::Unchanged
        } else {
            ItemsDiff::Replace
        };
    }
    let Some(prepended) = next.iter().position(|k| *k == previous[0]) else {
        return ItemsDiff::Replace;
    };
    let end = prepended + previous.len();
    if end > next.len() || next[prepended..end] != *previous {
        return ItemsDiff::Replace;
    }
    let appended = next.len() - end;
    match (prepended, appended) {
        (0, 0) => ItemsDiff::Unchanged,
        (0, appended) => ItemsDiff::Append { appended },
        (prepended, appended) => ItemsDiff::Prepend {
            prepended,
            appended,
        },
    }
}

/// Extends the bookkeeping with `appended` unmeasured items.
///
/// `first`, `last` and the height above are kept. If the shown range ended on a
/// partial last row, it grows to the end of that row.
pub fn apply_append(ctx: &mut LayoutContext, appended: usize) {
    let previous_count = ctx.items_count();
    ctx.heights.on_append(appended);
    if previous_count == 0 {
        return;
    }
    let count = ctx.items_count();
    let columns = ctx.columns();
    if ctx.layout.last_shown_index == previous_count - 1 && previous_count % columns != 0 {
        ctx.layout.last_shown_index = row_end(previous_count - 1, columns, count);
    }
    ctx.refresh_after_items_height();
}

/// Outcome of [`apply_prepend`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PrependOutcome {
    /// Indexes shifted; the shown items moved down by `before_delta`.
    Shifted { before_delta: f64 },
    /// Every prepended item is shown along with the old shown range.
    ShownAll,
    /// Rows shuffled: the layout must start over.
    Reset,
}

/// Moves the bookkeeping past `prepended` new leading items (and `appended`
/// trailing ones).
///
/// When `show_prepended` is set and the list is shown from its first item,
/// all prepended items are shown in one pass so they get measured together.
pub fn apply_prepend(
    ctx: &mut LayoutContext,
    prepended: usize,
    appended: usize,
    show_prepended: bool,
) -> PrependOutcome {
    let previous_count = ctx.items_count();
    let columns = ctx.columns();
    let previous = ctx.layout.shown_range(previous_count);

    ctx.heights.on_prepend(prepended);
    ctx.heights.on_append(appended);
    ctx.layout.before_resize = None;

    if prepended % columns != 0 {
        vdebug!(prepended, columns, "items::apply_prepend: rows shuffled, resetting layout");
        let count = ctx.items_count();
        ctx.heights.reset(count);
        return PrependOutcome::Reset;
    }

    let Some(previous) = previous else {
        return PrependOutcome::Reset;
    };
    let count = ctx.items_count();
    let last = if previous.last == previous_count - 1 && previous_count % columns != 0 {
        row_end(previous.last + prepended, columns, count)
    } else {
        previous.last + prepended
    };

    if show_prepended && previous.first == 0 {
        ctx.set_shown_range(Some(ShownRange::new(0, last)));
        return PrependOutcome::ShownAll;
    }

    let old_before = ctx.layout.before_items_height;
    ctx.set_shown_range(Some(ShownRange::new(previous.first + prepended, last)));
    PrependOutcome::Shifted {
        before_delta: ctx.layout.before_items_height - old_before,
    }
}

/// Shifts per-item states along with a prepend/append.
pub fn shift_states<S>(
    states: &mut Vec<Option<S>>,
    prepended: usize,
    appended: usize,
) {
    if prepended > 0 {
        states.splice(0..0, core::iter::repeat_with(|| None).take(prepended));
    }
    states.extend(core::iter::repeat_with(|| None).take(appended));
}
