use alloc::vec::Vec;

use crate::{BeforeResize, Error, Result};

/// A plain, serializable record of everything needed to restore a scroller
/// after its host remounts.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollerState<T, S> {
    pub items: Vec<T>,
    /// `None` means "not measured".
    pub item_heights: Vec<Option<f64>>,
    pub item_states: Vec<Option<S>>,
    pub first_shown_item_index: usize,
    pub last_shown_item_index: usize,
    pub before_items_height: f64,
    pub after_items_height: f64,
    pub columns_count: Option<usize>,
    pub vertical_spacing: Option<f64>,
    pub before_resize: Option<BeforeResize>,
}

fn check_height(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::misuse(alloc::format!(
            "persisted state: `{name}` must be a finite non-negative number, got {value}"
        )))
    }
}

impl<T, S> ScrollerState<T, S> {
    /// Rejects a record that cannot have been produced by a scroller.
    pub fn validate(&self) -> Result<()> {
        let count = self.items.len();
        if self.item_heights.len() != count {
            return Err(Error::misuse(alloc::format!(
                "persisted state: {} item heights for {count} items",
                self.item_heights.len()
            )));
        }
        if self.item_states.len() != count {
            return Err(Error::misuse(alloc::format!(
                "persisted state: {} item states for {count} items",
                self.item_states.len()
            )));
        }
        if count > 0
            && (self.first_shown_item_index > self.last_shown_item_index
                || self.last_shown_item_index >= count)
        {
            return Err(Error::misuse(alloc::format!(
                "persisted state: shown range {}..={} is invalid for {count} items",
                self.first_shown_item_index, self.last_shown_item_index
            )));
        }
        check_height("before_items_height", self.before_items_height)?;
        check_height("after_items_height", self.after_items_height)?;
        for h in self.item_heights.iter().flatten() {
            check_height("item_heights", *h)?;
        }
        if let Some(spacing) = self.vertical_spacing {
            check_height("vertical_spacing", spacing)?;
        }
        if self.columns_count == Some(0) {
            return Err(Error::misuse("persisted state: `columns_count` must be at least 1"));
        }
        if let Some(snapshot) = &self.before_resize {
            if snapshot.len() > count {
                return Err(Error::misuse(alloc::format!(
                    "persisted state: `before_resize` covers {} items, list has {count}",
                    snapshot.len()
                )));
            }
            for segment in &snapshot.segments {
                if segment.columns_count == 0 {
                    return Err(Error::misuse(
                        "persisted state: `before_resize` segment `columns_count` must be at least 1",
                    ));
                }
                check_height("before_resize.vertical_spacing", segment.vertical_spacing)?;
                for h in &segment.item_heights {
                    check_height("before_resize.item_heights", *h)?;
                }
            }
        }
        Ok(())
    }
}
