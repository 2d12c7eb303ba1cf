use core::fmt;

use virtual_scroller::{ItemKey, ScrollerHost, VirtualScroller};

/// A scroll anchor that can be used to preserve visual position across data changes.
///
/// Typical use cases:
/// - chat/timeline "prepend" (load older messages above) without content jumping
/// - restoring the reading position after a remount
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor<K> {
    pub key: K,
    /// The distance from the anchor item's top to the top of the visible area.
    pub offset_in_viewport: f64,
}

impl<K: fmt::Debug> fmt::Debug for ScrollAnchor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollAnchor")
            .field("key", &self.key)
            .field("offset_in_viewport", &self.offset_in_viewport)
            .finish()
    }
}

/// Captures an anchor for the first item whose bottom lies below the top of the
/// visible area.
///
/// The host must have rendered the scroller's current layout. Returns `None` when
/// nothing visible is rendered.
pub fn capture_first_visible_anchor<T, K, S, H>(
    scroller: &VirtualScroller<T, K, S>,
    host: &H,
) -> Option<ScrollAnchor<K>>
where
    K: ItemKey,
    H: ScrollerHost<T, S> + ?Sized,
{
    let visible = host.visible_area_bounds();
    let range = scroller.shown_range()?;
    for index in range.first..=range.last {
        let (Ok(top), Ok(height)) = (
            host.rendered_item_top_offset(index),
            host.rendered_item_height(index),
        ) else {
            continue;
        };
        if top + height > visible.top {
            let key = (scroller.options().item_key)(&scroller.items()[index]);
            return Some(ScrollAnchor {
                key,
                offset_in_viewport: visible.top - top,
            });
        }
    }
    None
}

/// Applies a previously captured anchor by scrolling the host.
///
/// Uses the rendered position of the anchor item, or its exact layout position when
/// it is not rendered. The caller forwards the resulting scroll to the scroller.
///
/// Returns `true` when the anchor was successfully applied.
pub fn apply_anchor<T, K, S, H>(
    scroller: &VirtualScroller<T, K, S>,
    host: &mut H,
    anchor: &ScrollAnchor<K>,
) -> bool
where
    K: ItemKey,
    H: ScrollerHost<T, S> + ?Sized,
{
    let Some(index) = scroller.index_of(&anchor.key) else {
        return false;
    };
    let list_top = host.list_top_offset();
    let top = match host.rendered_item_top_offset(index) {
        Ok(top) => top,
        Err(_) => match scroller.item_scroll_position(&*host, &anchor.key) {
            Some(position) => position - list_top,
            None => return false,
        },
    };
    host.scroll_to_y(list_top + top + anchor.offset_in_viewport);
    true
}
