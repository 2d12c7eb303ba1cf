use alloc::vec::Vec;

use crate::error::Reporter;
use crate::{Error, RenderedItems, Result, ShownRange};

/// Per-item measured heights plus a running average.
///
/// The average is taken over a *contiguous* span of measured items. Measuring a
/// range that neither overlaps nor touches the span starts a new span.
#[derive(Clone, Debug, Default)]
pub struct ItemHeights {
    heights: Vec<Option<f64>>,
    measured_sum: f64,
    measured_count: usize,
    measured_span: Option<(usize, usize)>,
}

impl ItemHeights {
    pub fn new(len: usize) -> Self {
        Self {
            heights: alloc::vec![None; len],
            measured_sum: 0.0,
            measured_count: 0,
            measured_span: None,
        }
    }

    /// Seeds the tracker from a restored, possibly partial, height table.
    ///
    /// The first contiguous run of known heights becomes the measured span.
    pub fn initialize(heights: Vec<Option<f64>>) -> Self {
        let mut measured_sum = 0.0;
        let mut measured_count = 0;
        let mut measured_span: Option<(usize, usize)> = None;
        for (i, h) in heights.iter().enumerate() {
            match (h, measured_span) {
                (Some(h), None) => {
                    measured_sum += h;
                    measured_count += 1;
                    measured_span = Some((i, i));
                }
                (Some(h), Some((first, _))) => {
                    measured_sum += h;
                    measured_count += 1;
                    measured_span = Some((first, i));
                }
                (None, Some(_)) => break,
                (None, None) => {}
            }
        }
        Self {
            heights,
            measured_sum,
            measured_count,
            measured_span,
        }
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.heights.get(index).copied().flatten()
    }

    pub fn as_slice(&self) -> &[Option<f64>] {
        &self.heights
    }

    /// The `[first, last]` bounds of the contiguous measured span.
    pub fn measured_span(&self) -> Option<(usize, usize)> {
        self.measured_span
    }

    /// Mean height over the measured span, or `0.0` when nothing is measured.
    pub fn average(&self) -> f64 {
        if self.measured_count == 0 {
            return 0.0;
        }
        self.measured_sum / self.measured_count as f64
    }

    pub fn reset(&mut self, len: usize) {
        self.heights.clear();
        self.heights.resize(len, None);
        self.reset_average();
    }

    fn reset_average(&mut self) {
        self.measured_sum = 0.0;
        self.measured_count = 0;
        self.measured_span = None;
    }

    /// Measures the rendered `range`.
    ///
    /// Items outside the measured span are measured and added to it. Items inside
    /// it are re-validated: a changed height is reported and overwritten.
    /// Returns the indexes that were measured for the first time in this span.
    pub(crate) fn measure(
        &mut self,
        surface: &(impl RenderedItems + ?Sized),
        range: ShownRange,
        reporter: &Reporter,
    ) -> Vec<usize> {
        if range.first >= self.len() {
            return Vec::new();
        }
        let range = ShownRange::new(range.first, range.last.min(self.len() - 1));
        if let Some((first, last)) = self.measured_span {
            if range.first > last + 1 || range.last + 1 < first {
                vtrace!(first, last, "ItemHeights: non-contiguous range, resetting average");
                self.reset_average();
            }
        }

        let span = self.measured_span;
        let mut measured = Vec::new();
        for i in range.first..=range.last {
            let height = match surface.rendered_item_height(i) {
                Ok(h) => h,
                Err(err) => {
                    reporter.report(err);
                    continue;
                }
            };
            let inside_span = matches!(span, Some((first, last)) if i >= first && i <= last);
            if inside_span {
                match self.heights[i] {
                    Some(previous) => {
                        if previous != height {
                            reporter.report(Error::HeightMismatch {
                                index: i,
                                previous,
                                measured: height,
                            });
                            self.measured_sum += height - previous;
                            self.heights[i] = Some(height);
                        }
                    }
                    None => {
                        self.measured_sum += height;
                        self.measured_count += 1;
                        self.heights[i] = Some(height);
                        measured.push(i);
                    }
                }
            } else {
                self.measured_sum += height;
                self.measured_count += 1;
                self.heights[i] = Some(height);
                self.extend_span(i);
                measured.push(i);
            }
        }
        measured
    }

    fn extend_span(&mut self, index: usize) {
        self.measured_span = Some(match self.measured_span {
            Some((first, last)) => (first.min(index), last.max(index)),
            None => (index, index),
        });
    }

    /// Re-measures a single rendered item after its height changed.
    ///
    /// Returns the new height.
    pub(crate) fn remeasure_one(
        &mut self,
        surface: &(impl RenderedItems + ?Sized),
        index: usize,
    ) -> Result<f64> {
        let height = surface.rendered_item_height(index)?;
        let previous = self.heights.get(index).copied().flatten();
        self.heights[index] = Some(height);
        match self.measured_span {
            Some((first, last)) if index >= first && index <= last => match previous {
                Some(previous) => self.measured_sum += height - previous,
                None => {
                    self.measured_sum += height;
                    self.measured_count += 1;
                }
            },
            Some((first, last)) if index + 1 == first || index == last + 1 => {
                self.measured_sum += height;
                self.measured_count += 1;
                self.extend_span(index);
            }
            Some(_) => {}
            None => {
                self.measured_sum = height;
                self.measured_count = 1;
                self.measured_span = Some((index, index));
            }
        }
        vtrace!(index, height, "ItemHeights::remeasure_one");
        Ok(height)
    }

    /// Marks one item as unmeasured. It is measured again when next rendered.
    pub(crate) fn forget(&mut self, index: usize) {
        let Some(previous) = self.heights.get_mut(index).and_then(Option::take) else {
            return;
        };
        if let Some((first, last)) = self.measured_span {
            if index >= first && index <= last {
                self.measured_sum -= previous;
                self.measured_count -= 1;
            }
        }
    }

    /// Shifts everything down by `count` unmeasured items.
    pub(crate) fn on_prepend(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.heights
            .splice(0..0, core::iter::repeat_n(None, count));
        self.measured_span = self
            .measured_span
            .map(|(first, last)| (first + count, last + count));
    }

    pub(crate) fn on_append(&mut self, count: usize) {
        let len = self.heights.len() + count;
        self.heights.resize(len, None);
    }
}
