use alloc::string::String;
use alloc::sync::Arc;

/// Errors and diagnostics raised by the scroller.
///
/// Only [`Error::Misuse`] is ever returned to the caller. The other variants are
/// non-fatal: they go through the reporting seam (a `tracing` warning plus
/// [`crate::ScrollerOptions::on_error`]) and the current layout pass carries on
/// with its best estimate.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// Invalid or conflicting configuration, or a malformed persisted state.
    #[error("misuse: {0}")]
    Misuse(String),

    /// A measurement was requested for an item the host has not materialized.
    #[error("item #{index} is not rendered")]
    NotRendered { index: usize },

    /// A rendered item's height changed without a height-change notification.
    #[error(
        "item #{index} height changed unexpectedly from {previous} to {measured}; \
         call `on_item_height_did_change` when an item's height changes"
    )]
    HeightMismatch {
        index: usize,
        previous: f64,
        measured: f64,
    },

    /// The host lacks a capability the scroller needs.
    #[error("host is not supported: {0}")]
    Unsupported(String),
}

impl Error {
    pub fn misuse(message: impl Into<String>) -> Self {
        Self::Misuse(message.into())
    }

    /// Whether the error aborts the operation that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Misuse(_))
    }
}

pub type Result<T> = core::result::Result<T, Error>;

/// A callback that observes every non-fatal error the scroller reports.
pub type ErrorCallback = Arc<dyn Fn(&Error) + Send + Sync>;

/// The single seam internal diagnostics go through.
#[derive(Clone, Default)]
pub(crate) struct Reporter {
    callback: Option<ErrorCallback>,
}

impl Reporter {
    pub(crate) fn new(callback: Option<ErrorCallback>) -> Self {
        Self { callback }
    }

    pub(crate) fn report(&self, error: Error) {
        vwarn!(error = %error, "virtual scroller diagnostic");
        if let Some(cb) = &self.callback {
            cb(&error);
        }
    }
}

impl core::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Reporter")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
