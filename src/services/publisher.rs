//! Hand-off of results and notices to the presentation side.

use posterize::Palette;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

use crate::error::{ErrorKind, SessionError};
use crate::models::QuantizationRequest;

/// One published result: bitmap and palette from the same computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Increases with every accepted request; later results have larger values
    pub generation: u64,
    pub request: QuantizationRequest,
    pub width: u32,
    pub height: u32,
    /// 8-bit RGBA pixels, row-major
    pub rgba: Vec<u8>,
    pub palette: Palette,
}

/// User-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// `None` for informational notices
    pub kind: Option<ErrorKind>,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
        }
    }

    pub fn error(error: &SessionError) -> Self {
        Self {
            kind: Some(error.kind()),
            message: error.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind.is_some()
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "[{kind}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Single-slot latest result plus a notice broadcast
pub struct ResultPublisher {
    results: watch::Sender<Option<Arc<Rendered>>>,
    notices: broadcast::Sender<Notice>,
}

impl ResultPublisher {
    pub fn new() -> Self {
        let (results, _) = watch::channel(None);
        let (notices, _) = broadcast::channel(64);
        Self { results, notices }
    }

    /// Replace the displayed result
    ///
    /// Returns false, leaving the slot untouched, if a result with the same
    /// or a later generation is already published.
    pub fn publish(&self, rendered: Arc<Rendered>) -> bool {
        let generation = rendered.generation;
        let request = rendered.request;
        let accepted = self.results.send_if_modified(|slot| match slot {
            Some(current) if current.generation >= generation => false,
            _ => {
                *slot = Some(rendered);
                true
            }
        });

        if accepted {
            tracing::debug!(generation, %request, "Published result");
        } else {
            tracing::debug!(generation, %request, "Dropped out-of-order result");
        }
        accepted
    }

    pub fn notify(&self, notice: Notice) {
        if notice.is_error() {
            tracing::warn!(notice = %notice, "Session notice");
        } else {
            tracing::info!(notice = %notice, "Session notice");
        }
        // No receivers is fine
        let _ = self.notices.send(notice);
    }

    pub fn latest(&self) -> Option<Arc<Rendered>> {
        self.results.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Rendered>>> {
        self.results.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }
}

impl Default for ResultPublisher {
    fn default() -> Self {
        Self::new()
    }
}
