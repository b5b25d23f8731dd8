//! Owned image buffers with explicit release.
//!
//! Every pixel buffer a session holds is registered with a [`BufferLedger`]
//! on acquisition and removed from it on release. A [`NativeBuffer`] cannot
//! be cloned; it is released either by [`NativeBuffer::release`] (which
//! consumes it) or when it is dropped, so a second release or a use after
//! release does not compile.

use posterize::PixelBuffer;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub type BufferId = u64;

/// Role of a buffer inside a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferKind {
    /// Decoded, unmodified input image
    Source,
    /// Quantized image derived from the source
    Derived,
}

/// Acquisition counters of a ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LedgerStats {
    pub acquired: u64,
    pub released: u64,
}

impl LedgerStats {
    pub fn live(&self) -> u64 {
        self.acquired - self.released
    }
}

/// Read-only description of a live buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BufferInfo {
    pub id: BufferId,
    pub kind: BufferKind,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

#[derive(Default)]
struct LedgerInner {
    next_id: AtomicU64,
    acquired: AtomicU64,
    released: AtomicU64,
    live: Mutex<HashMap<BufferId, BufferKind>>,
}

/// Tracks every buffer acquired for a session.
#[derive(Clone, Default)]
pub struct BufferLedger {
    inner: Arc<LedgerInner>,
}

impl BufferLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `pixels` as a new buffer of `kind`.
    pub fn acquire(&self, kind: BufferKind, pixels: PixelBuffer) -> NativeBuffer {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.live_map().insert(id, kind);
        self.inner.acquired.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(
            id,
            ?kind,
            width = pixels.width(),
            height = pixels.height(),
            "Acquired buffer"
        );

        NativeBuffer {
            id,
            kind,
            pixels,
            ledger: self.clone(),
        }
    }

    fn release_id(&self, id: BufferId) -> Result<BufferKind, BufferId> {
        let kind = self.live_map().remove(&id).ok_or(id)?;
        self.inner.released.fetch_add(1, Ordering::AcqRel);
        Ok(kind)
    }

    /// Number of live buffers of `kind`.
    pub fn live(&self, kind: BufferKind) -> usize {
        self.live_map().values().filter(|&&k| k == kind).count()
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            acquired: self.inner.acquired.load(Ordering::Acquire),
            released: self.inner.released.load(Ordering::Acquire),
        }
    }

    fn live_map(&self) -> MutexGuard<'_, HashMap<BufferId, BufferKind>> {
        // The map stays consistent even if a holder panicked
        self.inner
            .live
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for BufferLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferLedger")
            .field("stats", &self.stats())
            .finish()
    }
}

/// A pixel buffer owned by exactly one holder.
///
/// Moving the handle moves the release obligation with it. Borrowers get
/// read-only access through [`pixels`](Self::pixels).
pub struct NativeBuffer {
    id: BufferId,
    kind: BufferKind,
    pixels: PixelBuffer,
    ledger: BufferLedger,
}

impl NativeBuffer {
    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn info(&self) -> BufferInfo {
        BufferInfo {
            id: self.id,
            kind: self.kind,
            width: self.pixels.width(),
            height: self.pixels.height(),
            format: self.pixels.format().to_string(),
        }
    }

    /// Release the buffer now.
    pub fn release(self) {
        drop(self)
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        match self.ledger.release_id(self.id) {
            Ok(kind) => tracing::trace!(id = self.id, ?kind, "Released buffer"),
            // Nothing to retry; the pixels are freed with the handle
            Err(id) => tracing::error!(id, "Buffer release failed: not registered"),
        }
    }
}

impl std::fmt::Debug for NativeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBuffer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish()
    }
}
