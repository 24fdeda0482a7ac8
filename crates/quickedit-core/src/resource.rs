//! Resource lifecycle management.
//!
//! Two kinds of resources are tracked:
//! - [`SourceBuffer`]: the raw bytes of the selected file, registered once
//!   per selection and referenced by every export started from it
//! - [`DecodedImage`]: transient rasters decoded during an export
//!
//! Both are wrapped in a [`Handle`]. A handle releases its resource exactly
//! once, either through [`Handle::release`] or when it is dropped, so early
//! returns and `?` never leak. Each handle carries a [`Lease`] which other
//! owners can clone to observe whether the resource is still live.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::decode::{decode_image, DecodeError, DecodedImage};

/// Raw bytes of a selected file.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    bytes: Arc<[u8]>,
}

impl SourceBuffer {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Shared copy of the bytes. Stays valid after the buffer is released.
    pub fn shared(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Liveness flag shared between a handle and its observers.
#[derive(Debug, Clone)]
pub struct Lease {
    live: Arc<AtomicBool>,
}

impl Lease {
    fn new() -> Self {
        Self {
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// `false` once the owning handle has been released.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Flip to released. Returns `true` only for the call that did it.
    fn revoke(&self) -> bool {
        self.live.swap(false, Ordering::AcqRel)
    }
}

#[derive(Debug, Default)]
struct Ledger {
    next_id: AtomicU64,
    acquired: AtomicU64,
    released: AtomicU64,
}

/// Snapshot of the tracker's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ResourceStats {
    pub acquired: u64,
    pub released: u64,
    pub live: u64,
}

/// Hands out handles and counts how many were acquired and released.
///
/// Cloning a tracker shares its counters.
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    ledger: Arc<Ledger>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `source_bytes` and wrap the raster in a handle.
    ///
    /// Nothing is counted when decoding fails.
    pub fn acquire(&self, source_bytes: &[u8]) -> Result<Handle<DecodedImage>, DecodeError> {
        let image = decode_image(source_bytes)?;
        let handle = self.track(image);
        debug!(
            id = handle.id,
            width = handle.resource.as_ref().map_or(0, |i| i.width),
            height = handle.resource.as_ref().map_or(0, |i| i.height),
            "decoded image acquired"
        );
        Ok(handle)
    }

    /// Register the raw bytes of a newly selected file.
    pub fn register_source(&self, bytes: impl Into<Arc<[u8]>>) -> Handle<SourceBuffer> {
        let handle = self.track(SourceBuffer::new(bytes));
        debug!(
            id = handle.id,
            len = handle.resource.as_ref().map_or(0, SourceBuffer::len),
            "source buffer registered"
        );
        handle
    }

    /// Wrap an already built resource in a tracked handle.
    pub fn track<T>(&self, resource: T) -> Handle<T> {
        let id = self.ledger.next_id.fetch_add(1, Ordering::Relaxed);
        self.ledger.acquired.fetch_add(1, Ordering::Relaxed);
        Handle {
            id,
            resource: Some(resource),
            lease: Lease::new(),
            ledger: Arc::clone(&self.ledger),
        }
    }

    pub fn stats(&self) -> ResourceStats {
        let acquired = self.ledger.acquired.load(Ordering::Relaxed);
        let released = self.ledger.released.load(Ordering::Relaxed);
        ResourceStats {
            acquired,
            released,
            live: acquired.saturating_sub(released),
        }
    }
}

/// Owner of one tracked resource.
#[derive(Debug)]
pub struct Handle<T> {
    id: u64,
    resource: Option<T>,
    lease: Lease,
    ledger: Arc<Ledger>,
}

impl<T> Handle<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The resource, or `None` after release.
    pub fn get(&self) -> Option<&T> {
        self.resource.as_ref()
    }

    pub fn lease(&self) -> Lease {
        self.lease.clone()
    }

    pub fn is_live(&self) -> bool {
        self.lease.is_live()
    }

    /// Release the resource. Calling this more than once is a no-op.
    pub fn release(&mut self) {
        if !self.lease.revoke() {
            return;
        }
        self.resource = None;
        self.ledger.released.fetch_add(1, Ordering::Relaxed);
        debug!(id = self.id, "resource released");
    }
}

impl<T> Drop for Handle<T> {
    fn drop(&mut self) {
        self.release();
    }
}
