//! Source handle allocation
//!
//! Handles identify sources to the dispatcher and in log output. They are
//! issued in strictly increasing order starting at 0 and are never reused
//! unless the allocator is reset.

use std::sync::atomic::{AtomicU32, Ordering};

/// Issues unique source handles
///
/// Owned by whoever creates sources (normally the
/// [`SourceRegistry`](crate::registry::SourceRegistry)) and passed to
/// [`AudioSource::new`](crate::source::AudioSource::new) explicitly.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    next: AtomicU32,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next handle
    pub fn next(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Handle the next call to [`next`](Self::next) will return
    pub fn peek(&self) -> u32 {
        self.next.load(Ordering::Relaxed)
    }

    /// Restart numbering at 0
    ///
    /// Only for startup and tests: sources created before the reset keep
    /// their handles, so live sources and new ones may collide.
    pub fn reset(&self) {
        self.next.store(0, Ordering::Relaxed);
    }
}
