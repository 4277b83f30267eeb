//! Source registry
//!
//! Dispatcher-side container for live sources. It owns the handle allocator
//! and the shared backend and clock, creates sources on request, finds them
//! by handle, and polls all of them in one call from the server's update
//! loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use oas_common::Clock;
use tracing::{debug, info, warn};

use crate::backend::{AudioBackend, BufferId};
use crate::source::{AudioSource, HandleAllocator};
use crate::{Error, Result};

/// Live sources keyed by handle
pub struct SourceRegistry {
    backend: Arc<dyn AudioBackend>,
    clock: Arc<dyn Clock>,
    handles: HandleAllocator,
    sources: BTreeMap<u32, AudioSource>,
}

impl SourceRegistry {
    pub fn new(backend: Arc<dyn AudioBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            handles: HandleAllocator::new(),
            sources: BTreeMap::new(),
        }
    }

    /// Create a source for `buffer` and return its handle
    ///
    /// A source the backend could not create is not kept; its handle is
    /// still consumed.
    pub fn create_source(&mut self, buffer: BufferId) -> Result<u32> {
        let source = AudioSource::new(
            self.backend.clone(),
            buffer,
            &self.handles,
            self.clock.clone(),
        );
        let handle = source.handle();

        if !source.is_valid() {
            warn!("Sound source {} for buffer {} could not be created", handle, buffer);
            return Err(Error::InvalidSource(handle));
        }

        self.sources.insert(handle, source);
        Ok(handle)
    }

    pub fn get(&self, handle: u32) -> Option<&AudioSource> {
        self.sources.get(&handle)
    }

    pub fn get_mut(&mut self, handle: u32) -> Option<&mut AudioSource> {
        self.sources.get_mut(&handle)
    }

    /// Look up a source, reporting a missing handle as an error
    pub fn source_mut(&mut self, handle: u32) -> Result<&mut AudioSource> {
        self.sources.get_mut(&handle).ok_or(Error::NotFound(handle))
    }

    /// Delete a source and forget it
    ///
    /// If the backend refuses the release, the source stays registered so
    /// the deletion can be retried.
    pub fn delete_source(&mut self, handle: u32) -> Result<()> {
        self.source_mut(handle)?.delete_source()?;
        self.sources.remove(&handle);
        Ok(())
    }

    /// Poll every source; returns the handles whose state or gain changed
    pub fn update_all(&mut self) -> Vec<u32> {
        let changed: Vec<u32> = self
            .sources
            .iter_mut()
            .filter_map(|(handle, source)| source.update(false).then_some(*handle))
            .collect();

        if !changed.is_empty() {
            debug!("Sound sources changed: {:?}", changed);
        }
        changed
    }

    /// Diagnostic rows for one source
    pub fn status_rows(&self, handle: u32) -> Result<Vec<(&'static str, String)>> {
        self.get(handle)
            .map(AudioSource::status_rows)
            .ok_or(Error::NotFound(handle))
    }

    /// Delete every source and restart handle numbering
    ///
    /// Returns the number of sources whose backend release failed. Those are
    /// dropped anyway, which makes one more release attempt.
    pub fn reset(&mut self) -> usize {
        let mut failed = 0;
        for (handle, source) in self.sources.iter_mut() {
            if let Err(e) = source.delete_source() {
                warn!("Sound source {} not deleted during reset: {}", handle, e);
                failed += 1;
            }
        }

        let count = self.sources.len();
        self.sources.clear();
        self.handles.reset();
        info!("Reset sound sources ({} removed, {} failed)", count, failed);
        failed
    }

    /// Registered handles in ascending order
    pub fn handles(&self) -> impl Iterator<Item = u32> + '_ {
        self.sources.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
