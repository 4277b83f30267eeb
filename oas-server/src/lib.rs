//! # OAS Audio Server Library (oas-server)
//!
//! Per-source playback control for a networked audio-rendering server.
//!
//! **Purpose:** Own the lifecycle, cached parameters and transport state of
//! each sound source, reconcile them with a pollable audio backend, and run
//! time-driven gain fades.
//!
//! **Architecture:** Dispatchers hold sources in a [`registry::SourceRegistry`]
//! and poll them periodically. Every backend interaction goes through the
//! [`backend::AudioBackend`] trait so the controller can be driven by an
//! in-memory backend in tests.

pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod source;

pub use error::{Error, Result};
pub use registry::SourceRegistry;
pub use source::{AudioSource, HandleAllocator, SourceState};
