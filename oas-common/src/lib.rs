//! # OAS Common Library
//!
//! Shared code for the OpenAL audio server crates including:
//! - Error types
//! - Server configuration (`ServerInfo`, TOML bootstrap file)
//! - Monotonic timer/interval type and injectable clocks

pub mod config;
pub mod error;
pub mod time;

pub use config::ServerInfo;
pub use error::{Error, Result};
pub use time::{Clock, ManualClock, MonotonicClock, Time};
