//! Tracing setup
//!
//! The subscriber has to exist before configuration is loaded, otherwise
//! config warnings are lost, but the configured log level is only known
//! afterwards. The filter is therefore installed behind a reload layer and
//! narrowed once the config file has been read. `RUST_LOG` always wins.

use tracing::warn;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Level used until the configured one is known
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Filter directives for the server crates at `level`
pub fn filter_directives(level: &str) -> String {
    format!("oas_server={level},oas_common={level}")
}

/// Reloadable filter layer for the global subscriber
pub type FilterLayer = reload::Layer<EnvFilter, Registry>;

/// Handle for narrowing the log filter after startup
#[derive(Debug, Clone)]
pub struct LogFilter {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogFilter {
    /// Filter from `RUST_LOG`, or `DEFAULT_LOG_LEVEL` for the server crates
    pub fn from_env() -> (FilterLayer, Self) {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Self::build(filter, true),
            Err(_) => Self::with_level(DEFAULT_LOG_LEVEL),
        }
    }

    /// Filter for the server crates at `level`, ignoring `RUST_LOG`
    pub fn with_level(level: &str) -> (FilterLayer, Self) {
        Self::build(EnvFilter::new(filter_directives(level)), false)
    }

    fn build(filter: EnvFilter, from_env: bool) -> (FilterLayer, Self) {
        let (layer, handle) = reload::Layer::new(filter);
        (layer, Self { handle, from_env })
    }

    /// Switch to the configured level
    ///
    /// No-op when the filter came from `RUST_LOG`. An unparsable level is
    /// logged and the current filter kept.
    pub fn apply_level(&self, level: &str) {
        if self.from_env {
            return;
        }

        let filter = match EnvFilter::try_new(filter_directives(level)) {
            Ok(filter) => filter,
            Err(e) => {
                warn!("Invalid log level {:?} in config: {}", level, e);
                return;
            }
        };
        if let Err(e) = self.handle.reload(filter) {
            warn!("Failed to apply log level {:?}: {}", level, e);
        }
    }
}
