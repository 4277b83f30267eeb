//! oas-server configuration
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (--port, --cache-dir, --device, --gui)
//! 2. TOML configuration file (located per `oas_common::config`)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use oas_common::config::TomlConfig;
use oas_common::ServerInfo;
use tracing::info;

use crate::Result;

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub cache_directory: Option<PathBuf>,
    pub audio_device: Option<String>,
    /// GUI can only be switched on from the command line
    pub gui: bool,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    server_info: ServerInfo,
    update_interval: Duration,
    log_level: String,
}

impl ServerConfig {
    /// Load the TOML file (or defaults) and apply command-line overrides
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be read or parsed.
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let toml = TomlConfig::load_or_default(overrides.config_path.as_deref())?;
        Ok(Self::merge(toml, overrides))
    }

    /// Apply overrides on top of file configuration
    pub fn merge(toml: TomlConfig, overrides: ConfigOverrides) -> Self {
        let port = overrides.port.unwrap_or(toml.port);
        let cache_directory = overrides
            .cache_directory
            .unwrap_or_else(|| toml.cache_directory.clone());

        let mut server_info = ServerInfo::new(cache_directory, port);
        server_info.set_audio_device(
            overrides
                .audio_device
                .unwrap_or_else(|| toml.audio_device.clone()),
        );
        server_info.set_gui(overrides.gui || toml.gui);

        info!(
            "Server config: port {}, cache {:?}, device {:?}, gui {}",
            server_info.port(),
            server_info.cache_directory(),
            server_info.audio_device(),
            server_info.use_gui()
        );

        Self {
            server_info,
            update_interval: Duration::from_millis(toml.update_interval_ms),
            log_level: toml.logging.level,
        }
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Interval between source update polls
    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}
