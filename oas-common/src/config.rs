//! Server information and bootstrap configuration
//!
//! Configuration is read from a small TOML file. The file is located using
//! this priority order:
//! 1. Explicit path (command-line argument)
//! 2. `OAS_CONFIG` environment variable
//! 3. User config directory (`~/.config/oas/config.toml` on Linux)
//! 4. System config (`/etc/oas/config.toml`, Linux only)
//!
//! A missing config file is not fatal: a warning is logged and built-in
//! defaults are used. A config file that exists but cannot be parsed is an
//! error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "OAS_CONFIG";

/// Default TCP port the server listens on
pub const DEFAULT_PORT: u16 = 31231;

/// Default interval between source update polls
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 20;

/// Runtime description of the server instance
///
/// Holds the values every component may need to report or act on: where
/// uploaded audio is cached, which port the server answers on, which output
/// device was requested, and whether a GUI status display is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    cache_directory: PathBuf,
    port: u16,
    audio_device: String,
    use_gui: bool,
}

impl ServerInfo {
    pub fn new(cache_directory: impl Into<PathBuf>, port: u16) -> Self {
        Self {
            cache_directory: cache_directory.into(),
            port,
            audio_device: String::new(),
            use_gui: false,
        }
    }

    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Requested audio output device (empty means system default)
    pub fn audio_device(&self) -> &str {
        &self.audio_device
    }

    pub fn set_audio_device(&mut self, device: impl Into<String>) {
        self.audio_device = device.into();
    }

    pub fn use_gui(&self) -> bool {
        self.use_gui
    }

    pub fn set_gui(&mut self, use_gui: bool) {
        self.use_gui = use_gui;
    }
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self::new(default_cache_directory(), DEFAULT_PORT)
    }
}

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TomlConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory where uploaded audio files are cached
    #[serde(default = "default_cache_directory")]
    pub cache_directory: PathBuf,

    /// Output device name (empty = system default)
    #[serde(default)]
    pub audio_device: String,

    /// Attach the GUI status display
    #[serde(default)]
    pub gui: bool,

    /// Interval between source update polls in milliseconds
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cache_directory: default_cache_directory(),
            audio_device: String::new(),
            gui: false,
            update_interval_ms: default_update_interval_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_update_interval_ms() -> u64 {
    DEFAULT_UPDATE_INTERVAL_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn parse(text: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(text)?;
        if config.update_interval_ms == 0 {
            return Err(Error::Config(
                "update_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load configuration from an existing file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        let config = Self::parse(&text)?;
        info!("Loaded TOML configuration from {:?}", path);
        Ok(config)
    }

    /// Locate and load the config file, falling back to defaults
    ///
    /// Only a missing file degrades to defaults; unreadable or malformed
    /// files are reported as errors.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match resolve_config_path(explicit) {
            Some(path) if path.exists() => Self::load(&path),
            Some(path) => {
                warn!("Config file {:?} not found, using built-in defaults", path);
                Ok(Self::default())
            }
            None => {
                warn!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Build the server description from this configuration
    pub fn server_info(&self) -> ServerInfo {
        let mut info = ServerInfo::new(self.cache_directory.clone(), self.port);
        info.set_audio_device(self.audio_device.clone());
        info.set_gui(self.gui);
        info
    }
}

/// Resolve the config file path by priority
///
/// Returns the explicit or environment-provided path even if it does not
/// exist, so callers can report which file was expected. Platform default
/// locations are only returned when present.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    if let Some(user) = dirs::config_dir().map(|d| d.join("oas").join("config.toml")) {
        if user.exists() {
            return Some(user);
        }
    }

    if cfg!(target_os = "linux") {
        let system = PathBuf::from("/etc/oas/config.toml");
        if system.exists() {
            return Some(system);
        }
    }

    None
}

/// OS-dependent default cache directory
pub fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("oas"))
        .unwrap_or_else(|| std::env::temp_dir().join("oas_cache"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_info_accessors() {
        let mut info = ServerInfo::new("/tmp/oas-cache", 4000);
        assert_eq!(info.cache_directory(), Path::new("/tmp/oas-cache"));
        assert_eq!(info.port(), 4000);
        assert_eq!(info.audio_device(), "");
        assert!(!info.use_gui());

        info.set_audio_device("ALSA Default");
        info.set_gui(true);
        assert_eq!(info.audio_device(), "ALSA Default");
        assert!(info.use_gui());
    }

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.update_interval_ms, DEFAULT_UPDATE_INTERVAL_MS);
        assert_eq!(config.logging.level, "info");
        assert!(!config.gui);
        assert!(!config.cache_directory.as_os_str().is_empty());
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = TomlConfig::parse("").unwrap();
        assert_eq!(config, TomlConfig::default());
    }

    #[test]
    fn test_parse_full() {
        let config = TomlConfig::parse(
            r#"
            port = 5000
            cache_directory = "/var/cache/oas"
            audio_device = "hw:1"
            gui = true
            update_interval_ms = 50

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.cache_directory, PathBuf::from("/var/cache/oas"));
        assert_eq!(config.audio_device, "hw:1");
        assert!(config.gui);
        assert_eq!(config.update_interval_ms, 50);
        assert_eq!(config.logging.level, "debug");

        let info = config.server_info();
        assert_eq!(info.port(), 5000);
        assert_eq!(info.audio_device(), "hw:1");
        assert!(info.use_gui());
    }

    #[test]
    fn test_parse_rejects_zero_interval() {
        let result = TomlConfig::parse("update_interval_ms = 0");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let result = TomlConfig::parse("port = \"not a number\"");
        assert!(matches!(result, Err(Error::Toml(_))));
    }
}
