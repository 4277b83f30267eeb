//! Log output during startup
//!
//! The subscriber is installed before configuration is loaded, so warnings
//! from config resolution must reach it, and the configured level must take
//! effect afterwards.

use std::io::{self, Write};
use std::sync::Arc;

use oas_server::config::{ConfigOverrides, ServerConfig};
use oas_server::logging::LogFilter;
use parking_lot::Mutex;
use serial_test::serial;
use tempfile::TempDir;
use tracing_subscriber::layer::SubscriberExt;

/// In-memory log sink
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_startup<F: FnOnce(&LogFilter)>(level: &str, f: F) -> String {
    let (filter_layer, filter) = LogFilter::with_level(level);
    let sink = Captured::default();
    let writer = sink.clone();
    let subscriber = tracing_subscriber::registry().with(filter_layer).with(
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(move || writer.clone()),
    );

    tracing::subscriber::with_default(subscriber, || f(&filter));
    sink.text()
}

#[test]
#[serial]
fn test_missing_config_warning_is_logged() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let output = capture_startup("info", |filter| {
        let config = ServerConfig::load(ConfigOverrides {
            config_path: Some(missing.clone()),
            ..ConfigOverrides::default()
        })
        .unwrap();
        filter.apply_level(config.log_level());
    });

    assert!(output.contains("using built-in defaults"), "log was: {}", output);
    assert!(output.contains("Server config: port"), "log was: {}", output);
}

#[test]
#[serial]
fn test_configured_level_applies_after_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let output = capture_startup("info", |filter| {
        let config = ServerConfig::load(ConfigOverrides {
            config_path: Some(path.clone()),
            ..ConfigOverrides::default()
        })
        .unwrap();
        filter.apply_level(config.log_level());

        tracing::info!(target: "oas_server", "info after narrowing");
        tracing::warn!(target: "oas_server", "warn after narrowing");
    });

    // Logged at the startup level, before the config took effect
    assert!(output.contains("Loaded TOML configuration"), "log was: {}", output);
    assert!(!output.contains("info after narrowing"), "log was: {}", output);
    assert!(output.contains("warn after narrowing"), "log was: {}", output);
}
