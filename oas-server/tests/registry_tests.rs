//! Integration tests for SourceRegistry

use std::sync::Arc;

use oas_common::ManualClock;
use oas_server::backend::memory::Operation;
use oas_server::backend::{error_code, state_code, MemoryBackend};
use oas_server::{Error, SourceRegistry, SourceState};

fn setup() -> (Arc<MemoryBackend>, Arc<ManualClock>, SourceRegistry) {
    let backend = Arc::new(MemoryBackend::recording());
    let clock = Arc::new(ManualClock::new());
    let registry = SourceRegistry::new(backend.clone(), clock.clone());
    (backend, clock, registry)
}

#[test]
fn test_update_all_reports_fading_and_finished_sources() {
    let (backend, clock, mut registry) = setup();
    let buffer = backend.add_buffer();

    let idle = registry.create_source(buffer).unwrap();
    let fading = registry.create_source(buffer).unwrap();
    let playing = registry.create_source(buffer).unwrap();

    registry.source_mut(fading).unwrap().set_fade(0.0, 2.0).unwrap();
    registry.source_mut(playing).unwrap().play().unwrap();

    clock.advance_secs_f64(1.0);
    assert_eq!(registry.update_all(), vec![fading]);

    // Playback of the third source ends on its own
    let id = registry.get(playing).unwrap().backend_id().unwrap();
    backend.set_source_state(id, state_code::STOPPED);
    clock.advance_secs_f64(1.0);

    assert_eq!(registry.update_all(), vec![fading, playing]);
    assert_eq!(registry.get(playing).unwrap().state(), SourceState::Stopped);
    assert_eq!(registry.get(fading).unwrap().gain(), 0.0);
    assert!(registry.get(idle).unwrap().fade().is_none());

    assert!(registry.update_all().is_empty());
}

#[test]
fn test_failed_delete_keeps_source_registered() {
    let (backend, _clock, mut registry) = setup();
    let buffer = backend.add_buffer();
    let handle = registry.create_source(buffer).unwrap();

    backend.fail_once(Operation::DeleteSource, error_code::INVALID_OPERATION);
    assert!(matches!(
        registry.delete_source(handle),
        Err(Error::Backend { handle: 0, .. })
    ));
    assert_eq!(registry.len(), 1);

    registry.delete_source(handle).unwrap();
    assert!(registry.is_empty());
    assert_eq!(backend.live_sources(), 0);
}

#[test]
fn test_status_rows_by_handle() {
    let (backend, _clock, mut registry) = setup();
    let buffer = backend.add_buffer();
    let handle = registry.create_source(buffer).unwrap();
    registry.source_mut(handle).unwrap().set_gain(0.5).unwrap();

    let rows = registry.status_rows(handle).unwrap();
    assert_eq!(rows[0], ("Status", "Stopped".to_string()));
    assert_eq!(rows[1], ("Gain", "0.50".to_string()));
}

#[test]
fn test_reset_counts_failed_releases() {
    let (backend, _clock, mut registry) = setup();
    let buffer = backend.add_buffer();
    registry.create_source(buffer).unwrap();
    registry.create_source(buffer).unwrap();

    backend.fail_once(Operation::DeleteSource, error_code::INVALID_OPERATION);
    assert_eq!(registry.reset(), 1);
    assert!(registry.is_empty());

    // The failed source got one more release attempt when it was dropped
    assert_eq!(backend.live_sources(), 0);
    assert_eq!(registry.create_source(buffer).unwrap(), 0);
}

#[test]
fn test_polling_with_plain_backend_does_not_grow_call_log() {
    let backend = Arc::new(MemoryBackend::new());
    let mut registry = SourceRegistry::new(backend.clone(), Arc::new(ManualClock::new()));
    let buffer = backend.add_buffer();
    let handle = registry.create_source(buffer).unwrap();
    registry.source_mut(handle).unwrap().play().unwrap();

    for _ in 0..50_000 {
        registry.update_all();
    }

    assert!(backend.calls().is_empty());
    assert_eq!(registry.get(handle).unwrap().state(), SourceState::Playing);
}
