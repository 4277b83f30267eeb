//! In-memory audio backend
//!
//! Tracks sources, buffers, parameters and transport state without touching
//! any audio hardware. Failures can be injected per operation so callers
//! can exercise their error paths. A backend built with
//! [`MemoryBackend::recording`] also keeps a log of every call; the plain
//! [`MemoryBackend::new`] keeps none, so a long-running server does not
//! accumulate one.
//!
//! Parameter validation mirrors OpenAL: negative gain, non-positive pitch,
//! out-of-range cone values, negative offsets and non-finite values are
//! rejected with `INVALID_VALUE`; unknown source or buffer ids with
//! `INVALID_NAME`.

use super::{
    error_code, state_code, AudioBackend, BackendError, BackendResult, BufferId, ScalarParam,
    SourceId, Transport, Vec3, VectorParam,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// A recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateSource,
    BindBuffer { source: SourceId, buffer: BufferId },
    DeleteSource { source: SourceId },
    SetScalar { source: SourceId, param: ScalarParam, value: f32 },
    SetVector { source: SourceId, param: VectorParam, value: Vec3 },
    SetLooping { source: SourceId, looping: bool },
    Transport { source: SourceId, command: Transport },
    SourceState { source: SourceId },
}

impl BackendCall {
    /// Operation kind used for failure injection and call counting
    pub fn operation(&self) -> Operation {
        match self {
            BackendCall::CreateSource => Operation::CreateSource,
            BackendCall::BindBuffer { .. } => Operation::BindBuffer,
            BackendCall::DeleteSource { .. } => Operation::DeleteSource,
            BackendCall::SetScalar { param, .. } => Operation::SetScalar(*param),
            BackendCall::SetVector { param, .. } => Operation::SetVector(*param),
            BackendCall::SetLooping { .. } => Operation::SetLooping,
            BackendCall::Transport { command, .. } => Operation::Transport(*command),
            BackendCall::SourceState { .. } => Operation::SourceState,
        }
    }
}

/// Kind of backend operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateSource,
    BindBuffer,
    DeleteSource,
    SetScalar(ScalarParam),
    SetVector(VectorParam),
    SetLooping,
    Transport(Transport),
    SourceState,
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    error: BackendError,
    persistent: bool,
}

#[derive(Debug, Clone)]
struct SimSource {
    buffer: Option<BufferId>,
    state: i32,
    scalars: HashMap<ScalarParam, f32>,
    vectors: HashMap<VectorParam, Vec3>,
    looping: bool,
}

impl SimSource {
    fn new() -> Self {
        Self {
            buffer: None,
            state: state_code::INITIAL,
            scalars: HashMap::new(),
            vectors: HashMap::new(),
            looping: false,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_source: u32,
    next_buffer: u32,
    sources: HashMap<SourceId, SimSource>,
    buffers: HashSet<BufferId>,
    failures: HashMap<Operation, InjectedFailure>,
    record: bool,
    calls: Vec<BackendCall>,
}

impl Inner {
    /// Record the call and consume any failure injected for it
    fn enter(&mut self, call: BackendCall) -> BackendResult<()> {
        let op = call.operation();
        if self.record {
            self.calls.push(call);
        }

        let persistent = match self.failures.get(&op) {
            Some(failure) => failure.persistent,
            None => return Ok(()),
        };
        let failure = if persistent {
            self.failures.get(&op).cloned()
        } else {
            self.failures.remove(&op)
        };
        Err(failure
            .map(|f| f.error)
            .unwrap_or_else(|| BackendError::new(error_code::INVALID_OPERATION)))
    }

    fn source_mut(&mut self, source: SourceId) -> BackendResult<&mut SimSource> {
        self.sources
            .get_mut(&source)
            .ok_or_else(|| BackendError::with_detail(error_code::INVALID_NAME, "unknown source"))
    }
}

/// Software backend holding all state in memory
#[derive(Debug)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    /// Backend without a call log
    pub fn new() -> Self {
        Self::with_recording(false)
    }

    /// Backend that logs every call for [`calls`](Self::calls) and
    /// [`call_count`](Self::call_count)
    pub fn recording() -> Self {
        Self::with_recording(true)
    }

    fn with_recording(record: bool) -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_source: 1,
                next_buffer: 1,
                record,
                ..Inner::default()
            }),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.inner.lock().record
    }

    /// Register a loaded buffer and return its id
    pub fn add_buffer(&self) -> BufferId {
        let mut inner = self.inner.lock();
        let id = BufferId(inner.next_buffer);
        inner.next_buffer += 1;
        inner.buffers.insert(id);
        id
    }

    /// Make the next call of `op` fail with `code`
    pub fn fail_once(&self, op: Operation, code: i32) {
        self.inject(op, BackendError::new(code), false);
    }

    /// Make every call of `op` fail with `code` until cleared
    pub fn fail_always(&self, op: Operation, code: i32) {
        self.inject(op, BackendError::new(code), true);
    }

    /// Inject a failure carrying a full error (code and detail)
    pub fn inject(&self, op: Operation, error: BackendError, persistent: bool) {
        self.inner
            .lock()
            .failures
            .insert(op, InjectedFailure { error, persistent });
    }

    pub fn clear_failures(&self) {
        self.inner.lock().failures.clear();
    }

    /// Force the transport state of a source, e.g. to simulate playback
    /// reaching the end of its buffer
    pub fn set_source_state(&self, source: SourceId, code: i32) {
        if let Some(sim) = self.inner.lock().sources.get_mut(&source) {
            sim.state = code;
        }
    }

    /// All recorded calls, oldest first (empty unless recording)
    pub fn calls(&self) -> Vec<BackendCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Number of recorded calls (successful or not) of one operation kind
    pub fn call_count(&self, op: Operation) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.operation() == op)
            .count()
    }

    pub fn live_sources(&self) -> usize {
        self.inner.lock().sources.len()
    }

    pub fn has_source(&self, source: SourceId) -> bool {
        self.inner.lock().sources.contains_key(&source)
    }

    pub fn bound_buffer(&self, source: SourceId) -> Option<BufferId> {
        self.inner.lock().sources.get(&source).and_then(|s| s.buffer)
    }

    pub fn scalar(&self, source: SourceId, param: ScalarParam) -> Option<f32> {
        self.inner
            .lock()
            .sources
            .get(&source)
            .and_then(|s| s.scalars.get(&param).copied())
    }

    pub fn vector(&self, source: SourceId, param: VectorParam) -> Option<Vec3> {
        self.inner
            .lock()
            .sources
            .get(&source)
            .and_then(|s| s.vectors.get(&param).copied())
    }

    pub fn looping(&self, source: SourceId) -> Option<bool> {
        self.inner.lock().sources.get(&source).map(|s| s.looping)
    }

    pub fn state(&self, source: SourceId) -> Option<i32> {
        self.inner.lock().sources.get(&source).map(|s| s.state)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_scalar(param: ScalarParam, value: f32) -> BackendResult<()> {
    let valid = value.is_finite()
        && match param {
            ScalarParam::Gain
            | ScalarParam::RolloffFactor
            | ScalarParam::ReferenceDistance
            | ScalarParam::SecOffset => value >= 0.0,
            ScalarParam::Pitch => value > 0.0,
            ScalarParam::ConeInnerAngle | ScalarParam::ConeOuterAngle => {
                (0.0..=360.0).contains(&value)
            }
            ScalarParam::ConeOuterGain => (0.0..=1.0).contains(&value),
        };

    if valid {
        Ok(())
    } else {
        Err(BackendError::with_detail(
            error_code::INVALID_VALUE,
            format!("{:?} out of range: {}", param, value),
        ))
    }
}

impl AudioBackend for MemoryBackend {
    fn create_source(&self) -> BackendResult<SourceId> {
        let mut inner = self.inner.lock();
        inner.enter(BackendCall::CreateSource)?;

        let id = SourceId(inner.next_source);
        inner.next_source += 1;
        inner.sources.insert(id, SimSource::new());
        Ok(id)
    }

    fn bind_buffer(&self, source: SourceId, buffer: BufferId) -> BackendResult<()> {
        let mut inner = self.inner.lock();
        inner.enter(BackendCall::BindBuffer { source, buffer })?;

        if !inner.buffers.contains(&buffer) {
            return Err(BackendError::with_detail(
                error_code::INVALID_NAME,
                "unknown buffer",
            ));
        }
        inner.source_mut(source)?.buffer = Some(buffer);
        Ok(())
    }

    fn delete_source(&self, source: SourceId) -> BackendResult<()> {
        let mut inner = self.inner.lock();
        inner.enter(BackendCall::DeleteSource { source })?;

        inner
            .sources
            .remove(&source)
            .map(|_| ())
            .ok_or_else(|| BackendError::with_detail(error_code::INVALID_NAME, "unknown source"))
    }

    fn set_scalar(&self, source: SourceId, param: ScalarParam, value: f32) -> BackendResult<()> {
        let mut inner = self.inner.lock();
        inner.enter(BackendCall::SetScalar { source, param, value })?;

        let sim = inner.source_mut(source)?;
        validate_scalar(param, value)?;
        sim.scalars.insert(param, value);
        Ok(())
    }

    fn set_vector(&self, source: SourceId, param: VectorParam, value: Vec3) -> BackendResult<()> {
        let mut inner = self.inner.lock();
        inner.enter(BackendCall::SetVector { source, param, value })?;

        let sim = inner.source_mut(source)?;
        if !(value.x.is_finite() && value.y.is_finite() && value.z.is_finite()) {
            return Err(BackendError::new(error_code::INVALID_VALUE));
        }
        sim.vectors.insert(param, value);
        Ok(())
    }

    fn set_looping(&self, source: SourceId, looping: bool) -> BackendResult<()> {
        let mut inner = self.inner.lock();
        inner.enter(BackendCall::SetLooping { source, looping })?;

        inner.source_mut(source)?.looping = looping;
        Ok(())
    }

    fn transport(&self, source: SourceId, command: Transport) -> BackendResult<()> {
        let mut inner = self.inner.lock();
        inner.enter(BackendCall::Transport { source, command })?;

        let sim = inner.source_mut(source)?;
        sim.state = match command {
            Transport::Play => state_code::PLAYING,
            Transport::Stop => state_code::STOPPED,
            // Pausing a source that is not playing is a legal no-op
            Transport::Pause if sim.state == state_code::PLAYING => state_code::PAUSED,
            Transport::Pause => sim.state,
        };
        Ok(())
    }

    fn source_state(&self, source: SourceId) -> BackendResult<i32> {
        let mut inner = self.inner.lock();
        inner.enter(BackendCall::SourceState { source })?;

        Ok(inner.source_mut(source)?.state)
    }
}
