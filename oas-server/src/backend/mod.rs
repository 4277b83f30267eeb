//! Audio backend boundary
//!
//! The backend owns the actual playback resources. Sources talk to it only
//! through [`AudioBackend`], and every call returns an explicit
//! `Result<T, BackendError>` instead of leaving an error in shared state for
//! a later query.
//!
//! Identifiers, parameter kinds, state codes and error codes follow the
//! OpenAL model, so an OpenAL binding maps onto the trait one call at a time.
//!
//! # Implementations
//!
//! - [`memory::MemoryBackend`]: in-memory backend with call recording and
//!   failure injection. Used by tests and as the default output of the
//!   server binary.

use std::fmt;

pub mod memory;

pub use memory::MemoryBackend;

/// Backend identifier of a playback resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u32);

/// Backend identifier of a loaded audio buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport state codes reported by [`AudioBackend::source_state`]
pub mod state_code {
    pub const INITIAL: i32 = 0x1011;
    pub const PLAYING: i32 = 0x1012;
    pub const PAUSED: i32 = 0x1013;
    pub const STOPPED: i32 = 0x1014;
}

/// Error codes carried by [`BackendError`]
pub mod error_code {
    pub const INVALID_NAME: i32 = 0xA001;
    pub const INVALID_ENUM: i32 = 0xA002;
    pub const INVALID_VALUE: i32 = 0xA003;
    pub const INVALID_OPERATION: i32 = 0xA004;
    pub const OUT_OF_MEMORY: i32 = 0xA005;
}

/// A rejected backend call
///
/// `code` is the backend's error code. `detail` carries the extra
/// description some helper libraries provide alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub code: i32,
    pub detail: Option<String>,
}

impl BackendError {
    pub fn new(code: i32) -> Self {
        Self { code, detail: None }
    }

    pub fn with_detail(code: i32, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: Some(detail.into()),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error code = {:#06x}", self.code)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for BackendError {}

/// Result of a backend call
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Three-component vector used for position, velocity and direction
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Scalar source parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarParam {
    Gain,
    Pitch,
    RolloffFactor,
    ReferenceDistance,
    ConeInnerAngle,
    ConeOuterAngle,
    ConeOuterGain,
    /// Playback offset in seconds
    SecOffset,
}

/// Vector source parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorParam {
    Position,
    Velocity,
    Direction,
}

/// Transport commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Play,
    Stop,
    Pause,
}

impl fmt::Display for ScalarParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarParam::Gain => "gain",
            ScalarParam::Pitch => "pitch",
            ScalarParam::RolloffFactor => "rolloff factor",
            ScalarParam::ReferenceDistance => "reference distance",
            ScalarParam::ConeInnerAngle => "cone inner angle",
            ScalarParam::ConeOuterAngle => "cone outer angle",
            ScalarParam::ConeOuterGain => "cone outer gain",
            ScalarParam::SecOffset => "playback position",
        })
    }
}

impl fmt::Display for VectorParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VectorParam::Position => "position",
            VectorParam::Velocity => "velocity",
            VectorParam::Direction => "direction",
        })
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transport::Play => "play",
            Transport::Stop => "stop",
            Transport::Pause => "pause",
        })
    }
}

/// Capabilities a playback backend must provide
///
/// Methods take `&self`: one backend context is shared by every source
/// through an `Arc`, and implementations guard their own state.
pub trait AudioBackend: Send + Sync {
    /// Allocate a playback resource
    fn create_source(&self) -> BackendResult<SourceId>;

    /// Attach a loaded buffer to a source
    fn bind_buffer(&self, source: SourceId, buffer: BufferId) -> BackendResult<()>;

    /// Release a playback resource
    fn delete_source(&self, source: SourceId) -> BackendResult<()>;

    fn set_scalar(&self, source: SourceId, param: ScalarParam, value: f32) -> BackendResult<()>;

    fn set_vector(&self, source: SourceId, param: VectorParam, value: Vec3) -> BackendResult<()>;

    fn set_looping(&self, source: SourceId, looping: bool) -> BackendResult<()>;

    fn transport(&self, source: SourceId, command: Transport) -> BackendResult<()>;

    /// Raw transport state code (see [`state_code`])
    fn source_state(&self, source: SourceId) -> BackendResult<i32>;
}
