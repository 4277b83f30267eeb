//! Audio source controller
//!
//! [`AudioSource`] mediates every interaction between one playback unit and
//! the backend.
//!
//! # Cached parameters
//!
//! Parameters are pushed to the backend and cached locally only once the
//! backend accepts them. A rejected write is logged and leaves the cached
//! value as it was. Transport state is the one value pulled from the
//! backend, by [`AudioSource::update`].
//!
//! # Validity
//!
//! A source is valid only if the backend created the resource and bound the
//! buffer. An invalid source never retries: every mutator returns
//! [`Error::InvalidSource`] without touching the backend. Deleting an
//! invalid source succeeds as a no-op.
//!
//! # Polling
//!
//! The dispatcher calls `update(false)` periodically. Sources that are not
//! playing and not fading skip the backend query entirely.

use std::fmt;
use std::sync::Arc;

use oas_common::{Clock, Time};
use tracing::{debug, error, info, warn};

use super::fade::{Fade, FadeStep};
use super::handle::HandleAllocator;
use super::state::SourceState;
use crate::backend::{
    AudioBackend, BackendError, BackendResult, BufferId, ScalarParam, SourceId, Transport, Vec3,
    VectorParam,
};
use crate::{Error, Result};

/// Cone inner angle pushed when a source first becomes directional (degrees)
pub const DEFAULT_CONE_INNER_ANGLE: f32 = 45.0;

/// Cone outer angle pushed when a source first becomes directional (degrees)
pub const DEFAULT_CONE_OUTER_ANGLE: f32 = 180.0;

/// Gain outside the outer cone
pub const DEFAULT_CONE_OUTER_GAIN: f32 = 0.0;

/// One playback unit bound to a backend source and buffer
pub struct AudioSource {
    backend: Arc<dyn AudioBackend>,
    clock: Arc<dyn Clock>,

    handle: u32,
    id: Option<SourceId>,
    buffer: BufferId,
    valid: bool,
    state: SourceState,

    position: Vec3,
    velocity: Vec3,
    direction: Vec3,

    gain: f32,
    pitch: f32,
    rolloff: f32,
    reference_distance: f32,

    looping: bool,
    directional: bool,

    cone_inner_angle: f32,
    cone_outer_angle: f32,
    cone_outer_gain: f32,

    fade: Option<Fade>,
}

/// Log a rejected backend call with the source handle and error code
fn log_backend_error(handle: u32, what: &dyn fmt::Display, err: &BackendError) {
    error!(
        "Backend error for sound source {} ({}). Error code = {:#06x}",
        handle, what, err.code
    );
    if let Some(detail) = &err.detail {
        error!("More information provided by backend: \"{}\"", detail);
    }
}

impl AudioSource {
    /// Create a source playing `buffer`
    ///
    /// Always returns a source; check [`is_valid`](Self::is_valid). If the
    /// backend resource was created but the buffer could not be bound, the
    /// resource is released again.
    pub fn new(
        backend: Arc<dyn AudioBackend>,
        buffer: BufferId,
        handles: &HandleAllocator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut source = Self {
            backend,
            clock,
            handle: handles.next(),
            id: None,
            buffer,
            valid: false,
            state: SourceState::Unknown,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            direction: Vec3::ZERO,
            gain: 1.0,
            pitch: 1.0,
            rolloff: 1.0,
            reference_distance: 1.0,
            looping: false,
            directional: false,
            cone_inner_angle: DEFAULT_CONE_INNER_ANGLE,
            cone_outer_angle: DEFAULT_CONE_OUTER_ANGLE,
            cone_outer_gain: DEFAULT_CONE_OUTER_GAIN,
            fade: None,
        };

        let id = match source.backend.create_source() {
            Ok(id) => id,
            Err(e) => {
                log_backend_error(source.handle, &"create", &e);
                return source;
            }
        };

        if let Err(e) = source.backend.bind_buffer(id, buffer) {
            log_backend_error(source.handle, &format_args!("bind buffer {}", buffer), &e);
            if let Err(e) = source.backend.delete_source(id) {
                log_backend_error(source.handle, &"release after failed bind", &e);
            }
            return source;
        }

        source.id = Some(id);
        source.valid = true;
        source.update(true);

        info!(
            "Created sound source {} (backend id {}, buffer {})",
            source.handle, id, buffer
        );
        source
    }

    /// Backend id of a valid source
    fn live_id(&self) -> Result<SourceId> {
        match self.id {
            Some(id) if self.valid => Ok(id),
            _ => Err(Error::InvalidSource(self.handle)),
        }
    }

    /// Convert a backend result, logging a rejection
    fn checked<T>(&self, what: &dyn fmt::Display, result: BackendResult<T>) -> Result<T> {
        result.map_err(|source| {
            log_backend_error(self.handle, what, &source);
            Error::Backend {
                handle: self.handle,
                source,
            }
        })
    }

    fn write_scalar(&self, id: SourceId, param: ScalarParam, value: f32) -> Result<()> {
        self.checked(&param, self.backend.set_scalar(id, param, value))
    }

    fn write_vector(&self, id: SourceId, param: VectorParam, value: Vec3) -> Result<()> {
        self.checked(&param, self.backend.set_vector(id, param, value))
    }

    fn reject(&self, message: String) -> Error {
        warn!("Sound source {}: {}", self.handle, message);
        Error::InvalidParameter(message)
    }

    // Polling and fades

    /// Reconcile with the backend and advance any fade
    ///
    /// Unless `force` is set, only playing or fading sources query the
    /// backend. Returns true if the transport state changed or the fade
    /// changed the gain.
    pub fn update(&mut self, force: bool) -> bool {
        let Ok(id) = self.live_id() else {
            return false;
        };

        if !force && self.state != SourceState::Playing && self.fade.is_none() {
            return false;
        }

        let new_state = match self.backend.source_state(id) {
            Ok(code) => SourceState::from_backend_code(code),
            Err(e) => {
                log_backend_error(self.handle, &"query state", &e);
                SourceState::Unknown
            }
        };

        let faded = self.advance_fade().unwrap_or(false);

        if new_state == self.state && !faded {
            return false;
        }

        if new_state != self.state {
            debug!(
                "Sound source {} state {:?} -> {:?}",
                self.handle, self.state, new_state
            );
        }
        self.state = new_state;
        true
    }

    /// Take one fade step; Ok(true) if the gain changed
    fn advance_fade(&mut self) -> Result<bool> {
        let Some(fade) = self.fade else {
            return Ok(false);
        };
        if !self.valid {
            return Ok(false);
        }

        match fade.step(self.clock.now(), self.gain) {
            FadeStep::Reached => {
                self.fade = None;
                debug!("Sound source {} fade reached gain {:.3}", self.handle, self.gain);
                Ok(false)
            }
            FadeStep::Finish(target) => {
                self.fade = None;
                self.set_gain(target.max(0.0))?;
                debug!("Sound source {} fade finished at gain {:.3}", self.handle, self.gain);
                Ok(true)
            }
            FadeStep::Ramp(gain) => {
                self.set_gain(gain.max(0.0))?;
                Ok(true)
            }
        }
    }

    /// Fade the gain linearly to `target_gain` over `duration_secs`
    ///
    /// Replaces any fade already running. The first step is taken
    /// immediately, so a zero duration sets the target gain right away.
    /// Negative durations count as zero.
    pub fn set_fade(&mut self, target_gain: f32, duration_secs: f32) -> Result<()> {
        self.live_id()?;

        if !(target_gain.is_finite() && target_gain >= 0.0) {
            return Err(self.reject(format!(
                "fade target gain must be finite and not negative: {}",
                target_gain
            )));
        }

        self.fade = Some(Fade::new(
            self.gain,
            target_gain,
            f64::from(duration_secs),
            self.clock.now(),
        ));
        debug!(
            "Sound source {} fading gain {:.3} -> {:.3} over {:.3}s",
            self.handle, self.gain, target_gain, duration_secs
        );

        self.advance_fade().map(|_| ())
    }

    // Transport

    /// Start playback; a source that is already playing is left alone
    pub fn play(&mut self) -> Result<()> {
        let id = self.live_id()?;

        self.update(true);
        if self.state == SourceState::Playing {
            return Ok(());
        }

        self.checked(&Transport::Play, self.backend.transport(id, Transport::Play))?;
        self.state = SourceState::Playing;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        let id = self.live_id()?;
        self.checked(&Transport::Stop, self.backend.transport(id, Transport::Stop))?;
        self.state = SourceState::Stopped;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        let id = self.live_id()?;
        self.checked(&Transport::Pause, self.backend.transport(id, Transport::Pause))?;
        self.state = SourceState::Paused;
        Ok(())
    }

    /// Seek to `seconds` from the start of the buffer
    pub fn set_playback_position(&mut self, seconds: f32) -> Result<()> {
        let id = self.live_id()?;
        if !(seconds >= 0.0) {
            return Err(self.reject(format!("playback position must not be negative: {}", seconds)));
        }
        self.write_scalar(id, ScalarParam::SecOffset, seconds)
    }

    // Parameters

    /// Set the gain
    ///
    /// Negative gain is rejected without reaching the backend. Setting the
    /// gain does not cancel a running fade; the fade ends on its own once
    /// the gain equals its target.
    pub fn set_gain(&mut self, gain: f32) -> Result<()> {
        let id = self.live_id()?;
        if !(gain >= 0.0) {
            return Err(self.reject(format!("gain must not be negative: {}", gain)));
        }
        self.write_scalar(id, ScalarParam::Gain, gain)?;
        self.gain = gain;
        Ok(())
    }

    pub fn set_pitch(&mut self, pitch: f32) -> Result<()> {
        let id = self.live_id()?;
        self.write_scalar(id, ScalarParam::Pitch, pitch)?;
        self.pitch = pitch;
        Ok(())
    }

    pub fn set_rolloff_factor(&mut self, rolloff: f32) -> Result<()> {
        let id = self.live_id()?;
        self.write_scalar(id, ScalarParam::RolloffFactor, rolloff)?;
        self.rolloff = rolloff;
        Ok(())
    }

    pub fn set_reference_distance(&mut self, distance: f32) -> Result<()> {
        let id = self.live_id()?;
        self.write_scalar(id, ScalarParam::ReferenceDistance, distance)?;
        self.reference_distance = distance;
        Ok(())
    }

    pub fn set_cone_inner_angle(&mut self, degrees: f32) -> Result<()> {
        let id = self.live_id()?;
        self.write_scalar(id, ScalarParam::ConeInnerAngle, degrees)?;
        self.cone_inner_angle = degrees;
        Ok(())
    }

    pub fn set_cone_outer_angle(&mut self, degrees: f32) -> Result<()> {
        let id = self.live_id()?;
        self.write_scalar(id, ScalarParam::ConeOuterAngle, degrees)?;
        self.cone_outer_angle = degrees;
        Ok(())
    }

    pub fn set_cone_outer_gain(&mut self, gain: f32) -> Result<()> {
        let id = self.live_id()?;
        self.write_scalar(id, ScalarParam::ConeOuterGain, gain)?;
        self.cone_outer_gain = gain;
        Ok(())
    }

    pub fn set_position(&mut self, position: Vec3) -> Result<()> {
        let id = self.live_id()?;
        self.write_vector(id, VectorParam::Position, position)?;
        self.position = position;
        Ok(())
    }

    pub fn set_velocity(&mut self, velocity: Vec3) -> Result<()> {
        let id = self.live_id()?;
        self.write_vector(id, VectorParam::Velocity, velocity)?;
        self.velocity = velocity;
        Ok(())
    }

    /// Set the facing direction
    ///
    /// The zero vector makes the source omnidirectional. Going from
    /// omnidirectional to a non-zero direction also pushes the cached cone
    /// angles and outer gain; further direction changes do not.
    pub fn set_direction(&mut self, direction: Vec3) -> Result<()> {
        let id = self.live_id()?;
        self.write_vector(id, VectorParam::Direction, direction)?;
        self.direction = direction;

        if direction.is_zero() {
            self.directional = false;
        } else if !self.directional {
            let cone = [
                (ScalarParam::ConeInnerAngle, self.cone_inner_angle),
                (ScalarParam::ConeOuterAngle, self.cone_outer_angle),
                (ScalarParam::ConeOuterGain, self.cone_outer_gain),
            ];
            for (param, value) in cone {
                if let Err(e) = self.backend.set_scalar(id, param, value) {
                    log_backend_error(self.handle, &param, &e);
                }
            }
            self.directional = true;
        }

        Ok(())
    }

    pub fn set_looping(&mut self, looping: bool) -> Result<()> {
        let id = self.live_id()?;
        self.checked(&"looping", self.backend.set_looping(id, looping))?;
        self.looping = looping;
        Ok(())
    }

    // Lifecycle

    /// Release the backend resource
    ///
    /// On success the source is `Deleted` and permanently invalid. If the
    /// backend refuses, the source stays valid so the caller can retry;
    /// otherwise the resource leaks. Deleting an invalid source is a no-op.
    pub fn delete_source(&mut self) -> Result<()> {
        let Ok(id) = self.live_id() else {
            return Ok(());
        };

        self.checked(&"delete", self.backend.delete_source(id))?;

        self.state = SourceState::Deleted;
        self.valid = false;
        self.id = None;
        self.fade = None;
        info!("Deleted sound source {}", self.handle);
        Ok(())
    }

    // Accessors

    pub fn handle(&self) -> u32 {
        self.handle
    }

    /// Backend resource id, `None` unless valid
    pub fn backend_id(&self) -> Option<SourceId> {
        self.id
    }

    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn rolloff_factor(&self) -> f32 {
        self.rolloff
    }

    pub fn reference_distance(&self) -> f32 {
        self.reference_distance
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_directional(&self) -> bool {
        self.directional
    }

    pub fn cone_inner_angle(&self) -> f32 {
        self.cone_inner_angle
    }

    pub fn cone_outer_angle(&self) -> f32 {
        self.cone_outer_angle
    }

    pub fn cone_outer_gain(&self) -> f32 {
        self.cone_outer_gain
    }

    /// The running fade, if any
    pub fn fade(&self) -> Option<&Fade> {
        self.fade.as_ref()
    }

    /// Time left on the running fade
    pub fn fade_remaining(&self) -> Option<Time> {
        self.fade.map(|fade| fade.remaining(self.clock.now()))
    }
}

impl fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioSource")
            .field("handle", &self.handle)
            .field("id", &self.id)
            .field("buffer", &self.buffer)
            .field("valid", &self.valid)
            .field("state", &self.state)
            .field("gain", &self.gain)
            .field("fade", &self.fade)
            .finish_non_exhaustive()
    }
}

impl Drop for AudioSource {
    fn drop(&mut self) {
        if let Ok(id) = self.live_id() {
            if let Err(e) = self.backend.delete_source(id) {
                warn!(
                    "Sound source {} not released on drop. Error code = {:#06x}",
                    self.handle, e.code
                );
            }
        }
    }
}
