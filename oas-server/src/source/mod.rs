//! Sound source control
//!
//! One [`AudioSource`] per playback unit. It owns the unit's handle, the
//! parameter values last accepted by the backend, the transport state seen
//! at the last poll, and an optional gain fade that advances on each poll.

mod controller;
pub mod fade;
pub mod handle;
pub mod state;
pub mod status;

pub use controller::{
    AudioSource, DEFAULT_CONE_INNER_ANGLE, DEFAULT_CONE_OUTER_ANGLE, DEFAULT_CONE_OUTER_GAIN,
};
pub use fade::{Fade, FadeStep};
pub use handle::HandleAllocator;
pub use state::SourceState;
