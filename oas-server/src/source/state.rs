//! Source transport state

use crate::backend::state_code;
use std::fmt;

/// Transport state of a source
///
/// `Initial`, `Playing`, `Paused` and `Stopped` mirror what the backend
/// reports. `Deleted` and `Unknown` are local: `Deleted` after a successful
/// release, `Unknown` before the first poll or when the backend reports
/// something unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceState {
    Initial,
    Playing,
    Paused,
    Stopped,
    Deleted,
    Unknown,
}

impl SourceState {
    /// Map a backend transport-state code
    pub fn from_backend_code(code: i32) -> Self {
        match code {
            state_code::INITIAL => SourceState::Initial,
            state_code::PLAYING => SourceState::Playing,
            state_code::PAUSED => SourceState::Paused,
            state_code::STOPPED => SourceState::Stopped,
            _ => SourceState::Unknown,
        }
    }

    /// Status text shown in diagnostic displays
    ///
    /// A source that has never played reads the same as a stopped one.
    pub fn status_label(&self) -> &'static str {
        match self {
            SourceState::Initial | SourceState::Stopped => "Stopped",
            SourceState::Playing => "Playing",
            SourceState::Paused => "Paused",
            SourceState::Deleted => "Deleting",
            SourceState::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_code_mapping() {
        assert_eq!(SourceState::from_backend_code(state_code::INITIAL), SourceState::Initial);
        assert_eq!(SourceState::from_backend_code(state_code::PLAYING), SourceState::Playing);
        assert_eq!(SourceState::from_backend_code(state_code::PAUSED), SourceState::Paused);
        assert_eq!(SourceState::from_backend_code(state_code::STOPPED), SourceState::Stopped);
        assert_eq!(SourceState::from_backend_code(0), SourceState::Unknown);
        assert_eq!(SourceState::from_backend_code(-1), SourceState::Unknown);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(SourceState::Initial.status_label(), "Stopped");
        assert_eq!(SourceState::Stopped.status_label(), "Stopped");
        assert_eq!(SourceState::Playing.status_label(), "Playing");
        assert_eq!(SourceState::Paused.status_label(), "Paused");
        assert_eq!(SourceState::Deleted.status_label(), "Deleting");
        assert_eq!(SourceState::Unknown.status_label(), "Unknown");
        assert_eq!(SourceState::Deleted.to_string(), "Deleting");
    }
}
