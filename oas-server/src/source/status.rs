//! Diagnostic projection of a source
//!
//! Status displays show a source as a fixed list of label/value rows. Row
//! order and number formats are part of what those displays expect:
//! gain with 2 decimals, pitch and vectors with 3, loop as On/Off.

use super::controller::AudioSource;

/// Row labels, in display order
pub const LABELS: [&str; 13] = [
    "Status", "Gain", "Loop", "Pitch", "PosX", "PosY", "PosZ", "VelX", "VelY", "VelZ", "DirX",
    "DirY", "DirZ",
];

impl AudioSource {
    /// Number of diagnostic rows
    pub fn index_count() -> usize {
        LABELS.len()
    }

    /// Label of row `index`, or an empty string if out of range
    pub fn label_for_index(index: usize) -> &'static str {
        LABELS.get(index).copied().unwrap_or("")
    }

    /// Current value of row `index`, or an empty string if out of range
    pub fn string_for_index(&self, index: usize) -> String {
        let position = self.position();
        let velocity = self.velocity();
        let direction = self.direction();

        match index {
            0 => self.state().status_label().to_string(),
            1 => format!("{:.2}", self.gain()),
            2 => (if self.is_looping() { "On" } else { "Off" }).to_string(),
            3 => format!("{:.3}", self.pitch()),
            4 => format!("{:.3}", position.x),
            5 => format!("{:.3}", position.y),
            6 => format!("{:.3}", position.z),
            7 => format!("{:.3}", velocity.x),
            8 => format!("{:.3}", velocity.y),
            9 => format!("{:.3}", velocity.z),
            10 => format!("{:.3}", direction.x),
            11 => format!("{:.3}", direction.y),
            12 => format!("{:.3}", direction.z),
            _ => String::new(),
        }
    }

    /// All rows as label/value pairs
    pub fn status_rows(&self) -> Vec<(&'static str, String)> {
        (0..Self::index_count())
            .map(|i| (Self::label_for_index(i), self.string_for_index(i)))
            .collect()
    }
}
