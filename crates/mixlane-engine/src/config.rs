//! Engine configuration knobs.

use serde::{Deserialize, Serialize};

/// Tunable limits for the engine. The host system loads these once at
/// startup; defaults match the hosted product's limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum length of revision feedback text, in characters.
    pub min_feedback_chars: usize,
    /// Maximum total bytes of files attached to one pitch.
    pub max_pitch_storage_bytes: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_feedback_chars: 10,
            // 1 GiB per pitch.
            max_pitch_storage_bytes: 1024 * 1024 * 1024,
        }
    }
}
