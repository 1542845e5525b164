//! Playback configuration.

use serde::{Deserialize, Serialize};

/// Tunable playback parameters.
///
/// The playback rate is not part of the config: it is chosen per playback
/// request and scales every duration derived from `base_unit_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Duration of one dot in seconds; every other duration is an integer
    /// multiple of this unit.
    pub base_unit_secs: f64,
    /// Tone frequency in Hz.
    pub tone_frequency_hz: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_unit_secs: 0.12,
            tone_frequency_hz: 600.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.base_unit_secs, 0.12);
        assert_eq!(config.tone_frequency_hz, 600.0);
    }
}
