//! Timing model: Morse string → ordered tone/silence events.
//!
//! Pure and deterministic; the same input, rate, and config always produce
//! the same event sequence. Gap lengths follow standard Morse timing: one
//! unit between elements, three units between characters, seven units
//! between words.

use crate::codec;
use crate::config::PlaybackConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Units of tone for a dash.
const DASH_UNITS: f64 = 3.0;
/// Units of silence after a character's last symbol.
const CHAR_GAP_UNITS: f64 = 3.0;
/// Units of silence for a word separator.
const WORD_GAP_UNITS: f64 = 7.0;

/// One scheduled interval of playback. Durations are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Audible tone at a fixed frequency.
    Tone {
        duration_secs: f64,
        frequency_hz: f64,
    },
    /// Silence between tones.
    Silence { duration_secs: f64 },
}

impl PlaybackEvent {
    /// Duration of the event, regardless of kind.
    pub const fn duration_secs(&self) -> f64 {
        match self {
            Self::Tone { duration_secs, .. } | Self::Silence { duration_secs } => *duration_secs,
        }
    }

    /// Duration as a [`Duration`] for timer arithmetic.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs())
    }
}

/// Reject playback rates the timing model cannot scale by.
pub fn validate_rate(rate: f64) -> Result<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidRate(rate))
    }
}

/// Build the event sequence for a Morse string at the given playback rate.
///
/// The input is normalized first (collapsed whitespace, padded `/`), so the
/// tokens are symbol groups and word separators. Characters other than `.`,
/// `-`, and `/` are ignored; the codec has already reported them. `rate`
/// must be positive and finite (see [`validate_rate`]); every duration
/// scales by `1 / rate`.
pub fn build_events(morse: &str, rate: f64, config: &PlaybackConfig) -> Vec<PlaybackEvent> {
    let unit = config.base_unit_secs / rate;
    let mut events = Vec::new();

    for token in codec::normalize(morse).split_whitespace() {
        if token == "/" {
            // Word separator: 7 units, no additional character gap.
            events.push(PlaybackEvent::Silence {
                duration_secs: WORD_GAP_UNITS * unit,
            });
            continue;
        }

        let mut had_symbol = false;
        for symbol in token.chars() {
            let tone_units = match symbol {
                '.' => 1.0,
                '-' => DASH_UNITS,
                _ => continue,
            };
            had_symbol = true;
            events.push(PlaybackEvent::Tone {
                duration_secs: tone_units * unit,
                frequency_hz: config.tone_frequency_hz,
            });
            events.push(PlaybackEvent::Silence {
                duration_secs: unit,
            });
        }

        if had_symbol {
            events.push(PlaybackEvent::Silence {
                duration_secs: CHAR_GAP_UNITS * unit,
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: f64 = 0.12;

    fn tone(units: f64) -> PlaybackEvent {
        PlaybackEvent::Tone {
            duration_secs: units * UNIT,
            frequency_hz: 600.0,
        }
    }

    fn silence(units: f64) -> PlaybackEvent {
        PlaybackEvent::Silence {
            duration_secs: units * UNIT,
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(build_events("", 1.0, &PlaybackConfig::default()).is_empty());
        assert!(build_events("   ", 1.0, &PlaybackConfig::default()).is_empty());
    }

    #[test]
    fn test_single_dot() {
        let events = build_events(".", 1.0, &PlaybackConfig::default());
        assert_eq!(events, vec![tone(1.0), silence(1.0), silence(3.0)]);
    }

    #[test]
    fn test_single_dash() {
        let events = build_events("-", 1.0, &PlaybackConfig::default());
        assert_eq!(events, vec![tone(3.0), silence(1.0), silence(3.0)]);
    }

    #[test]
    fn test_word_separator_gap() {
        // ". . / . -" : two E's, word gap, then E and T. The separator
        // contributes a single 7-unit silence and no character gap of its
        // own; every character token still ends with its 3-unit gap.
        let events = build_events(". . / . -", 1.0, &PlaybackConfig::default());
        assert_eq!(
            events,
            vec![
                tone(1.0),
                silence(1.0),
                silence(3.0),
                tone(1.0),
                silence(1.0),
                silence(3.0),
                silence(7.0),
                tone(1.0),
                silence(1.0),
                silence(3.0),
                tone(3.0),
                silence(1.0),
                silence(3.0),
            ]
        );
    }

    #[test]
    fn test_rate_scales_inversely() {
        let config = PlaybackConfig::default();
        let base = build_events("... ---", 1.0, &config);
        let double = build_events("... ---", 2.0, &config);
        assert_eq!(base.len(), double.len());
        for (a, b) in base.iter().zip(&double) {
            assert!((a.duration_secs() - 2.0 * b.duration_secs()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_frequency_from_config() {
        let config = PlaybackConfig {
            tone_frequency_hz: 440.0,
            ..PlaybackConfig::default()
        };
        let events = build_events(".", 1.0, &config);
        let PlaybackEvent::Tone { frequency_hz, .. } = events[0] else {
            panic!("expected a tone event");
        };
        assert_eq!(frequency_hz, 440.0);
    }

    #[test]
    fn test_unpadded_separator_normalized() {
        let glued = build_events(".../.", 1.0, &PlaybackConfig::default());
        let padded = build_events("... / .", 1.0, &PlaybackConfig::default());
        assert_eq!(glued, padded);
    }

    #[test]
    fn test_all_durations_positive() {
        let events = build_events("... --- ... / -.-", 3.5, &PlaybackConfig::default());
        assert!(events.iter().all(|e| e.duration_secs() > 0.0));
        assert!(events.iter().all(|e| e.duration() > Duration::ZERO));
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(1.0).is_ok());
        assert!(validate_rate(0.1).is_ok());
        assert!(validate_rate(0.0).is_err());
        assert!(validate_rate(-1.0).is_err());
        assert!(validate_rate(f64::NAN).is_err());
        assert!(validate_rate(f64::INFINITY).is_err());
    }
}
