//! # keyer-core
//!
//! Core types for the keyer Morse translator: the character⇄Morse codec,
//! the pure timing model that turns a Morse string into a sequence of timed
//! tone/silence events, and the shared error taxonomy.

pub mod codec;
pub mod config;
pub mod error;
pub mod timing;

pub use codec::{decode, encode, normalize, Conversion};
pub use config::PlaybackConfig;
pub use error::{Error, Result};
pub use timing::{build_events, validate_rate, PlaybackEvent};
