//! # keyer-audio
//!
//! Audible Morse playback for keyer.
//!
//! - Sine tone synthesis with a click-free amplitude envelope, rendered in
//!   the cpal output callback
//! - Cooperative playback scheduler driving one session at a time, with
//!   start/stop/cancel semantics over crossbeam channels

pub mod output;
pub mod scheduler;
pub mod tone;

pub use scheduler::{PlaybackScheduler, SessionEvent, SessionStatus};
pub use tone::{ToneEngine, ToneSource};
