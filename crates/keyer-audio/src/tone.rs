//! Tone synthesis and the tone engine.
//!
//! One tone sounds at a time. A tone is a phase-accumulated sine with a
//! short linear attack and a fade-out before its nominal end, so starting
//! and stopping never clicks. Natural completion is signaled over a
//! bounded channel fired from the audio callback; a forced stop ramps the
//! tone down quickly and deliberately does not fire that signal.

use crate::output::ToneOutput;
use crossbeam_channel::{bounded, Receiver, Sender};
use keyer_core::Result;
use parking_lot::Mutex;
use std::f64::consts::TAU;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Attack ramp length in seconds.
const ATTACK_SECS: f64 = 0.01;
/// Fade-out length before the nominal end, in seconds.
const RELEASE_SECS: f64 = 0.05;
/// Ramp applied by a forced stop, in seconds.
const CANCEL_RELEASE_SECS: f64 = 0.005;
/// Peak amplitude of the envelope.
const PEAK_GAIN: f64 = 0.5;

/// Voice slot shared between the engine and the output callback.
pub type SharedVoice = Arc<Mutex<Option<ToneVoice>>>;

/// Something that can sound one tone at a time.
///
/// The playback scheduler is the single owner of a tone source while a
/// session is active; no other component may command it.
pub trait ToneSource {
    /// Start a tone. The returned channel fires exactly once when the tone
    /// ends naturally; it never fires for a forced stop.
    fn sound(&mut self, frequency_hz: f64, duration_secs: f64) -> Result<Receiver<()>>;

    /// Immediately silence any in-progress tone. Idempotent.
    fn force_stop(&mut self);
}

/// A single in-progress tone.
pub struct ToneVoice {
    phase: f64,
    phase_step: f64,
    sample_rate: f64,
    position: u64,
    total_frames: u64,
    attack_frames: u64,
    release_frames: u64,
    cancelled: bool,
    done_tx: Sender<()>,
}

impl ToneVoice {
    pub fn new(frequency_hz: f64, duration_secs: f64, sample_rate: f64, done_tx: Sender<()>) -> Self {
        let total_frames = (duration_secs * sample_rate).round().max(1.0) as u64;
        let attack_frames = (ATTACK_SECS * sample_rate) as u64;
        let release_frames = ((RELEASE_SECS * sample_rate) as u64).min(total_frames);

        Self {
            phase: 0.0,
            phase_step: TAU * frequency_hz / sample_rate,
            sample_rate,
            position: 0,
            total_frames,
            attack_frames,
            release_frames,
            cancelled: false,
            done_tx,
        }
    }

    /// Render the next mono sample and advance.
    pub fn next_sample(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }

        let value = (self.phase.sin() * self.gain()) as f32;
        self.phase = (self.phase + self.phase_step) % TAU;
        self.position += 1;
        value
    }

    /// True once the voice has rendered its last frame.
    pub const fn is_finished(&self) -> bool {
        self.position >= self.total_frames
    }

    /// Shorten the voice to a quick release ramp. The natural-completion
    /// signal is suppressed.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        let ramp = ((CANCEL_RELEASE_SECS * self.sample_rate) as u64).max(1);
        self.release_frames = ramp;
        self.total_frames = self.total_frames.min(self.position + ramp);
    }

    /// Consume the voice, firing the natural-completion signal unless the
    /// tone was cancelled.
    pub fn finish(self) {
        if !self.cancelled {
            let _ = self.done_tx.try_send(());
        }
    }

    fn gain(&self) -> f64 {
        let attack = if self.attack_frames == 0 {
            1.0
        } else {
            (self.position as f64 / self.attack_frames as f64).min(1.0)
        };
        let remaining = self.total_frames - self.position;
        let release = if self.release_frames == 0 {
            1.0
        } else {
            (remaining as f64 / self.release_frames as f64).min(1.0)
        };
        PEAK_GAIN * attack.min(release)
    }
}

/// Tone engine backed by a cpal output stream.
///
/// The stream is acquired lazily on the first [`ToneSource::sound`] call,
/// because audio devices may only become available after a user-triggered
/// action. Acquisition failure is non-fatal; the next call retries.
pub struct ToneEngine {
    voice: SharedVoice,
    output: Option<ToneOutput>,
}

impl ToneEngine {
    pub fn new() -> Self {
        Self {
            voice: Arc::new(Mutex::new(None)),
            output: None,
        }
    }

    fn ensure_output(&mut self) -> Result<f64> {
        if let Some(output) = &self.output {
            return Ok(f64::from(output.sample_rate()));
        }

        let output = ToneOutput::new(self.voice.clone())?;
        info!(
            "Tone output acquired: {} Hz, {} channels, device: {}",
            output.sample_rate(),
            output.channels(),
            output.device_name()
        );
        let sample_rate = f64::from(output.sample_rate());
        self.output = Some(output);
        Ok(sample_rate)
    }
}

impl Default for ToneEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneSource for ToneEngine {
    fn sound(&mut self, frequency_hz: f64, duration_secs: f64) -> Result<Receiver<()>> {
        let sample_rate = self.ensure_output()?;
        let (done_tx, done_rx) = bounded(1);

        let mut slot = self.voice.lock();
        if slot.is_some() {
            warn!("Replacing an unfinished tone; only one tone may sound at a time");
        }
        *slot = Some(ToneVoice::new(
            frequency_hz,
            duration_secs,
            sample_rate,
            done_tx,
        ));
        debug!("Tone started: {frequency_hz} Hz for {duration_secs:.3}s");

        Ok(done_rx)
    }

    fn force_stop(&mut self) {
        if let Some(voice) = self.voice.lock().as_mut() {
            voice.cancel();
            debug!("Tone force-stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

    use super::*;
    use crossbeam_channel::TryRecvError;

    const SAMPLE_RATE: f64 = 1000.0;

    fn voice(duration_secs: f64) -> (ToneVoice, Receiver<()>) {
        let (tx, rx) = bounded(1);
        (ToneVoice::new(600.0, duration_secs, SAMPLE_RATE, tx), rx)
    }

    fn drain(voice: &mut ToneVoice) -> Vec<f32> {
        let mut samples = Vec::new();
        while !voice.is_finished() {
            samples.push(voice.next_sample());
        }
        samples
    }

    #[test]
    fn test_voice_length_matches_duration() {
        let (mut v, _rx) = voice(0.25);
        assert_eq!(drain(&mut v).len(), 250);
    }

    #[test]
    fn test_voice_starts_silent() {
        // First sample sits at the foot of the attack ramp (and at phase 0).
        let (mut v, _rx) = voice(0.25);
        assert_eq!(v.next_sample(), 0.0);
    }

    #[test]
    fn test_natural_completion_signals_once() {
        let (mut v, rx) = voice(0.05);
        drain(&mut v);
        v.finish();
        assert!(rx.try_recv().is_ok());
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_cancel_suppresses_completion() {
        let (mut v, rx) = voice(1.0);
        for _ in 0..100 {
            v.next_sample();
        }
        v.cancel();
        let tail = drain(&mut v);
        // 5ms cancel ramp at 1kHz
        assert_eq!(tail.len(), 5);
        v.finish();
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let (mut v, _rx) = voice(1.0);
        v.cancel();
        let end = v.total_frames;
        v.cancel();
        assert_eq!(v.total_frames, end);
    }

    #[test]
    fn test_finished_voice_renders_silence() {
        let (mut v, _rx) = voice(0.01);
        drain(&mut v);
        assert_eq!(v.next_sample(), 0.0);
    }

    #[test]
    fn test_gain_never_exceeds_peak() {
        let (mut v, _rx) = voice(0.5);
        for sample in drain(&mut v) {
            assert!(f64::from(sample.abs()) <= PEAK_GAIN + 1e-9);
        }
    }
}
