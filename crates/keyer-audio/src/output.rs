//! Audio output using cpal.
//!
//! The output stream renders the shared tone voice; when no tone is active
//! it emits silence. `cpal::Stream` is not `Send`, so the stream is built
//! and owned on the scheduler worker thread.

use crate::tone::{SharedVoice, ToneVoice};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    Device, SampleFormat, Stream, StreamConfig,
};
use keyer_core::{Error, Result};
use tracing::{debug, error, info};

/// Audio output stream wrapper.
pub struct ToneOutput {
    _stream: Stream,
    sample_rate: u32,
    channels: u16,
    device_name: String,
}

impl ToneOutput {
    /// Create a new audio output on the default device.
    pub fn new(voice: SharedVoice) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::AudioUnavailable("no output device found".to_string()))?;

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        info!("Using audio output device: {device_name}");

        Self::with_device(device, voice)
    }

    /// Create a new audio output on a specific device.
    pub fn with_device(device: Device, voice: SharedVoice) -> Result<Self> {
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported_config = device
            .default_output_config()
            .map_err(|e| Error::AudioUnavailable(format!("failed to get output config: {e}")))?;

        debug!("Supported output config: {:?}", supported_config);

        let sample_format = supported_config.sample_format();
        let config: StreamConfig = supported_config.into();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;

        debug!("Output config: {sample_rate}Hz, {channels} channels");

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, voice)?,
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, voice)?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, voice)?,
            _ => {
                return Err(Error::AudioUnavailable(format!(
                    "unsupported sample format: {sample_format:?}"
                )));
            }
        };

        stream
            .play()
            .map_err(|e| Error::AudioUnavailable(format!("failed to start stream: {e}")))?;

        Ok(Self {
            _stream: stream,
            sample_rate,
            channels,
            device_name,
        })
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &Device,
        config: &StreamConfig,
        voice: SharedVoice,
    ) -> Result<Stream> {
        let channels = usize::from(config.channels);

        let err_fn = |err| {
            error!("Audio stream error: {err}");
        };

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let mut slot = voice.lock();
                    for frame in data.chunks_mut(channels) {
                        let value = slot.as_mut().map_or(0.0, ToneVoice::next_sample);
                        for sample in frame.iter_mut() {
                            *sample = T::from_sample(value);
                        }
                        if slot.as_ref().is_some_and(ToneVoice::is_finished) {
                            if let Some(finished) = slot.take() {
                                finished.finish();
                            }
                        }
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| Error::AudioUnavailable(format!("failed to build stream: {e}")))?;

        Ok(stream)
    }

    /// Get the device name.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Get the sample rate.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of channels.
    pub const fn channels(&self) -> u16 {
        self.channels
    }
}

/// List available output devices.
pub fn list_output_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();

    let devices: Vec<String> = host
        .output_devices()
        .map_err(|e| Error::AudioUnavailable(format!("failed to list devices: {e}")))?
        .filter_map(|d| d.name().ok())
        .collect();

    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices() {
        // This test may fail on CI without audio hardware
        let result = list_output_devices();
        // Just ensure it doesn't panic
        let _ = result;
    }
}
