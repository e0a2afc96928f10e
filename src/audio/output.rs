//! Audio output using cpal
//!
//! Manages the output device with callback-based playback. The audio thread
//! pulls one [`AudioFrame`] at a time from a shared [`FrameSource`] (the
//! dual-lane mixer); the source's lock is taken once per device buffer, not
//! once per frame.

use crate::audio::AudioFrame;
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Anything the audio thread can pull frames from.
///
/// Implemented by the playback mixer. Must never block: if no audio is
/// available, return [`AudioFrame::zero`] for silence.
pub trait FrameSource: Send {
    /// Produce the next output frame.
    fn next_frame(&mut self) -> AudioFrame;
}

/// Audio output manager.
///
/// Owns the cpal device and stream.
pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
}

impl AudioOutput {
    /// Open an audio device for output.
    ///
    /// # Arguments
    /// - `device_name`: Optional device name (None = default device)
    ///
    /// If the requested device is not found, falls back to the default device.
    pub fn new(device_name: Option<String>) -> Result<Self> {
        let host = cpal::default_host();

        let device = if let Some(name) = device_name.as_ref() {
            let mut devices = host
                .output_devices()
                .map_err(|e| Error::AudioOutput(format!("failed to enumerate devices: {}", e)))?;

            match devices.find(|d| d.name().ok().as_ref() == Some(name)) {
                Some(dev) => {
                    info!("Found requested audio device: {}", name);
                    dev
                }
                None => {
                    warn!(
                        "Requested device '{}' not found, falling back to default device",
                        name
                    );
                    host.default_output_device().ok_or_else(|| {
                        Error::AudioOutput(format!(
                            "device '{}' not found and no default device available",
                            name
                        ))
                    })?
                }
            }
        } else {
            host.default_output_device()
                .ok_or_else(|| Error::AudioOutput("no default output device found".to_string()))?
        };

        info!(
            "Using audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let (config, sample_format) = Self::get_best_config(&device)?;

        debug!(
            "Audio config: sample_rate={}, channels={}, format={:?}",
            config.sample_rate.0, config.channels, sample_format
        );

        Ok(Self {
            device,
            config,
            sample_format,
            stream: None,
        })
    }

    /// Get the best supported configuration for playback.
    ///
    /// Prefers 44.1 kHz, stereo, f32 samples (matching our internal format).
    fn get_best_config(device: &Device) -> Result<(StreamConfig, SampleFormat)> {
        let mut supported_configs = device
            .supported_output_configs()
            .map_err(|e| Error::AudioOutput(format!("failed to get device configs: {}", e)))?;

        let preferred = supported_configs.find(|config| {
            config.channels() == 2
                && config.min_sample_rate().0 <= 44100
                && config.max_sample_rate().0 >= 44100
                && config.sample_format() == SampleFormat::F32
        });

        if let Some(supported_config) = preferred {
            let sample_format = supported_config.sample_format();
            let config = supported_config
                .with_sample_rate(cpal::SampleRate(44100))
                .config();
            return Ok((config, sample_format));
        }

        // Fallback: device default config
        let supported_config = device
            .default_output_config()
            .map_err(|e| Error::AudioOutput(format!("failed to get default config: {}", e)))?;

        if supported_config.sample_rate().0 != 44100 {
            warn!(
                "Device does not support 44100 Hz, using {} Hz (playback speed will be off)",
                supported_config.sample_rate().0
            );
        }

        let sample_format = supported_config.sample_format();
        Ok((supported_config.config(), sample_format))
    }

    /// Start the audio stream, pulling frames from `source`.
    ///
    /// The source is locked once per device buffer on the real-time audio
    /// thread; keep per-frame work inside it small and non-blocking.
    pub fn start(&mut self, source: Arc<Mutex<dyn FrameSource>>) -> Result<()> {
        info!("Starting audio stream");

        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream_f32(source)?,
            SampleFormat::I16 => self.build_stream_i16(source)?,
            sample_format => {
                return Err(Error::AudioOutput(format!(
                    "unsupported sample format: {:?}",
                    sample_format
                )));
            }
        };

        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("failed to start stream: {}", e)))?;

        self.stream = Some(stream);
        info!("Audio stream started");
        Ok(())
    }

    fn build_stream_f32(&self, source: Arc<Mutex<dyn FrameSource>>) -> Result<Stream> {
        let channels = self.config.channels as usize;

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut source = source.lock().unwrap();
                    fill_f32(data, channels, &mut *source);
                },
                move |err| {
                    warn!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("failed to build stream: {}", e)))?;

        Ok(stream)
    }

    fn build_stream_i16(&self, source: Arc<Mutex<dyn FrameSource>>) -> Result<Stream> {
        let channels = self.config.channels as usize;

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    let mut source = source.lock().unwrap();
                    fill_i16(data, channels, &mut *source);
                },
                move |err| {
                    warn!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("failed to build stream: {}", e)))?;

        Ok(stream)
    }

    /// Stop audio playback and drop the stream.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            info!("Stopping audio stream");
            stream
                .pause()
                .map_err(|e| Error::AudioOutput(format!("failed to pause stream: {}", e)))?;
            drop(stream);
        }
        Ok(())
    }

}

/// Fill a device buffer with frames pulled from `source`.
///
/// The mixer emits stereo; a mono device gets the left channel only and any
/// channels beyond the first two are written as silence.
fn fill_f32(data: &mut [f32], channels: usize, source: &mut dyn FrameSource) {
    for frame in data.chunks_mut(channels) {
        let mut audio_frame = source.next_frame();
        audio_frame.clamp();

        frame[0] = audio_frame.left;
        if channels > 1 {
            frame[1] = audio_frame.right;
        }
        for extra in frame.iter_mut().skip(2) {
            *extra = 0.0;
        }
    }
}

fn fill_i16(data: &mut [i16], channels: usize, source: &mut dyn FrameSource) {
    for frame in data.chunks_mut(channels) {
        let mut audio_frame = source.next_frame();
        audio_frame.clamp();

        frame[0] = (audio_frame.left * i16::MAX as f32) as i16;
        if channels > 1 {
            frame[1] = (audio_frame.right * i16::MAX as f32) as i16;
        }
        for extra in frame.iter_mut().skip(2) {
            *extra = 0;
        }
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tone(f32);

    impl FrameSource for Tone {
        fn next_frame(&mut self) -> AudioFrame {
            AudioFrame {
                left: self.0,
                right: -self.0,
            }
        }
    }

    #[test]
    fn test_frame_source_object_safety() {
        // The mixer is handed to the stream as a trait object; make sure the
        // pattern compiles and pulls frames through the lock.
        let source: Arc<Mutex<dyn FrameSource>> = Arc::new(Mutex::new(Tone(0.25)));
        let frame = source.lock().unwrap().next_frame();
        assert_eq!(frame.left, 0.25);
        assert_eq!(frame.right, -0.25);
    }

    #[test]
    fn test_fill_f32_interleaves_and_silences_extra_channels() {
        let mut tone = Tone(0.25);
        let mut data = [9.0f32; 8]; // two 4-channel frames
        fill_f32(&mut data, 4, &mut tone);

        assert_eq!(data, [0.25, -0.25, 0.0, 0.0, 0.25, -0.25, 0.0, 0.0]);
    }

    #[test]
    fn test_fill_f32_mono_takes_left_channel() {
        let mut tone = Tone(0.5);
        let mut data = [0.0f32; 3];
        fill_f32(&mut data, 1, &mut tone);
        assert_eq!(data, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_fill_i16_converts_and_clamps() {
        // A source hotter than full scale must clamp, not wrap
        let mut hot = Tone(1.5);
        let mut data = [0i16; 4];
        fill_i16(&mut data, 2, &mut hot);

        assert_eq!(data, [i16::MAX, -i16::MAX, i16::MAX, -i16::MAX]);
    }

    // Actual device playback requires audio hardware; covered by manual testing.
}
