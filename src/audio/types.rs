//! Core audio data types
//!
//! Everything downstream of the decoder works on one representation:
//! interleaved stereo f32 samples at a known sample rate.

/// A clip of decoded PCM audio.
///
/// **Format:**
/// - Samples are f32 (floating point -1.0 to 1.0)
/// - Stereo interleaved: [L, R, L, R, ...]
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// PCM audio samples (interleaved stereo)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioClip {
    /// Create a clip from interleaved stereo samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        debug_assert_eq!(samples.len() % 2, 0, "samples must be stereo pairs");
        Self {
            samples,
            sample_rate,
        }
    }

    /// Number of stereo frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        (self.frames() as u64 * 1000) / self.sample_rate as u64
    }

    /// Convert a millisecond offset to a frame index at this clip's rate.
    pub fn ms_to_frames(&self, ms: u64) -> usize {
        Self::ms_to_frames_at(ms, self.sample_rate)
    }

    fn ms_to_frames_at(ms: u64, sample_rate: u32) -> usize {
        ((ms * sample_rate as u64) / 1000) as usize
    }

    /// Get the audio frame at a frame index.
    pub fn frame(&self, frame_index: usize) -> Option<AudioFrame> {
        let sample_index = frame_index * 2;
        if sample_index + 1 < self.samples.len() {
            Some(AudioFrame {
                left: self.samples[sample_index],
                right: self.samples[sample_index + 1],
            })
        } else {
            None
        }
    }

    /// Copy out the `[start_ms, end_ms)` range as a new clip.
    ///
    /// Bounds are clamped to the clip; an inverted range yields an empty clip.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> AudioClip {
        let start = (self.ms_to_frames(start_ms) * 2).min(self.samples.len());
        let end = (self.ms_to_frames(end_ms) * 2).min(self.samples.len());
        let samples = if start < end {
            self.samples[start..end].to_vec()
        } else {
            Vec::new()
        };
        AudioClip::new(samples, self.sample_rate)
    }

    /// Append another clip's samples (must share the sample rate).
    pub fn append(&mut self, other: &AudioClip) {
        debug_assert_eq!(self.sample_rate, other.sample_rate);
        self.samples.extend_from_slice(&other.samples);
    }

    /// Apply a linear fade-in over the first `fade_ms` of the clip, in place.
    pub fn fade_in(&mut self, fade_ms: u64) {
        let fade_frames = self.ms_to_frames(fade_ms).min(self.frames());
        if fade_frames == 0 {
            return;
        }
        for frame_idx in 0..fade_frames {
            let gain = frame_idx as f32 / fade_frames as f32;
            self.samples[frame_idx * 2] *= gain;
            self.samples[frame_idx * 2 + 1] *= gain;
        }
    }

    /// Apply a linear fade-out over the last `fade_ms` of the clip, in place.
    pub fn fade_out(&mut self, fade_ms: u64) {
        let fade_frames = self.ms_to_frames(fade_ms).min(self.frames());
        if fade_frames == 0 {
            return;
        }
        let total = self.frames();
        for (step, frame_idx) in (total - fade_frames..total).enumerate() {
            let gain = 1.0 - (step + 1) as f32 / fade_frames as f32;
            self.samples[frame_idx * 2] *= gain;
            self.samples[frame_idx * 2 + 1] *= gain;
        }
    }

    /// Mean loudness in dBFS (full scale = 1.0), computed as 20*log10(rms).
    ///
    /// Returns None for an empty or digitally silent clip.
    pub fn mean_dbfs(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        let sum_sq: f64 = self.samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let rms = (sum_sq / self.samples.len() as f64).sqrt();
        if rms <= 0.0 {
            return None;
        }
        Some(20.0 * rms.log10() as f32)
    }
}

/// A single stereo sample (one frame of audio).
///
/// Used for passing audio between the mixer and the output device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFrame {
    /// Left channel sample
    pub left: f32,

    /// Right channel sample
    pub right: f32,
}

impl AudioFrame {
    /// A silent frame (0.0, 0.0).
    pub fn zero() -> Self {
        AudioFrame {
            left: 0.0,
            right: 0.0,
        }
    }

    /// Scale both channels.
    pub fn scaled(self, gain: f32) -> Self {
        AudioFrame {
            left: self.left * gain,
            right: self.right * gain,
        }
    }

    /// Add another frame to this frame (for mixing).
    pub fn add(&mut self, other: AudioFrame) {
        self.left += other.left;
        self.right += other.right;
    }

    /// Clamp samples to [-1.0, 1.0] to prevent clipping.
    pub fn clamp(&mut self) {
        self.left = self.left.clamp(-1.0, 1.0);
        self.right = self.right.clamp(-1.0, 1.0);
    }
}
