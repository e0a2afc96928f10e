//! Audio resampling using rubato
//!
//! Normalizes the decoded recording to the standard 44.1 kHz playback rate so
//! the segment buffers, the mixer lanes, and the output device all agree on
//! one clock.

use crate::audio::AudioClip;
use crate::error::{Error, Result};
use rubato::{FastFixedIn, Resampler as RubatoResampler};
use tracing::debug;

/// Standard sample rate for playback and export
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// Resample a clip to [`TARGET_SAMPLE_RATE`].
///
/// A clip already at the target rate is returned unchanged.
pub fn to_target_rate(clip: AudioClip) -> Result<AudioClip> {
    if clip.sample_rate == TARGET_SAMPLE_RATE {
        debug!("Sample rate already {} Hz, skipping resample", TARGET_SAMPLE_RATE);
        return Ok(clip);
    }

    debug!(
        "Resampling from {} Hz to {} Hz",
        clip.sample_rate, TARGET_SAMPLE_RATE
    );

    // rubato expects planar input
    let planar_input = deinterleave(&clip.samples);
    let input_frames = planar_input[0].len();
    if input_frames == 0 {
        return Ok(AudioClip::new(Vec::new(), TARGET_SAMPLE_RATE));
    }

    let mut resampler = FastFixedIn::<f32>::new(
        TARGET_SAMPLE_RATE as f64 / clip.sample_rate as f64,
        1.0,
        rubato::PolynomialDegree::Septic,
        input_frames,
        2,
    )
    .map_err(|e| Error::Decode(format!("failed to create resampler: {}", e)))?;

    let planar_output = resampler
        .process(&planar_input, None)
        .map_err(|e| Error::Decode(format!("resampling failed: {}", e)))?;

    let interleaved = interleave(planar_output);
    debug!(
        "Resampled {} input frames to {} output frames",
        input_frames,
        interleaved.len() / 2
    );

    Ok(AudioClip::new(interleaved, TARGET_SAMPLE_RATE))
}

/// Convert interleaved stereo samples to planar format.
///
/// Input:  [L, R, L, R, ...]
/// Output: [[L, L, ...], [R, R, ...]]
fn deinterleave(samples: &[f32]) -> Vec<Vec<f32>> {
    let frames = samples.len() / 2;
    let mut planar = vec![Vec::with_capacity(frames); 2];
    for frame_idx in 0..frames {
        planar[0].push(samples[frame_idx * 2]);
        planar[1].push(samples[frame_idx * 2 + 1]);
    }
    planar
}

/// Convert planar stereo samples back to interleaved format.
fn interleave(planar: Vec<Vec<f32>>) -> Vec<f32> {
    if planar.len() < 2 {
        return Vec::new();
    }
    let frames = planar[0].len().min(planar[1].len());
    let mut interleaved = Vec::with_capacity(frames * 2);
    for frame_idx in 0..frames {
        interleaved.push(planar[0][frame_idx]);
        interleaved.push(planar[1][frame_idx]);
    }
    interleaved
}
