//! Clip encoding
//!
//! Writes a compacted clip to disk in the source recording's format. WAV is
//! written directly with hound (16-bit PCM); any other extension is staged as
//! a temporary WAV and handed to the external `ffmpeg` binary, which picks
//! the codec from the destination extension. A missing or failing ffmpeg is
//! an export error, never fatal to the session.

use crate::audio::AudioClip;
use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Write `clip` to `dest`, encoding per the destination extension.
pub fn write_clip(clip: &AudioClip, dest: &Path) -> Result<()> {
    let ext = dest
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if ext == "wav" {
        return write_wav(clip, dest);
    }

    // Stage as WAV, then let ffmpeg produce the compressed format
    let staging = tempfile::Builder::new()
        .prefix("subloop-export-")
        .suffix(".wav")
        .tempfile()
        .map_err(|e| Error::Export(format!("cannot create staging file: {}", e)))?;

    write_wav(clip, staging.path())?;
    encode_with_ffmpeg(staging.path(), dest)
}

/// Write a clip as 16-bit PCM stereo WAV.
fn write_wav(clip: &AudioClip, dest: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(dest, spec)
        .map_err(|e| Error::Export(format!("cannot create {}: {}", dest.display(), e)))?;

    for &sample in &clip.samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(value)
            .map_err(|e| Error::Export(format!("write failed: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| Error::Export(format!("finalize failed: {}", e)))?;

    debug!("Wrote {} frames to {}", clip.frames(), dest.display());
    Ok(())
}

/// Re-encode a staged WAV into `dest` via the external ffmpeg command.
fn encode_with_ffmpeg(staged: &Path, dest: &Path) -> Result<()> {
    let status = Command::new("ffmpeg")
        .arg("-i")
        .arg(staged)
        .arg("-y")
        .arg(dest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| {
            Error::Export(format!(
                "cannot run ffmpeg (is it installed?): {}",
                e
            ))
        })?;

    if !status.success() {
        return Err(Error::Export(format!(
            "ffmpeg failed encoding {}: {}",
            dest.display(),
            status
        )));
    }

    debug!("Encoded {} via ffmpeg", dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.wav");

        let clip = AudioClip::new(vec![0.25; 441 * 2], 44100);
        write_clip(&clip, &dest).unwrap();

        let mut reader = hound::WavReader::open(&dest).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44100);

        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 441 * 2);
        let expected = (0.25 * i16::MAX as f32) as i16;
        assert_eq!(samples[0], expected);
    }

    #[test]
    fn test_wav_clamps_hot_samples() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("hot.wav");

        let clip = AudioClip::new(vec![1.5, -1.5], 44100);
        write_clip(&clip, &dest).unwrap();

        let mut reader = hound::WavReader::open(&dest).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples[0], i16::MAX);
        assert_eq!(samples[1], -i16::MAX);
    }

    #[test]
    fn test_unwritable_destination_is_error() {
        let clip = AudioClip::new(vec![0.0; 4], 44100);
        let result = write_clip(&clip, Path::new("/nonexistent-dir/out.wav"));
        assert!(result.is_err());
    }
}
