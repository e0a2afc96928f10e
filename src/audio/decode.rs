//! Audio decoding using symphonia
//!
//! Decodes the entire source recording into one linear [`AudioClip`] at the
//! file's native sample rate. Segment preparation slices that buffer; nothing
//! downstream touches the file again.
//!
//! # Sample Format
//!
//! - Output: stereo f32 samples (interleaved: [L, R, L, R, ...])
//! - Mono files: duplicated to stereo
//! - Multi-channel: downmixed to stereo

use crate::audio::AudioClip;
use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

/// Decode an entire audio file into a single stereo f32 buffer.
pub fn decode_file(path: &Path) -> Result<AudioClip> {
    let file = File::open(path)
        .map_err(|e| Error::Decode(format!("cannot open {}: {}", path.display(), e)))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Hint the probe with the file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(ext.to_str().unwrap_or(""));
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::Decode(format!("unsupported format {}: {}", path.display(), e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| Error::Decode(format!("no audio track in {}", path.display())))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params.sample_rate.unwrap_or(44100);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| Error::Decode(format!("unsupported codec in {}: {}", path.display(), e)))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(Error::Decode(format!(
                    "read error in {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => convert_to_stereo_f32(&decoded, &mut samples),
            // A corrupt frame is not fatal for a whole-file decode
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("Skipping undecodable packet: {}", e);
            }
            Err(e) => {
                return Err(Error::Decode(format!(
                    "decode error in {}: {}",
                    path.display(),
                    e
                )))
            }
        }
    }

    if samples.is_empty() {
        return Err(Error::Decode(format!(
            "no audio decoded from {}",
            path.display()
        )));
    }

    let clip = AudioClip::new(samples, sample_rate);
    info!(
        "Decoded {}: {} ms at {} Hz",
        path.display(),
        clip.duration_ms(),
        sample_rate
    );
    Ok(clip)
}

/// Convert a decoded buffer to interleaved stereo f32, appending to `out`.
fn convert_to_stereo_f32(buffer: &AudioBufferRef, out: &mut Vec<f32>) {
    match buffer {
        AudioBufferRef::F32(buf) => interleave(buf.spec().channels.count(), buf.frames(), out, |ch, i| buf.chan(ch)[i]),
        AudioBufferRef::F64(buf) => interleave(buf.spec().channels.count(), buf.frames(), out, |ch, i| buf.chan(ch)[i] as f32),
        AudioBufferRef::S32(buf) => interleave(buf.spec().channels.count(), buf.frames(), out, |ch, i| {
            buf.chan(ch)[i] as f32 / i32::MAX as f32
        }),
        AudioBufferRef::S16(buf) => interleave(buf.spec().channels.count(), buf.frames(), out, |ch, i| {
            buf.chan(ch)[i] as f32 / i16::MAX as f32
        }),
        AudioBufferRef::U8(buf) => interleave(buf.spec().channels.count(), buf.frames(), out, |ch, i| {
            (buf.chan(ch)[i] as f32 - 128.0) / 128.0
        }),
        AudioBufferRef::S24(buf) => interleave(buf.spec().channels.count(), buf.frames(), out, |ch, i| {
            buf.chan(ch)[i].inner() as f32 / 8_388_607.0
        }),
        other => {
            debug!("Skipping buffer with unhandled sample format ({} frames)", other.frames());
        }
    }
}

/// Interleave planar channel data into stereo, duplicating mono and
/// downmixing anything above two channels by alternating sum.
fn interleave<F>(channels: usize, frames: usize, out: &mut Vec<f32>, sample: F)
where
    F: Fn(usize, usize) -> f32,
{
    out.reserve(frames * 2);
    match channels {
        0 => {}
        1 => {
            for i in 0..frames {
                let s = sample(0, i);
                out.push(s);
                out.push(s);
            }
        }
        2 => {
            for i in 0..frames {
                out.push(sample(0, i));
                out.push(sample(1, i));
            }
        }
        n => {
            // Simple downmix: average even channels left, odd channels right
            let halves = (n as f32 / 2.0).max(1.0);
            for i in 0..frames {
                let mut left = 0.0f32;
                let mut right = 0.0f32;
                for ch in 0..n {
                    if ch % 2 == 0 {
                        left += sample(ch, i);
                    } else {
                        right += sample(ch, i);
                    }
                }
                out.push(left / halves);
                out.push(right / halves);
            }
        }
    }
}
