//! Silence compaction
//!
//! Removes interior silent runs from a clip and concatenates what remains.
//! The threshold is adaptive: it sits a fixed number of dB below the clip's
//! own mean loudness, so a quiet recording is not flattened by a global
//! constant. Cuts keep a small margin of audio on each side so they are not
//! audibly abrupt.
//!
//! A clip in which no non-silent audio is detected is returned unchanged;
//! compaction never produces an empty result and never lengthens a clip.

use crate::audio::AudioClip;
use crate::config::PlayerConfig;
use tracing::debug;

/// RMS analysis window. Small enough that cut boundaries stay well under the
/// keep margin, large enough to keep the scan linear.
const WINDOW_MS: u64 = 10;

/// Remove silent runs longer than the configured minimum from `clip`.
///
/// Reads the clip and produces a new value; the input is never mutated.
pub fn compact_silence(clip: &AudioClip, config: &PlayerConfig) -> AudioClip {
    let Some(mean_db) = clip.mean_dbfs() else {
        // Digitally silent (or empty): nothing to detect, keep the original
        debug!("Clip has no measurable loudness, skipping compaction");
        return clip.clone();
    };
    let threshold_db = mean_db - config.silence_thresh_db;

    let keep_ranges = nonsilent_ranges_ms(clip, threshold_db, config.silence_min_len_ms);
    if keep_ranges.is_empty() {
        debug!("No non-silent runs detected, keeping original clip");
        return clip.clone();
    }

    // Pad each kept run with the keep margin, clamped so consecutive runs
    // never overlap (a cut run is at least min_silence_len, but clamping
    // keeps the no-duplication property for any configuration).
    let total_ms = clip.duration_ms();
    let mut compacted = AudioClip::new(Vec::new(), clip.sample_rate);
    let mut previous_end = 0u64;

    for (start, end) in keep_ranges {
        let padded_start = start.saturating_sub(config.silence_keep_ms).max(previous_end);
        let padded_end = (end + config.silence_keep_ms).min(total_ms);
        if padded_start >= padded_end {
            continue;
        }
        compacted.append(&clip.slice_ms(padded_start, padded_end));
        previous_end = padded_end;
    }

    if compacted.frames() == 0 {
        return clip.clone();
    }

    debug!(
        "Compacted {} ms to {} ms (threshold {:.1} dBFS)",
        total_ms,
        compacted.duration_ms(),
        threshold_db
    );
    compacted
}

/// Millisecond ranges of non-silent audio.
///
/// A silent stretch counts as silence only when it is at least
/// `min_silence_ms` long; shorter dips stay inside their surrounding
/// non-silent range.
fn nonsilent_ranges_ms(clip: &AudioClip, threshold_db: f32, min_silence_ms: u64) -> Vec<(u64, u64)> {
    let total_ms = clip.duration_ms();
    if total_ms == 0 {
        return Vec::new();
    }

    // Classify fixed windows by RMS loudness
    let window_count = total_ms.div_ceil(WINDOW_MS);
    let mut silent: Vec<bool> = Vec::with_capacity(window_count as usize);
    for w in 0..window_count {
        let start = w * WINDOW_MS;
        let end = ((w + 1) * WINDOW_MS).min(total_ms);
        let db = clip.slice_ms(start, end).mean_dbfs();
        silent.push(match db {
            Some(db) => db < threshold_db,
            None => true,
        });
    }

    // Silent runs shorter than the minimum are reclassified as sound
    let min_windows = (min_silence_ms / WINDOW_MS).max(1) as usize;
    let mut w = 0;
    while w < silent.len() {
        if silent[w] {
            let run_start = w;
            while w < silent.len() && silent[w] {
                w += 1;
            }
            if w - run_start < min_windows {
                for s in &mut silent[run_start..w] {
                    *s = false;
                }
            }
        } else {
            w += 1;
        }
    }

    // Collect the remaining non-silent stretches
    let mut ranges = Vec::new();
    let mut w = 0;
    while w < silent.len() {
        if !silent[w] {
            let run_start = w;
            while w < silent.len() && !silent[w] {
                w += 1;
            }
            let start_ms = run_start as u64 * WINDOW_MS;
            let end_ms = (w as u64 * WINDOW_MS).min(total_ms);
            ranges.push((start_ms, end_ms));
        } else {
            w += 1;
        }
    }

    ranges
}
