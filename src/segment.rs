//! Segment model and preparation pipeline
//!
//! A [`Segment`] is one subtitle-aligned, independently playable audio unit.
//! Preparation runs once at startup: each cue's bounds are widened by a fixed
//! padding, clamped to the recording, sliced out of the decoded buffer, and
//! edge-faded to prevent clicks at the slice boundaries.
//!
//! The faded slice is stored twice on purpose: `playback_buffer` is shared
//! with the playback lanes via `Arc`, while `raw_clip` is an independent value
//! read only by the export pipeline. Export can never corrupt what is
//! playing, and vice versa.

use crate::audio::AudioClip;
use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use crate::subtitle::Cue;
use std::sync::Arc;
use tracing::{info, warn};

/// One subtitle-aligned playable unit.
///
/// Immutable after preparation.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Position in the ordered sequence (0-based), stable for the session
    pub index: usize,

    /// The subtitle's display string
    pub text: String,

    /// Padded start bound within the source recording, in milliseconds
    pub start_ms: u64,

    /// Padded end bound within the source recording, in milliseconds
    pub end_ms: u64,

    /// Edge-faded PCM for `[start_ms, end_ms)`, shared with playback lanes
    pub playback_buffer: Arc<AudioClip>,

    /// Independent copy of the same faded audio, used only for export
    pub raw_clip: AudioClip,
}

/// Convert cues into the ordered segment sequence.
///
/// Cues whose padded range collapses to nothing (entirely past the end of the
/// recording, or zero-length) are skipped with a warning; every produced
/// segment satisfies `start_ms < end_ms <= total_duration_ms`. An input that
/// yields no segments at all is an error.
pub fn prepare_segments(
    audio: &AudioClip,
    cues: &[Cue],
    config: &PlayerConfig,
) -> Result<Vec<Segment>> {
    let total_ms = audio.duration_ms();
    let mut segments = Vec::with_capacity(cues.len());

    for cue in cues {
        let safe_start = cue.start_ms.saturating_sub(config.padding_ms);
        let safe_end = (cue.end_ms + config.padding_ms).min(total_ms);

        if safe_start >= safe_end {
            warn!(
                "Skipping cue outside the recording: [{}, {}] ms of {} ms",
                cue.start_ms, cue.end_ms, total_ms
            );
            continue;
        }

        let mut clip = audio.slice_ms(safe_start, safe_end);
        if clip.frames() == 0 {
            warn!(
                "Skipping cue with empty audio slice: [{}, {}] ms",
                safe_start, safe_end
            );
            continue;
        }

        clip.fade_in(config.edge_fade_ms);
        clip.fade_out(config.edge_fade_ms);

        let raw_clip = clip.clone();
        segments.push(Segment {
            index: segments.len(),
            text: cue.text.clone(),
            start_ms: safe_start,
            end_ms: safe_end,
            playback_buffer: Arc::new(clip),
            raw_clip,
        });
    }

    if segments.is_empty() {
        return Err(Error::Subtitle(
            "no usable segments after preparation".to_string(),
        ));
    }

    info!("Prepared {} segments from {} cues", segments.len(), cues.len());
    Ok(segments)
}
