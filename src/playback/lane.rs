//! A single playback lane
//!
//! A lane holds at most one segment buffer and a per-frame gain envelope:
//! an optional fade-in ramp at the start of playback, and an optional
//! commanded fade-out that ramps from the current gain down to silence and
//! then releases the buffer. Restarting playback on a lane simply replaces
//! whatever it held, including an in-flight fade-out.

use crate::audio::{AudioClip, AudioFrame};
use std::sync::Arc;

/// In-flight fade-out state.
#[derive(Debug, Clone, Copy)]
struct FadeOut {
    /// Frames left until silence
    remaining: usize,

    /// Total fade length in frames
    total: usize,

    /// Gain captured when the fade-out was commanded (a restart can land
    /// mid-fade-in, so this is not always 1.0)
    start_gain: f32,
}

/// One of the two output lanes used for crossfading.
#[derive(Debug, Default)]
pub struct Lane {
    /// Buffer being played, shared with the owning segment
    buffer: Option<Arc<AudioClip>>,

    /// Current read position, in frames
    position: usize,

    /// Fade-in ramp length in frames (0 = no ramp)
    fade_in_frames: usize,

    /// Commanded fade-out, if any
    fade_out: Option<FadeOut>,
}

impl Lane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin playback of `buffer` from the start with a fade-in ramp.
    ///
    /// Replaces any current playback, including an unfinished fade-out.
    pub fn play(&mut self, buffer: Arc<AudioClip>, fade_in_ms: u64) {
        let fade_in_frames = buffer.ms_to_frames(fade_in_ms);
        self.buffer = Some(buffer);
        self.position = 0;
        self.fade_in_frames = fade_in_frames;
        self.fade_out = None;
    }

    /// Begin a fade-out from the current gain; the lane falls silent and
    /// releases its buffer once the ramp completes.
    ///
    /// No-op on an idle lane.
    pub fn begin_fade_out(&mut self, fade_out_ms: u64) {
        let Some(buffer) = &self.buffer else {
            return;
        };
        let total = buffer.ms_to_frames(fade_out_ms).max(1);
        self.fade_out = Some(FadeOut {
            remaining: total,
            total,
            start_gain: self.current_gain(),
        });
    }

    /// Whether the lane is currently producing (or holding, when paused) audio.
    pub fn is_active(&self) -> bool {
        self.buffer.is_some()
    }

    /// Gain that will be applied to the next frame.
    fn current_gain(&self) -> f32 {
        if let Some(fade) = &self.fade_out {
            return fade.start_gain * (fade.remaining as f32 / fade.total as f32);
        }
        if self.fade_in_frames > 0 && self.position < self.fade_in_frames {
            return self.position as f32 / self.fade_in_frames as f32;
        }
        1.0
    }

    /// Produce the next frame and advance.
    ///
    /// Returns silence once the buffer ends naturally or the fade-out
    /// completes; in both cases the buffer is released.
    pub fn next_frame(&mut self) -> AudioFrame {
        let Some(buffer) = &self.buffer else {
            return AudioFrame::zero();
        };

        let Some(frame) = buffer.frame(self.position) else {
            // Natural end of the buffer
            self.stop();
            return AudioFrame::zero();
        };

        let gain = self.current_gain();
        let out = frame.scaled(gain);

        self.position += 1;
        if let Some(fade) = &mut self.fade_out {
            fade.remaining -= 1;
            if fade.remaining == 0 {
                self.stop();
            }
        }

        out
    }

    /// Drop the buffer and reset the envelope.
    fn stop(&mut self) {
        self.buffer = None;
        self.position = 0;
        self.fade_in_frames = 0;
        self.fade_out = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(frames: usize) -> Arc<AudioClip> {
        // 1 kHz frame rate: 1 frame = 1 ms, which keeps the math readable
        Arc::new(AudioClip::new(vec![1.0; frames * 2], 1000))
    }

    #[test]
    fn test_idle_lane_is_silent() {
        let mut lane = Lane::new();
        assert!(!lane.is_active());
        assert_eq!(lane.next_frame(), AudioFrame::zero());
    }

    #[test]
    fn test_fade_in_ramp() {
        let mut lane = Lane::new();
        lane.play(clip(100), 10);

        let first = lane.next_frame();
        assert_eq!(first.left, 0.0);

        let mut last = first.left;
        for _ in 0..9 {
            let f = lane.next_frame();
            assert!(f.left >= last);
            last = f.left;
        }

        // Past the ramp: full gain
        assert_eq!(lane.next_frame().left, 1.0);
    }

    #[test]
    fn test_natural_end_releases_buffer() {
        let mut lane = Lane::new();
        lane.play(clip(3), 0);

        for _ in 0..3 {
            assert_eq!(lane.next_frame().left, 1.0);
        }
        assert!(lane.is_active()); // not yet observed the end
        assert_eq!(lane.next_frame(), AudioFrame::zero());
        assert!(!lane.is_active());
    }

    #[test]
    fn test_fade_out_ramps_to_silence_and_releases() {
        let mut lane = Lane::new();
        lane.play(clip(100), 0);
        lane.next_frame();

        lane.begin_fade_out(10);
        let mut last = f32::MAX;
        for _ in 0..10 {
            let f = lane.next_frame();
            assert!(f.left <= last);
            last = f.left;
        }
        assert!(!lane.is_active());
        assert_eq!(lane.next_frame(), AudioFrame::zero());
    }

    #[test]
    fn test_fade_out_mid_fade_in_starts_from_current_gain() {
        let mut lane = Lane::new();
        lane.play(clip(100), 20);
        for _ in 0..10 {
            lane.next_frame(); // halfway up the fade-in
        }

        lane.begin_fade_out(10);
        let first = lane.next_frame();
        // Fade-out starts near the interrupted gain (~0.5), not at full volume
        assert!(first.left < 0.6, "gain was {}", first.left);
    }

    #[test]
    fn test_play_replaces_inflight_fade_out() {
        let mut lane = Lane::new();
        lane.play(clip(100), 0);
        lane.begin_fade_out(50);
        lane.next_frame();

        // Rapid restart recycles the lane: stale fade-out is discarded
        lane.play(clip(100), 0);
        assert!(lane.is_active());
        assert_eq!(lane.next_frame().left, 1.0);
    }

    #[test]
    fn test_fade_out_on_idle_lane_is_noop() {
        let mut lane = Lane::new();
        lane.begin_fade_out(50);
        assert!(!lane.is_active());
    }
}
