//! Dual-lane mixer
//!
//! Holds exactly two [`Lane`]s and sums them into the output stream, so a
//! fade-out on one lane can overlap a fade-in on the other. The engine is the
//! only writer; the audio callback is the only reader. Pausing gates the
//! output at the mixer without advancing lane positions, which is what makes
//! resume position-exact.

use crate::audio::{AudioClip, AudioFrame, FrameSource};
use crate::playback::lane::Lane;
use std::sync::Arc;

/// Number of independent output lanes (ping-pong crossfade needs two).
pub const LANE_COUNT: usize = 2;

/// The two-lane crossfade mixer.
#[derive(Debug, Default)]
pub struct LaneMixer {
    lanes: [Lane; LANE_COUNT],
    paused: bool,
}

impl LaneMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a buffer on the given lane with a fade-in ramp.
    pub fn play_on(&mut self, lane: usize, buffer: Arc<AudioClip>, fade_in_ms: u64) {
        self.lanes[lane].play(buffer, fade_in_ms);
    }

    /// Command a fade-out on the given lane.
    pub fn fade_out(&mut self, lane: usize, fade_out_ms: u64) {
        self.lanes[lane].begin_fade_out(fade_out_ms);
    }

    /// Suspend output without losing lane positions.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether any lane still holds audio.
    ///
    /// True while paused too: a paused lane is holding its position, not done.
    pub fn is_busy(&self) -> bool {
        self.lanes.iter().any(|lane| lane.is_active())
    }
}

impl FrameSource for LaneMixer {
    fn next_frame(&mut self) -> AudioFrame {
        if self.paused {
            return AudioFrame::zero();
        }

        let mut mixed = AudioFrame::zero();
        for lane in &mut self.lanes {
            mixed.add(lane.next_frame());
        }
        mixed.clamp();
        mixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(frames: usize, level: f32) -> Arc<AudioClip> {
        Arc::new(AudioClip::new(vec![level; frames * 2], 1000))
    }

    #[test]
    fn test_idle_mixer_is_silent_and_not_busy() {
        let mut mixer = LaneMixer::new();
        assert!(!mixer.is_busy());
        assert_eq!(mixer.next_frame(), AudioFrame::zero());
    }

    #[test]
    fn test_lanes_sum_and_clamp() {
        let mut mixer = LaneMixer::new();
        mixer.play_on(0, clip(10, 0.7), 0);
        mixer.play_on(1, clip(10, 0.6), 0);

        let frame = mixer.next_frame();
        assert_eq!(frame.left, 1.0); // 1.3 clamped
    }

    #[test]
    fn test_pause_gates_output_and_holds_position() {
        let mut mixer = LaneMixer::new();
        mixer.play_on(0, clip(4, 0.5), 0);

        assert_eq!(mixer.next_frame().left, 0.5);

        mixer.set_paused(true);
        for _ in 0..100 {
            assert_eq!(mixer.next_frame(), AudioFrame::zero());
        }
        assert!(mixer.is_busy()); // still holding audio

        mixer.set_paused(false);
        // Resume continues from frame 1, not from the start
        assert_eq!(mixer.next_frame().left, 0.5);
        assert_eq!(mixer.next_frame().left, 0.5);
        assert_eq!(mixer.next_frame().left, 0.5);
        mixer.next_frame(); // observes the end
        assert!(!mixer.is_busy());
    }

    #[test]
    fn test_crossfade_overlap() {
        let mut mixer = LaneMixer::new();
        mixer.play_on(0, clip(100, 0.5), 0);
        mixer.next_frame();

        // Restart pattern: fade out lane 0, start lane 1
        mixer.fade_out(0, 10);
        mixer.play_on(1, clip(100, 0.5), 5);

        // During the overlap both lanes contribute
        let early = mixer.next_frame();
        assert!(early.left > 0.4, "overlap frame was {}", early.left);

        // After the fade-out window only lane 1 remains
        for _ in 0..20 {
            mixer.next_frame();
        }
        assert_eq!(mixer.next_frame().left, 0.5);
        assert!(mixer.is_busy());
    }
}
