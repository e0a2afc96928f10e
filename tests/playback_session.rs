//! Playback session integration tests
//!
//! Drives the full preparation + engine + mixer stack without audio
//! hardware: the mixer is pulled manually in place of the cpal callback.

use std::sync::{Arc, Mutex};

use subloop::audio::{AudioClip, FrameSource};
use subloop::config::PlayerConfig;
use subloop::playback::{LaneMixer, PlaybackEngine, PlaybackState};
use subloop::segment::{self, Segment};
use subloop::subtitle::Cue;

/// 1 kHz frame rate keeps frame counts equal to milliseconds.
const RATE: u32 = 1000;

fn cue(start_ms: u64, end_ms: u64, text: &str) -> Cue {
    Cue {
        start_ms,
        end_ms,
        text: text.to_string(),
    }
}

fn session(cues: &[Cue]) -> (PlaybackEngine, Arc<Mutex<LaneMixer>>, Arc<Vec<Segment>>) {
    let recording = AudioClip::new(vec![0.5; 10_000 * 2], RATE);
    let config = PlayerConfig::default();
    let segments = Arc::new(segment::prepare_segments(&recording, cues, &config).unwrap());
    let mixer = Arc::new(Mutex::new(LaneMixer::new()));
    let engine = PlaybackEngine::new(Arc::clone(&segments), Arc::clone(&mixer), &config);
    (engine, mixer, segments)
}

/// Simulate the audio thread consuming `frames` frames.
fn pull(mixer: &Arc<Mutex<LaneMixer>>, frames: usize) {
    let mut mixer = mixer.lock().unwrap();
    for _ in 0..frames {
        mixer.next_frame();
    }
}

fn pull_until_idle(mixer: &Arc<Mutex<LaneMixer>>) {
    let mut mixer = mixer.lock().unwrap();
    while mixer.is_busy() {
        mixer.next_frame();
    }
}

#[test]
fn overlapping_neighbors_pad_and_clamp_independently() {
    let (_, _, segments) = session(&[
        cue(1000, 2000, "a"),
        cue(2000, 3500, "b"),
        cue(5000, 6000, "c"),
    ]);

    let bounds: Vec<(u64, u64)> = segments.iter().map(|s| (s.start_ms, s.end_ms)).collect();
    assert_eq!(bounds, vec![(900, 2100), (1900, 3600), (4900, 6100)]);

    for segment in segments.iter() {
        assert!(segment.start_ms < segment.end_ms);
        assert!(segment.end_ms <= 10_000);
    }
}

#[test]
fn full_session_walkthrough() {
    let (mut engine, mixer, _) = session(&[
        cue(1000, 2000, "a"),
        cue(3000, 4000, "b"),
        cue(5000, 6000, "c"),
    ]);

    // Initial play lands on lane 0
    engine.replay();
    assert_eq!(engine.active_lane(), 0);
    assert_eq!(engine.state(), PlaybackState::Playing);
    assert!(mixer.lock().unwrap().is_busy());

    // Partway through, advance: lane flips, cursor moves
    pull(&mixer, 300);
    engine.advance();
    assert_eq!(engine.active_lane(), 1);
    assert_eq!(engine.current_index(), 1);

    // Pause partway, resume continues from the same spot
    pull(&mixer, 200);
    engine.toggle_pause();
    assert_eq!(engine.state(), PlaybackState::Paused);
    pull(&mixer, 1000); // paused output is silence, positions held
    assert!(mixer.lock().unwrap().is_busy());
    engine.toggle_pause();
    assert_eq!(engine.state(), PlaybackState::Playing);

    // Let the segment end naturally; without looping the session finishes
    pull_until_idle(&mixer);
    engine.tick();
    assert_eq!(engine.state(), PlaybackState::Finished);

    // Replay from Finished re-enters Playing on the other lane
    engine.replay();
    assert_eq!(engine.state(), PlaybackState::Playing);
    assert_eq!(engine.active_lane(), 0);
}

#[test]
fn advance_at_last_segment_is_noop() {
    let (mut engine, mixer, _) = session(&[
        cue(1000, 2000, "a"),
        cue(3000, 4000, "b"),
        cue(5000, 6000, "c"),
    ]);
    engine.replay();
    engine.advance();
    engine.advance();
    assert_eq!(engine.current_index(), 2);

    pull_until_idle(&mixer);
    let lane_before = engine.active_lane();

    engine.advance();
    assert_eq!(engine.current_index(), 2);
    assert_eq!(engine.active_lane(), lane_before);
    // No restart was issued: the lanes stay drained
    assert!(!mixer.lock().unwrap().is_busy());
}

#[test]
fn retreat_at_first_segment_is_noop() {
    let (mut engine, mixer, _) = session(&[cue(1000, 2000, "a"), cue(3000, 4000, "b")]);
    engine.replay();
    pull_until_idle(&mixer);
    let lane_before = engine.active_lane();

    engine.retreat();
    assert_eq!(engine.current_index(), 0);
    assert_eq!(engine.active_lane(), lane_before);
    assert!(!mixer.lock().unwrap().is_busy());
}

#[test]
fn lanes_strictly_alternate_across_restarts() {
    let (mut engine, _, _) = session(&[cue(1000, 2000, "a"), cue(3000, 4000, "b")]);
    engine.replay();

    let mut lanes = vec![engine.active_lane()];
    engine.advance();
    lanes.push(engine.active_lane());
    engine.retreat();
    lanes.push(engine.active_lane());
    engine.replay();
    lanes.push(engine.active_lane());

    assert_eq!(lanes, vec![0, 1, 0, 1]);
}

#[test]
fn loop_replays_same_segment_indefinitely() {
    let (mut engine, mixer, _) = session(&[cue(1000, 2000, "a"), cue(3000, 4000, "b")]);
    engine.replay();
    engine.toggle_loop();

    for _ in 0..10 {
        pull_until_idle(&mixer);
        engine.tick();
        assert_eq!(engine.state(), PlaybackState::Playing);
        assert_eq!(engine.current_index(), 0);
    }
}

#[test]
fn restart_crossfade_output_is_smooth() {
    // After a restart mid-playback, the summed output never jumps to a
    // discontinuity larger than the two overlapping ramps allow.
    let (mut engine, mixer, _) = session(&[cue(1000, 3000, "a")]);
    engine.replay();
    pull(&mixer, 500); // well past the fade-in, lane at full gain

    engine.replay(); // crossfade restart

    let mut mixer = mixer.lock().unwrap();
    let mut previous = mixer.next_frame().left;
    for _ in 0..100 {
        let current = mixer.next_frame().left;
        assert!(
            (current - previous).abs() < 0.1,
            "output jumped from {} to {}",
            previous,
            current
        );
        previous = current;
    }
}

#[test]
fn toggling_loop_never_restarts() {
    let (mut engine, mixer, _) = session(&[cue(1000, 2000, "a")]);
    engine.replay();
    pull(&mixer, 300);

    let lane_before = engine.active_lane();
    engine.toggle_loop();
    engine.toggle_loop();
    assert_eq!(engine.active_lane(), lane_before);
    assert_eq!(engine.state(), PlaybackState::Playing);
}

#[test]
fn playback_and_raw_buffers_are_isolated() {
    let (_, _, segments) = session(&[cue(1000, 2000, "a")]);
    let segment = &segments[0];
    assert_eq!(
        segment.playback_buffer.samples, segment.raw_clip.samples,
        "both views hold the same faded audio"
    );
    assert_ne!(
        segment.playback_buffer.samples.as_ptr(),
        segment.raw_clip.samples.as_ptr(),
        "but in independent allocations"
    );
}
