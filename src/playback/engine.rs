//! Playback engine
//!
//! Owns the session state (cursor, loop flag, pause flag, active lane) and
//! drives the dual-lane mixer in response to commands. The engine is the only
//! writer of lane state; the control loop calls [`PlaybackEngine::tick`] once
//! per scheduling tick to observe natural playback completion by polling.
//!
//! # Restart (the ping-pong crossfade)
//!
//! Every restart-triggering command (replay, advance, retreat, loop
//! re-entry) runs the same sequence:
//!
//! 1. fade out whatever the old active lane is playing (never a hard stop,
//!    which truncates the waveform and pops),
//! 2. flip `active_lane` to the other lane,
//! 3. start the target segment there with a shorter fade-in, so the two
//!    ramps overlap instead of leaving a gap.
//!
//! The lane being torn down and the lane being started are therefore always
//! different physical lanes. A second restart arriving before the previous
//! fade-out finishes recycles that lane and discards the stale fade-out,
//! which is accepted (at most one fade-out is ever in flight per lane).

use crate::config::PlayerConfig;
use crate::playback::mixer::{LaneMixer, LANE_COUNT};
use crate::segment::Segment;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Lifecycle state of the playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Before the first play command
    Stopped,

    /// At least one lane is producing (or crossfading) audio
    Playing,

    /// Output suspended, positions held
    Paused,

    /// Current segment played to its natural end with looping off
    Finished,
}

/// Short-lived status message for user feedback only.
#[derive(Debug, Clone)]
struct Notice {
    message: String,
    expires_at: Instant,
}

/// The segment-indexed playback state machine.
pub struct PlaybackEngine {
    segments: Arc<Vec<Segment>>,
    mixer: Arc<Mutex<LaneMixer>>,

    current_index: usize,
    loop_enabled: bool,
    state: PlaybackState,

    /// Lane holding the most recently started sound; flips on every restart
    active_lane: usize,

    notice: Option<Notice>,

    restart_fadeout_ms: u64,
    restart_fadein_ms: u64,
    notice_ttl: Duration,
}

impl PlaybackEngine {
    /// Create the engine over an immutable segment sequence.
    ///
    /// The session starts `Stopped` at segment 0 with looping off; the first
    /// restart lands on lane 0.
    pub fn new(
        segments: Arc<Vec<Segment>>,
        mixer: Arc<Mutex<LaneMixer>>,
        config: &PlayerConfig,
    ) -> Self {
        Self {
            segments,
            mixer,
            current_index: 0,
            loop_enabled: false,
            state: PlaybackState::Stopped,
            // Flipped before use, so the first restart starts lane 0
            active_lane: LANE_COUNT - 1,
            notice: None,
            restart_fadeout_ms: config.restart_fadeout_ms,
            restart_fadein_ms: config.restart_fadein_ms,
            notice_ttl: Duration::from_millis(config.notice_ttl_ms),
        }
    }

    // ---- accessors -------------------------------------------------------

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    pub fn active_lane(&self) -> usize {
        self.active_lane
    }

    /// The currently selected segment (None only for an empty sequence).
    pub fn current_segment(&self) -> Option<&Segment> {
        self.segments.get(self.current_index)
    }

    /// The current transient notice, dropping it once expired.
    pub fn notice(&mut self) -> Option<&str> {
        if let Some(n) = &self.notice {
            if Instant::now() >= n.expires_at {
                self.notice = None;
            }
        }
        self.notice.as_ref().map(|n| n.message.as_str())
    }

    /// Post a transient notice; display-only, never affects playback.
    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            message: message.into(),
            expires_at: Instant::now() + self.notice_ttl,
        });
    }

    // ---- commands --------------------------------------------------------

    /// Replay the current segment from its start.
    pub fn replay(&mut self) {
        self.restart();
    }

    /// Move to the next segment and restart. No-op at the last segment.
    pub fn advance(&mut self) {
        if self.current_index + 1 < self.segments.len() {
            self.current_index += 1;
            self.restart();
        } else {
            debug!("Advance at last segment: no-op");
        }
    }

    /// Move to the previous segment and restart. No-op at the first segment.
    pub fn retreat(&mut self) {
        if self.current_index > 0 {
            self.current_index -= 1;
            self.restart();
        } else {
            debug!("Retreat at first segment: no-op");
        }
    }

    /// Toggle pause.
    ///
    /// Pausing suspends both lanes without losing position; resuming releases
    /// them. Toggling after playback has finished restarts the segment.
    pub fn toggle_pause(&mut self) {
        match self.state {
            PlaybackState::Paused => {
                self.mixer.lock().unwrap().set_paused(false);
                self.state = PlaybackState::Playing;
                debug!("Resumed");
            }
            PlaybackState::Playing => {
                let mut mixer = self.mixer.lock().unwrap();
                if mixer.is_busy() {
                    mixer.set_paused(true);
                    drop(mixer);
                    self.state = PlaybackState::Paused;
                    debug!("Paused");
                } else {
                    // Nothing left on the lanes: treat as finished and restart
                    drop(mixer);
                    self.restart();
                }
            }
            PlaybackState::Stopped | PlaybackState::Finished => {
                self.restart();
            }
        }
    }

    /// Toggle loop mode. Never triggers a restart by itself; it only changes
    /// what the next idle check does.
    pub fn toggle_loop(&mut self) {
        self.loop_enabled = !self.loop_enabled;
        info!("Loop {}", if self.loop_enabled { "on" } else { "off" });
    }

    // ---- scheduling ------------------------------------------------------

    /// Per-tick idle check.
    ///
    /// When no lane is producing audio and the session is not paused: restart
    /// the current segment if looping, otherwise settle into `Finished` and
    /// wait for the next command.
    pub fn tick(&mut self) {
        if self.state == PlaybackState::Paused || self.state == PlaybackState::Stopped {
            return;
        }

        let busy = self.mixer.lock().unwrap().is_busy();
        if busy {
            return;
        }

        if self.loop_enabled {
            debug!("Looping segment {}", self.current_index);
            self.restart();
        } else if self.state == PlaybackState::Playing {
            info!("Segment {} finished", self.current_index);
            self.state = PlaybackState::Finished;
        }
    }

    // ---- internals -------------------------------------------------------

    /// The crossfade restart. See the module docs for the lane ping-pong.
    ///
    /// A cursor outside the segment sequence makes this a no-op rather than
    /// undefined access (cannot occur given command clamping).
    fn restart(&mut self) {
        let Some(segment) = self.segments.get(self.current_index) else {
            debug!("Restart with out-of-range index {}: no-op", self.current_index);
            return;
        };

        let mut mixer = self.mixer.lock().unwrap();
        mixer.fade_out(self.active_lane, self.restart_fadeout_ms);

        self.active_lane = (self.active_lane + 1) % LANE_COUNT;
        mixer.play_on(
            self.active_lane,
            Arc::clone(&segment.playback_buffer),
            self.restart_fadein_ms,
        );
        mixer.set_paused(false);
        drop(mixer);

        self.state = PlaybackState::Playing;
        debug!(
            "Restarted segment {} on lane {}",
            self.current_index, self.active_lane
        );
    }
}
