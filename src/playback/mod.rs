//! Dual-channel crossfade playback
//!
//! Two always-ready output lanes, a mixer that sums them, and the
//! segment-indexed state machine that ping-pongs restarts between the lanes
//! so fade-out and fade-in can overlap without clicks.

pub mod engine;
pub mod lane;
pub mod mixer;

pub use engine::{PlaybackEngine, PlaybackState};
pub use mixer::{LaneMixer, LANE_COUNT};
