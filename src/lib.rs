//! # subloop
//!
//! Segment-by-segment review of a subtitled audio recording. Each subtitle
//! cue becomes an independently replayable, loopable audio unit; switching
//! between units crossfades across two playback lanes so restarts never
//! click. A per-segment export path compacts interior silence and writes the
//! clip under an ordinal-prefixed name.
//!
//! **Architecture:** symphonia decode → rubato resample → segment
//! preparation (once, at startup) → dual-lane mixer pulled by a cpal
//! callback, driven by a polling control loop.

pub mod audio;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod export;
pub mod playback;
pub mod segment;
pub mod subtitle;
pub mod ui;

pub use config::PlayerConfig;
pub use error::{Error, Result};
