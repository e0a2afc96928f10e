//! subloop configuration
//!
//! Tunables for segment preparation, crossfade restarts, and silence-compacted
//! export. All fields have working defaults; an optional TOML file overrides
//! individual values.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Player configuration
///
/// Durations are milliseconds on the source timeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Padding added before and after each subtitle cue
    pub padding_ms: u64,

    /// Static fade applied to the head and tail of every segment buffer
    pub edge_fade_ms: u64,

    /// Fade-out applied to the old lane on restart
    ///
    /// Shorter is snappier but too short reintroduces the click (30-50 ms works).
    pub restart_fadeout_ms: u64,

    /// Fade-in applied to the new lane on restart (shorter than the fade-out,
    /// so the two ramps overlap instead of leaving a gap)
    pub restart_fadein_ms: u64,

    /// Interior silent runs at least this long are removed on export
    pub silence_min_len_ms: u64,

    /// Margin of audio kept on each side of every silence cut
    pub silence_keep_ms: u64,

    /// Silence threshold, in dB below the segment's own mean loudness
    pub silence_thresh_db: f32,

    /// How long a transient notice stays on screen
    pub notice_ttl_ms: u64,

    /// Control loop tick interval
    pub tick_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            padding_ms: 100,
            edge_fade_ms: 30,
            restart_fadeout_ms: 50,
            restart_fadein_ms: 10,
            silence_min_len_ms: 400,
            silence_keep_ms: 100,
            silence_thresh_db: 16.0,
            notice_ttl_ms: 2000,
            tick_ms: 33,
        }
    }
}

impl PlayerConfig {
    /// Load configuration, merging an optional TOML file over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config: Self = toml::from_str(&text).map_err(|e| {
            Error::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.restart_fadeout_ms == 0 || self.restart_fadein_ms == 0 {
            return Err(Error::Config(
                "restart fade durations must be non-zero".to_string(),
            ));
        }
        if self.tick_ms == 0 {
            return Err(Error::Config("tick_ms must be non-zero".to_string()));
        }
        Ok(())
    }
}
