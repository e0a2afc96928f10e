//! Silence-compacting export pipeline
//!
//! Invoked per command for the currently selected segment: compacts the
//! segment's raw clip (see [`silence`]) and writes it next to the user's
//! other exports under an ordinal-prefixed name, so exported files sort in
//! segment order. Reads the segment sequence only; never touches playback
//! state or lanes.

pub mod silence;
pub mod writer;

use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use crate::segment::Segment;
use std::path::{Path, PathBuf};
use tracing::info;

pub use silence::compact_silence;

/// Output file name for a segment: `{ordinal:03}_{source-base-name}`.
///
/// The ordinal is `index + 1`, so exports sort by segment order starting at 1
/// and keep the source's extension (and therefore its encoded format).
pub fn export_file_name(segment: &Segment, source: &Path) -> Result<String> {
    let base = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Export(format!("unusable source name: {}", source.display())))?;
    Ok(format!("{:03}_{}", segment.index + 1, base))
}

/// Compact and export one segment.
///
/// Deterministic for a given segment: the same input produces byte-identical
/// output (same ordinal, same clip, same adaptive threshold).
///
/// # Arguments
/// - `segment`: the currently selected segment
/// - `source`: path of the source recording (supplies the base name and format)
/// - `out_dir`: directory to write into
///
/// # Returns
/// Path of the written file.
pub fn export_segment(
    segment: &Segment,
    source: &Path,
    out_dir: &Path,
    config: &PlayerConfig,
) -> Result<PathBuf> {
    let dest = out_dir.join(export_file_name(segment, source)?);

    let compacted = compact_silence(&segment.raw_clip, config);
    writer::write_clip(&compacted, &dest)?;

    info!(
        "Exported segment {} ({} ms compacted to {} ms) to {}",
        segment.index,
        segment.raw_clip.duration_ms(),
        compacted.duration_ms(),
        dest.display()
    );
    Ok(dest)
}
