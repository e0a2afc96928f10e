//! SRT subtitle parsing
//!
//! Parses SubRip (.srt) files into ordered, millisecond-resolution cues. This
//! is the timing input for segment preparation; a file that yields no cues is
//! a fatal load error.
//!
//! The parser tolerates the variations commonly found in generated SRT files:
//! UTF-8 BOM, CRLF line endings, `.` as the millisecond separator, and
//! multi-line cue text.

use crate::error::{Error, Result};
use std::path::Path;
use tracing::warn;

/// One timed text interval from the subtitle file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Cue start on the recording timeline, in milliseconds
    pub start_ms: u64,

    /// Cue end on the recording timeline, in milliseconds
    pub end_ms: u64,

    /// Display text (joined with `\n` for multi-line cues)
    pub text: String,
}

/// Load and parse an SRT file.
pub fn load_srt(path: &Path) -> Result<Vec<Cue>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Subtitle(format!("cannot read {}: {}", path.display(), e)))?;
    parse_srt(&text)
}

/// Parse SRT text into cues.
///
/// Cue blocks are separated by blank lines. Within a block the optional
/// counter line is skipped, the timing line is parsed, and all remaining
/// lines become the cue text. Blocks without a valid timing line are skipped
/// with a warning; an input yielding zero cues is an error.
pub fn parse_srt(input: &str) -> Result<Vec<Cue>> {
    let input = input.trim_start_matches('\u{feff}');
    let mut cues = Vec::new();

    for block in input.split("\n\n").flat_map(|b| b.split("\r\n\r\n")) {
        let lines: Vec<&str> = block
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim().is_empty())
            .collect();
        if lines.is_empty() {
            continue;
        }

        // The counter line is optional; the timing line is the first line
        // containing the arrow.
        let Some(timing_idx) = lines.iter().position(|l| l.contains("-->")) else {
            warn!("Skipping subtitle block without timing line: {:?}", lines[0]);
            continue;
        };

        let (start_ms, end_ms) = match parse_timing_line(lines[timing_idx]) {
            Some(bounds) => bounds,
            None => {
                warn!("Skipping malformed timing line: {:?}", lines[timing_idx]);
                continue;
            }
        };

        let text = lines[timing_idx + 1..].join("\n");
        cues.push(Cue {
            start_ms,
            end_ms,
            text,
        });
    }

    if cues.is_empty() {
        return Err(Error::Subtitle(
            "no cues found in subtitle input".to_string(),
        ));
    }

    Ok(cues)
}

/// Parse `HH:MM:SS,mmm --> HH:MM:SS,mmm` into millisecond bounds.
fn parse_timing_line(line: &str) -> Option<(u64, u64)> {
    let mut parts = line.splitn(2, "-->");
    let start = parse_timestamp(parts.next()?.trim())?;
    // Position hints ("X1:40 X2:600 ...") may trail the end timestamp.
    let end_part = parts.next()?.trim();
    let end_token = end_part.split_whitespace().next()?;
    let end = parse_timestamp(end_token)?;
    Some((start, end))
}

/// Parse `HH:MM:SS,mmm` (or `HH:MM:SS.mmm`) into milliseconds.
fn parse_timestamp(ts: &str) -> Option<u64> {
    let (clock, millis) = ts.rsplit_once([',', '.'])?;
    let millis: u64 = millis.trim().parse().ok()?;

    let mut fields = clock.split(':');
    let hours: u64 = fields.next()?.trim().parse().ok()?;
    let minutes: u64 = fields.next()?.trim().parse().ok()?;
    let seconds: u64 = fields.next()?.trim().parse().ok()?;
    if fields.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }

    Some(((hours * 3600 + minutes * 60 + seconds) * 1000) + millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello world\n\n2\n00:00:02,500 --> 00:00:03,500\nSecond line\nwraps here\n";

    #[test]
    fn test_parse_basic() {
        let cues = parse_srt(SAMPLE).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].start_ms, 1000);
        assert_eq!(cues[0].end_ms, 2000);
        assert_eq!(cues[0].text, "Hello world");
        assert_eq!(cues[1].text, "Second line\nwraps here");
    }

    #[test]
    fn test_parse_crlf_and_bom() {
        let input = "\u{feff}1\r\n00:00:00,100 --> 00:00:00,900\r\nText\r\n\r\n";
        let cues = parse_srt(input).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].start_ms, 100);
        assert_eq!(cues[0].end_ms, 900);
        assert_eq!(cues[0].text, "Text");
    }

    #[test]
    fn test_parse_dot_millis_separator() {
        let input = "00:01:00.250 --> 00:01:02.750\nNo counter line\n";
        let cues = parse_srt(input).unwrap();
        assert_eq!(cues[0].start_ms, 60_250);
        assert_eq!(cues[0].end_ms, 62_750);
    }

    #[test]
    fn test_hours_accumulate() {
        assert_eq!(parse_timestamp("01:02:03,004"), Some(3_723_004));
    }

    #[test]
    fn test_malformed_block_skipped() {
        let input = "1\nnot a timing line\ntext\n\n2\n00:00:01,000 --> 00:00:02,000\nok\n";
        let cues = parse_srt(input).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "ok");
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(parse_srt("").is_err());
        assert!(parse_srt("just some text\n").is_err());
    }
}
