//! Clipboard access
//!
//! Copies the current subtitle text by piping it to the platform clipboard
//! tool: `pbcopy` on macOS, `wl-copy` under Wayland, `xclip` under X11.
//! Failures surface as a transient notice and never disturb playback.

use crate::error::{Error, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Copy text to the system clipboard.
pub fn copy_text(text: &str) -> Result<()> {
    let (program, args): (&str, &[&str]) = if cfg!(target_os = "macos") {
        ("pbcopy", &[])
    } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        ("wl-copy", &[])
    } else {
        ("xclip", &["-selection", "clipboard"])
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::Clipboard(format!("cannot run {}: {}", program, e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| Error::Clipboard(format!("cannot write to {}: {}", program, e)))?;
    }

    let status = child
        .wait()
        .map_err(|e| Error::Clipboard(format!("failed waiting for {}: {}", program, e)))?;

    if !status.success() {
        return Err(Error::Clipboard(format!("{} exited with {}", program, status)));
    }

    debug!("Copied {} bytes to clipboard via {}", text.len(), program);
    Ok(())
}
