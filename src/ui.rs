//! Terminal UI and key input
//!
//! Raw-mode crossterm screen: a status line, the current subtitle (masked
//! when hidden), a key-hint footer, and a transient toast in the corner.
//! Input is polled with a zero timeout from the control loop, so rendering
//! and key handling share one cooperative tick.

use crate::error::{Error, Result};
use crate::playback::PlaybackState;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::{cursor, event, execute, style, terminal};
use std::io::{Stdout, Write};
use std::time::Duration;

/// A user command, decoupled from the key that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    /// Copy the current subtitle text to the clipboard
    CopyText,
    /// Export the current segment with silence compaction
    Export,
    /// Pause/resume (or restart after the segment finished)
    TogglePause,
    /// Replay the current segment from its start
    Replay,
    /// Show or hide the subtitle text
    ToggleSubtitle,
    /// Move to the next segment
    Advance,
    /// Move to the previous segment
    Retreat,
    /// Toggle loop mode
    ToggleLoop,
    /// Quit the session
    Quit,
}

/// Poll for one user command without blocking beyond `timeout`.
pub fn poll_command(timeout: Duration) -> Result<Option<UserCommand>> {
    if !event::poll(timeout).map_err(|e| Error::Terminal(e.to_string()))? {
        return Ok(None);
    }
    let event = event::read().map_err(|e| Error::Terminal(e.to_string()))?;
    Ok(map_event(&event))
}

fn map_event(event: &Event) -> Option<UserCommand> {
    let Event::Key(KeyEvent { code, kind, .. }) = event else {
        return None;
    };
    if *kind != KeyEventKind::Press {
        return None;
    }
    match code {
        KeyCode::Char('c') | KeyCode::Char('C') => Some(UserCommand::CopyText),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(UserCommand::Export),
        KeyCode::Char(' ') => Some(UserCommand::TogglePause),
        KeyCode::Up => Some(UserCommand::Replay),
        KeyCode::Down => Some(UserCommand::ToggleSubtitle),
        KeyCode::Right => Some(UserCommand::Advance),
        KeyCode::Left => Some(UserCommand::Retreat),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(UserCommand::ToggleLoop),
        KeyCode::Char('q') | KeyCode::Esc => Some(UserCommand::Quit),
        _ => None,
    }
}

/// Everything the screen needs for one frame.
#[derive(Debug, Clone)]
pub struct SessionView {
    /// 1-based ordinal of the current segment
    pub ordinal: usize,
    pub segment_count: usize,
    pub state: PlaybackState,
    pub loop_enabled: bool,
    pub subtitle_visible: bool,
    /// Current subtitle text (unmasked)
    pub text: String,
    pub notice: Option<String>,
}

/// Replace every non-whitespace character so the text length and word shape
/// stay recognizable while the content is hidden.
pub fn mask_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_whitespace() { c } else { '-' })
        .collect()
}

/// Raw-mode terminal screen. Restores the terminal on drop.
pub struct Screen {
    stdout: Stdout,
}

impl Screen {
    pub fn new() -> Result<Self> {
        let mut stdout = std::io::stdout();
        terminal::enable_raw_mode().map_err(|e| Error::Terminal(e.to_string()))?;
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)
            .map_err(|e| Error::Terminal(e.to_string()))?;
        Ok(Self { stdout })
    }

    /// Draw one frame.
    pub fn draw(&mut self, view: &SessionView) -> Result<()> {
        let (cols, rows) = terminal::size().map_err(|e| Error::Terminal(e.to_string()))?;

        let state_label = match view.state {
            PlaybackState::Stopped => "STOPPED",
            PlaybackState::Playing => "PLAYING",
            PlaybackState::Paused => "PAUSED",
            PlaybackState::Finished => "FINISHED",
        };
        let status = format!(
            "Seg: {}/{} | {} | Loop: {} | Subs: {}",
            view.ordinal,
            view.segment_count,
            state_label,
            if view.loop_enabled { "ON" } else { "OFF" },
            if view.subtitle_visible { "SHOW" } else { "HIDDEN" },
        );

        let text = if view.subtitle_visible {
            view.text.clone()
        } else {
            mask_text(&view.text)
        };

        let mut out = &self.stdout;
        crossterm::queue!(
            out,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0),
            style::Print(&status),
        )
        .map_err(|e| Error::Terminal(e.to_string()))?;

        // Toast in the top-right corner
        if let Some(notice) = &view.notice {
            let col = cols.saturating_sub(notice.chars().count() as u16 + 1);
            crossterm::queue!(out, cursor::MoveTo(col, 0), style::Print(notice))
                .map_err(|e| Error::Terminal(e.to_string()))?;
        }

        // Subtitle block, vertically centered
        let lines: Vec<&str> = text.lines().collect();
        let first_row = (rows / 2).saturating_sub(lines.len() as u16 / 2);
        for (i, line) in lines.iter().enumerate() {
            let col = (cols / 2).saturating_sub(line.chars().count() as u16 / 2);
            crossterm::queue!(
                out,
                cursor::MoveTo(col, first_row + i as u16),
                style::Print(line)
            )
            .map_err(|e| Error::Terminal(e.to_string()))?;
        }

        let hint = "[Space] Pause  [Up] Replay  [Left/Right] Prev/Next  [r] Loop  [Down] Subs  [x] Export  [c] Copy  [q] Quit";
        crossterm::queue!(
            out,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            style::Print(hint)
        )
        .map_err(|e| Error::Terminal(e.to_string()))?;

        self.stdout
            .flush()
            .map_err(|e| Error::Terminal(e.to_string()))?;
        Ok(())
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_key_map() {
        assert_eq!(map_event(&press(KeyCode::Char(' '))), Some(UserCommand::TogglePause));
        assert_eq!(map_event(&press(KeyCode::Up)), Some(UserCommand::Replay));
        assert_eq!(map_event(&press(KeyCode::Down)), Some(UserCommand::ToggleSubtitle));
        assert_eq!(map_event(&press(KeyCode::Right)), Some(UserCommand::Advance));
        assert_eq!(map_event(&press(KeyCode::Left)), Some(UserCommand::Retreat));
        assert_eq!(map_event(&press(KeyCode::Char('r'))), Some(UserCommand::ToggleLoop));
        assert_eq!(map_event(&press(KeyCode::Char('x'))), Some(UserCommand::Export));
        assert_eq!(map_event(&press(KeyCode::Char('c'))), Some(UserCommand::CopyText));
        assert_eq!(map_event(&press(KeyCode::Char('q'))), Some(UserCommand::Quit));
        assert_eq!(map_event(&press(KeyCode::Esc)), Some(UserCommand::Quit));
        assert_eq!(map_event(&press(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_release_events_ignored() {
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(map_event(&release), None);
    }

    #[test]
    fn test_mask_text_preserves_shape() {
        assert_eq!(mask_text("Hello world"), "----- -----");
        assert_eq!(mask_text("two\nlines here"), "---\n----- ----");
        assert_eq!(mask_text(""), "");
    }
}
