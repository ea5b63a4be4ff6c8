//! Input - crossterm key events to host commands.
//!
//! Keys are named the way handlers see them in [`Event::value`]:
//! "a", "Enter", "Tab", "ArrowUp", ...
//!
//! [`Event::value`]: crate::node::Event::value

use std::time::Duration;

use crossterm::event::{
    poll, read, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};

/// What the host loop does with one key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Stop the loop (Ctrl+C, Esc, q).
    Quit,
    /// Move focus to the next clickable node.
    FocusNext,
    /// Move focus to the previous clickable node.
    FocusPrevious,
    /// Fire `click` on the focused node.
    Activate,
    /// Fire `keydown` with this key name.
    Key(String),
    /// Nothing to do.
    Ignore,
}

/// Name of a key the way handlers receive it.
pub fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Insert => "Insert".to_string(),
        _ => String::new(),
    }
}

/// Map a key event to a host command.
pub fn command_for(event: KeyEvent) -> HostCommand {
    if event.kind == KeyEventKind::Release {
        return HostCommand::Ignore;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);

    match event.code {
        KeyCode::Char('c') if ctrl => HostCommand::Quit,
        KeyCode::Char('q') | KeyCode::Esc => HostCommand::Quit,
        KeyCode::BackTab => HostCommand::FocusPrevious,
        KeyCode::Tab if shift => HostCommand::FocusPrevious,
        KeyCode::Tab => HostCommand::FocusNext,
        KeyCode::Enter | KeyCode::Char(' ') => HostCommand::Activate,
        code => match key_name(code) {
            name if name.is_empty() => HostCommand::Ignore,
            name => HostCommand::Key(name),
        },
    }
}

/// Poll for the next key command with timeout.
/// Returns None if no key arrived within the timeout.
pub fn poll_command(timeout: Duration) -> std::io::Result<Option<HostCommand>> {
    if !poll(timeout)? {
        return Ok(None);
    }
    match read()? {
        CrosstermEvent::Key(key) => Ok(Some(command_for(key))),
        _ => Ok(Some(HostCommand::Ignore)),
    }
}
