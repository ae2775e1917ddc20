//! Key mapping from raw terminal key codes to semantic events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Semantic input event delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// Any key, delivered before its semantic translation.
    Pressed(KeyCode),
    /// No key seen for the release threshold.
    Released,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Space,
    Enter,
    Digit(u8),
    Minus,
}

/// Map a raw key code to its semantic event.
///
/// Arrows also answer to vi-style `h`/`j`/`k`/`l`.
pub fn decode(code: KeyCode) -> Option<InputEvent> {
    match code {
        KeyCode::Left | KeyCode::Char('h') => Some(InputEvent::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(InputEvent::Right),
        KeyCode::Up | KeyCode::Char('k') => Some(InputEvent::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(InputEvent::Down),

        KeyCode::Esc | KeyCode::Char('q') => Some(InputEvent::Escape),
        KeyCode::Char(' ') | KeyCode::Char('f') => Some(InputEvent::Space),
        KeyCode::Enter => Some(InputEvent::Enter),

        KeyCode::Char(c @ '0'..='9') => Some(InputEvent::Digit(c as u8 - b'0')),
        KeyCode::Char('-') => Some(InputEvent::Minus),

        _ => None,
    }
}

/// Ctrl+C always interrupts, whatever the game does with `q`/Esc.
pub fn is_interrupt(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}
