//! TerminalRenderer: the crossterm-backed render target.
//!
//! Writes are queued and only reach the terminal on `flush`. Consecutive
//! writes on the same row skip the cursor move, and the foreground color is
//! only re-issued when it changes, so a diffed frame stays small.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    style::{Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal, QueueableCommand,
};

use crate::fb::Glyph;
use crate::target::RenderTarget;
use crate::types::Color;

pub struct TerminalRenderer {
    stdout: io::Stdout,
    cursor: Option<(u16, u16)>,
    color: Option<Option<Color>>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            cursor: None,
            color: None,
        }
    }

    /// Raw/no-echo mode on the alternate screen with the cursor hidden.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.stdout.queue(terminal::EnterAlternateScreen)?;
        self.stdout.queue(cursor::Hide)?;
        self.stdout.queue(terminal::DisableLineWrap)?;
        self.stdout.flush()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.stdout.queue(ResetColor)?;
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(terminal::EnableLineWrap)?;
        self.stdout.queue(cursor::Show)?;
        self.stdout.queue(terminal::LeaveAlternateScreen)?;
        self.stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn apply_color(&mut self, color: Option<Color>) -> io::Result<()> {
        if self.color == Some(color) {
            return Ok(());
        }
        match color {
            Some(c) => self.stdout.queue(SetForegroundColor(to_term_color(c)))?,
            None => self.stdout.queue(ResetColor)?,
        };
        self.color = Some(color);
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget for TerminalRenderer {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn put(&mut self, x: u16, y: u16, glyph: Glyph) -> io::Result<()> {
        if self.cursor != Some((x, y)) {
            self.stdout.queue(cursor::MoveTo(x, y))?;
        }
        self.apply_color(glyph.color)?;
        self.stdout.queue(Print(glyph.ch))?;
        self.cursor = Some((x.saturating_add(1), y));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.queue(ResetColor)?;
        self.color = None;
        self.stdout.flush()
    }

    fn clear(&mut self) -> io::Result<()> {
        self.stdout
            .queue(terminal::Clear(terminal::ClearType::All))?;
        self.cursor = None;
        self.stdout.flush()
    }
}

/// Map the palette onto terminal colors. Rainbow is resolved before drawing
/// and only falls back to white here.
fn to_term_color(color: Color) -> TermColor {
    match color {
        Color::Red => TermColor::Red,
        Color::Green => TermColor::Green,
        Color::Blue => TermColor::Blue,
        Color::Yellow => TermColor::Yellow,
        Color::Cyan => TermColor::Cyan,
        Color::Magenta => TermColor::Magenta,
        Color::Rainbow => TermColor::White,
    }
}
