//! Screen frame with a title and a key/value status line.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::screen::Screen;

/// Ordered key/value pairs shown on the bottom edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    entries: BTreeMap<String, String>,
}

impl StatusLine {
    pub fn set(&mut self, key: impl Into<String>, value: impl Display) {
        self.entries.insert(key.into(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `key: value | key: value`, in key order.
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[derive(Debug, Clone)]
pub struct Border {
    pub ch: char,
    pub title: String,
    pub status: StatusLine,
    show_fps: bool,
}

impl Border {
    pub fn new(ch: char) -> Self {
        Self {
            ch,
            title: String::new(),
            status: StatusLine::default(),
            show_fps: true,
        }
    }

    pub fn with_fps(mut self, show_fps: bool) -> Self {
        self.show_fps = show_fps;
        self
    }

    pub fn shows_fps(&self) -> bool {
        self.show_fps
    }

    /// Forget the status line; the title stays.
    pub fn reset(&mut self) {
        self.status.clear();
    }

    pub fn render(&self, screen: &mut Screen) {
        let w = screen.width() as i32;
        let h = screen.height() as i32;
        if w == 0 || h == 0 {
            return;
        }

        for x in 0..w {
            screen.put((x, 0), self.ch, None);
            screen.put((x, h - 1), self.ch, None);
        }
        for y in 0..h {
            screen.put((0, y), self.ch, None);
            screen.put((w - 1, y), self.ch, None);
        }

        if !self.title.is_empty() {
            write_label(screen, &format!(" {} ", self.title), 2, 0);
        }
        if !self.status.is_empty() {
            write_label(screen, &format!(" {} ", self.status.text()), 2, h - 1);
        }
    }
}

fn write_label(screen: &mut Screen, text: &str, x: i32, y: i32) {
    // Leave the far corner to the frame.
    let room = (screen.width() as i32 - x - 1).max(0) as usize;
    for (i, ch) in text.chars().take(room).enumerate() {
        screen.put((x + i as i32, y), ch, None);
    }
}
