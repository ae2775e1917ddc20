//! Core types module - shared value types and constants
//!
//! This module defines the plain data types used by every layer of the arcade:
//! the framebuffer, the input decoder, the entity engine and the games.
//! They carry no external dependencies so they can be used from pure logic and
//! from tests alike.
//!
//! # Coordinates
//!
//! Entities move on real-valued coordinates so that sub-cell velocities
//! accumulate; they are truncated toward zero into integer [`Cell`]s only when
//! drawn or tested for collision.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_FPS` | 30 | Frame rate cap used when none is configured |
//! | `KEY_RELEASE_MS` | 500 | Idle time before a synthetic "key released" |
//! | `FPS_WINDOW` | 30 | Frames averaged for the displayed FPS |
//!
//! # Examples
//!
//! ```
//! use tui_arcade_types::{cell_of, Color, Extent};
//!
//! assert_eq!(cell_of(10.7, -0.4), (10, 0));
//! assert_eq!(Color::from_name("RED"), Some(Color::Red));
//! assert!(Extent::new(80, 20).contains((79, 19)));
//! ```

/// Frame rate cap used when none is configured.
pub const DEFAULT_FPS: u32 = 30;

/// Idle time in milliseconds after which a synthetic "key released" is emitted.
pub const KEY_RELEASE_MS: u64 = 500;

/// Number of recent frames averaged for the displayed FPS.
pub const FPS_WINDOW: usize = 30;

/// Integer grid cell `(x, y)`.
pub type Cell = (i32, i32);

/// Truncate a real-valued position into the cell it occupies.
#[inline]
pub fn cell_of(x: f64, y: f64) -> Cell {
    (x.trunc() as i32, y.trunc() as i32)
}

/// Terminal palette.
///
/// `Rainbow` is a pseudo-color: it is never stored in a framebuffer, the
/// drawing layer resolves it to a random member of [`Color::RAINBOW`] on every
/// draw so rainbow objects flicker from frame to frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    Rainbow,
}

impl Color {
    /// Concrete colors a rainbow draw picks from.
    pub const RAINBOW: [Color; 6] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Cyan,
        Color::Magenta,
    ];

    pub fn is_rainbow(self) -> bool {
        self == Color::Rainbow
    }

    /// Parse a color from its name (case-insensitive).
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "blue" => Some(Color::Blue),
            "yellow" => Some(Color::Yellow),
            "cyan" => Some(Color::Cyan),
            "magenta" => Some(Color::Magenta),
            "rainbow" => Some(Color::Rainbow),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Cyan => "cyan",
            Color::Magenta => "magenta",
            Color::Rainbow => "rainbow",
        }
    }
}

/// Width and height of the drawable area in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub width: u16,
    pub height: u16,
}

impl Extent {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, (x, y): Cell) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }
}
