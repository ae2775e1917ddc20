//! Terminal "game renderer" module.
//!
//! This is a small, game-oriented rendering layer for terminal gameplay.
//! It avoids widget/layout libraries and instead composes each frame into a
//! double-buffered character grid that is diffed against the previous frame
//! before anything is written to the terminal.
//!
//! Goals:
//! - Keep the entity engine testable without a terminal ([`RecordingTarget`])
//! - Write only the cells that changed
//! - Cap the frame rate and report the achieved rate ([`FramePacer`])

pub mod fb;
pub mod pacing;
pub mod renderer;
pub mod target;

pub use tui_arcade_types as types;

pub use fb::{Glyph, ScreenBuffer, Slot, BLANK_PLACEHOLDER};
pub use pacing::FramePacer;
pub use renderer::TerminalRenderer;
pub use target::{Recorded, RecordingTarget, RenderTarget};
