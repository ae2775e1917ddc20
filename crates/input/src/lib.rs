//! Terminal input module (engine-facing).
//!
//! This module is independent of any UI framework. It reads raw `crossterm`
//! key codes without blocking, coalesces key-repeat bursts into one discrete
//! press per tick, synthesises key release after idle time (for terminals
//! without release events) and maps keys onto [`InputEvent`]s.

pub mod coalesce;
pub mod map;
pub mod source;

pub use tui_arcade_types as types;

pub use coalesce::{KeyCoalescer, TickEvents};
pub use map::{decode, is_interrupt, InputEvent};
pub use source::{InputSource, ScriptedInput, TerminalInput};

pub use crossterm::event::KeyCode;
