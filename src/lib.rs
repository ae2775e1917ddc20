//! Terminal arcade (workspace facade crate).
//!
//! Re-exports the member crates under stable names
//! (`tui_arcade::{types,term,input,engine,games}`) and holds the binary's
//! configuration layer.

pub mod config;

pub use tui_arcade_engine as engine;
pub use tui_arcade_games as games;
pub use tui_arcade_input as input;
pub use tui_arcade_term as term;
pub use tui_arcade_types as types;
