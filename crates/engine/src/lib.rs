//! Character-grid game engine.
//!
//! The pieces, leaf to root:
//!
//! - [`object`]: the entity model ([`Entity`], [`Body`], shared [`Handle`]s)
//!   with delta motion, parent/kid ownership and per-frame occupied cells.
//! - [`shapes`], [`bitmap`], [`effects`], [`widgets`]: drawable entities.
//! - [`collision`]: broad-phase hits by occupied-cell intersection.
//! - [`screen`]: the live object list, render pass, resize handling and
//!   input polling over a [`term::RenderTarget`] and [`input::InputSource`].
//! - [`scene`] and [`controller`]: the per-game state machine that routes
//!   input to the active scene and its listeners.
//! - [`actors`]: player, enemy swarm and boss composites.

pub mod actors;
pub mod bitmap;
pub mod border;
pub mod collision;
pub mod config;
pub mod controller;
pub mod effects;
pub mod error;
pub mod listener;
pub mod object;
pub mod scene;
pub mod screen;
pub mod shapes;
pub mod widgets;

pub use tui_arcade_input as input;
pub use tui_arcade_term as term;
pub use tui_arcade_types as types;

pub use config::EngineConfig;
pub use controller::{Controller, Play};
pub use error::{EngineError, Result};
pub use listener::KeyListener;
pub use object::{handle, same, Body, Entity, Handle, WeakHandle};
pub use scene::{Scene, SceneFactory};
pub use screen::{Screen, Signal};
