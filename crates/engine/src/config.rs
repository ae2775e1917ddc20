//! Engine knobs. Loading them from files or flags is the binary's job.

use std::time::Duration;

use crate::types::{DEFAULT_FPS, KEY_RELEASE_MS};

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Frame rate cap.
    pub fps: u32,
    /// Idle time before a synthetic key release.
    pub key_release_ms: u64,
    /// Frames between terminal size checks; `None` checks once per `fps` frames.
    pub resize_check_frames: Option<u32>,
    /// Overlay internals on the status line and propagate render failures.
    pub debug: bool,
    pub border_char: char,
    pub show_fps: bool,
}

impl EngineConfig {
    pub fn key_release(&self) -> Duration {
        Duration::from_millis(self.key_release_ms)
    }

    pub fn resize_interval(&self) -> u64 {
        self.resize_check_frames.unwrap_or(self.fps).max(1) as u64
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            key_release_ms: KEY_RELEASE_MS,
            resize_check_frames: None,
            debug: false,
            border_char: '*',
            show_fps: true,
        }
    }
}
