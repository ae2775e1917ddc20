//! Settings file for the arcade binary.
//!
//! Reads `arcade.toml` from the executable's directory or the current
//! directory, or an explicit path. Missing keys fall back to defaults; a file
//! that fails to parse is reported and ignored.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::EngineConfig;
use crate::types::{DEFAULT_FPS, KEY_RELEASE_MS};

pub const CONFIG_FILE: &str = "arcade.toml";

#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct ArcadeConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct EngineSection {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_key_release")]
    pub key_release_ms: u64,
    /// Frames between terminal size checks; unset means once per second.
    #[serde(default)]
    pub resize_check_frames: Option<u32>,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct DisplaySection {
    #[serde(default = "default_border_char")]
    pub border_char: char,
    #[serde(default = "default_show_fps")]
    pub show_fps: bool,
}

fn default_fps() -> u32 { DEFAULT_FPS }
fn default_key_release() -> u64 { KEY_RELEASE_MS }
fn default_border_char() -> char { '*' }
fn default_show_fps() -> bool { true }

impl Default for EngineSection {
    fn default() -> Self {
        EngineSection {
            fps: default_fps(),
            key_release_ms: default_key_release(),
            resize_check_frames: None,
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        DisplaySection {
            border_char: default_border_char(),
            show_fps: default_show_fps(),
        }
    }
}

/// Overrides from the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub fps: Option<u32>,
    pub debug: bool,
}

impl ArcadeConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid arcade config")
    }

    /// Load `path`, or the first `arcade.toml` found in the usual places.
    pub fn load(path: Option<&Path>) -> Self {
        let found = match path {
            Some(p) => Some(p.to_path_buf()),
            None => candidate_dirs()
                .into_iter()
                .map(|d| d.join(CONFIG_FILE))
                .find(|p| p.is_file()),
        };
        let Some(path) = found else {
            return Self::default();
        };

        match load_file(&path) {
            Ok(config) => {
                log::info!("config loaded from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("{err:#}; using defaults");
                Self::default()
            }
        }
    }

    pub fn engine_config(&self, overrides: Overrides) -> EngineConfig {
        let fps = overrides.fps.unwrap_or(self.engine.fps);
        let fps = if fps == 0 {
            log::warn!("fps must be positive, using {DEFAULT_FPS}");
            DEFAULT_FPS
        } else {
            fps
        };
        EngineConfig {
            fps,
            key_release_ms: self.engine.key_release_ms,
            resize_check_frames: self.engine.resize_check_frames,
            debug: overrides.debug,
            border_char: self.display.border_char,
            show_fps: self.display.show_fps,
        }
    }
}

fn load_file(path: &Path) -> Result<ArcadeConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    ArcadeConfig::parse(&text).with_context(|| format!("in {}", path.display()))
}

/// Executable directory, then the working directory.
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }
    dirs
}
