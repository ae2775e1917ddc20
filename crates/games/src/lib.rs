//! The arcade's titles and the chooser that launches them.

pub mod arcade;
pub mod geo_bash;
pub mod last_survivor;
pub mod number_crush;

use tui_arcade_engine::bitmap::Bitmap;
use tui_arcade_engine::{EngineConfig, Play, Result};

pub use arcade::Arcade;

/// A game the arcade can launch.
#[derive(Clone, Copy)]
pub struct Title {
    pub name: &'static str,
    /// Art shown in the chooser.
    pub logo: fn() -> Bitmap,
    /// Build a fresh controller for a new session.
    pub launch: fn(&EngineConfig) -> Result<Box<dyn Play>>,
}

impl std::fmt::Debug for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Title").field("name", &self.name).finish()
    }
}

pub fn titles() -> Vec<Title> {
    vec![geo_bash::TITLE, number_crush::TITLE, last_survivor::TITLE]
}

/// Titles whose name contains `filter`, ignoring case. An empty filter
/// matches everything.
pub fn find(filter: &str) -> Vec<Title> {
    let filter = filter.trim().to_lowercase();
    titles()
        .into_iter()
        .filter(|t| t.name.to_lowercase().contains(&filter))
        .collect()
}
