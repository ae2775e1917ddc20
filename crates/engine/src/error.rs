use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A controller was built without a title.
    #[error("controller name must not be blank")]
    MissingName,

    #[error("controller `{0}` has no scenes")]
    NoScenes(String),

    #[error("render target failed: {0}")]
    Render(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
