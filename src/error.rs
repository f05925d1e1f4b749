//! Scene error types
//!
//! Only asset problems are errors. Out-of-bounds players, generation lag
//! and stale contacts are ordinary gameplay states handled by the controller.

use thiserror::Error;

/// Errors surfaced to the host while building a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A named tilemap or image the scene needs is not registered.
    #[error("missing asset: {0}")]
    MissingAsset(String),

    /// An asset was found but its contents are unusable.
    #[error("invalid asset {name}: {reason}")]
    InvalidAsset { name: String, reason: String },

    /// A profile name that matches none of the presets.
    #[error("unknown scene profile: {0}")]
    UnknownProfile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SceneError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SceneError::InvalidAsset {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SceneError>;
