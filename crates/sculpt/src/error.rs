//! Error types of the editing core.
//!
//! `EditError` values other than `SceneSink` are recoverable: the controller
//! turns them into user notifications and leaves the registry untouched.

use shared::ShapeId;
use thiserror::Error;

/// Failure reported by the scene sink
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Scene node already exists: {0}")]
    DuplicateNode(ShapeId),

    #[error("Scene node not found: {0}")]
    MissingNode(ShapeId),

    #[error("Scene sink unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by editing operations and the replay engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// Picking found no shape where one was required
    #[error("No design found at the target location")]
    NoTarget,

    /// The cutter does not overlap any target
    #[error("Cutter does not intersect any design")]
    NoIntersection,

    /// The gesture or selection does not carry enough data
    #[error("{0}")]
    InsufficientInput(String),

    /// Repeat requested with no recorded operation
    #[error("Nothing to repeat")]
    NothingToRepeat,

    /// Mirroring the registry into the scene sink failed
    #[error("Scene sink failure: {0}")]
    SceneSink(#[from] SceneError),
}

impl EditError {
    /// Fatal errors abort the current handler instead of being shown to the user
    pub fn is_fatal(&self) -> bool {
        matches!(self, EditError::SceneSink(_))
    }
}

/// Errors raised while reading persisted projects
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Malformed project JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported project schema version {found} (newest supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Project not found: {0}")]
    UnknownProject(String),

    #[error(transparent)]
    Edit(#[from] EditError),
}
