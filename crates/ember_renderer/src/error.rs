//! Error types for the renderer.

use thiserror::Error;

/// Errors that can stop a render from starting or finishing.
///
/// Absorption, depth termination and cancellation are not errors; they are
/// ordinary outcomes reported through values.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to spawn render dispatch thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid tile list: {0}")]
    InvalidTiles(String),

    #[error("failed to parse render configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("render dispatch thread panicked")]
    WorkerPanicked,
}

/// Result type for renderer operations.
pub type Result<T> = std::result::Result<T, RenderError>;
