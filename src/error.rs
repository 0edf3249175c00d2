//! Error types
//!
//! Nothing here is fatal to the arena: the host logs and contains every
//! variant so that teardown always completes.

use thiserror::Error;

/// A scene failed to step or render for one tick
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("non-finite value in {what}")]
    NonFinite { what: &'static str },
    #[error("scene used before initialize")]
    Uninitialized,
}

/// Audio sink failures (blocked autoplay, missing API, node creation)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    #[error("audio output unsupported on this platform")]
    Unsupported,
    #[error("audio sink creation failed: {0}")]
    Create(String),
    #[error("audio node failure: {0}")]
    Node(String),
}

/// Drawing surface failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("surface lost")]
    SurfaceLost,
    #[error("surface out of memory")]
    OutOfMemory,
    #[error("surface error: {0}")]
    Other(String),
}

/// Key-value store failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Umbrella error for host-level operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArenaError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("platform error: {0}")]
    Platform(String),
}
