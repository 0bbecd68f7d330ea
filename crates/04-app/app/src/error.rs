//! Error surface of the application layer.

use bridge::BridgeError;
use futures::task::SpawnError;
use thiserror::Error;

/// Route table and navigation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No route has the (normalised) path.
    #[error("no route matches `{0}`")]
    NotFound(String),

    /// A router needs at least one route.
    #[error("route table is empty")]
    Empty,

    /// Two routes share a path or a name.
    #[error("duplicate route `{0}`")]
    Duplicate(String),
}

/// Failures while attaching the UI to the host page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    /// Nothing in the host page matches the anchor selector.
    #[error("anchor `{0}` not found")]
    AnchorNotFound(String),

    /// Building or updating the view failed.
    #[error("render failed: {0}")]
    Render(String),
}

impl MountError {
    /// Wraps a rendering failure message.
    pub fn render(msg: impl Into<String>) -> Self {
        MountError::Render(msg.into())
    }
}

/// Anything that stops [`crate::Bootstrap::start`].
#[derive(Debug, Error)]
pub enum BootError {
    /// The module handle refused to start loading.
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// The executor rejected a task.
    #[error("spawn failed: {0}")]
    Spawn(#[from] SpawnError),

    /// The UI could not be attached.
    #[error("mount failed: {0}")]
    Mount(#[from] MountError),

    /// Config overrides were not valid JSON.
    #[error("invalid boot config: {0}")]
    Config(#[from] serde_json::Error),
}
