use thiserror::Error;

use crate::ModuleStatus;

/// Result alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Why the guest module could not be brought up.
///
/// Cloneable so one failure can be handed to every ready waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The binary could not be fetched.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The response was not a valid WebAssembly module.
    #[error("compile failed: {0}")]
    Compile(String),

    /// Linking against the import object failed.
    #[error("instantiate failed: {0}")]
    Instantiate(String),

    /// The instance lacks an export the host needs.
    #[error("module is missing export `{0}`")]
    MissingExport(&'static str),

    /// The module trapped while starting.
    #[error("start failed: {0}")]
    Start(String),

    /// The bridge was dropped before the load settled.
    #[error("module load was abandoned")]
    Abandoned,
}

/// Failure reported by an installed entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// The guest returned a negative status.
    #[error("guest returned status {status}: {reason}")]
    Guest {
        /// Raw status code.
        status: i32,
        /// Description of the status.
        reason: &'static str,
    },

    /// The guest produced bytes that are not UTF-8.
    #[error("guest result is not valid UTF-8")]
    InvalidUtf8,

    /// Calling into the guest failed on the host side (trap, bad export).
    #[error("host call failed: {0}")]
    Host(String),
}

/// Errors surfaced by [`crate::Bridge`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The module has not finished loading.
    #[error("module not ready (status: {status})")]
    NotReady {
        /// Status observed at call time.
        status: ModuleStatus,
    },

    /// The module failed to load; calls can never succeed.
    #[error("module failed to load: {0}")]
    LoadFailed(LoadError),

    /// The entry point itself failed.
    #[error("entry point failed: {0}")]
    Entry(#[from] EntryError),

    /// A lifecycle step was attempted out of order.
    #[error("invalid module transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: ModuleStatus,
        /// Requested status.
        to: ModuleStatus,
    },
}
