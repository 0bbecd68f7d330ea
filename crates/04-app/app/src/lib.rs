//! Application layer: context, router, store and boot sequencing.
//!
//! The browser shim builds an [`AppContext`] through [`Bootstrap`], which
//! starts module initialisation on a local executor and mounts the UI
//! without waiting for it. [`supervise`] mirrors the module outcome into
//! the [`Store`] so the UI can show it.

#![deny(missing_docs)]

pub mod boot;
pub mod config;
pub mod context;
pub mod error;
pub mod router;
pub mod store;

pub use boot::{supervise, Bootstrap, Mount};
pub use config::{BootConfig, DEFAULT_ANCHOR, DEFAULT_WASM_URL};
pub use context::AppContext;
pub use error::{BootError, MountError, RouteError};
pub use router::{Route, Router};
pub use store::{Action, AppState, RunRecord, Store, SubscriptionId, HISTORY_LIMIT};
