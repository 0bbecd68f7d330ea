#![deny(missing_docs)]
//! Call surface between UI code and the compiled guest module.
//!
//! * [`Bridge`] – the module handle: status, installed entry point, captured
//!   load failure and ready waiters.
//! * [`EntryPoint`] – the single routine the guest exports, as seen by the host.
//! * [`ModuleLoader`] / [`load_into`] – asynchronous fetch + instantiate task
//!   whose outcome is recorded on the bridge instead of being dropped.
//! * [`BridgeError`] / [`LoadError`] / [`EntryError`] – typed failure surface.

mod entry;
mod error;
mod handle;
mod loader;

pub use entry::EntryPoint;
pub use error::{BridgeError, BridgeResult, EntryError, LoadError};
pub use handle::{Bridge, ModuleStatus};
pub use loader::{initialize, load_into, LoadFuture, ModuleLoader};
