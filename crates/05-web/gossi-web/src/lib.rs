//! Browser bootstrap shim for gossi.
//!
//! On load this crate:
//! - starts fetching and instantiating the guest module (`/wasm/main.wasm`),
//! - mounts the UI at `#app` without waiting for the module,
//! - exports `run(program, data)` so page scripts reach the same bridge the
//!   UI uses.
//!
//! Only [`view_model`] builds natively; everything touching the DOM or the
//! WebAssembly JS API is wasm32-only.

pub mod view_model;

#[cfg(target_arch = "wasm32")]
mod loader;
#[cfg(target_arch = "wasm32")]
mod shim;
#[cfg(target_arch = "wasm32")]
mod ui;


#[cfg(target_arch = "wasm32")]
pub use loader::{WasmEntry, WebModuleLoader};
#[cfg(target_arch = "wasm32")]
pub use shim::{app_state, module_status, run, start, WebSpawner};
#[cfg(target_arch = "wasm32")]
pub use ui::DomMount;
