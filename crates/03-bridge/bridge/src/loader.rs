//! Asynchronous module initialisation.

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::{Bridge, BridgeError, BridgeResult, EntryPoint, LoadError};

/// Future returned by [`ModuleLoader::load`].
pub type LoadFuture = LocalBoxFuture<'static, Result<Rc<dyn EntryPoint>, LoadError>>;

/// Fetches, instantiates and starts a module, yielding its entry point.
pub trait ModuleLoader {
    /// Loads the module published at `url`.
    ///
    /// No timeout or retry is applied by callers; the loader decides how long
    /// a fetch may take.
    fn load(&self, url: &str) -> LoadFuture;
}

/// Drives a load for a bridge already marked `Loading`.
///
/// The outcome is recorded on the bridge (and thus delivered to its ready
/// waiters) before being returned, so dropping the result loses nothing.
pub async fn load_into<L>(bridge: &Bridge, loader: &L, url: &str) -> BridgeResult<()>
where
    L: ModuleLoader + ?Sized,
{
    log::info!("loading module from {url}");
    match loader.load(url).await {
        Ok(entry) => {
            bridge.install(entry)?;
            log::info!("module ready ({url})");
            Ok(())
        }
        Err(err) => {
            log::error!("module load failed ({url}): {err}");
            bridge.fail(err.clone())?;
            Err(BridgeError::LoadFailed(err))
        }
    }
}

/// Marks the bridge `Loading` and drives the load to completion.
pub async fn initialize<L>(bridge: &Bridge, loader: &L, url: &str) -> BridgeResult<()>
where
    L: ModuleLoader + ?Sized,
{
    bridge.begin_loading()?;
    load_into(bridge, loader, url).await
}
