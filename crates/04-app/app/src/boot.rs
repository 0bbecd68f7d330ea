//! Startup sequencing: module initialisation and UI mount run independently.

use bridge::{load_into, ModuleLoader};
use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::{Action, AppContext, BootConfig, BootError, MountError, Router};

/// Attaches the root UI to the host page.
pub trait Mount {
    /// Renders into the element selected by `anchor`.
    fn mount(&self, anchor: &str, ctx: &AppContext) -> Result<(), MountError>;
}

impl<F> Mount for F
where
    F: Fn(&str, &AppContext) -> Result<(), MountError>,
{
    fn mount(&self, anchor: &str, ctx: &AppContext) -> Result<(), MountError> {
        self(anchor, ctx)
    }
}

/// Owns the application context until the shim starts it.
pub struct Bootstrap {
    ctx: AppContext,
}

impl Bootstrap {
    /// Context with the default route table.
    pub fn new(config: BootConfig) -> Self {
        Self::with_router(config, Router::default())
    }

    /// Context over a custom route table.
    pub fn with_router(config: BootConfig, router: Router) -> Self {
        Self {
            ctx: AppContext::new(config, router),
        }
    }

    /// The context the UI and exports share.
    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Starts the module load and mounts the UI.
    ///
    /// The load and its supervisor are spawned on `spawner`; the mount runs
    /// synchronously and never waits for the module. Load failures do not
    /// fail this call: they land on the bridge and in the store.
    pub fn start<L, M, S>(&self, loader: L, mount: &M, spawner: &S) -> Result<(), BootError>
    where
        L: ModuleLoader + 'static,
        M: Mount + ?Sized,
        S: LocalSpawn + ?Sized,
    {
        let ctx = &self.ctx;
        ctx.bridge.begin_loading()?;
        ctx.store.dispatch(Action::ModuleLoading);

        let bridge = ctx.bridge.clone();
        let url = ctx.config.wasm_url.clone();
        spawner.spawn_local(async move {
            if let Err(err) = load_into(&bridge, &loader, &url).await {
                log::debug!("init task finished with {err}");
            }
        })?;
        spawner.spawn_local(supervise(ctx.clone()))?;

        mount.mount(&ctx.config.anchor, ctx)?;
        log::info!("mounted at {}", ctx.config.anchor);
        Ok(())
    }
}

/// Mirrors the module outcome into the store once it settles.
pub async fn supervise(ctx: AppContext) {
    match ctx.bridge.ready().await {
        Ok(()) => ctx.store.dispatch(Action::ModuleReady),
        Err(err) => {
            log::error!("module unavailable: {err}");
            ctx.store.dispatch(Action::ModuleFailed(err.to_string()));
        }
    }
}
