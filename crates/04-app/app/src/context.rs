//! Explicit application context handed to the UI.

use bridge::{Bridge, BridgeResult};

use crate::{Action, BootConfig, Route, RouteError, Router, Store};

/// Everything a view needs: the module bridge, the router and the store.
///
/// Cloning is cheap; all clones observe the same state.
#[derive(Clone)]
pub struct AppContext {
    /// Settings the context was booted with.
    pub config: BootConfig,
    /// Handle to the guest module.
    pub bridge: Bridge,
    /// Route table and current route.
    pub router: Router,
    /// UI state.
    pub store: Store,
}

impl AppContext {
    /// Fresh context with an uninitialised bridge; the store starts on the
    /// router's current route.
    pub fn new(config: BootConfig, router: Router) -> Self {
        let store = Store::new();
        store.dispatch(Action::Navigated(router.current().path));
        Self {
            config,
            bridge: Bridge::new(),
            router,
            store,
        }
    }

    /// Calls the bridge and records the outcome in the store.
    ///
    /// The bridge result is returned exactly as the bridge produced it.
    pub fn run(&self, program: &str, data: &str) -> BridgeResult<String> {
        let result = self.bridge.run(program, data);
        let action = match &result {
            Ok(output) => Action::RunCompleted {
                program: program.to_owned(),
                data: data.to_owned(),
                output: output.clone(),
            },
            Err(err) => {
                log::warn!("run {program:?} failed: {err}");
                Action::RunFailed {
                    program: program.to_owned(),
                    data: data.to_owned(),
                    error: err.to_string(),
                }
            }
        };
        self.store.dispatch(action);
        result
    }

    /// Navigates the router and mirrors the new path into the store.
    pub fn navigate(&self, path: &str) -> Result<Route, RouteError> {
        let route = self.router.navigate(path)?;
        self.store.dispatch(Action::Navigated(route.path.clone()));
        Ok(route)
    }
}
