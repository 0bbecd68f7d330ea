//! Start function and the JS-visible bridge exports.

use std::cell::RefCell;

use app::{AppContext, BootConfig, Bootstrap};
use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};
use js_sys::Reflect;
use wasm_bindgen::prelude::*;

use crate::{DomMount, WebModuleLoader};

/// Attribute on `<html>` holding JSON [`BootConfig`] overrides.
const CONFIG_ATTR: &str = "data-gossi-config";

/// Property on the global object page scripts call as `run(program, data)`.
pub(crate) const GLOBAL_RUN: &str = "run";

thread_local! {
    static CTX: RefCell<Option<AppContext>> = const { RefCell::new(None) };
}

/// Runs futures on the browser microtask queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSpawner;

impl LocalSpawn for WebSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}

/// Entry point invoked by the wasm-bindgen glue once the shim is loaded.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let config = read_config();
    if let Some(level) = config.level().to_level() {
        // Ignore error if a logger is already installed (tests reload the shim).
        let _ = console_log::init_with_level(level);
    }
    log::info!(
        "gossi starting: module={} anchor={}",
        config.wasm_url,
        config.anchor
    );

    let boot = Bootstrap::new(config);
    CTX.with(|c| *c.borrow_mut() = Some(boot.context().clone()));
    install_global_run()?;
    boot.start(WebModuleLoader, &DomMount, &WebSpawner)
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Forwards to the guest's entry point; fails until the module is ready.
#[wasm_bindgen]
pub fn run(program: &str, data: &str) -> Result<String, JsValue> {
    with_ctx(|ctx| {
        ctx.run(program, data)
            .map_err(|err| JsValue::from_str(&err.to_string()))
    })
}

/// Current module status (`uninitialized`, `loading`, `ready`, `failed`).
#[wasm_bindgen]
pub fn module_status() -> Result<String, JsValue> {
    with_ctx(|ctx| Ok(ctx.bridge.status().to_string()))
}

/// JSON snapshot of the UI store.
#[wasm_bindgen]
pub fn app_state() -> Result<String, JsValue> {
    with_ctx(|ctx| {
        ctx.store
            .to_json()
            .map_err(|err| JsValue::from_str(&err.to_string()))
    })
}

/// Puts `run` on `globalThis`, next to the ES-module export of the same name.
pub(crate) fn install_global_run() -> Result<(), JsValue> {
    let run_global =
        Closure::<dyn Fn(String, String) -> Result<String, JsValue>>::new(
            |program: String, data: String| run(&program, &data),
        );
    Reflect::set(
        &js_sys::global(),
        &JsValue::from_str(GLOBAL_RUN),
        run_global.as_ref(),
    )?;
    run_global.forget();
    Ok(())
}

fn with_ctx<R>(f: impl FnOnce(&AppContext) -> Result<R, JsValue>) -> Result<R, JsValue> {
    // Clone out so page callbacks re-entering an export never hit a live borrow.
    let ctx = CTX.with(|c| c.borrow().clone());
    let ctx = ctx.ok_or_else(|| JsValue::from_str("not started"))?;
    f(&ctx)
}

fn read_config() -> BootConfig {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .and_then(|el| el.get_attribute(CONFIG_ATTR));
    let Some(raw) = raw else {
        return BootConfig::default();
    };
    match BootConfig::from_json(&raw) {
        Ok(config) => config,
        Err(err) => {
            web_sys::console::warn_1(&format!("ignoring {CONFIG_ATTR}: {err}").into());
            BootConfig::default()
        }
    }
}
