//! Boot sequencing: independent mount, fixed module path, failure reporting.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use app::{AppContext, BootConfig, BootError, Bootstrap, MountError, RunRecord};
use bridge::{
    BridgeError, EntryError, EntryPoint, LoadError, LoadFuture, ModuleLoader, ModuleStatus,
};
use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::future::FutureExt;

type Gate = oneshot::Sender<Result<Rc<dyn EntryPoint>, LoadError>>;

/// Loader whose outcome is decided by the test through a oneshot gate.
struct GatedLoader {
    urls: Rc<RefCell<Vec<String>>>,
    gate: RefCell<Option<oneshot::Receiver<Result<Rc<dyn EntryPoint>, LoadError>>>>,
}

impl GatedLoader {
    fn new() -> (Self, Gate, Rc<RefCell<Vec<String>>>) {
        let (tx, rx) = oneshot::channel();
        let urls = Rc::new(RefCell::new(Vec::new()));
        let loader = Self {
            urls: urls.clone(),
            gate: RefCell::new(Some(rx)),
        };
        (loader, tx, urls)
    }
}

impl ModuleLoader for GatedLoader {
    fn load(&self, url: &str) -> LoadFuture {
        self.urls.borrow_mut().push(url.to_owned());
        let rx = self.gate.borrow_mut().take();
        async move {
            match rx {
                Some(rx) => rx.await.unwrap_or(Err(LoadError::Abandoned)),
                None => Err(LoadError::Abandoned),
            }
        }
        .boxed_local()
    }
}

fn counting_entry(hits: Rc<Cell<u32>>) -> Rc<dyn EntryPoint> {
    Rc::new(move |program: &str, data: &str| -> Result<String, EntryError> {
        hits.set(hits.get() + 1);
        Ok(format!("{program}|{data}"))
    })
}

fn noop_mount(_: &str, _: &AppContext) -> Result<(), MountError> {
    Ok(())
}

#[test]
fn module_fetch_targets_fixed_path() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut pool = LocalPool::new();
    let (loader, _gate, urls) = GatedLoader::new();
    let boot = Bootstrap::new(BootConfig::default());

    boot.start(loader, &noop_mount, &pool.spawner()).unwrap();
    pool.run_until_stalled();

    assert_eq!(urls.borrow().as_slice(), &["/wasm/main.wasm".to_string()]);
}

#[test]
fn mount_completes_before_module_is_ready() {
    let mut pool = LocalPool::new();
    let (loader, gate, _) = GatedLoader::new();
    let boot = Bootstrap::new(BootConfig::default());
    let seen_at_mount = Rc::new(Cell::new(None));

    let seen = seen_at_mount.clone();
    let mount = move |anchor: &str, ctx: &AppContext| -> Result<(), MountError> {
        assert_eq!(anchor, "#app");
        seen.set(Some(ctx.bridge.status()));
        Ok(())
    };
    boot.start(loader, &mount, &pool.spawner()).unwrap();
    pool.run_until_stalled();

    assert_eq!(seen_at_mount.get(), Some(ModuleStatus::Loading));
    let ctx = boot.context();
    assert_eq!(ctx.bridge.status(), ModuleStatus::Loading);
    assert_eq!(ctx.store.snapshot().module, ModuleStatus::Loading);

    let hits = Rc::new(Cell::new(0));
    assert!(gate.send(Ok(counting_entry(hits.clone()))).is_ok());
    pool.run_until_stalled();

    assert_eq!(ctx.bridge.status(), ModuleStatus::Ready);
    assert_eq!(ctx.store.snapshot().module, ModuleStatus::Ready);
    assert_eq!(hits.get(), 0);
}

#[test]
fn run_before_ready_fails_and_is_recorded() {
    let mut pool = LocalPool::new();
    let (loader, _gate, _) = GatedLoader::new();
    let boot = Bootstrap::new(BootConfig::default());
    boot.start(loader, &noop_mount, &pool.spawner()).unwrap();
    pool.run_until_stalled();

    let ctx = boot.context();
    let err = ctx.run("echo", "early").unwrap_err();
    assert_eq!(
        err,
        BridgeError::NotReady {
            status: ModuleStatus::Loading
        }
    );

    let state = ctx.store.snapshot();
    assert_eq!(state.runs_failed, 1);
    assert_eq!(
        state.last_run,
        Some(RunRecord {
            program: "echo".into(),
            data: "early".into(),
            result: Err("module not ready (status: loading)".into()),
        })
    );
}

#[test]
fn ready_module_forwards_every_call() {
    let mut pool = LocalPool::new();
    let (loader, gate, _) = GatedLoader::new();
    let boot = Bootstrap::new(BootConfig::default());
    boot.start(loader, &noop_mount, &pool.spawner()).unwrap();

    let hits = Rc::new(Cell::new(0));
    assert!(gate.send(Ok(counting_entry(hits.clone()))).is_ok());
    pool.run_until_stalled();

    let ctx = boot.context();
    for _ in 0..2 {
        assert_eq!(ctx.run("uppercase", "a b").unwrap(), "uppercase|a b");
    }
    assert_eq!(hits.get(), 2);
    assert_eq!(ctx.store.snapshot().runs_ok, 2);
}

#[test]
fn load_failure_is_reflected_in_store() {
    let mut pool = LocalPool::new();
    let (loader, gate, _) = GatedLoader::new();
    let boot = Bootstrap::new(BootConfig::default());
    boot.start(loader, &noop_mount, &pool.spawner()).unwrap();

    assert!(gate
        .send(Err(LoadError::Fetch("404 Not Found".into())))
        .is_ok());
    pool.run_until_stalled();

    let ctx = boot.context();
    let state = ctx.store.snapshot();
    assert_eq!(state.module, ModuleStatus::Failed);
    assert_eq!(
        state.load_error.as_deref(),
        Some("fetch failed: 404 Not Found")
    );
    assert_eq!(
        ctx.run("echo", "x"),
        Err(BridgeError::LoadFailed(LoadError::Fetch(
            "404 Not Found".into()
        )))
    );
}

#[test]
fn custom_wasm_url_is_used() {
    let mut pool = LocalPool::new();
    let (loader, _gate, urls) = GatedLoader::new();
    let config = BootConfig::from_json(r#"{"wasm_url":"/static/guest.wasm"}"#).unwrap();
    let boot = Bootstrap::new(config);

    boot.start(loader, &noop_mount, &pool.spawner()).unwrap();
    pool.run_until_stalled();

    assert_eq!(urls.borrow().as_slice(), &["/static/guest.wasm".to_string()]);
}

#[test]
fn mount_error_aborts_start_but_load_continues() {
    let mut pool = LocalPool::new();
    let (loader, gate, _) = GatedLoader::new();
    let boot = Bootstrap::new(BootConfig::default());
    let failing = |anchor: &str, _: &AppContext| -> Result<(), MountError> {
        Err(MountError::AnchorNotFound(anchor.to_owned()))
    };

    let err = boot.start(loader, &failing, &pool.spawner()).unwrap_err();
    assert!(matches!(
        err,
        BootError::Mount(MountError::AnchorNotFound(ref anchor)) if anchor == "#app"
    ));

    assert!(gate.send(Ok(counting_entry(Rc::default()))).is_ok());
    pool.run_until_stalled();
    assert!(boot.context().bridge.is_ready());
}

#[test]
fn second_start_is_rejected() {
    let pool = LocalPool::new();
    let boot = Bootstrap::new(BootConfig::default());
    let (first, _gate1, _) = GatedLoader::new();
    let (second, _gate2, _) = GatedLoader::new();

    boot.start(first, &noop_mount, &pool.spawner()).unwrap();
    let err = boot.start(second, &noop_mount, &pool.spawner()).unwrap_err();
    assert!(matches!(
        err,
        BootError::Bridge(BridgeError::InvalidTransition { .. })
    ));
}
