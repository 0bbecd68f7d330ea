//! Module handle shared between the initialisation task and UI callers.
//!
//! The handle is single-threaded (`Rc<RefCell<_>>`): the browser runs one
//! event loop and entry points wrap JS objects that are not `Send`. No borrow
//! is held while an entry point runs, so a re-entrant `run` from inside a
//! guest callback cannot panic on the `RefCell`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::{BridgeError, BridgeResult, EntryPoint, LoadError};

/// Lifecycle of the guest module.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    /// Nothing requested yet.
    #[default]
    Uninitialized,
    /// Fetch/instantiate in flight.
    Loading,
    /// Entry point installed; calls are forwarded.
    Ready,
    /// Loading failed; the failure is kept on the handle.
    Failed,
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModuleStatus::Uninitialized => "uninitialized",
            ModuleStatus::Loading => "loading",
            ModuleStatus::Ready => "ready",
            ModuleStatus::Failed => "failed",
        })
    }
}

type Waiter = oneshot::Sender<Result<(), LoadError>>;

#[derive(Default)]
struct Slot {
    status: ModuleStatus,
    entry: Option<Rc<dyn EntryPoint>>,
    failure: Option<LoadError>,
    waiters: Vec<Waiter>,
    calls: u64,
}

/// Cheap-to-clone handle to the guest module.
#[derive(Clone, Default)]
pub struct Bridge {
    slot: Rc<RefCell<Slot>>,
}

impl Bridge {
    /// Creates an uninitialised handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle status.
    pub fn status(&self) -> ModuleStatus {
        self.slot.borrow().status
    }

    /// Whether calls are currently forwarded.
    pub fn is_ready(&self) -> bool {
        self.status() == ModuleStatus::Ready
    }

    /// The captured load failure, if loading failed.
    pub fn failure(&self) -> Option<LoadError> {
        self.slot.borrow().failure.clone()
    }

    /// Number of calls forwarded to the entry point so far.
    pub fn calls(&self) -> u64 {
        self.slot.borrow().calls
    }

    /// Marks the module as loading. Only valid once, from `Uninitialized`.
    pub fn begin_loading(&self) -> BridgeResult<()> {
        let mut slot = self.slot.borrow_mut();
        expect_status(&slot, ModuleStatus::Uninitialized, ModuleStatus::Loading)?;
        slot.status = ModuleStatus::Loading;
        Ok(())
    }

    /// Installs the entry point and wakes every ready waiter.
    pub fn install(&self, entry: Rc<dyn EntryPoint>) -> BridgeResult<()> {
        let waiters = {
            let mut slot = self.slot.borrow_mut();
            expect_status(&slot, ModuleStatus::Loading, ModuleStatus::Ready)?;
            slot.status = ModuleStatus::Ready;
            slot.entry = Some(entry);
            std::mem::take(&mut slot.waiters)
        };
        notify(waiters, Ok(()));
        Ok(())
    }

    /// Records a load failure and hands it to every ready waiter.
    pub fn fail(&self, err: LoadError) -> BridgeResult<()> {
        let waiters = {
            let mut slot = self.slot.borrow_mut();
            expect_status(&slot, ModuleStatus::Loading, ModuleStatus::Failed)?;
            slot.status = ModuleStatus::Failed;
            slot.failure = Some(err.clone());
            std::mem::take(&mut slot.waiters)
        };
        notify(waiters, Err(err));
        Ok(())
    }

    /// Forwards `program` and `data` to the entry point and returns its result.
    ///
    /// Nothing is validated, cached or queued: a call before the module is
    /// ready fails immediately, and every call after it reaches the guest.
    pub fn run(&self, program: &str, data: &str) -> BridgeResult<String> {
        let entry = {
            let mut slot = self.slot.borrow_mut();
            match slot.status {
                ModuleStatus::Ready => {}
                ModuleStatus::Failed => {
                    let err = slot.failure.clone().unwrap_or(LoadError::Abandoned);
                    return Err(BridgeError::LoadFailed(err));
                }
                status => return Err(BridgeError::NotReady { status }),
            }
            slot.calls += 1;
            match slot.entry.clone() {
                Some(entry) => entry,
                None => {
                    return Err(BridgeError::NotReady {
                        status: slot.status,
                    })
                }
            }
        };

        log::trace!("bridge run: program={program:?} data_len={}", data.len());
        entry.call(program, data).map_err(BridgeError::from)
    }

    /// Resolves once the module is ready, or with the load failure.
    ///
    /// Waiters registered before the bridge is dropped without settling
    /// resolve with [`LoadError::Abandoned`].
    pub fn ready(&self) -> LocalBoxFuture<'static, Result<(), LoadError>> {
        let mut slot = self.slot.borrow_mut();
        match slot.status {
            ModuleStatus::Ready => future::ready(Ok(())).boxed_local(),
            ModuleStatus::Failed => {
                let err = slot.failure.clone().unwrap_or(LoadError::Abandoned);
                future::ready(Err(err)).boxed_local()
            }
            ModuleStatus::Uninitialized | ModuleStatus::Loading => {
                let (tx, rx) = oneshot::channel();
                slot.waiters.push(tx);
                rx.map(|res| res.unwrap_or(Err(LoadError::Abandoned)))
                    .boxed_local()
            }
        }
    }
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("Bridge")
            .field("status", &slot.status)
            .field("failure", &slot.failure)
            .field("waiters", &slot.waiters.len())
            .field("calls", &slot.calls)
            .finish()
    }
}

fn expect_status(slot: &Slot, from: ModuleStatus, to: ModuleStatus) -> BridgeResult<()> {
    if slot.status == from {
        Ok(())
    } else {
        Err(BridgeError::InvalidTransition {
            from: slot.status,
            to,
        })
    }
}

fn notify(waiters: Vec<Waiter>, outcome: Result<(), LoadError>) {
    for waiter in waiters {
        // Receiver gone means the caller stopped waiting.
        let _ = waiter.send(outcome.clone());
    }
}
