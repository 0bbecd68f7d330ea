//! Global UI state and its reducer.
//!
//! [`AppState::reduce`] is pure; [`Store`] wraps it with shared ownership and
//! change notification. Subscribers run after the state borrow is released,
//! so they may dispatch again.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use bridge::ModuleStatus;
use serde::Serialize;

/// Runs kept in [`AppState::history`]; oldest entries are evicted first.
pub const HISTORY_LIMIT: usize = 32;

/// One bridge call as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    /// Program name as passed to the bridge.
    pub program: String,
    /// Input as passed to the bridge.
    pub data: String,
    /// Guest output, or the bridge error rendered as text.
    pub result: Result<String, String>,
}

/// State changes the UI and boot sequence can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Module fetch started.
    ModuleLoading,
    /// Entry point installed.
    ModuleReady,
    /// Load failed with the given message.
    ModuleFailed(String),
    /// Router moved to this path.
    Navigated(String),
    /// A bridge call returned `output`.
    RunCompleted {
        /// Program name.
        program: String,
        /// Input data.
        data: String,
        /// Guest result.
        output: String,
    },
    /// A bridge call failed.
    RunFailed {
        /// Program name.
        program: String,
        /// Input data.
        data: String,
        /// Rendered bridge error.
        error: String,
    },
    /// Drops the run history and the last run.
    ClearHistory,
}

/// Everything the views render from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppState {
    /// Mirror of the bridge status.
    pub module: ModuleStatus,
    /// Load failure, once the module has failed.
    pub load_error: Option<String>,
    /// Current route path.
    pub route: String,
    /// Most recent run, kept after history eviction.
    pub last_run: Option<RunRecord>,
    /// Up to [`HISTORY_LIMIT`] runs, oldest first.
    pub history: VecDeque<RunRecord>,
    /// Calls that returned a result.
    pub runs_ok: u64,
    /// Calls the bridge rejected or that failed in the guest.
    pub runs_failed: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            module: ModuleStatus::Uninitialized,
            load_error: None,
            route: "/".to_owned(),
            last_run: None,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            runs_ok: 0,
            runs_failed: 0,
        }
    }
}

impl AppState {
    /// Applies `action` in place.
    pub fn reduce(&mut self, action: Action) {
        match action {
            Action::ModuleLoading => {
                self.module = ModuleStatus::Loading;
                self.load_error = None;
            }
            Action::ModuleReady => {
                self.module = ModuleStatus::Ready;
                self.load_error = None;
            }
            Action::ModuleFailed(msg) => {
                self.module = ModuleStatus::Failed;
                self.load_error = Some(msg);
            }
            Action::Navigated(path) => self.route = path,
            Action::RunCompleted {
                program,
                data,
                output,
            } => {
                self.runs_ok += 1;
                self.record(RunRecord {
                    program,
                    data,
                    result: Ok(output),
                });
            }
            Action::RunFailed {
                program,
                data,
                error,
            } => {
                self.runs_failed += 1;
                self.record(RunRecord {
                    program,
                    data,
                    result: Err(error),
                });
            }
            Action::ClearHistory => {
                self.history.clear();
                self.last_run = None;
            }
        }
    }

    fn record(&mut self, run: RunRecord) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(run.clone());
        self.last_run = Some(run);
    }
}

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&AppState)>;

#[derive(Default)]
struct Inner {
    state: AppState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

/// Shared, observable [`AppState`]. Clones share state.
#[derive(Clone, Default)]
pub struct Store {
    inner: Rc<RefCell<Inner>>,
}

impl Store {
    /// Store over [`AppState::default`] with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.inner.borrow().state.clone()
    }

    /// Reduces `action` and notifies listeners with the new state.
    pub fn dispatch(&self, action: Action) {
        log::debug!("dispatch {action:?}");
        let (state, listeners) = {
            let mut inner = self.inner.borrow_mut();
            inner.state.reduce(action);
            let listeners: Vec<Listener> =
                inner.listeners.iter().map(|(_, l)| l.clone()).collect();
            (inner.state.clone(), listeners)
        };
        for listener in listeners {
            listener(&state);
        }
    }

    /// Registers `listener` for every subsequent dispatch.
    pub fn subscribe(&self, listener: impl Fn(&AppState) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Removes a listener; returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(lid, _)| *lid != id);
        inner.listeners.len() != before
    }

    /// JSON rendering of the current state.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.inner.borrow().state)
    }
}
