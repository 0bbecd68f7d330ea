//! Reducer and subscription behaviour of the UI store.

use std::cell::RefCell;
use std::rc::Rc;

use app::{Action, AppState, Store, HISTORY_LIMIT};
use bridge::ModuleStatus;

fn completed(i: usize) -> Action {
    Action::RunCompleted {
        program: "echo".into(),
        data: format!("#{i}"),
        output: format!("#{i} by gossi"),
    }
}

#[test]
fn module_lifecycle_actions_update_status() {
    let mut state = AppState::default();
    assert_eq!(state.module, ModuleStatus::Uninitialized);

    state.reduce(Action::ModuleLoading);
    assert_eq!(state.module, ModuleStatus::Loading);

    state.reduce(Action::ModuleFailed("compile failed: bad magic".into()));
    assert_eq!(state.module, ModuleStatus::Failed);
    assert_eq!(state.load_error.as_deref(), Some("compile failed: bad magic"));
}

#[test]
fn history_is_bounded_and_drops_oldest() {
    let mut state = AppState::default();
    for i in 0..HISTORY_LIMIT + 5 {
        state.reduce(completed(i));
    }

    assert_eq!(state.history.len(), HISTORY_LIMIT);
    assert_eq!(state.history.front().unwrap().data, "#5");
    assert_eq!(
        state.last_run.as_ref().unwrap().data,
        format!("#{}", HISTORY_LIMIT + 4)
    );
    assert_eq!(state.runs_ok, (HISTORY_LIMIT + 5) as u64);
}

#[test]
fn clear_history_keeps_counters() {
    let mut state = AppState::default();
    state.reduce(completed(0));
    state.reduce(Action::RunFailed {
        program: "echo".into(),
        data: "x".into(),
        error: "boom".into(),
    });
    state.reduce(Action::ClearHistory);

    assert!(state.history.is_empty());
    assert_eq!(state.last_run, None);
    assert_eq!((state.runs_ok, state.runs_failed), (1, 1));
}

#[test]
fn subscribers_see_new_state_and_can_unsubscribe() {
    let store = Store::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = seen.clone();
    let id = store.subscribe(move |state| sink.borrow_mut().push(state.module));

    store.dispatch(Action::ModuleLoading);
    store.dispatch(Action::ModuleReady);
    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.dispatch(Action::ModuleFailed("late".into()));

    assert_eq!(
        seen.borrow().as_slice(),
        &[ModuleStatus::Loading, ModuleStatus::Ready]
    );
}

#[test]
fn listeners_may_dispatch_reentrantly() {
    let store = Store::new();
    let inner = store.clone();
    store.subscribe(move |state| {
        if state.module == ModuleStatus::Ready && state.route != "/about" {
            inner.dispatch(Action::Navigated("/about".into()));
        }
    });

    store.dispatch(Action::ModuleReady);
    assert_eq!(store.snapshot().route, "/about");
}

#[test]
fn json_snapshot_uses_snake_case_status() {
    let store = Store::new();
    store.dispatch(Action::ModuleLoading);
    let json: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
    assert_eq!(json["module"], "loading");
    assert_eq!(json["route"], "/");
    assert_eq!(json["history"], serde_json::json!([]));
}
