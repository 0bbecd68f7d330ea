//! Text the views render, derived from [`AppState`].

use app::{AppState, RunRecord};
use bridge::ModuleStatus;

/// Module status line shown on every view.
pub fn status_line(state: &AppState) -> String {
    match state.module {
        ModuleStatus::Uninitialized => "module not requested".to_owned(),
        ModuleStatus::Loading => "loading module…".to_owned(),
        ModuleStatus::Ready => "module ready".to_owned(),
        ModuleStatus::Failed => match &state.load_error {
            Some(err) => format!("module failed: {err}"),
            None => "module failed".to_owned(),
        },
    }
}

/// Output area text for the last run.
pub fn result_line(state: &AppState) -> String {
    state
        .last_run
        .as_ref()
        .map(record_line)
        .unwrap_or_default()
}

/// Newest-first history entries.
pub fn history_lines(state: &AppState) -> Vec<String> {
    state
        .history
        .iter()
        .rev()
        .map(|run| format!("{}({:?}) → {}", run.program, run.data, record_line(run)))
        .collect()
}

fn record_line(run: &RunRecord) -> String {
    match &run.result {
        Ok(output) => output.clone(),
        Err(err) => format!("error: {err}"),
    }
}

/// Which view is visible for the current route.
pub fn shows_home(state: &AppState) -> bool {
    state.route == "/"
}
