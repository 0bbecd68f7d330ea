//! Hash-style client router.
//!
//! Paths are normalised before matching: a leading `#` is dropped, an empty
//! path means `/`, and trailing slashes are ignored except on the root.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::RouteError;

/// A named view reachable at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Stable identifier used by views.
    pub name: String,
    /// Normalised path, always starting with `/`.
    pub path: String,
}

impl Route {
    /// Creates a route; `path` is normalised.
    pub fn new(name: impl Into<String>, path: &str) -> Self {
        Self {
            name: name.into(),
            path: normalize(path),
        }
    }

    /// Link target for anchors (`#/about`).
    pub fn href(&self) -> String {
        format!("#{}", self.path)
    }
}

struct Table {
    routes: Vec<Route>,
    current: usize,
}

/// Route table plus the current position. Clones share state.
#[derive(Clone)]
pub struct Router {
    table: Rc<RefCell<Table>>,
}

impl Router {
    /// Builds a router over `routes`; the first route is the initial one.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteError> {
        if routes.is_empty() {
            return Err(RouteError::Empty);
        }
        for (idx, route) in routes.iter().enumerate() {
            if routes[..idx]
                .iter()
                .any(|r| r.path == route.path || r.name == route.name)
            {
                return Err(RouteError::Duplicate(route.path.clone()));
            }
        }
        Ok(Self {
            table: Rc::new(RefCell::new(Table { routes, current: 0 })),
        })
    }

    /// All routes in declaration order.
    pub fn routes(&self) -> Vec<Route> {
        self.table.borrow().routes.clone()
    }

    /// The route currently shown.
    pub fn current(&self) -> Route {
        let table = self.table.borrow();
        table.routes[table.current].clone()
    }

    /// Looks up `path` (or a `#/...` fragment) without navigating.
    pub fn resolve(&self, path: &str) -> Result<Route, RouteError> {
        let table = self.table.borrow();
        let idx = position(&table.routes, path)?;
        Ok(table.routes[idx].clone())
    }

    /// Moves to `path`; the current route is unchanged on error.
    pub fn navigate(&self, path: &str) -> Result<Route, RouteError> {
        let mut table = self.table.borrow_mut();
        let idx = position(&table.routes, path)?;
        table.current = idx;
        log::debug!("navigated to {}", table.routes[idx].path);
        Ok(table.routes[idx].clone())
    }

    /// Route registered under `name`.
    pub fn by_name(&self, name: &str) -> Option<Route> {
        self.table
            .borrow()
            .routes
            .iter()
            .find(|r| r.name == name)
            .cloned()
    }
}

impl Default for Router {
    /// `home` at `/` and `about` at `/about`.
    fn default() -> Self {
        Self {
            table: Rc::new(RefCell::new(Table {
                routes: vec![Route::new("home", "/"), Route::new("about", "/about")],
                current: 0,
            })),
        }
    }
}

fn position(routes: &[Route], path: &str) -> Result<usize, RouteError> {
    let wanted = normalize(path);
    routes
        .iter()
        .position(|r| r.path == wanted)
        .ok_or(RouteError::NotFound(wanted))
}

fn normalize(path: &str) -> String {
    let path = path.trim();
    let path = path.strip_prefix('#').unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_owned();
    }
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}
