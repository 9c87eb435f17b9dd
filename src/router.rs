//! Route table and request dispatch.
//!
//! # Responsibilities
//! - Store every (path template, method) registration made through groups
//! - Resolve a request to a route and run its handler chain
//! - Answer unmatched requests with 404 / 405
//!
//! # Matching
//! Among the templates matching a path, the one with the most literal
//! segments wins; ties go to the earliest registration.

use crate::chain::HandlerChain;
use crate::config::RouterConfig;
use crate::context::Context;
use crate::error::{HandlerResult, HttpError, Result, RoutingError};
use crate::group::RouteGroup;
use crate::handler::BoxedHandler;
use crate::matcher::PathPattern;
use crate::method::Method;
use crate::route::{Route, RouteState};
use axum::http::{HeaderValue, header};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cheaply clonable handle to a route table.
///
/// # Example
/// ```
/// use trellis::{Router, handler};
///
/// let router = Router::new();
/// let api = router.group("/api", vec![]);
/// api.get("/health", vec![handler(|ctx| async move {
///     ctx.write("ok");
///     Ok(())
/// })]);
/// assert_eq!(router.routes(), vec![(trellis::Method::Get, "/api/health".to_string())]);
/// ```
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

struct RouterInner {
    config: RouterConfig,
    table: RwLock<Vec<TableEntry>>,
    named: DashMap<String, Arc<RouteState>>,
    not_found: HandlerChain,
}

/// All registrations sharing one path template
struct TableEntry {
    pattern: PathPattern,
    methods: Vec<(Method, Arc<RouteState>)>,
}

enum Lookup {
    Found(Arc<RouteState>, Vec<(String, String)>),
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                config,
                table: RwLock::new(Vec::new()),
                named: DashMap::new(),
                not_found: HandlerChain::default(),
            }),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    /// Create a root group at `prefix` with its own handler chain.
    pub fn group(&self, prefix: &str, handlers: Vec<BoxedHandler>) -> RouteGroup {
        RouteGroup::new(prefix, self.clone(), handlers)
    }

    /// Handlers run for requests no route matches.
    pub fn not_found(&self, handlers: Vec<BoxedHandler>) {
        self.inner.not_found.extend(handlers);
    }

    /// Look up a route registered with [`Route::name`].
    pub fn route(&self, name: &str) -> Option<Route> {
        let state = self.inner.named.get(name)?.value().clone();
        Some(Route::from_state(state, self.clone()))
    }

    /// Build the URL of the route named `name`.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String> {
        self.route(name)
            .ok_or_else(|| RoutingError::UnknownRoute {
                name: name.to_string(),
            })?
            .url(params)
    }

    /// Every registered `(method, path template)` pair, in registration order.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.inner
            .table
            .read()
            .iter()
            .flat_map(|entry| {
                entry
                    .methods
                    .iter()
                    .map(|(method, _)| (*method, entry.pattern.template().to_string()))
            })
            .collect()
    }

    pub(crate) fn register(&self, method: Method, state: Arc<RouteState>) {
        let template = state.pattern.template().to_string();
        let mut table = self.inner.table.write();

        let entry = match table.iter_mut().position(|e| e.pattern.template() == template) {
            Some(index) => &mut table[index],
            None => {
                table.push(TableEntry {
                    pattern: state.pattern.clone(),
                    methods: Vec::new(),
                });
                let last = table.len() - 1;
                &mut table[last]
            }
        };

        match entry.methods.iter_mut().find(|(m, _)| *m == method) {
            Some(slot) => {
                if !Arc::ptr_eq(&slot.1, &state) {
                    tracing::warn!(%method, path = %template, "Replacing existing route registration");
                    slot.1.release(method);
                }
                slot.1 = state;
            }
            None => entry.methods.push((method, state)),
        }
        tracing::debug!(%method, path = %template, "Route registered");
    }

    pub(crate) fn name_route(&self, name: String, state: Arc<RouteState>) {
        if self.inner.named.insert(name.clone(), state).is_some() {
            tracing::warn!(name = %name, "Route name reused");
        }
    }

    fn lookup(&self, method: Method, path: &str) -> Lookup {
        let table = self.inner.table.read();
        let mut best: Option<(usize, Arc<RouteState>, Vec<(String, String)>)> = None;
        let mut allowed = Vec::new();

        for entry in table.iter() {
            let Some(params) = entry.pattern.matches(path) else {
                continue;
            };
            match entry.methods.iter().find(|(m, _)| *m == method) {
                Some((_, state)) => {
                    let specificity = entry.pattern.specificity();
                    if best.as_ref().is_none_or(|(s, _, _)| specificity > *s) {
                        best = Some((specificity, Arc::clone(state), params));
                    }
                }
                None => allowed.extend(entry.methods.iter().map(|(m, _)| *m)),
            }
        }

        match best {
            Some((_, state, params)) => Lookup::Found(state, params),
            None if !allowed.is_empty() => {
                allowed.sort();
                allowed.dedup();
                Lookup::MethodNotAllowed(allowed)
            }
            None => Lookup::NotFound,
        }
    }

    /// Match `ctx` against the table and run the resulting handler chain.
    ///
    /// Handler errors come back unchanged. An unmatched path yields
    /// [`HttpError::not_found`] unless not-found handlers are set; a path
    /// registered only for other methods yields
    /// [`HttpError::method_not_allowed`] and an `Allow` response header.
    pub async fn dispatch(&self, ctx: &Context) -> HandlerResult {
        let path = self.normalize(ctx.path());
        tracing::trace!(method = %ctx.method(), path, "Dispatching request");

        match self.lookup(ctx.method(), path) {
            Lookup::Found(state, params) => {
                ctx.set_params(params);
                ctx.set_handlers(state.resolve(ctx.method()));
                ctx.next().await
            }
            Lookup::MethodNotAllowed(allowed) => {
                let allow = allowed
                    .iter()
                    .map(|m| m.as_ref())
                    .collect::<Vec<_>>()
                    .join(", ");
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    ctx.set_header(header::ALLOW, value);
                }
                Err(HttpError::method_not_allowed().into())
            }
            Lookup::NotFound if !self.inner.not_found.is_empty() => {
                ctx.set_handlers(self.inner.not_found.handlers());
                ctx.next().await
            }
            Lookup::NotFound => Err(HttpError::not_found().into()),
        }
    }

    fn normalize<'a>(&self, path: &'a str) -> &'a str {
        if self.inner.config.ignore_trailing_slash && path.len() > 1 {
            let trimmed = path.trim_end_matches('/');
            if trimmed.is_empty() { "/" } else { trimmed }
        } else {
            path
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.inner.table.read().len())
            .field("config", &self.inner.config)
            .finish()
    }
}
