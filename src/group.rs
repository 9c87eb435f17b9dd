//! Route groups.
//!
//! A [`RouteGroup`] prepends its prefix to every route it creates and runs
//! its handler chain in front of the route's own handlers.
//!
//! # Handler inheritance
//!
//! ```text
//! api.use_handlers(h1)
//! v1 = api.group("/v1", [])     v1 chain: [h1]   (copy taken now)
//! v1.use_handlers(h2)           v1 chain: [h1, h2]
//! api.use_handlers(h3)          api chain: [h1, h3], v1 unchanged
//! v2 = api.group("/v2", [h4])   v2 chain: [h4]   (nothing inherited)
//! ```
//!
//! Routes keep reading the chain of the group that created them, so handlers
//! added to that group later still apply to them.

use crate::chain::HandlerChain;
use crate::error::Result;
use crate::handler::BoxedHandler;
use crate::method::METHODS;
use crate::route::Route;
use crate::router::Router;

/// A path prefix plus a handler chain shared by the routes created through it.
///
/// Clones refer to the same group: a handler added through one clone is seen
/// by routes created through any of them. Use [`RouteGroup::group`] to get a
/// group with a chain of its own.
#[derive(Clone, Debug)]
pub struct RouteGroup {
    prefix: String,
    router: Router,
    handlers: HandlerChain,
}

macro_rules! method_routes {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(&self, path: &str, handlers: Vec<BoxedHandler>) -> Route {
                Route::new(path, self).$name(handlers)
            }
        )*
    };
}

impl RouteGroup {
    pub(crate) fn new(prefix: impl Into<String>, router: Router, handlers: Vec<BoxedHandler>) -> Self {
        Self {
            prefix: prefix.into(),
            router,
            handlers: HandlerChain::new(handlers),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The group's live handler chain.
    pub fn chain(&self) -> &HandlerChain {
        &self.handlers
    }

    /// The group's handlers as they are now.
    pub fn handlers(&self) -> Vec<BoxedHandler> {
        self.handlers.handlers()
    }

    method_routes! {
        /// Add a GET route at `prefix + path`.
        ///
        /// ```
        /// use trellis::{Router, handler};
        ///
        /// let router = Router::new();
        /// let api = router.group("/api", vec![]);
        /// let route = api.get("/users", vec![handler(|ctx| async move {
        ///     ctx.write("[]");
        ///     Ok(())
        /// })]);
        /// assert_eq!(route.path(), "/api/users");
        /// ```
        get,
        /// Add a POST route at `prefix + path`.
        post,
        /// Add a PUT route at `prefix + path`.
        put,
        /// Add a PATCH route at `prefix + path`.
        patch,
        /// Add a DELETE route at `prefix + path`.
        delete,
        /// Add a CONNECT route at `prefix + path`.
        connect,
        /// Add a HEAD route at `prefix + path`.
        head,
        /// Add an OPTIONS route at `prefix + path`.
        options,
        /// Add a TRACE route at `prefix + path`.
        trace,
    }

    /// Add one route answering every method in [`METHODS`].
    pub fn any(&self, path: &str, handlers: Vec<BoxedHandler>) -> Route {
        let route = Route::new(path, self);
        for method in METHODS {
            route.add_method(method, handlers.clone());
        }
        route
    }

    /// Add a route for a comma-separated method list, e.g. `"GET,POST"`.
    ///
    /// Names are not trimmed. An unknown or empty name fails the whole call
    /// and registers nothing.
    pub fn to(&self, methods: &str, path: &str, handlers: Vec<BoxedHandler>) -> Result<Route> {
        let route = Route::new(path, self);
        route.add_list(methods, handlers)?;
        Ok(route)
    }

    /// Create a subgroup at `prefix + suffix`.
    ///
    /// With an empty `handlers` the subgroup starts from a copy of this
    /// group's chain; otherwise it starts from `handlers` alone. Either way
    /// the two chains are independent afterwards.
    pub fn group(&self, suffix: &str, handlers: Vec<BoxedHandler>) -> RouteGroup {
        let inherited = handlers.is_empty();
        let handlers = if inherited {
            self.handlers.snapshot()
        } else {
            HandlerChain::new(handlers)
        };
        let prefix = format!("{}{}", self.prefix, suffix);
        tracing::debug!(prefix = %prefix, inherited, handlers = handlers.len(), "Route group created");
        RouteGroup {
            prefix,
            router: self.router.clone(),
            handlers,
        }
    }

    /// Append handlers to this group's chain.
    ///
    /// They run for every route created through this group, including routes
    /// created before this call. Subgroups already forked are not affected.
    pub fn use_handlers(&self, handlers: Vec<BoxedHandler>) {
        self.handlers.extend(handlers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::handler::handler;
    use crate::method::Method;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recorder(log: &Log, label: &'static str) -> BoxedHandler {
        let log = log.clone();
        handler(move |_| {
            let log = log.clone();
            async move {
                log.lock().push(label);
                Ok(())
            }
        })
    }

    async fn run(router: &Router, method: Method, path: &str) -> Context {
        let ctx = Context::new(method, path);
        router.dispatch(&ctx).await.unwrap();
        ctx
    }

    #[test]
    fn test_subgroup_prefix_concatenates() {
        let router = Router::new();
        let api = router.group("/api", vec![]);
        let v1 = api.group("/v1", vec![]);
        assert_eq!(v1.prefix(), "/api/v1");
        assert_eq!(v1.get("/x", vec![]).path(), "/api/v1/x");
        assert_eq!(api.group("v2", vec![]).prefix(), "/apiv2");
    }

    #[tokio::test]
    async fn test_fork_without_handlers_copies_chain() {
        let log: Log = Arc::default();
        let router = Router::new();
        let api = router.group("/api", vec![]);

        api.use_handlers(vec![recorder(&log, "h1")]);
        let v1 = api.group("/v1", vec![]);
        v1.use_handlers(vec![recorder(&log, "h2")]);
        api.use_handlers(vec![recorder(&log, "h3")]);

        assert_eq!(v1.handlers().len(), 2);
        assert_eq!(api.handlers().len(), 2);
        assert!(!v1.chain().is_shared_with(api.chain()));

        v1.get("/x", vec![recorder(&log, "route")]);
        api.get("/x", vec![recorder(&log, "route")]);

        run(&router, Method::Get, "/api/v1/x").await;
        assert_eq!(*log.lock(), vec!["h1", "h2", "route"]);

        log.lock().clear();
        run(&router, Method::Get, "/api/x").await;
        assert_eq!(*log.lock(), vec!["h1", "h3", "route"]);
    }

    #[tokio::test]
    async fn test_fork_with_handlers_discards_inheritance() {
        let log: Log = Arc::default();
        let router = Router::new();
        let api = router.group("/api", vec![recorder(&log, "h1")]);
        let v1 = api.group("/v1", vec![recorder(&log, "h2")]);
        api.use_handlers(vec![recorder(&log, "h3")]);

        v1.get("/x", vec![]);
        run(&router, Method::Get, "/api/v1/x").await;
        assert_eq!(*log.lock(), vec!["h2"]);
    }

    #[tokio::test]
    async fn test_routes_see_later_use_on_their_group() {
        let log: Log = Arc::default();
        let router = Router::new();
        let api = router.group("/api", vec![]);
        api.post("/items", vec![recorder(&log, "create")]);
        api.use_handlers(vec![recorder(&log, "auth")]);

        run(&router, Method::Post, "/api/items").await;
        assert_eq!(*log.lock(), vec!["auth", "create"]);
    }

    #[test]
    fn test_any_registers_every_method_once() {
        let router = Router::new();
        let route = router.group("", vec![]).any("/x", vec![]);
        assert_eq!(route.methods(), METHODS.to_vec());

        let registered: Vec<Method> = router
            .routes()
            .into_iter()
            .filter(|(_, path)| path == "/x")
            .map(|(method, _)| method)
            .collect();
        assert_eq!(registered, METHODS.to_vec());
    }

    #[tokio::test]
    async fn test_to_registers_listed_methods_only() {
        let router = Router::new();
        let group = router.group("", vec![]);
        let route = group.to("GET,POST", "/x", vec![]).unwrap();
        assert_eq!(route.methods(), vec![Method::Get, Method::Post]);

        run(&router, Method::Post, "/x").await;
        let err = router
            .dispatch(&Context::new(Method::Put, "/x"))
            .await
            .unwrap_err();
        assert_eq!(
            crate::error::HttpError::status_of(&err),
            axum::http::StatusCode::METHOD_NOT_ALLOWED
        );

        assert!(group.to("GET,BREW", "/y", vec![]).is_err());
        assert!(router.routes().iter().all(|(_, path)| path != "/y"));
    }

    #[test]
    fn test_each_method_helper_registers_one_method() {
        let router = Router::new();
        let group = router.group("", vec![]);
        let routes = [
            (group.get("/m", vec![]), Method::Get),
            (group.post("/m", vec![]), Method::Post),
            (group.put("/m", vec![]), Method::Put),
            (group.patch("/m", vec![]), Method::Patch),
            (group.delete("/m", vec![]), Method::Delete),
            (group.connect("/m", vec![]), Method::Connect),
            (group.head("/m", vec![]), Method::Head),
            (group.options("/m", vec![]), Method::Options),
            (group.trace("/m", vec![]), Method::Trace),
        ];
        for (route, method) in routes {
            assert_eq!(route.methods(), vec![method]);
        }
        assert_eq!(router.routes().len(), METHODS.len());
    }
}
