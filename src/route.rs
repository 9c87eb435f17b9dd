use crate::chain::HandlerChain;
use crate::error::{Result, RoutingError};
use crate::group::RouteGroup;
use crate::handler::BoxedHandler;
use crate::matcher::PathPattern;
use crate::method::Method;
use crate::router::Router;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// A path registered through a [`RouteGroup`], plus the handlers attached to
/// each of its methods.
///
/// A route keeps a live handle to its group's handler chain and reads it at
/// dispatch time. Handlers added to the group with
/// [`RouteGroup::use_handlers`] after the route was created still run in
/// front of the route's own handlers.
#[derive(Clone)]
pub struct Route {
    state: Arc<RouteState>,
    router: Router,
}

/// Routing data stored in the router's table
pub(crate) struct RouteState {
    pub(crate) pattern: PathPattern,
    group_handlers: HandlerChain,
    handlers: DashMap<Method, Vec<BoxedHandler>>,
    name: RwLock<Option<String>>,
}

impl RouteState {
    /// The effective chain for `method`: the group chain as it is now,
    /// followed by the route's own handlers.
    pub(crate) fn resolve(&self, method: Method) -> Vec<BoxedHandler> {
        let mut chain = self.group_handlers.handlers();
        if let Some(own) = self.handlers.get(&method) {
            chain.extend(own.iter().cloned());
        }
        chain
    }

    /// Forget `method` after another route took over its registration.
    pub(crate) fn release(&self, method: Method) {
        self.handlers.remove(&method);
    }
}

macro_rules! method_routes {
    ($($(#[$doc:meta])* $name:ident => $method:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(self, handlers: Vec<BoxedHandler>) -> Self {
                self.add_method(Method::$method, handlers);
                self
            }
        )*
    };
}

impl Route {
    pub(crate) fn new(path: &str, group: &RouteGroup) -> Self {
        let template = format!("{}{}", group.prefix(), path);
        Self {
            state: Arc::new(RouteState {
                pattern: PathPattern::parse(&template),
                group_handlers: group.chain().clone(),
                handlers: DashMap::new(),
                name: RwLock::new(None),
            }),
            router: group.router().clone(),
        }
    }

    pub(crate) fn from_state(state: Arc<RouteState>, router: Router) -> Self {
        Self { state, router }
    }

    /// Full path template, group prefix included.
    pub fn path(&self) -> &str {
        self.state.pattern.template()
    }

    pub fn route_name(&self) -> Option<String> {
        self.state.name.read().clone()
    }

    /// Methods this route has handlers for.
    ///
    /// A method later registered on the same path by another route is
    /// dropped from this list.
    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.state.handlers.iter().map(|e| *e.key()).collect();
        methods.sort();
        methods
    }

    /// The handlers a request for `method` would run right now.
    pub fn handlers_for(&self, method: Method) -> Vec<BoxedHandler> {
        self.state.resolve(method)
    }

    /// Register `handlers` for the method named `method`.
    pub fn add(&self, method: &str, handlers: Vec<BoxedHandler>) -> Result<()> {
        self.add_method(Method::parse(method)?, handlers);
        Ok(())
    }

    /// Register `handlers` for every method of a comma-separated list.
    ///
    /// The whole list is validated first; nothing is registered when any
    /// entry is invalid.
    pub fn add_list(&self, methods: &str, handlers: Vec<BoxedHandler>) -> Result<()> {
        for method in Method::parse_list(methods)? {
            self.add_method(method, handlers.clone());
        }
        Ok(())
    }

    pub(crate) fn add_method(&self, method: Method, handlers: Vec<BoxedHandler>) {
        self.state.handlers.insert(method, handlers);
        self.router.register(method, Arc::clone(&self.state));
    }

    /// Name the route so it can be found with [`Router::route`].
    pub fn name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        *self.state.name.write() = Some(name.clone());
        self.router.name_route(name, Arc::clone(&self.state));
        self
    }

    /// Build a URL from the route template.
    ///
    /// ```
    /// use trellis::Router;
    ///
    /// let router = Router::new();
    /// let route = router.group("/users", vec![]).get("/:id", vec![]);
    /// assert_eq!(route.url(&[("id", "42")]).unwrap(), "/users/42");
    /// ```
    pub fn url(&self, params: &[(&str, &str)]) -> Result<String> {
        self.state
            .pattern
            .build(params)
            .map_err(|param| RoutingError::MissingParam {
                route: self.path().to_string(),
                param,
            })
    }

    method_routes! {
        /// Register handlers for GET
        get => Get,
        /// Register handlers for POST
        post => Post,
        /// Register handlers for PUT
        put => Put,
        /// Register handlers for PATCH
        patch => Patch,
        /// Register handlers for DELETE
        delete => Delete,
        /// Register handlers for CONNECT
        connect => Connect,
        /// Register handlers for HEAD
        head => Head,
        /// Register handlers for OPTIONS
        options => Options,
        /// Register handlers for TRACE
        trace => Trace,
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path())
            .field("methods", &self.methods())
            .finish()
    }
}
