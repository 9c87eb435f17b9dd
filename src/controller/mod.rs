//! Convention-based controllers.
//!
//! A controller is any type whose request methods are listed in a
//! [`Controller::actions`] table. [`RouteGroup::register_controller`] turns
//! every action into a route answering all methods at
//!
//! ```text
//! /<controller_name in snake_case>/<action name in snake_case>[/<params segment>]
//! ```
//!
//! The table is normally generated by `#[controller]` on an `impl` block,
//! which lists every public method shaped like `fn name(&self, ctx: Context) -> Result<..>`
//! (sync or async) and skips everything else. A public sibling
//! `fn <name>_params(&self) -> &str` supplies the optional third segment.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use trellis::{controller, Context, HandlerResult, Router};
//!
//! struct User;
//!
//! #[controller]
//! impl User {
//!     pub async fn show(&self, ctx: Context) -> HandlerResult {
//!         ctx.write(format!("user {}", ctx.param("id").unwrap_or_default()));
//!         Ok(())
//!     }
//!
//!     pub fn show_params(&self) -> &'static str {
//!         ":id"
//!     }
//!
//!     pub fn helper(&self, x: i32) -> String {
//!         x.to_string()
//!     }
//! }
//!
//! let router = Router::new();
//! let routes = router.group("", vec![]).register_controller(Arc::new(User));
//! assert_eq!(routes[0].path(), "/user/show/:id");
//! ```

use crate::context::Context;
use crate::error::HandlerResult;
use crate::group::RouteGroup;
use crate::handler::Handler;
use crate::naming::{short_type_name, to_snake_case};
use crate::route::Route;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Calls one controller method with the request context.
pub type ActionFn<C> = fn(Arc<C>, Context) -> BoxFuture<'static, HandlerResult>;

/// Produces the extra path segment of an action.
pub type ParamsFn<C> = fn(&C) -> String;

/// Where an action's optional third path segment comes from
pub enum ParamsSegment<C> {
    /// No `<name>_params` sibling
    Absent,
    /// A `<name>_params` sibling returning one string
    Supplied(ParamsFn<C>),
    /// A `<name>_params` sibling of another shape; contributes nothing
    Mismatched,
}

/// One route-eligible controller method.
pub struct Action<C> {
    name: &'static str,
    invoke: ActionFn<C>,
    params: ParamsSegment<C>,
}

impl<C> Action<C> {
    pub fn new(name: &'static str, invoke: ActionFn<C>) -> Self {
        Self {
            name,
            invoke,
            params: ParamsSegment::Absent,
        }
    }

    pub fn with_params(mut self, params: ParamsFn<C>) -> Self {
        self.params = ParamsSegment::Supplied(params);
        self
    }

    /// Record a `<name>_params` sibling that does not return a single string.
    pub fn with_mismatched_params(mut self) -> Self {
        self.params = ParamsSegment::Mismatched;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &ParamsSegment<C> {
        &self.params
    }

    /// Route path for this action under `base`, the snake-cased controller name.
    pub fn path(&self, base: &str, controller: &C) -> String {
        let mut path = format!("/{}/{}", base, to_snake_case(self.name));
        match &self.params {
            ParamsSegment::Supplied(segment) => {
                path.push('/');
                path.push_str(&segment(controller));
            }
            ParamsSegment::Mismatched => {
                tracing::warn!(
                    action = self.name,
                    "{}_params does not return a single string; no segment appended",
                    self.name
                );
            }
            ParamsSegment::Absent => {}
        }
        path
    }
}

/// A type whose methods can be registered as routes.
///
/// Implemented by `#[controller]`; a manual implementation only needs to
/// list its actions.
pub trait Controller: Send + Sync + Sized + 'static {
    /// Name used for the first path segment, before snake-casing.
    fn controller_name() -> &'static str {
        short_type_name::<Self>()
    }

    fn actions() -> Vec<Action<Self>>;
}

/// Handler bound to one action of one controller instance
pub struct ControllerAction<C> {
    controller: Arc<C>,
    name: &'static str,
    invoke: ActionFn<C>,
}

impl<C> ControllerAction<C> {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[async_trait]
impl<C: Controller> Handler for ControllerAction<C> {
    async fn handle(&self, ctx: Context) -> HandlerResult {
        (self.invoke)(Arc::clone(&self.controller), ctx).await
    }
}

impl RouteGroup {
    /// Register every action of `controller` as a route answering all methods.
    ///
    /// Returns the created routes in action order.
    pub fn register_controller<C: Controller>(&self, controller: Arc<C>) -> Vec<Route> {
        let base = to_snake_case(C::controller_name());

        C::actions()
            .into_iter()
            .map(|action| {
                let path = action.path(&base, &controller);
                tracing::debug!(
                    controller = C::controller_name(),
                    action = action.name,
                    path = %format!("{}{}", self.prefix(), path),
                    "Controller action registered"
                );
                let handler = ControllerAction {
                    controller: Arc::clone(&controller),
                    name: action.name,
                    invoke: action.invoke,
                };
                self.any(&path, vec![Arc::new(handler)])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HandlerError, HttpError};
    use crate::method::{METHODS, Method};
    use crate::router::Router;
    use axum::http::StatusCode;

    struct UserAccount {
        greeting: String,
    }

    impl UserAccount {
        async fn show(&self, ctx: Context) -> HandlerResult {
            ctx.write(format!("{} show", self.greeting));
            Ok(())
        }

        async fn list(&self, ctx: Context) -> HandlerResult {
            ctx.write(format!("{} list", self.greeting));
            Ok(())
        }

        fn fail(&self, _ctx: Context) -> Result<(), HttpError> {
            Err(HttpError::new(StatusCode::CONFLICT, "taken"))
        }
    }

    impl Controller for UserAccount {
        fn actions() -> Vec<Action<Self>> {
            vec![
                Action::new("show", |c: Arc<UserAccount>, ctx| Box::pin(async move { c.show(ctx).await }))
                    .with_params(|_| ":id".to_string()),
                Action::new("list", |c: Arc<UserAccount>, ctx| Box::pin(async move { c.list(ctx).await })),
                Action::new("fail", |c: Arc<UserAccount>, ctx| {
                    Box::pin(async move { c.fail(ctx).map_err(HandlerError::from) })
                })
                .with_mismatched_params(),
            ]
        }
    }

    fn controller() -> Arc<UserAccount> {
        Arc::new(UserAccount {
            greeting: "hi".into(),
        })
    }

    #[test]
    fn test_paths_follow_naming_convention() {
        let router = Router::new();
        let routes = router
            .group("/api", vec![])
            .register_controller(controller());

        let paths: Vec<&str> = routes.iter().map(|r| r.path()).collect();
        assert_eq!(
            paths,
            vec!["/api/user_account/show/:id", "/api/user_account/list", "/api/user_account/fail"]
        );
        for route in &routes {
            assert_eq!(route.methods(), METHODS.to_vec());
        }
    }

    #[tokio::test]
    async fn test_each_route_calls_its_own_action() {
        let router = Router::new();
        router.group("", vec![]).register_controller(controller());

        let ctx = Context::new(Method::Get, "/user_account/list");
        router.dispatch(&ctx).await.unwrap();
        assert_eq!(ctx.response_body(), b"hi list".to_vec());

        let ctx = Context::new(Method::Post, "/user_account/show/5");
        router.dispatch(&ctx).await.unwrap();
        assert_eq!(ctx.response_body(), b"hi show".to_vec());
        assert_eq!(ctx.param("id").as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_action_error_reaches_dispatch() {
        let router = Router::new();
        router.group("", vec![]).register_controller(controller());

        let err = router
            .dispatch(&Context::new(Method::Delete, "/user_account/fail"))
            .await
            .unwrap_err();
        assert_eq!(HttpError::status_of(&err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_controller_name_override() {
        struct Impl;
        impl Controller for Impl {
            fn controller_name() -> &'static str {
                "AdminPanel"
            }
            fn actions() -> Vec<Action<Self>> {
                vec![Action::new("Dashboard", |_, _| {
                    Box::pin(async { HandlerResult::Ok(()) })
                })]
            }
        }

        let router = Router::new();
        let routes = router.group("", vec![]).register_controller(Arc::new(Impl));
        assert_eq!(routes[0].path(), "/admin_panel/dashboard");
    }
}
