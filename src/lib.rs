//! # Trellis
//!
//! Route groups with shared handler chains, and controllers whose methods
//! become routes by naming convention.
//!
//! ## Features
//!
//! - **Route groups**: path prefixes with ordered handler chains, forked into
//!   subgroups that copy or replace the parent's chain
//! - **Late-bound chains**: handlers added to a group also run for the routes
//!   it created earlier
//! - **Controllers**: `#[controller]` registers every public `(&self, Context) -> Result`
//!   method at `/<type>/<method>[/<params>]`
//! - **axum serving**: [`Router::into_axum`] plugs the route table into an
//!   axum server; [`Router::listen`] runs one with graceful shutdown
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trellis::prelude::*;
//!
//! struct User;
//!
//! #[controller]
//! impl User {
//!     pub async fn show(&self, ctx: Context) -> HandlerResult {
//!         let id = ctx.param("id").ok_or_else(|| HttpError::bad_request("missing id"))?;
//!         ctx.write_json(&serde_json::json!({ "id": id }))
//!     }
//!
//!     pub fn show_params(&self) -> &'static str {
//!         ":id"
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     let router = Router::new();
//!     let api = router.group("/api", vec![access_log()]);
//!     api.get("/health", vec![handler(|ctx| async move {
//!         ctx.write("ok");
//!         Ok(())
//!     })]);
//!
//!     // GET /api/v1/user/show/42
//!     let v1 = api.group("/v1", vec![]);
//!     v1.register_controller(Arc::new(User));
//!
//!     router.listen("0.0.0.0:3000").await.unwrap();
//! }
//! ```
//!
//! ## Setup phase
//!
//! Groups, `use_handlers` and controller registration are meant to run
//! before the router starts serving. Nothing stops later changes, but
//! requests already in flight may or may not see them.

pub mod chain;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod group;
pub mod handler;
pub mod logging;
pub mod matcher;
pub mod method;
pub mod naming;
pub mod route;
pub mod router;
pub mod service;

// Re-export core types
pub use chain::HandlerChain;
pub use config::RouterConfig;
pub use context::Context;
pub use controller::{Action, Controller};
pub use error::{HandlerError, HandlerResult, HttpError, Result, RoutingError};
pub use group::RouteGroup;
pub use handler::{BoxedHandler, Handler, handler};
pub use logging::access_log;
pub use method::{METHODS, Method};
pub use route::Route;
pub use router::Router;
pub use service::shutdown_signal;

// Re-export macros
pub use trellis_macro::controller;

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::controller::{Action, Controller};
    pub use crate::error::{HandlerError, HandlerResult, HttpError, RoutingError};
    pub use crate::{
        BoxedHandler, Context, Handler, HandlerChain, METHODS, Method, Route, RouteGroup, Router,
        RouterConfig, access_log, controller, handler,
    };
    pub use async_trait::async_trait;
    pub use axum::http::StatusCode;
}
