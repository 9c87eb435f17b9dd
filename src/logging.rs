use crate::context::Context;
use crate::error::{HandlerResult, HttpError};
use crate::handler::{BoxedHandler, Handler};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// A handler that logs method, path, status and timing of each request
///
/// Put it first in a group's chain; it runs the rest of the chain through
/// [`Context::next`] and logs once that returns.
#[derive(Clone, Default)]
pub struct AccessLog;

#[async_trait]
impl Handler for AccessLog {
    async fn handle(&self, ctx: Context) -> HandlerResult {
        let start = Instant::now();
        tracing::debug!(method = %ctx.method(), path = ctx.path(), "--> request");

        let result = ctx.next().await;
        let elapsed = start.elapsed();
        match &result {
            Ok(()) => tracing::info!(
                method = %ctx.method(),
                path = ctx.path(),
                status = ctx.status().as_u16(),
                ?elapsed,
                "<-- request"
            ),
            Err(err) => tracing::warn!(
                method = %ctx.method(),
                path = ctx.path(),
                status = HttpError::status_of(err).as_u16(),
                error = %err,
                ?elapsed,
                "<-- request failed"
            ),
        }
        result
    }
}

pub fn access_log() -> BoxedHandler {
    Arc::new(AccessLog)
}
