use crate::context::Context;
use crate::error::HandlerResult;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// A unit of request processing.
///
/// Handlers run in chain order for every dispatched request. Returning an
/// error stops the chain and hands the error to the caller of
/// [`Router::dispatch`](crate::Router::dispatch) unchanged.
///
/// # Example
/// ```
/// use trellis::{async_trait, Context, Handler, HandlerResult};
///
/// struct Hello;
///
/// #[async_trait]
/// impl Handler for Hello {
///     async fn handle(&self, ctx: Context) -> HandlerResult {
///         ctx.write("hello");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, ctx: Context) -> HandlerResult;
}

/// Shared, type-erased handler as stored in chains and routes
pub type BoxedHandler = Arc<dyn Handler>;

/// Adapts an async closure into a [`Handler`]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(&self, ctx: Context) -> HandlerResult {
        (self.f)(ctx).await
    }
}

/// Box an async closure as a handler.
///
/// ```
/// use trellis::handler;
///
/// let h = handler(|ctx| async move {
///     ctx.write("pong");
///     Ok(())
/// });
/// ```
pub fn handler<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(HandlerFn { f })
}
