//! Serving a [`Router`] through axum.
//!
//! ```rust,no_run
//! use trellis::{Router, handler};
//!
//! # async fn run() {
//! let router = Router::new();
//! router.group("", vec![]).get("/", vec![handler(|ctx| async move {
//!     ctx.write("hello");
//!     Ok(())
//! })]);
//!
//! // Runs until Ctrl+C or SIGTERM
//! router.listen("0.0.0.0:3000").await.unwrap();
//! # }
//! ```

use crate::context::{Context, ResponseState};
use crate::error::HttpError;
use crate::method::Method;
use crate::router::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::future::Future;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::signal;

impl Router {
    /// An axum router that sends every request through this router.
    pub fn into_axum(self) -> axum::Router {
        axum::Router::new().fallback(move |request: Request| async move { self.serve(request).await })
    }

    /// Bind `addr` and serve until [`shutdown_signal`] fires.
    pub async fn listen(self, addr: impl ToSocketAddrs) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serve connections from `listener` until `shutdown` completes, then let
    /// in-flight requests finish.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(addr = ?listener.local_addr().ok(), "Router listening");
        axum::serve(listener, self.into_axum())
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("Router stopped");
        Ok(())
    }

    /// Dispatch one HTTP request and build the response.
    ///
    /// A handler error becomes a response with the error's status (500 for
    /// errors other than [`HttpError`]); headers already set on the context,
    /// such as `Allow`, are kept.
    pub async fn serve(&self, request: Request) -> Response {
        let (parts, body) = request.into_parts();

        let Ok(method) = Method::try_from(&parts.method) else {
            return HttpError::new(StatusCode::NOT_IMPLEMENTED, "Unsupported method").into_response();
        };
        let body = match axum::body::to_bytes(body, self.config().body_limit).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "Request body rejected");
                return HttpError::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
            }
        };

        let ctx = Context::from_parts(method, parts.uri.path(), parts.headers, body);
        let result = self.dispatch(&ctx).await;
        let mut state = ctx.take_response();

        if let Err(err) = result {
            state.status = HttpError::status_of(&err);
            if state.status.is_server_error() {
                tracing::error!(%method, path = ctx.path(), error = %err, "Handler failed");
            }
            if state.body.is_empty() {
                let message = match err.downcast_ref::<HttpError>() {
                    Some(http) => http.message.clone(),
                    None => state
                        .status
                        .canonical_reason()
                        .unwrap_or("Internal Server Error")
                        .to_string(),
                };
                state.body = message.into_bytes();
            }
        }

        to_response(state)
    }
}

/// Completes on Ctrl+C, or SIGTERM on unix.
///
/// A signal that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        _ = terminate => tracing::info!("Received SIGTERM signal"),
    }
}

fn to_response(state: ResponseState) -> Response {
    let mut response = Response::new(Body::from(state.body));
    *response.status_mut() = state.status;
    *response.headers_mut() = state.headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::handler::handler;
    use axum::http::header;
    use tower::ServiceExt;
    use tower_http::trace::TraceLayer;

    async fn send(app: axum::Router, method: &str, uri: &str, body: &'static str) -> (StatusCode, String, Response) {
        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        (
            status,
            String::from_utf8(bytes.to_vec()).unwrap(),
            Response::from_parts(parts, Body::empty()),
        )
    }

    fn app() -> Router {
        let router = Router::new();
        let api = router.group("/api", vec![]);
        api.post("/echo/:name", vec![handler(|ctx| async move {
            ctx.set_status(StatusCode::CREATED);
            ctx.write(format!("{}:", ctx.param("name").unwrap_or_default()));
            ctx.write(ctx.body().clone());
            Ok(())
        })]);
        api.get("/boom", vec![handler(|_| async { Err("db down".into()) })]);
        router
    }

    #[tokio::test]
    async fn test_serves_through_axum() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let service = app().into_axum().layer(TraceLayer::new_for_http());

        let (status, body, _) = send(service, "POST", "/api/echo/bob?x=1", "hi").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, "bob:hi");
    }

    #[tokio::test]
    async fn test_errors_map_to_status() {
        let (status, body, _) = send(app().into_axum(), "GET", "/api/boom", "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal Server Error");

        let (status, body, _) = send(app().into_axum(), "GET", "/nowhere", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not Found");

        let (status, _, response) = send(app().into_axum(), "PUT", "/api/boom", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET");
    }

    #[tokio::test]
    async fn test_serve_with_shutdown() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let router = Router::new();
        router.group("", vec![]).get("/ping", vec![handler(|ctx| async move {
            ctx.write("pong");
            Ok(())
        })]);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(router.serve_with_shutdown(listener, async {
            let _ = stopped.await;
        }));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /ping HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        assert!(raw.starts_with("HTTP/1.1 200 OK"), "{raw}");
        assert!(raw.ends_with("pong"), "{raw}");

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_body_limit() {
        let router = Router::with_config(RouterConfig::default().body_limit(4));
        router.group("", vec![]).post("/upload", vec![]);

        let (status, _, _) = send(router.into_axum(), "POST", "/upload", "too large").await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
