//! Per-request state shared by every handler of one dispatch.

use crate::error::{HandlerError, HandlerResult};
use crate::handler::BoxedHandler;
use crate::method::Method;
use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;

/// Request context passed to handlers.
///
/// Cloning is cheap and every clone refers to the same request, so a handler
/// can hand the context to [`Context::next`] or to spawned work and still see
/// the writes made by the rest of the chain.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    params: Mutex<Vec<(String, String)>>,
    data: DashMap<String, Arc<dyn Any + Send + Sync>>,
    response: Mutex<ResponseState>,
    pipeline: Mutex<Pipeline>,
}

/// The response being built by the handler chain
#[derive(Debug, Clone)]
pub struct ResponseState {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }
}

#[derive(Default)]
struct Pipeline {
    handlers: Vec<BoxedHandler>,
    index: usize,
    aborted: bool,
}

impl Context {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self::from_parts(method, path, HeaderMap::new(), Bytes::new())
    }

    pub fn from_parts(
        method: Method,
        path: impl Into<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                method,
                path: path.into(),
                headers,
                body,
                params: Mutex::new(Vec::new()),
                data: DashMap::new(),
                response: Mutex::new(ResponseState::default()),
                pipeline: Mutex::new(Pipeline::default()),
            }),
        }
    }

    pub fn method(&self) -> Method {
        self.inner.method
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.inner.body
    }

    /// Value of a path parameter matched by the router.
    pub fn param(&self, name: &str) -> Option<String> {
        self.inner
            .params
            .lock()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn params(&self) -> Vec<(String, String)> {
        self.inner.params.lock().clone()
    }

    pub(crate) fn set_params(&self, params: Vec<(String, String)>) {
        *self.inner.params.lock() = params;
    }

    /// Store a value for later handlers in the chain.
    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.inner.data.insert(key.into(), Arc::new(value));
    }

    /// Fetch a value stored with [`Context::set`]; `None` if absent or of another type.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let value = self.inner.data.get(key)?.value().clone();
        value.downcast::<T>().ok()
    }

    pub fn set_status(&self, status: StatusCode) {
        self.inner.response.lock().status = status;
    }

    pub fn status(&self) -> StatusCode {
        self.inner.response.lock().status
    }

    pub fn set_header(&self, name: HeaderName, value: HeaderValue) {
        self.inner.response.lock().headers.insert(name, value);
    }

    /// Append bytes to the response body.
    pub fn write(&self, data: impl AsRef<[u8]>) {
        self.inner
            .response
            .lock()
            .body
            .extend_from_slice(data.as_ref());
    }

    /// Replace the response body with `value` serialized as JSON.
    pub fn write_json<T: Serialize>(&self, value: &T) -> HandlerResult {
        let body = serde_json::to_vec(value).map_err(HandlerError::from)?;
        let mut response = self.inner.response.lock();
        response.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response.body = body;
        Ok(())
    }

    pub fn response_body(&self) -> Vec<u8> {
        self.inner.response.lock().body.clone()
    }

    pub fn response(&self) -> ResponseState {
        self.inner.response.lock().clone()
    }

    pub(crate) fn take_response(&self) -> ResponseState {
        std::mem::take(&mut *self.inner.response.lock())
    }

    pub(crate) fn set_handlers(&self, handlers: Vec<BoxedHandler>) {
        *self.inner.pipeline.lock() = Pipeline {
            handlers,
            index: 0,
            aborted: false,
        };
    }

    /// Run the handlers that have not run yet.
    ///
    /// A handler calling `next` gets control back once the rest of the chain
    /// has finished, which lets it act both before and after the remaining
    /// handlers. The first error ends the chain.
    pub async fn next(&self) -> HandlerResult {
        loop {
            let current = {
                let mut pipeline = self.inner.pipeline.lock();
                if pipeline.aborted || pipeline.index >= pipeline.handlers.len() {
                    return Ok(());
                }
                let current = pipeline.handlers[pipeline.index].clone();
                pipeline.index += 1;
                current
            };
            current.handle(self.clone()).await?;
        }
    }

    /// Skip the handlers that have not run yet.
    pub fn abort(&self) {
        self.inner.pipeline.lock().aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.inner.pipeline.lock().aborted
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("method", &self.inner.method)
            .field("path", &self.inner.path)
            .finish()
    }
}
