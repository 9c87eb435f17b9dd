use axum::http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors raised while building the route table.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("Unknown HTTP method: {method}")]
    UnknownMethod { method: String },

    #[error("Empty HTTP method name in list: {methods:?}")]
    EmptyMethod { methods: String },

    #[error("Missing value for parameter '{param}' in route {route}")]
    MissingParam { route: String, param: String },

    #[error("No route named {name}")]
    UnknownRoute { name: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Type-erased error returned by handlers and controller methods.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Standard return type for handlers
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// A handler error that carries an HTTP status code.
#[derive(Debug, Clone, Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Status for an arbitrary handler error: its own status if it is an
    /// [`HttpError`], 500 otherwise.
    pub fn status_of(err: &HandlerError) -> StatusCode {
        err.downcast_ref::<HttpError>()
            .map(|e| e.status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl axum::response::IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

impl axum::response::IntoResponse for RoutingError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            RoutingError::UnknownMethod { .. } | RoutingError::EmptyMethod { .. } => {
                StatusCode::METHOD_NOT_ALLOWED
            }
            RoutingError::UnknownRoute { .. } => StatusCode::NOT_FOUND,
            RoutingError::MissingParam { .. } | RoutingError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
