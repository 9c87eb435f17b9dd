use crate::error::{Result, RoutingError};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// HTTP methods a route can be registered for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Connect,
    Head,
    Options,
    Trace,
}

/// Every supported method, in the order `any` registers them.
pub const METHODS: [Method; 9] = [
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Patch,
    Method::Delete,
    Method::Connect,
    Method::Head,
    Method::Options,
    Method::Trace,
];

impl Method {
    /// Parse a single method name. Names are case-sensitive upper-case tokens.
    pub fn parse(name: &str) -> Result<Self> {
        Method::from_str(name).map_err(|_| RoutingError::UnknownMethod {
            method: name.to_string(),
        })
    }

    /// Parse a comma-separated list such as `GET,POST`.
    ///
    /// No whitespace trimming is done: `"GET, POST"` is rejected because
    /// `" POST"` is not a method name.
    pub fn parse_list(methods: &str) -> Result<Vec<Self>> {
        methods
            .split(',')
            .map(|name| {
                if name.is_empty() {
                    Err(RoutingError::EmptyMethod {
                        methods: methods.to_string(),
                    })
                } else {
                    Method::parse(name)
                }
            })
            .collect()
    }
}

impl From<Method> for axum::http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => axum::http::Method::GET,
            Method::Post => axum::http::Method::POST,
            Method::Put => axum::http::Method::PUT,
            Method::Patch => axum::http::Method::PATCH,
            Method::Delete => axum::http::Method::DELETE,
            Method::Connect => axum::http::Method::CONNECT,
            Method::Head => axum::http::Method::HEAD,
            Method::Options => axum::http::Method::OPTIONS,
            Method::Trace => axum::http::Method::TRACE,
        }
    }
}

impl TryFrom<&axum::http::Method> for Method {
    type Error = RoutingError;

    fn try_from(method: &axum::http::Method) -> Result<Self> {
        Method::parse(method.as_str())
    }
}
