use crate::error::{Result, RoutingError};
use serde::Deserialize;
use std::env;

pub const ENV_IGNORE_TRAILING_SLASH: &str = "TRELLIS_IGNORE_TRAILING_SLASH";
pub const ENV_BODY_LIMIT: &str = "TRELLIS_BODY_LIMIT";

const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Router settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Dispatch `/users/` like `/users`
    pub ignore_trailing_slash: bool,
    /// Max request body size buffered when serving through axum
    pub body_limit: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            ignore_trailing_slash: false,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl RouterConfig {
    /// Defaults overridden by `TRELLIS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_IGNORE_TRAILING_SLASH) {
            config.ignore_trailing_slash = value.parse().map_err(|_| {
                RoutingError::Config(format!("{ENV_IGNORE_TRAILING_SLASH} must be true or false, got {value:?}"))
            })?;
        }
        if let Some(value) = lookup(ENV_BODY_LIMIT) {
            config.body_limit = value.parse().map_err(|_| {
                RoutingError::Config(format!("{ENV_BODY_LIMIT} must be a byte count, got {value:?}"))
            })?;
        }

        Ok(config)
    }

    pub fn ignore_trailing_slash(mut self, ignore: bool) -> Self {
        self.ignore_trailing_slash = ignore;
        self
    }

    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RouterConfig::from_lookup(lookup(&[])).unwrap();
        assert!(!config.ignore_trailing_slash);
        assert_eq!(config.body_limit, DEFAULT_BODY_LIMIT);
    }

    #[test]
    fn test_overrides_and_errors() {
        let config = RouterConfig::from_lookup(lookup(&[
            (ENV_IGNORE_TRAILING_SLASH, "true"),
            (ENV_BODY_LIMIT, "1024"),
        ]))
        .unwrap();
        assert!(config.ignore_trailing_slash);
        assert_eq!(config.body_limit, 1024);

        assert!(matches!(
            RouterConfig::from_lookup(lookup(&[(ENV_BODY_LIMIT, "lots")])),
            Err(RoutingError::Config(_))
        ));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RouterConfig =
            serde_json::from_str(r#"{ "ignore_trailing_slash": true }"#).unwrap();
        assert!(config.ignore_trailing_slash);
        assert_eq!(config.body_limit, DEFAULT_BODY_LIMIT);
    }
}
