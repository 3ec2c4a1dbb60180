//! Client configuration.

use crate::error::{ClientError, ClientResult};
use drupal_entity_model::CoercionMode;

/// Environment variable holding the application root URL.
pub const SERVICES_URL_ENV: &str = "DRUPAL_SERVICES_URL";

const DEFAULT_SERVICES_URL: &str = "http://127.0.0.1/api";

/// Services client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Application root all resource paths are resolved against
    base_url: String,
    /// Coercion mode applied to entities the client hydrates
    pub coercion: CoercionMode,
}

impl ClientConfig {
    /// Create a configuration for the given application root.
    ///
    /// The URL is validated up front; a trailing slash is normalized away so
    /// resource paths can be appended directly.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL \"{base_url}\": {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            coercion: CoercionMode::default(),
        })
    }

    /// Create a configuration from `DRUPAL_SERVICES_URL`, with a localhost
    /// default.
    pub fn from_env() -> ClientResult<Self> {
        let base_url =
            std::env::var(SERVICES_URL_ENV).unwrap_or_else(|_| DEFAULT_SERVICES_URL.to_string());
        Self::new(base_url)
    }

    /// Use strict field coercion for hydrated entities.
    pub fn with_coercion(mut self, mode: CoercionMode) -> Self {
        self.coercion = mode;
        self
    }

    /// The normalized application root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a resource path against the application root.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
