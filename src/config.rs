// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Portal client configuration

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::http::DEFAULT_USER_AGENT;

/// Default portal address
pub const DEFAULT_BASE_URL: &str = "https://portal.kcisec.com/";

/// Default scope of the session cookie
pub const DEFAULT_COOKIE_PATH: &str = "/DSAI/";

/// Portal client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base address every relative path is resolved against
    pub base_url: Url,
    /// Path scope of the session cookie
    pub cookie_path: String,
    /// Request timeout (None = transport default)
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: String,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            cookie_path: DEFAULT_COOKIE_PATH.to_string(),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
            proxy: None,
            accept_invalid_certs: false,
        }
    }
}

impl ApiConfig {
    /// Create a config pointing at the production portal
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at another base address
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(base_url.as_ref())?;
        if url.host_str().is_none() {
            return Err(Error::config(format!("base URL has no host: {}", url)));
        }
        self.base_url = url;
        Ok(self)
    }

    /// Set the session cookie path scope
    pub fn cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set max redirects
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Accept invalid TLS certificates
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Host of the base address
    pub fn host(&self) -> &str {
        self.base_url.host_str().unwrap_or("")
    }

    /// Resolve a relative path against the base address
    pub fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.host(), "portal.kcisec.com");
        assert_eq!(config.cookie_path, "/DSAI/");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_resolve() {
        let config = ApiConfig::new()
            .with_base_url("http://127.0.0.1:8080/")
            .unwrap();
        assert_eq!(
            config.resolve("/DSAI/").unwrap().as_str(),
            "http://127.0.0.1:8080/DSAI/"
        );
        assert_eq!(
            config.resolve("DSAI/list.asp?id=3").unwrap().as_str(),
            "http://127.0.0.1:8080/DSAI/list.asp?id=3"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiConfig::new().with_base_url("not a url"),
            Err(Error::Url(_))
        ));
        assert!(matches!(
            ApiConfig::new().with_base_url("data:text/plain,hello"),
            Err(Error::Config(_))
        ));
    }
}
