// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! KCIS Detention System portal client
//!
//! The portal authenticates every request with a single `DSAI` cookie whose
//! value is the account token. A [`KcisClient`] owns that cookie jar and
//! keeps it current with whatever `Set-Cookie` headers the portal returns.
//!
//! ```rust,no_run
//! use kcis_api::{KcisClient, Payload};
//!
//! # async fn run() -> kcis_api::Result<()> {
//! let client = KcisClient::new("0123456789abcdef")?;
//! if client.probe().await {
//!     let page = client.get("/DSAI/list.asp").await?;
//!     client
//!         .post("/DSAI/save.asp", &Payload::form([("id", "42"), ("note", "late bus")]))
//!         .await?;
//!     client.download("/DSAI/export.asp", "export.xls").await?;
//!     # let _ = page;
//! }
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use crate::config::ApiConfig;
use crate::error::Result;
use crate::http::{CookieJar, HttpClient, Payload, Request};

/// Portal landing page, also used to validate sessions
pub const DSAI_PATH: &str = "/DSAI/";

/// Text the portal only renders for a logged-in session (the logout link)
pub const LOGOUT_MARKER: &str = "[登出]";

/// Build the session jar for `account` under `config`. Fails with
/// [`Error::Config`](crate::Error::Config) for tokens that cannot be sent
/// as a cookie value.
pub fn session_jar(account: &str, config: &ApiConfig) -> Result<CookieJar> {
    CookieJar::for_account(account, config.host(), &config.cookie_path)
}

/// Check whether a portal page was rendered for a logged-in session
pub fn is_logged_in(body: &str) -> bool {
    body.contains(LOGOUT_MARKER)
}

/// Authenticated portal client
#[derive(Debug, Clone)]
pub struct KcisClient {
    http: HttpClient,
    config: ApiConfig,
    account: String,
    jar: CookieJar,
}

impl KcisClient {
    /// Create a client for `account` against the production portal
    pub fn new(account: impl Into<String>) -> Result<Self> {
        Self::with_config(account, ApiConfig::default())
    }

    /// Create a client for `account` with a custom configuration
    pub fn with_config(account: impl Into<String>, config: ApiConfig) -> Result<Self> {
        let http = HttpClient::with_config(&config)?;
        let account = account.into();
        let jar = session_jar(&account, &config)?;
        Ok(Self {
            http,
            config,
            account,
            jar,
        })
    }

    /// Current account token
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Switch to another account. The whole cookie jar is replaced, nothing
    /// from the previous session survives. On error the client is unchanged.
    pub fn set_account(&mut self, account: impl Into<String>) -> Result<()> {
        let account = account.into();
        self.jar = session_jar(&account, &self.config)?;
        self.account = account;
        Ok(())
    }

    /// The client's cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.jar
    }

    /// Get client configuration
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// GET `path` with the client's session
    pub async fn get(&self, path: &str) -> Result<String> {
        self.get_with_jar(path, &self.jar).await
    }

    /// GET the portal landing page
    pub async fn get_home(&self) -> Result<String> {
        self.get(DSAI_PATH).await
    }

    /// POST `payload` to `path` with the client's session
    pub async fn post(&self, path: &str, payload: &Payload) -> Result<String> {
        self.post_with_jar(path, &self.jar, payload).await
    }

    /// Download `path` into `dest` with the client's session
    pub async fn download(&self, path: &str, dest: impl AsRef<Path>) -> Result<u64> {
        self.download_with_jar(path, &self.jar, dest).await
    }

    /// Check that the portal accepts this client's account
    pub async fn probe(&self) -> bool {
        probe_with(&self.http, &self.account, &self.config).await
    }

    /// GET `path` with an explicit cookie jar
    pub async fn get_with_jar(&self, path: &str, jar: &CookieJar) -> Result<String> {
        let url = self.config.resolve(path)?;
        let response = self.http.execute(Request::get(url), jar).await?;
        Ok(response.text_lossy())
    }

    /// POST `payload` to `path` with an explicit cookie jar
    pub async fn post_with_jar(
        &self,
        path: &str,
        jar: &CookieJar,
        payload: &Payload,
    ) -> Result<String> {
        let url = self.config.resolve(path)?;
        let request = Request::post(url).payload(payload);
        let response = self.http.execute(request, jar).await?;
        Ok(response.text_lossy())
    }

    /// Download `path` into `dest` with an explicit cookie jar
    pub async fn download_with_jar(
        &self,
        path: &str,
        jar: &CookieJar,
        dest: impl AsRef<Path>,
    ) -> Result<u64> {
        let url = self.config.resolve(path)?;
        self.http.download(Request::get(url), jar, dest).await
    }

    /// One-off GET with a session jar derived from `account`. The jar is
    /// dropped when the call returns.
    pub async fn fetch(account: &str, path: &str, config: &ApiConfig) -> Result<String> {
        let jar = session_jar(account, config)?;
        let http = HttpClient::with_config(config)?;
        let url = config.resolve(path)?;
        let response = http.execute(Request::get(url), &jar).await?;
        Ok(response.text_lossy())
    }

    /// Check that the portal accepts `account`
    pub async fn probe_account(account: &str, config: &ApiConfig) -> bool {
        match HttpClient::with_config(config) {
            Ok(http) => probe_with(&http, account, config).await,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot build HTTP client for probe");
                false
            }
        }
    }
}

async fn probe_with(http: &HttpClient, account: &str, config: &ApiConfig) -> bool {
    let jar = match session_jar(account, config) {
        Ok(jar) => jar,
        Err(e) => {
            tracing::warn!(error = %e, "Cannot build session jar for probe");
            return false;
        }
    };
    let url = match config.resolve(DSAI_PATH) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(error = %e, "Cannot resolve probe URL");
            return false;
        }
    };

    match http.execute(Request::get(url), &jar).await {
        Ok(response) => {
            let logged_in = is_logged_in(&response.text_lossy());
            tracing::debug!(logged_in, "Session probe");
            logged_in
        }
        Err(e) => {
            tracing::debug!(error = %e, "Session probe failed");
            false
        }
    }
}
