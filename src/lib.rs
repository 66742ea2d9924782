// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # kcis-api - KCIS Detention System Portal Client
//!
//! A small async client for `portal.kcisec.com`. Sessions are carried by a
//! single `DSAI` cookie whose value is the account token.
//!
//! ## Features
//!
//! - Authenticated GET, form POST and file download against portal paths
//! - Session probe: is this account token accepted by the portal?
//! - Per-client cookie jar, refreshed from every `Set-Cookie` the portal sends
//! - Explicit configuration (base address, cookie scope, timeout) instead of globals
//!
//! ## Example
//!
//! ```rust,no_run
//! use kcis_api::{ApiConfig, KcisClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = KcisClient::with_config("0123456789abcdef", ApiConfig::default())?;
//!
//!     if client.probe().await {
//!         let home = client.get_home().await?;
//!         println!("{} bytes", home.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod portal;

// Re-exports for convenience

// Client
pub use portal::{is_logged_in, session_jar, KcisClient, DSAI_PATH, LOGOUT_MARKER};

// Configuration
pub use config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_COOKIE_PATH};

// Errors
pub use error::{Error, Result};

// HTTP
pub use http::{Cookie, CookieJar, HttpClient, Payload, Request, Response, SESSION_COOKIE};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
