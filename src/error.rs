// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the KCIS portal client
//!
//! Every portal exchange resolves to a [`Result`]. Transport failures are
//! split into the cases a caller may want to tell apart (timeout, non-2xx
//! status, everything else on the wire).

use thiserror::Error;

/// Result type alias for portal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the portal client
#[derive(Error, Debug)]
pub enum Error {
    /// Connection, DNS, TLS or protocol failure
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request did not complete in time
    #[error("Request timed out: {url}")]
    Timeout { url: String },

    /// Server answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Redirect chain longer than the configured limit
    #[error("Too many redirects ({hops}) ending at {url}")]
    TooManyRedirects { url: String, hops: usize },

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error (download destination)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Error::Timeout {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        if let Some(status) = err.status() {
            return Error::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        Error::Transport(err)
    }
}

impl Error {
    /// Create a status error
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Error::Status {
            status,
            url: url.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Check if the exchange itself failed (network, timeout or status)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_)
                | Error::Timeout { .. }
                | Error::Status { .. }
                | Error::TooManyRedirects { .. }
        )
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Timeout { url }
            | Error::Status { url, .. }
            | Error::TooManyRedirects { url, .. } => Some(url),
            Error::Transport(e) => e.url().map(|u| u.as_str()),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
