// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for the portal client
//!
//! Provides a lightweight HTTP transport that works against an explicit
//! cookie jar, plus the request, payload and response types it exchanges.

mod client;
mod cookie;
mod request;
mod response;

pub use client::HttpClient;
pub use cookie::{is_valid_cookie_value, Cookie, CookieJar, SESSION_COOKIE};
pub use request::{encode_form, percent_encode, Payload, Request, FORM_CONTENT_TYPE};
pub use response::Response;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const ACCEPT_LANGUAGE: &str = "accept-language";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const LOCATION: &str = "location";
    pub const SET_COOKIE: &str = "set-cookie";
}
