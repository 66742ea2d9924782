// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-memory cookie jar keyed by (domain, path, name)

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use dashmap::DashMap;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use url::Url;

use super::headers;
use crate::error::{Error, Result};

/// Name of the portal session cookie
pub const SESSION_COOKIE: &str = "DSAI";

const MAX_AGE_CAP_SECS: i64 = 400 * 24 * 60 * 60;

/// Non-RFC 1123 date layouts still sent in `Expires` (Netscape, RFC 850, asctime)
const LEGACY_DATE_FORMATS: &[&str] = &[
    "%a, %d-%b-%Y %H:%M:%S GMT",
    "%a, %d-%b-%y %H:%M:%S GMT",
    "%a %b %e %H:%M:%S %Y",
];

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie belongs to
    pub domain: String,
    /// Path the cookie is valid for
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag (HTTPS only)
    pub secure: bool,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
        }
    }

    /// Set the domain (stored lowercase)
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into().to_ascii_lowercase();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp <= Utc::now())
    }

    /// Check if the cookie should be sent to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        if !self.domain_matches(host) {
            return false;
        }

        if !self.path_matches(url.path()) {
            return false;
        }

        if self.secure && url.scheme() != "https" {
            return false;
        }

        !self.is_expired()
    }

    fn domain_matches(&self, host: &str) -> bool {
        self.domain.is_empty() || domain_match(host, &self.domain)
    }

    // RFC 6265 5.1.4: "/DSAI" matches "/DSAI" and "/DSAI/x" but not "/DSAIX"
    fn path_matches(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }
        if !request_path.starts_with(&self.path) {
            return false;
        }
        self.path.ends_with('/') || request_path[self.path.len()..].starts_with('/')
    }

    /// Parse a Set-Cookie header value
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let first = parts.next()?.trim();

        let (name, value) = first.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let mut cookie = Cookie::new(name, value.trim().trim_matches('"'));

        let host = url.host_str().unwrap_or("").to_ascii_lowercase();
        cookie.domain = host.clone();
        cookie.path = default_path(url);

        let mut max_age = None;
        let mut domain_attr = None;
        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let attr = attr.trim().to_lowercase();
                let val = val.trim();
                match attr.as_str() {
                    "domain" if !val.trim_start_matches('.').is_empty() => {
                        domain_attr = Some(val.trim_start_matches('.').to_ascii_lowercase())
                    }
                    "path" if val.starts_with('/') => cookie.path = val.to_string(),
                    "expires" => {
                        if let Some(dt) = parse_http_date(val) {
                            cookie.expires = Some(dt);
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            max_age = Some(secs);
                        }
                    }
                    _ => {}
                }
            } else if part.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            }
        }

        // RFC 6265 5.3 step 6: never store a cookie for a domain the host is not in
        if let Some(domain) = domain_attr {
            if !domain_match(&host, &domain) {
                return None;
            }
            cookie.domain = domain;
        }

        // Max-Age wins over Expires; capped at 400 days (RFC 6265bis)
        if let Some(secs) = max_age {
            let secs = secs.clamp(-1, MAX_AGE_CAP_SECS);
            cookie.expires = Some(Utc::now() + chrono::Duration::seconds(secs));
        }

        Some(cookie)
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Parse an `Expires` value: RFC 1123 first, then the legacy layouts
fn parse_http_date(val: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
        return Some(dt.with_timezone(&Utc));
    }
    LEGACY_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(val, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// RFC 6265 5.1.3 domain-match, case-insensitive
fn domain_match(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let domain = domain.trim_start_matches('.').to_ascii_lowercase();
    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Check that a value can be sent verbatim in a `Cookie` header
/// (RFC 6265 cookie-octet: visible ASCII minus `"` `,` `;` `\`)
pub fn is_valid_cookie_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
}

/// RFC 6265 default-path: the request path up to, not including, its last '/'
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Cookie storage owned by a single client or call frame
#[derive(Debug, Clone)]
pub struct CookieJar {
    /// Cookies stored by domain
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self {
            cookies: Arc::new(DashMap::new()),
        }
    }

    /// Create a jar holding only the session cookie for `account`.
    /// Fails when the token cannot be carried in a `Cookie` header.
    pub fn for_account(account: &str, host: &str, path: &str) -> Result<Self> {
        if !is_valid_cookie_value(account) {
            return Err(Error::config(format!(
                "account token contains characters not allowed in a cookie: {:?}",
                account
            )));
        }
        let jar = Self::new();
        jar.add(Cookie::new(SESSION_COOKIE, account).domain(host).path(path));
        Ok(jar)
    }

    /// Add a cookie, replacing any with the same (domain, path, name).
    /// An already-expired cookie only removes its counterpart.
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        if !cookie.is_expired() {
            entry.push(cookie);
        }
    }

    /// Add a cookie from a Set-Cookie header
    pub fn add_from_header(&self, header: &str, url: &Url) {
        if let Some(cookie) = Cookie::parse(header, url) {
            self.add(cookie);
        }
    }

    /// Merge every Set-Cookie header of a response, returning the names stored
    pub fn merge_set_cookies(&self, response_headers: &HeaderMap, url: &Url) -> Vec<String> {
        let mut merged = Vec::new();
        for value in response_headers.get_all(headers::SET_COOKIE) {
            if let Some(cookie) = value.to_str().ok().and_then(|v| Cookie::parse(v, url)) {
                merged.push(cookie.name.clone());
                self.add(cookie);
            }
        }
        merged
    }

    /// Find a live cookie by name, regardless of scope
    pub fn get(&self, name: &str) -> Option<Cookie> {
        self.cookies
            .iter()
            .flat_map(|e| e.value().clone())
            .find(|c| c.name == name && !c.is_expired())
    }

    /// Get all cookies for a URL, most specific path first
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        self.remove_expired();

        let mut result: Vec<Cookie> = self
            .cookies
            .iter()
            .flat_map(|e| {
                e.value()
                    .iter()
                    .filter(|c| c.matches(url))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        result.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
        result
    }

    /// Get Cookie header value for a URL
    pub fn get_cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_cookies(url);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(|c| c.to_header_value())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Remove a specific cookie
    pub fn remove(&self, name: &str, domain: &str, path: &str) {
        if let Some(mut cookies) = self.cookies.get_mut(domain) {
            cookies.retain(|c| c.name != name || c.path != path);
        }
    }

    /// Clear all cookies
    pub fn clear(&self) {
        self.cookies.clear();
    }

    fn remove_expired(&self) {
        for mut entry in self.cookies.iter_mut() {
            entry.value_mut().retain(|c| !c.is_expired());
        }
    }

    /// Snapshot of every stored cookie
    pub fn cookies(&self) -> Vec<Cookie> {
        self.cookies
            .iter()
            .flat_map(|e| e.value().clone())
            .collect()
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
