// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation
//!
//! One call is one exchange: attach cookies from the caller's jar, send,
//! reject non-2xx, merge `Set-Cookie` back into the jar, read the body.
//! Redirects are followed here rather than inside reqwest so that cookies
//! set on every hop reach the jar.

use std::path::Path;
use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use reqwest::redirect::Policy;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use super::cookie::CookieJar;
use super::headers;
use super::request::Request;
use super::response::Response;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// HTTP transport shared by every portal call of a client
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    max_redirects: usize,
}

impl HttpClient {
    /// Create a transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&ApiConfig::default())
    }

    /// Create a transport from the portal configuration
    pub fn with_config(config: &ApiConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            headers::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        default_headers.insert(
            headers::ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-TW,zh;q=0.9,en;q=0.5"),
        );

        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(default_headers);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build().map_err(Error::Transport)?;

        Ok(Self {
            client,
            max_redirects: config.max_redirects,
        })
    }

    /// Execute a request and buffer the whole body
    pub async fn execute(&self, request: Request, jar: &CookieJar) -> Result<Response> {
        let start = Instant::now();
        let response = self.send(request, jar).await?;

        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        tracing::debug!(
            url = %final_url,
            status = %status,
            bytes = body.len(),
            time_ms = start.elapsed().as_millis() as u64,
            "Response"
        );

        Ok(Response::new(status, headers, body, final_url))
    }

    /// Execute a request and stream the body into `dest`, replacing any
    /// existing file. Returns the number of bytes written.
    pub async fn download(
        &self,
        request: Request,
        jar: &CookieJar,
        dest: impl AsRef<Path>,
    ) -> Result<u64> {
        let dest = dest.as_ref();
        let start = Instant::now();
        let mut response = self.send(request, jar).await?;
        let url = response.url().clone();

        let mut file = tokio::fs::File::create(dest).await?;
        let written = async {
            let mut written: u64 = 0;
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok::<u64, Error>(written)
        }
        .await;

        match written {
            Ok(written) => {
                tracing::debug!(
                    url = %url,
                    dest = %dest.display(),
                    bytes = written,
                    time_ms = start.elapsed().as_millis() as u64,
                    "Download complete"
                );
                Ok(written)
            }
            Err(e) => {
                drop(file);
                // Partial bodies are never left behind
                let _ = tokio::fs::remove_file(dest).await;
                tracing::warn!(url = %url, error = %e, "Download failed");
                Err(e)
            }
        }
    }

    async fn send(&self, request: Request, jar: &CookieJar) -> Result<reqwest::Response> {
        let Request {
            mut method,
            mut url,
            headers: mut extra_headers,
            mut body,
            timeout,
        } = request;
        let mut hops = 0;

        loop {
            tracing::debug!(method = %method, url = %url, "Request");

            let mut builder = self
                .client
                .request(method.clone(), url.clone())
                .headers(extra_headers.clone());

            if let Some(cookie_header) = jar.get_cookie_header(&url) {
                builder = builder.header(headers::COOKIE, cookie_header);
            }

            if let Some(ref body) = body {
                builder = builder.body(body.clone());
            }

            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }

            let response = match builder.send().await {
                Ok(response) => response,
                Err(e) => {
                    let err = Error::from(e);
                    tracing::warn!(url = %url, error = %err, "Request failed");
                    return Err(err);
                }
            };

            let status = response.status();
            let location = redirect_target(&response);

            if !status.is_success() && location.is_none() {
                tracing::warn!(url = %url, status = %status, "Request rejected");
                return Err(Error::status(status.as_u16(), url.as_str()));
            }

            let merged = jar.merge_set_cookies(response.headers(), &url);
            if !merged.is_empty() {
                tracing::debug!(cookies = ?merged, "Merged response cookies");
            }

            let Some(location) = location else {
                return Ok(response);
            };

            if hops >= self.max_redirects {
                tracing::warn!(url = %url, hops, "Too many redirects");
                return Err(Error::TooManyRedirects {
                    url: url.to_string(),
                    hops,
                });
            }
            hops += 1;

            let next = url.join(&location)?;
            tracing::debug!(status = %status, from = %url, to = %next, "Redirect");

            // 303, and 301/302 after a POST, continue as a bodiless GET
            if status == StatusCode::SEE_OTHER
                || (method == Method::POST
                    && matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND))
            {
                method = Method::GET;
                body = None;
                extra_headers.remove(headers::CONTENT_TYPE);
            }
            url = next;
        }
    }
}

/// `Location` of a 3xx response, if it is a redirect we can follow
fn redirect_target(response: &reqwest::Response) -> Option<String> {
    if !response.status().is_redirection() {
        return None;
    }
    response
        .headers()
        .get(headers::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Cookie, Payload};
    use url::Url;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&server.uri()).unwrap().join(p).unwrap()
    }

    #[test]
    fn test_client_creation() {
        assert!(HttpClient::new().is_ok());
    }

    #[tokio::test]
    async fn test_execute_attaches_and_merges_cookies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/DSAI/"))
            .and(header("cookie", "DSAI=acc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "ASPSESSIONID=s1; path=/")
                    .set_body_string("ok"),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let host = Url::parse(&server.uri()).unwrap().host_str().unwrap().to_string();
        let jar = CookieJar::for_account("acc", &host, "/DSAI/").unwrap();

        let resp = client
            .execute(Request::get(url(&server, "/DSAI/")), &jar)
            .await
            .unwrap();

        assert_eq!(resp.text().unwrap(), "ok");
        assert_eq!(jar.len(), 2);
        assert_eq!(jar.get("ASPSESSIONID").unwrap().value, "s1");
    }

    #[tokio::test]
    async fn test_execute_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/DSAI/save.asp"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("a=1&b=x%20y"))
            .respond_with(ResponseTemplate::new(200).set_body_string("saved"))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let request = Request::post(url(&server, "/DSAI/save.asp"))
            .payload(&Payload::form([("a", "1"), ("b", "x y")]));

        let resp = client.execute(request, &CookieJar::new()).await.unwrap();
        assert_eq!(resp.text().unwrap(), "saved");
    }

    #[tokio::test]
    async fn test_non_success_status_skips_cookie_merge() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(500).insert_header("set-cookie", "junk=1; path=/"),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let jar = CookieJar::new();
        jar.add(Cookie::new("keep", "1"));

        let err = client
            .execute(Request::get(url(&server, "/DSAI/")), &jar)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(500));
        assert!(err.is_transport());
        assert_eq!(jar.len(), 1);
        assert!(jar.get("junk").is_none());
    }

    #[tokio::test]
    async fn test_redirect_hops_merge_cookies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/DSAI/login.asp"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("set-cookie", "ASPSESSIONID=fromredirect; path=/")
                    .insert_header("location", "/DSAI/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/DSAI/"))
            .and(header("cookie", "ASPSESSIONID=fromredirect"))
            .respond_with(ResponseTemplate::new(200).set_body_string("home"))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let jar = CookieJar::new();
        let resp = client
            .execute(Request::get(url(&server, "/DSAI/login.asp")), &jar)
            .await
            .unwrap();

        assert_eq!(resp.text().unwrap(), "home");
        assert_eq!(resp.url.path(), "/DSAI/");
        assert_eq!(jar.get("ASPSESSIONID").unwrap().value, "fromredirect");
    }

    #[tokio::test]
    async fn test_post_redirect_continues_as_get() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/DSAI/save.asp"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "done.asp"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/DSAI/done.asp"))
            .and(body_string(""))
            .respond_with(ResponseTemplate::new(200).set_body_string("done"))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let request = Request::post(url(&server, "/DSAI/save.asp"))
            .payload(&Payload::form([("a", "1")]));

        let resp = client.execute(request, &CookieJar::new()).await.unwrap();
        assert_eq!(resp.text().unwrap(), "done");
    }

    #[tokio::test]
    async fn test_redirect_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/DSAI/loop.asp"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/DSAI/loop.asp"))
            .mount(&server)
            .await;

        let client = HttpClient::with_config(&ApiConfig::new().max_redirects(3)).unwrap();
        let err = client
            .execute(Request::get(url(&server, "/DSAI/loop.asp")), &CookieJar::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TooManyRedirects { hops: 3, .. }));
        assert!(err.is_transport());
        assert_eq!(server.received_requests().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_download_overwrites_file() {
        let server = MockServer::start().await;
        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        Mock::given(method("GET"))
            .and(path("/DSAI/export.xls"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("export.xls");
        std::fs::write(&dest, vec![b'x'; 50_000]).unwrap();

        let client = HttpClient::new().unwrap();
        let written = client
            .download(
                Request::get(url(&server, "/DSAI/export.xls")),
                &CookieJar::new(),
                &dest,
            )
            .await
            .unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
    }

    #[tokio::test]
    async fn test_download_status_error_leaves_file_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("report.pdf");
        std::fs::write(&dest, b"previous").unwrap();

        let client = HttpClient::new().unwrap();
        let err = client
            .download(Request::get(url(&server, "/missing")), &CookieJar::new(), &dest)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(404));
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous");
    }
}
