//! HTTP request wrapper over reqwest.
//!
//! Each call issues one request and resolves exactly once: a 2xx response
//! is `Ok`, anything else is an [`HttpError`]. There are no retries, no
//! client-side timeouts, and redirects are left to reqwest's default policy.
//!
//! [`HttpClient`] is the asynchronous variant. [`BlockingHttpClient`] blocks
//! the calling thread and returns the body directly; it must not be used
//! from inside an async runtime thread.

use crate::config::ClientConfig;
use crate::error::{FuwuResult, HttpError};

pub use reqwest::Method;

/// Whether `status` counts as success (the whole 2xx range).
pub fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Request headers, sent in order.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub data: Option<String>,
    /// Basic-auth user name.
    pub user: Option<String>,
    /// Basic-auth password; only sent together with `user`.
    pub password: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn basic_auth(mut self, user: impl Into<String>, password: Option<&str>) -> Self {
        self.user = Some(user.into());
        self.password = password.map(str::to_string);
        self
    }
}

/// A completed exchange with a 2xx status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Requested URL.
    pub url: String,
    /// URL after any redirects.
    pub final_url: String,
    pub status: u16,
    /// All response headers.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// First header called `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn resolve(self) -> Result<Self, HttpError> {
        if is_success(self.status) {
            Ok(self)
        } else {
            Err(HttpError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// The parts of reqwest's async and blocking request builders that
/// [`RequestOptions`] drive.
trait OptionsTarget: Sized {
    fn header_pair(self, name: &str, value: &str) -> Self;
    fn basic_auth_pair(self, user: &str, password: Option<&str>) -> Self;
    fn body_text(self, body: String) -> Self;

    /// Default headers first, then the request's own headers, auth and body.
    fn apply(mut self, defaults: &[(String, String)], options: &RequestOptions) -> Self {
        for (name, value) in defaults.iter().chain(&options.headers) {
            self = self.header_pair(name, value);
        }
        if let Some(user) = &options.user {
            self = self.basic_auth_pair(user, options.password.as_deref());
        }
        if let Some(data) = &options.data {
            self = self.body_text(data.clone());
        }
        self
    }
}

impl OptionsTarget for reqwest::RequestBuilder {
    fn header_pair(self, name: &str, value: &str) -> Self {
        self.header(name, value)
    }

    fn basic_auth_pair(self, user: &str, password: Option<&str>) -> Self {
        self.basic_auth(user, password)
    }

    fn body_text(self, body: String) -> Self {
        self.body(body)
    }
}

impl OptionsTarget for reqwest::blocking::RequestBuilder {
    fn header_pair(self, name: &str, value: &str) -> Self {
        self.header(name, value)
    }

    fn basic_auth_pair(self, user: &str, password: Option<&str>) -> Self {
        self.basic_auth(user, password)
    }

    fn body_text(self, body: String) -> Self {
        self.body(body)
    }
}

fn collect_headers(map: &reqwest::header::HeaderMap) -> Vec<(String, String)> {
    map.iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
        .collect()
}

/// Asynchronous HTTP client.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    default_headers: Vec<(String, String)>,
}

impl HttpClient {
    /// Client with the default configuration.
    pub fn new() -> FuwuResult<Self> {
        Self::with_config(&ClientConfig::default())
    }

    pub fn with_config(config: &ClientConfig) -> FuwuResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            default_headers: config.default_headers.clone(),
        })
    }

    /// Send one request and resolve it by status.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        tracing::debug!("{method} {url}");

        let r = self
            .client
            .request(method.clone(), url)
            .apply(&self.default_headers, options)
            .send()
            .await?;
        let status = r.status().as_u16();
        let final_url = r.url().to_string();
        let headers = collect_headers(r.headers());
        let body = r.text().await?;

        tracing::debug!("{method} {url} -> {status}");

        HttpResponse {
            url: url.to_string(),
            final_url,
            status,
            headers,
            body,
        }
        .resolve()
    }

    pub async fn get(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        self.request(Method::GET, url, options).await
    }

    pub async fn post(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        self.request(Method::POST, url, options).await
    }

    pub async fn put(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        self.request(Method::PUT, url, options).await
    }

    pub async fn head(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        self.request(Method::HEAD, url, options).await
    }

    pub async fn delete(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        self.request(Method::DELETE, url, options).await
    }

    pub async fn patch(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        self.request(Method::PATCH, url, options).await
    }

    pub async fn options(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        self.request(Method::OPTIONS, url, options).await
    }
}

/// Blocking HTTP client: the synchronous request mode.
///
/// Construct and use it from a plain thread (or `spawn_blocking`).
pub struct BlockingHttpClient {
    client: reqwest::blocking::Client,
    default_headers: Vec<(String, String)>,
}

impl BlockingHttpClient {
    pub fn new() -> FuwuResult<Self> {
        Self::with_config(&ClientConfig::default())
    }

    pub fn with_config(config: &ClientConfig) -> FuwuResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            default_headers: config.default_headers.clone(),
        })
    }

    /// Send one request, blocking until it completes, and return the full
    /// response.
    pub fn send(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        tracing::debug!("{method} {url} (blocking)");

        let r = self
            .client
            .request(method.clone(), url)
            .apply(&self.default_headers, options)
            .send()?;
        let status = r.status().as_u16();
        let final_url = r.url().to_string();
        let headers = collect_headers(r.headers());
        let body = r.text()?;

        tracing::debug!("{method} {url} -> {status} (blocking)");

        HttpResponse {
            url: url.to_string(),
            final_url,
            status,
            headers,
            body,
        }
        .resolve()
    }

    /// Send one request, blocking until it completes, and return the body.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<String, HttpError> {
        self.send(method, url, options).map(|r| r.body)
    }

    pub fn get(&self, url: &str, options: &RequestOptions) -> Result<String, HttpError> {
        self.request(Method::GET, url, options)
    }

    pub fn post(&self, url: &str, options: &RequestOptions) -> Result<String, HttpError> {
        self.request(Method::POST, url, options)
    }

    pub fn put(&self, url: &str, options: &RequestOptions) -> Result<String, HttpError> {
        self.request(Method::PUT, url, options)
    }

    pub fn head(&self, url: &str, options: &RequestOptions) -> Result<String, HttpError> {
        self.request(Method::HEAD, url, options)
    }

    pub fn delete(&self, url: &str, options: &RequestOptions) -> Result<String, HttpError> {
        self.request(Method::DELETE, url, options)
    }

    pub fn patch(&self, url: &str, options: &RequestOptions) -> Result<String, HttpError> {
        self.request(Method::PATCH, url, options)
    }

    pub fn options(&self, url: &str, options: &RequestOptions) -> Result<String, HttpError> {
        self.request(Method::OPTIONS, url, options)
    }
}
