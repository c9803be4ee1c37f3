//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::auth_common::credentials::CredentialSource;
use crate::auth_common::token_provider::TokenPersister;
use crate::client_builder::{ClientBuilder, DEFAULT_AUTH_HEADER, DEFAULT_AUTH_PATH, DEFAULT_TIMEOUT};
use crate::error::{auth_err, ia_err, requested_with, user_agent};
use crate::error::{AstraError, AstraErrorCode};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde_derive::Deserialize;
use serde_json::Value;

use std::result::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// **The authenticated HTTP transport**.
///
/// This should be created once and used throughout the application lifetime, across
/// all tasks. All the document, schema, REST and operations clients in this crate are
/// layered on top of it.
///
/// Note: there is no need to enclose this struct in an `Rc` or [`Arc`], as it uses an
/// [`Arc`] internally, so calling `.clone()` on this struct will always return the
/// same underlying client (and the same session token).
#[derive(Clone, Debug)]
pub struct Client {
    // Use an inner Arc so cloning keeps the same contents
    pub(crate) inner: Arc<ClientRef>,
}

pub(crate) struct ClientRef {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) auth_url: String,
    pub(crate) auth_header: HeaderName,
    pub(crate) credentials: CredentialSource,
    pub(crate) token_persister: Option<Arc<dyn TokenPersister>>,
    pub(crate) auto_reconnect: bool,
    pub(crate) timeout: Duration,
    // session doesn't require a tokio Mutex because it's never held across awaits
    session: std::sync::Mutex<String>,
    auth_count: AtomicUsize,
}

/// Per-request settings: query parameters, JSON body and timeout.
#[derive(Default, Debug, Clone)]
pub struct RequestOptions {
    pub(crate) params: Vec<(String, String)>,
    pub(crate) body: Option<Value>,
    pub(crate) timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> RequestOptions {
        RequestOptions {
            ..Default::default()
        }
    }
    /// Add a query parameter.
    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }
    /// Set the JSON request body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
    /// Specify the timeout value for the request.
    ///
    /// If not set, the default timeout value configured for the [`Client`](crate::ClientBuilder::timeout()) is used.
    pub fn timeout(mut self, t: Duration) -> Self {
        self.timeout = Some(t);
        self
    }
}

/// A normalized response: the http status plus the payload, unwrapped from the
/// `data` envelope when there is one.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
    /// Continuation cursor from a paginated response, passed back verbatim to get the next page.
    pub page_state: Option<String>,
    /// Server-reported count, when present in the envelope.
    pub count: Option<u64>,
}

impl ApiResponse {
    pub fn into_data(self) -> Value {
        self.data
    }
}

/// Normalize a raw http response body into an [`ApiResponse`].
///
/// An empty body yields `Value::Null`. If the body is an object with a non-null `data`
/// member, that member is the payload and `pageState`/`count` are lifted from the
/// envelope; otherwise the whole body is the payload.
pub fn normalize(status: u16, raw_body: &str) -> Result<ApiResponse, AstraError> {
    if raw_body.trim().is_empty() {
        return Ok(ApiResponse {
            status,
            data: Value::Null,
            page_state: None,
            count: None,
        });
    }
    let mut body: Value = match serde_json::from_str(raw_body) {
        Ok(v) => v,
        Err(e) => {
            let mut err = AstraError::from(e);
            err.status = Some(status);
            err.body = Some(raw_body.to_string());
            return Err(err);
        }
    };
    if let Value::Object(m) = &mut body {
        if m.get("data").map_or(false, |d| !d.is_null()) {
            let page_state = m
                .get("pageState")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            let count = m.get("count").and_then(|v| v.as_u64());
            let data = m.remove("data").unwrap_or(Value::Null);
            return Ok(ApiResponse {
                status,
                data,
                page_state,
                count,
            });
        }
    }
    Ok(ApiResponse {
        status,
        data: body,
        page_state: None,
        count: None,
    })
}

/// Percent-encode one URL path segment.
///
/// Every character outside the unreserved set is encoded, so `?`, `#`, `/` and `%`
/// stay part of the segment. Empty, `.` and `..` segments are rejected.
pub(crate) fn path_segment(segment: &str) -> Result<String, AstraError> {
    match segment {
        "" => ia_err!("path segment must not be empty"),
        "." | ".." => ia_err!("path segment '{}' is not allowed", segment),
        s => Ok(urlencoding::encode(s).into_owned()),
    }
}

/// Percent-encode each `/`-separated segment of `path`. Leading and trailing
/// slashes are ignored.
pub(crate) fn encode_path(path: &str) -> Result<String, AstraError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return ia_err!("path must not be empty");
    }
    let segments = trimmed
        .split('/')
        .map(path_segment)
        .collect::<Result<Vec<String>, AstraError>>()?;
    Ok(segments.join("/"))
}

#[derive(Default, Debug, Deserialize)]
struct AuthResponse {
    #[serde(rename = "authToken")]
    auth_token: Option<String>,
}

// A response as read off the wire, before status checking
struct RawResponse {
    status: u16,
    text: String,
}

impl Client {
    /// Create a new [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    // Create the new Client based on builder configuration
    pub(crate) async fn new(b: &ClientBuilder) -> Result<Client, AstraError> {
        if cfg!(target_arch = "wasm32") {
            return Err(AstraError::new(
                AstraErrorCode::EnvironmentRestriction,
                "this client is for server-side use only: not for use in a web browser",
            ));
        }
        let base_url = b.resolve_base_url()?;
        let credentials = b.resolve_credentials()?;
        let timeout = b.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let http = {
            if let Some(c) = &b.client {
                c.clone()
            } else {
                reqwest::Client::builder().connect_timeout(timeout).build()?
            }
        };
        let auth_url = match &b.auth_url {
            Some(u) => u.clone(),
            None => format!("{}{}", base_url, DEFAULT_AUTH_PATH),
        };
        let header_name = match &b.auth_header {
            Some(h) => h.clone(),
            None => {
                if credentials.is_application_token() {
                    AUTHORIZATION.as_str().to_string()
                } else {
                    DEFAULT_AUTH_HEADER.to_string()
                }
            }
        };
        let auth_header = HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|e| AstraError::new(AstraErrorCode::Configuration, &e.to_string()))?;
        let initial = match &credentials {
            CredentialSource::SessionToken { token, .. } => token.clone(),
            _ => String::new(),
        };
        let needs_token = matches!(
            credentials,
            CredentialSource::TokenCallback(_) | CredentialSource::PasswordExchange { .. }
        );
        debug!(
            "Creating new Client: base_url={}, credentials={}, auth_header={}",
            base_url,
            credentials.kind(),
            auth_header
        );
        let client = Client {
            inner: Arc::new(ClientRef {
                http,
                base_url,
                auth_url,
                auth_header,
                credentials,
                token_persister: b.token_persister.clone(),
                auto_reconnect: b.auto_reconnect.unwrap_or(true),
                timeout,
                session: std::sync::Mutex::new(initial),
                auth_count: AtomicUsize::new(0),
            }),
        };
        if needs_token {
            client.authenticate().await?;
        }
        Ok(client)
    }

    /// The base URL all request paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The credential source selected when this client was built.
    pub fn credentials(&self) -> &CredentialSource {
        &self.inner.credentials
    }

    /// The number of successful (re)authentications performed by this client.
    pub fn authentication_count(&self) -> usize {
        self.inner.auth_count.load(Ordering::Relaxed)
    }

    /// The token currently attached to requests.
    pub fn current_token(&self) -> String {
        if let CredentialSource::ApplicationToken(t) = &self.inner.credentials {
            return t.clone();
        }
        match self.inner.session.lock() {
            Ok(g) => g.clone(),
            Err(p) => p.into_inner().clone(),
        }
    }

    fn set_session_token(&self, token: &str) {
        let changed = {
            // This is in its own code block so the lock will be released directly afterwards.
            let mut sguard = match self.inner.session.lock() {
                Ok(g) => g,
                Err(p) => p.into_inner(),
            };
            let changed = sguard.as_str() != token;
            *sguard = token.to_string();
            changed
        };
        self.inner.auth_count.fetch_add(1, Ordering::Relaxed);
        if changed {
            if let Some(p) = &self.inner.token_persister {
                p.set_token(token);
            }
        }
    }

    /// Obtain a new session token and store it, replacing any previous one.
    ///
    /// The token comes from the configured token callback, or from exchanging the
    /// configured username and password. Each call replaces the stored token and, if
    /// it changed, calls the [`TokenPersister`] hook.
    ///
    /// For clients using an application token this does nothing: application tokens
    /// are never refreshed.
    pub async fn authenticate(&self) -> Result<(), AstraError> {
        let token = match &self.inner.credentials {
            CredentialSource::ApplicationToken(_) => {
                debug!("application token in use: not authenticating");
                return Ok(());
            }
            CredentialSource::SessionToken {
                refresh: Some(source),
                ..
            } => self.fetch_token(source).await?,
            CredentialSource::SessionToken { refresh: None, .. } => {
                return auth_err!(
                    "cannot refresh session token: no token provider or username/password configured"
                );
            }
            other => self.fetch_token(other).await?,
        };
        if token.is_empty() {
            return auth_err!("authentication did not return a usable token");
        }
        debug!("obtained new session token");
        self.set_session_token(&token);
        Ok(())
    }

    async fn fetch_token(&self, source: &CredentialSource) -> Result<String, AstraError> {
        match source {
            CredentialSource::TokenCallback(provider) => match provider.get_token().await {
                Ok(t) => Ok(t),
                Err(e) => auth_err!("token provider failed: {}", e),
            },
            CredentialSource::PasswordExchange { username, password } => {
                self.exchange_password(username, password).await
            }
            other => auth_err!("cannot obtain a token from {} credentials", other.kind()),
        }
    }

    async fn exchange_password(&self, username: &str, password: &str) -> Result<String, AstraError> {
        trace!("POST {}", self.inner.auth_url);
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        let resp = self
            .inner
            .http
            .post(&self.inner.auth_url)
            .headers(Self::standard_headers())
            .timeout(self.inner.timeout)
            .json(&body)
            .send()
            .await;
        let resp = match resp {
            Ok(r) => r,
            Err(e) => return auth_err!("error contacting auth endpoint: {}", e),
        };
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        if !(200..300).contains(&status) {
            let mut err = AstraError::new(
                AstraErrorCode::AuthenticationFailure,
                &format!("token exchange failed with http status {}", status),
            );
            err.status = Some(status);
            err.body = Some(text);
            return Err(err);
        }
        let normalized = normalize(status, &text)?;
        let ar: AuthResponse = serde_json::from_value(normalized.data).unwrap_or_default();
        match ar.auth_token {
            Some(t) if !t.is_empty() => Ok(t),
            _ => auth_err!("auth response did not contain an authToken"),
        }
    }

    fn standard_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static(requested_with()),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(user_agent()));
        headers
    }

    fn url_for(&self, path: &str) -> String {
        if path.is_empty() || path.starts_with('/') {
            format!("{}{}", self.inner.base_url, path)
        } else {
            format!("{}/{}", self.inner.base_url, path)
        }
    }

    // Send one request with whatever token is current, without checking the status.
    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        options: &RequestOptions,
    ) -> Result<RawResponse, AstraError> {
        let url = self.url_for(path);
        let mut headers = Self::standard_headers();
        let token = self.current_token();
        let value = if self.inner.auth_header == AUTHORIZATION {
            format!("Bearer {}", token)
        } else {
            token
        };
        headers.insert(self.inner.auth_header.clone(), HeaderValue::from_str(&value)?);

        trace!("{} {}", method, url);
        let mut rb = self
            .inner
            .http
            .request(method.clone(), &url)
            .headers(headers)
            .timeout(self.get_timeout(&options.timeout));
        if !options.params.is_empty() {
            rb = rb.query(&options.params);
        }
        if let Some(b) = &options.body {
            rb = rb.json(b);
        }
        let resp = rb.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        Ok(RawResponse { status, text })
    }

    fn check(raw: RawResponse) -> Result<ApiResponse, AstraError> {
        if !(200..300).contains(&raw.status) {
            return Err(AstraError::request_failed(raw.status, &raw.text));
        }
        normalize(raw.status, &raw.text)
    }

    /// Issue one http request against `path` (relative to the base URL).
    ///
    /// If the response is a 401, the client uses session tokens, and auto-reconnect is
    /// enabled, the client reauthenticates once and replays the request once. Every
    /// other failure, including a failed replay or a timeout, is returned as is.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, AstraError> {
        let raw = self.send_once(&method, path, &options).await?;
        if raw.status == 401
            && self.inner.auto_reconnect
            && !self.inner.credentials.is_application_token()
        {
            debug!("got 401 for {} {}: reconnecting", method, path);
            self.authenticate().await?;
            let retry = self.send_once(&method, path, &options).await?;
            return Self::check(retry);
        }
        Self::check(raw)
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, AstraError> {
        self.request(Method::GET, path, options).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<ApiResponse, AstraError> {
        let options = match body {
            Some(b) => options.body(b),
            None => options,
        };
        self.request(Method::POST, path, options).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<ApiResponse, AstraError> {
        self.request(Method::PUT, path, options.body(body)).await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<ApiResponse, AstraError> {
        self.request(Method::PATCH, path, options.body(body)).await
    }

    pub async fn delete(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, AstraError> {
        self.request(Method::DELETE, path, options).await
    }

    pub(crate) fn get_timeout(&self, t: &Option<Duration>) -> Duration {
        // if t is given, use that. If not, use client's timeout
        if let Some(d) = t {
            return *d;
        }
        self.inner.timeout
    }
}

impl std::fmt::Debug for ClientRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRef")
            .field("base_url", &self.base_url)
            .field("auth_url", &self.auth_url)
            .field("auth_header", &self.auth_header)
            .field("credentials", &self.credentials)
            .field("auto_reconnect", &self.auto_reconnect)
            .field("timeout", &self.timeout)
            .finish()
    }
}
