//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Builder for creating an [`Astra Client`](crate::Client)
//!

use std::collections::HashMap;
use std::default::Default;
use std::env;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::auth_common::config_file::{default_section, load_section, DEFAULT_CONFIG_FILE_PATH};
use crate::auth_common::credentials::CredentialSource;
use crate::auth_common::token_provider::{TokenPersister, TokenProvider};
use crate::client::Client;
use crate::error::{config_err, ia_err, AstraError};
use reqwest::header::HeaderName;
use url::Url;

/// Path appended to the base URL to form the authentication endpoint, if no
/// separate auth URL is given.
pub const DEFAULT_AUTH_PATH: &str = "/api/rest/v1/auth";
/// Header used to carry session tokens.
pub const DEFAULT_AUTH_HEADER: &str = "X-Cassandra-Token";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder used to set all the parameters to create an Astra [`Client`](crate::Client).
///
/// A base URL is required, either directly via [`base_url()`](ClientBuilder::base_url())
/// or derived from [`database_id()`](ClientBuilder::database_id()) and
/// [`database_region()`](ClientBuilder::database_region()). At least one credential
/// source is required. Later calls override earlier ones, so defaults may be set in
/// code and then overridden with [`from_environment()`](ClientBuilder::from_environment()).
#[derive(Default, Clone)]
pub struct ClientBuilder {
    pub(crate) base_url: Option<String>,
    pub(crate) database_id: Option<String>,
    pub(crate) database_region: Option<String>,
    pub(crate) auth_url: Option<String>,
    pub(crate) auth_header: Option<String>,
    pub(crate) auto_reconnect: Option<bool>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) client: Option<reqwest::Client>,
    pub(crate) application_token: Option<String>,
    pub(crate) auth_token: Option<String>,
    pub(crate) token_provider: Option<Arc<dyn TokenProvider>>,
    pub(crate) token_persister: Option<Arc<dyn TokenPersister>>,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
    // For error messaging
    pub(crate) from_environment: bool,
}

impl ClientBuilder {
    /// Create a new ClientBuilder struct.
    pub fn new() -> Self {
        ClientBuilder {
            ..Default::default()
        }
    }
    /// Build a new [`Client`].
    ///
    /// This validates the configuration and, for token-callback and username/password
    /// credentials, obtains the first session token. No other network calls are made.
    pub async fn build(self) -> Result<Client, AstraError> {
        Client::new(&self).await
    }
    /// Gather configuration settings from the current environment.
    ///
    /// The following environment variables are used:
    ///
    /// | variable | description |
    /// | -------- | ----------- |
    /// | `ASTRA_BASE_URL` | The base URL. See [`ClientBuilder::base_url()`]. |
    /// | `ASTRA_DB_ID` | The database id. See [`ClientBuilder::database_id()`]. |
    /// | `ASTRA_DB_REGION` | The database region. See [`ClientBuilder::database_region()`]. |
    /// | `ASTRA_AUTH_URL` | A separate authentication URL. See [`ClientBuilder::auth_url()`]. |
    /// | `ASTRA_DB_APPLICATION_TOKEN` | An application token. See [`ClientBuilder::application_token()`]. |
    /// | `ASTRA_DB_USERNAME` | Username for token exchange. See [`ClientBuilder::credentials()`]. |
    /// | `ASTRA_DB_PASSWORD` | Password for token exchange. |
    ///
    pub fn from_environment(mut self) -> Result<Self, AstraError> {
        self.from_environment = true;
        self.apply_settings(|key| env::var(key).ok())
    }
    /// Gather configuration settings from a section of an ini-style file such as `~/.astrarc`.
    ///
    /// The file uses the same keys as [`from_environment()`](ClientBuilder::from_environment()):
    ///```ini
    /// [default]
    /// ASTRA_DB_ID=3c8ba5b5-1a32-4a97-b2b8-2e7a0b1c1e55
    /// ASTRA_DB_REGION=us-east1
    /// ASTRA_DB_APPLICATION_TOKEN=AstraCS:...
    ///```
    pub fn from_config_file(self, config_file: &str, section: &str) -> Result<Self, AstraError> {
        let settings = load_section(config_file, section)?;
        self.apply_settings(|key| settings.get(key).cloned())
    }
    /// Gather configuration settings from `~/.astrarc`, using the section named by the
    /// `ASTRA_RC_SECTION` environment variable (or `default`).
    pub fn from_default_config_file(self) -> Result<Self, AstraError> {
        let section = default_section();
        self.from_config_file(DEFAULT_CONFIG_FILE_PATH, &section)
    }
    pub(crate) fn apply_settings<F>(mut self, lookup: F) -> Result<Self, AstraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("ASTRA_BASE_URL") {
            self = self.base_url(&val)?;
        }
        if let Some(val) = lookup("ASTRA_DB_ID") {
            self = self.database_id(&val)?;
        }
        if let Some(val) = lookup("ASTRA_DB_REGION") {
            self = self.database_region(&val)?;
        }
        if let Some(val) = lookup("ASTRA_AUTH_URL") {
            self = self.auth_url(&val)?;
        }
        if let Some(val) = lookup("ASTRA_DB_APPLICATION_TOKEN") {
            self = self.application_token(&val)?;
        }
        if let Some(val) = lookup("ASTRA_DB_USERNAME") {
            self.username = Some(val);
        }
        if let Some(val) = lookup("ASTRA_DB_PASSWORD") {
            self.password = Some(val);
        }
        Ok(self)
    }
    /// Set the base URL all request paths are appended to.
    ///
    /// Examples:
    /// ```text
    ///     // Astra database
    ///     https://<database id>-<region>.apps.astra.datastax.com
    ///
    ///     // Astra DevOps API
    ///     https://api.astra.datastax.com
    ///
    ///     // Local Stargate
    ///     http://localhost:8082
    /// ```
    /// An explicit base URL takes precedence over one derived from a database id and region.
    pub fn base_url(mut self, base_url: &str) -> Result<Self, AstraError> {
        self.base_url = Some(normalize_url(base_url)?);
        Ok(self)
    }
    /// Set the Astra database id used to derive the base URL.
    pub fn database_id(mut self, database_id: &str) -> Result<Self, AstraError> {
        self.database_id = Some(database_id.to_string());
        Ok(self)
    }
    /// Set the Astra database region used to derive the base URL.
    pub fn database_region(mut self, region: &str) -> Result<Self, AstraError> {
        self.database_region = Some(region.to_string());
        Ok(self)
    }
    /// Set a separate URL for the username/password token exchange.
    ///
    /// By default the exchange is posted to the base URL plus [`DEFAULT_AUTH_PATH`].
    pub fn auth_url(mut self, auth_url: &str) -> Result<Self, AstraError> {
        self.auth_url = Some(normalize_url(auth_url)?);
        Ok(self)
    }
    /// Override the name of the header used to carry the credential.
    ///
    /// By default session tokens are sent in `X-Cassandra-Token` and application tokens
    /// in `Authorization: Bearer <token>`. If the header given here is `Authorization`,
    /// the `Bearer` prefix is added; otherwise the bare token is sent.
    pub fn auth_header_name(mut self, name: &str) -> Result<Self, AstraError> {
        if let Err(e) = HeaderName::from_bytes(name.as_bytes()) {
            return ia_err!("invalid auth header name '{}': {}", name, e);
        }
        self.auth_header = Some(name.to_string());
        Ok(self)
    }
    /// Use a long-lived application token. Application tokens are never refreshed.
    pub fn application_token(mut self, token: &str) -> Result<Self, AstraError> {
        self.application_token = Some(token.to_string());
        Ok(self)
    }
    /// Use an existing session token, for example one cached by a [`TokenPersister`].
    ///
    /// If [`credentials()`](ClientBuilder::credentials()) or a
    /// [`token_provider()`](ClientBuilder::token_provider()) is also given, it is used to
    /// reauthenticate when the session token expires.
    pub fn auth_token(mut self, token: &str) -> Result<Self, AstraError> {
        self.auth_token = Some(token.to_string());
        Ok(self)
    }
    /// Specify username and password to exchange for session tokens.
    pub fn credentials(mut self, username: &str, password: &str) -> Result<Self, AstraError> {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        Ok(self)
    }
    /// Specify a callback used to get session tokens.
    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Result<Self, AstraError> {
        self.token_provider = Some(provider);
        Ok(self)
    }
    /// Specify a hook called with every new session token.
    pub fn token_persister(
        mut self,
        persister: Arc<dyn TokenPersister>,
    ) -> Result<Self, AstraError> {
        self.token_persister = Some(persister);
        Ok(self)
    }
    /// Enable or disable reauthentication after an HTTP 401. Enabled by default.
    pub fn auto_reconnect(mut self, auto_reconnect: bool) -> Result<Self, AstraError> {
        self.auto_reconnect = Some(auto_reconnect);
        Ok(self)
    }
    /// Specify the timeout used for requests.
    ///
    /// Note that the timeout can also be set on a per-request basis with
    /// [`RequestOptions::timeout()`](crate::RequestOptions::timeout()).
    ///
    /// The default timeout is 10 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Result<Self, AstraError> {
        if timeout.is_zero() {
            return ia_err!("timeout must be greater than zero");
        }
        self.timeout = Some(timeout);
        Ok(self)
    }
    /// Specify a [`reqwest::Client`] to use for all http/s connections.
    ///
    /// By default, the [`Client`] creates an internal [`reqwest::Client`] to use for
    /// all communications. If your application already has a reqwest Client, you can pass that
    /// into the ClientBuilder to avoid creating multiple connection pools.
    pub fn reqwest_client(mut self, client: &reqwest::Client) -> Result<Self, AstraError> {
        self.client = Some(client.clone());
        Ok(self)
    }

    // Return the base URL: explicit, or derived from database id and region.
    pub(crate) fn resolve_base_url(&self) -> Result<String, AstraError> {
        if let Some(u) = &self.base_url {
            return Ok(u.clone());
        }
        match (&self.database_id, &self.database_region) {
            (Some(id), Some(region)) if !id.is_empty() && !region.is_empty() => {
                normalize_url(&astra_database_url(id, region))
            }
            _ => {
                if self.from_environment {
                    config_err!("base url required: set ASTRA_BASE_URL, or ASTRA_DB_ID and ASTRA_DB_REGION")
                } else {
                    config_err!("base url required: call ClientBuilder::base_url(), or ClientBuilder::database_id() and ClientBuilder::database_region()")
                }
            }
        }
    }

    pub(crate) fn resolve_credentials(&self) -> Result<CredentialSource, AstraError> {
        CredentialSource::resolve(
            self.application_token.as_deref(),
            self.auth_token.as_deref(),
            self.token_provider.as_ref(),
            self.username.as_deref(),
            self.password.as_deref(),
        )
    }
}

/// The hostname of an Astra database's data APIs.
pub fn astra_database_url(database_id: &str, region: &str) -> String {
    format!("https://{}-{}.apps.astra.datastax.com", database_id, region)
}

// Validate a URL and strip any trailing slash, so paths can simply be appended.
fn normalize_url(u: &str) -> Result<String, AstraError> {
    let parsed = Url::parse(u)?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return config_err!("url '{}' has no host", u);
    }
    Ok(u.trim_end_matches('/').to_string())
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut creds: HashMap<&str, bool> = HashMap::new();
        creds.insert("application_token", self.application_token.is_some());
        creds.insert("auth_token", self.auth_token.is_some());
        creds.insert("token_provider", self.token_provider.is_some());
        creds.insert("username", self.username.is_some());
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("database_id", &self.database_id)
            .field("database_region", &self.database_region)
            .field("auth_url", &self.auth_url)
            .field("auth_header", &self.auth_header)
            .field("auto_reconnect", &self.auto_reconnect)
            .field("timeout", &self.timeout)
            .field("credentials_set", &creds)
            .finish()
    }
}
