//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::client::Client;
use crate::compat::db::Db;
use crate::document_client::DocumentClient;
use crate::error::{config_err, ia_err, AstraError};
use derive_builder::Builder;
use std::result::Result;
use tracing::debug;
use url::Url;

/// Connection settings for a [`MongoClient`].
#[derive(Default, Clone, Builder)]
#[builder(default)]
pub struct MongoClientOptions {
    /// Namespace used by [`MongoClient::db()`] when no name is given.
    #[builder(setter(into, strip_option))]
    pub keyspace_name: Option<String>,
    #[builder(setter(into, strip_option))]
    pub application_token: Option<String>,
}

impl std::fmt::Debug for MongoClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoClientOptions")
            .field("keyspace_name", &self.keyspace_name)
            .field("application_token", &self.application_token.as_ref().map(|_| "****"))
            .finish()
    }
}

/// A document-database style client over the Astra document API.
///
/// ```no_run
/// # use astra_rust_sdk::compat::MongoClient;
/// # use serde_json::json;
/// # #[tokio::main]
/// # pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MongoClient::connect_uri(
///     "https://db-region.apps.astra.datastax.com/app?astraApplicationToken=AstraCS:...",
/// )
/// .await?;
/// let users = client.db(None)?.collection("users");
/// users.insert_one(json!({"name": "Cliff"})).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MongoClient {
    base_url: String,
    options: MongoClientOptions,
    client: Option<Client>,
}

impl MongoClient {
    pub fn new(base_url: &str, options: MongoClientOptions) -> MongoClient {
        MongoClient {
            base_url: base_url.to_string(),
            options,
            client: None,
        }
    }

    /// Split a connection URI of the form
    /// `https://host/keyspace?astraApplicationToken=<token>` into a base URL and options.
    pub fn parse_uri(uri: &str) -> Result<(String, MongoClientOptions), AstraError> {
        let parsed = Url::parse(uri)?;
        let host = match parsed.host_str() {
            Some(h) => h,
            None => return config_err!("connection uri '{}' has no host", uri),
        };
        let base_url = match parsed.port() {
            Some(p) => format!("{}://{}:{}", parsed.scheme(), host, p),
            None => format!("{}://{}", parsed.scheme(), host),
        };
        let keyspace = parsed.path().trim_matches('/');
        let token = parsed
            .query_pairs()
            .find(|(k, _)| k == "astraApplicationToken")
            .map(|(_, v)| v.into_owned());
        let options = MongoClientOptions {
            keyspace_name: if keyspace.is_empty() {
                None
            } else {
                Some(keyspace.to_string())
            },
            application_token: token,
        };
        Ok((base_url, options))
    }

    /// Parse `uri` (see [`parse_uri()`](MongoClient::parse_uri())) and connect.
    pub async fn connect_uri(uri: &str) -> Result<MongoClient, AstraError> {
        let (base_url, options) = Self::parse_uri(uri)?;
        let mut client = MongoClient::new(&base_url, options);
        client.connect().await?;
        Ok(client)
    }

    /// Build the underlying authenticated [`Client`].
    pub async fn connect(&mut self) -> Result<(), AstraError> {
        let token = match &self.options.application_token {
            Some(t) => t.clone(),
            None => return config_err!("an application token is required to connect"),
        };
        debug!("connecting to {}", self.base_url);
        let client = Client::builder()
            .base_url(&self.base_url)?
            .application_token(&token)?
            .build()
            .await?;
        self.client = Some(client);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Get a database by name, or the keyspace from the connection options.
    pub fn db(&self, name: Option<&str>) -> Result<Db, AstraError> {
        let client = match &self.client {
            Some(c) => c,
            None => return ia_err!("client is not connected: call connect() first"),
        };
        let name = match name.or(self.options.keyspace_name.as_deref()) {
            Some(n) if !n.is_empty() => n,
            _ => return ia_err!("no database name given and no keyspace configured"),
        };
        Ok(Db::new(DocumentClient::new(client).namespace(name)))
    }

    /// There are no connections to release; this only drops the transport.
    pub fn close(&mut self) {
        self.client = None;
    }
}
