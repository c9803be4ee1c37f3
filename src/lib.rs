//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Astra Rust SDK
//!
//! This is a Rust SDK for [DataStax Astra](https://astra.datastax.com) and
//! [Stargate](https://stargate.io) HTTP APIs. It provides:
//!
//! - an authenticated HTTP transport ([`Client`]) that attaches the right credential
//!   to every request and transparently reauthenticates when a session token expires,
//! - a path-addressed JSON document client ([`DocumentClient`]),
//! - a document-database style compatibility layer ([`compat`]) that translates
//!   familiar filter and update expressions into document API calls,
//! - thin clients for the schema ([`AstraSchemas`]), table row ([`AstraRest`]),
//!   GraphQL ([`AstraGraphQL`]) and DevOps ([`AstraOps`]) APIs.
//!
//! This SDK supplies and uses Rust `async` methods throughout, using the [tokio](https://crates.io/crates/tokio) runtime. There is currently no blocking support.
//!
//! The general flow for an application is:
//! - Create a [`ClientBuilder`] with all needed parameters
//! - Create a [`Client`] from the [`ClientBuilder`] that will be used throughout the application, across all tasks
//! - Wrap the [`Client`] in the API client(s) you need, such as [`DocumentClient`] or [`compat::MongoClient`]
//!
//! ## Simple Example
//! The following code creates a [`Client`] from values in the current environment, stores a
//! document, and reads it back.
//! ```no_run
//! use astra_rust_sdk::{Client, DocumentClient};
//! use serde_json::json;
//! use std::error::Error;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn Error>> {
//!     let client = Client::builder()
//!         .from_environment()?
//!         .build().await?;
//!     let users = DocumentClient::new(&client)
//!         .namespace("app")
//!         .collection("users");
//!     users.create(Some("cliff"), &json!({"name": "Cliff", "age": 42})).await?;
//!     let doc = users.get("cliff").await?;
//!     println!("doc={:?}", doc);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuring the SDK
//!
//! ### Base URL
//!
//! Every request path is appended to a base URL. Set it directly with
//! [`ClientBuilder::base_url()`], or give a database id and region with
//! [`ClientBuilder::database_id()`] and [`ClientBuilder::database_region()`], in which case the
//! base URL is `https://<database id>-<region>.apps.astra.datastax.com`. An explicit base URL wins.
//!
//! ### Credentials
//!
//! Exactly one credential source is used, chosen in this order:
//!
//! 1. An application token ([`ClientBuilder::application_token()`]). It is sent as
//!    `Authorization: Bearer <token>` and never refreshed.
//! 2. An existing session token ([`ClientBuilder::auth_token()`]), sent as `X-Cassandra-Token`.
//!    If a token provider or username/password is also configured, it is used to get a new
//!    token when this one expires.
//! 3. A [`TokenProvider`] callback ([`ClientBuilder::token_provider()`]).
//! 4. A username and password ([`ClientBuilder::credentials()`]), exchanged for a session token
//!    at `<base url>/api/rest/v1/auth` (or [`ClientBuilder::auth_url()`]).
//!
//! When a request using a session token gets an HTTP 401, the client reauthenticates once and
//! replays the request once. This can be turned off with [`ClientBuilder::auto_reconnect()`].
//! A [`TokenPersister`] can be given to be told about every new session token.
//!
//! ### Environment and config file
//!
//! [`ClientBuilder::from_environment()`] reads `ASTRA_BASE_URL`, `ASTRA_DB_ID`, `ASTRA_DB_REGION`,
//! `ASTRA_AUTH_URL`, `ASTRA_DB_APPLICATION_TOKEN`, `ASTRA_DB_USERNAME` and `ASTRA_DB_PASSWORD`.
//! [`ClientBuilder::from_config_file()`] reads the same keys from a section of an ini file:
//!
//! ```ini
//! [default]
//! ASTRA_DB_ID=3c8ba5b5-1a32-4a97-b2b8-2e7a0b1c1e55
//! ASTRA_DB_REGION=us-east1
//! ASTRA_DB_APPLICATION_TOKEN=AstraCS:...
//! ```
//!
//! [`ClientBuilder::from_default_config_file()`] reads `~/.astrarc`, using the section named by
//! `ASTRA_RC_SECTION` (or `default`). Later builder calls override earlier ones:
//! ```no_run
//! # use astra_rust_sdk::Client;
//! # use std::time::Duration;
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::builder()
//!     .timeout(Duration::from_secs(5))?
//!     .from_default_config_file()?
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Local Stargate
//!
//! ```no_run
//! # use astra_rust_sdk::Client;
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::builder()
//!     .base_url("http://localhost:8082")?
//!     .auth_url("http://localhost:8081/v1/auth")?
//!     .credentials("cassandra", "cassandra")?
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Documents
//!
//! Documents are JSON values addressed by path: `documentId` or `documentId/nested/field`.
//! [`Collection::get()`] returns `None` for a missing path, [`Collection::update()`] merges,
//! [`Collection::replace()`] overwrites, and [`Collection::delete()`] succeeds whether or not
//! anything was stored. [`Collection::find()`] takes a filter where plain values mean equality:
//! `{"age": 42}` is the same query as `{"age": {"$eq": 42}}`.
//!
//! ## Compatibility layer
//!
//! The [`compat`] module offers `insert_one`, `update_one`, `find`, `delete_many` and friends.
//! Some of these are emulated client-side and are not atomic; see [`compat::Capabilities`].
//!
//! ## Quickstart
//!
//! The `demos/quickstart` and `demos/compat` programs in the source tree can be used as
//! templates. Run them with:
//! ```text
//! ASTRA_DB_ID=... ASTRA_DB_REGION=... ASTRA_DB_APPLICATION_TOKEN=... cargo run --example quickstart
//! ```
//!
//! ## Logging
//!
//! The SDK logs through [tracing](https://crates.io/crates/tracing): client construction and
//! reauthentication at `debug`, every request at `trace`, and swallowed per-document failures of
//! multi-document operations at `warn`.
//!
//! ## License
//!
//! Copyright (C) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//!
//! This SDK is licensed under the Universal Permissive License 1.0. See
//! [LICENSE](https://oss.oracle.com/licenses/upl/) for details.
//!

pub(crate) mod client_builder;
pub use crate::client_builder::{
    astra_database_url, ClientBuilder, DEFAULT_AUTH_HEADER, DEFAULT_AUTH_PATH, DEFAULT_TIMEOUT,
};

pub(crate) mod client;
pub use crate::client::{normalize, ApiResponse, Client, RequestOptions};

pub(crate) mod astra_client;
pub use crate::astra_client::AstraClient;

pub(crate) mod auth_common;
pub use crate::auth_common::credentials::CredentialSource;
pub use crate::auth_common::token_provider::{TokenFuture, TokenPersister, TokenProvider};

pub mod compat;

pub(crate) mod document_client;
pub use crate::document_client::{
    BatchResult, Collection, DeleteAck, DocumentClient, FindOptions, FindResult, Namespace,
    WriteResult,
};

pub(crate) mod error;
pub use crate::error::{AstraError, AstraErrorCode};

pub(crate) mod graphql;
pub use crate::graphql::AstraGraphQL;

pub(crate) mod ops;
pub use crate::ops::{AstraOps, DEVOPS_BASE_URL};

pub mod query;
pub use crate::query::{QueryOptions, QueryOptionsBuilder};

pub(crate) mod rest;
pub use crate::rest::{AstraRest, REST_BASE_PATH};

pub(crate) mod schemas;
pub use crate::schemas::{AstraSchemas, SCHEMAS_BASE_PATH};
