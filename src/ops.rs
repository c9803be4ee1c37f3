//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::client::{path_segment, ApiResponse, Client, RequestOptions};
use crate::error::AstraError;
use reqwest::Method;
use serde_json::Value;
use std::result::Result;

/// Base URL of the Astra DevOps API.
pub const DEVOPS_BASE_URL: &str = "https://api.astra.datastax.com";

const PATH_PREFIX: &str = "/v2";

/// Client for the Astra DevOps API: databases, organization roles, users and tokens.
///
/// Unlike the other facades, every method returns the full [`ApiResponse`] so the
/// http status (for example `202 Accepted` from lifecycle operations) can be inspected.
///
/// The transport should be built with [`DEVOPS_BASE_URL`] and an application token:
/// ```no_run
/// # use astra_rust_sdk::{AstraOps, Client, DEVOPS_BASE_URL};
/// # #[tokio::main]
/// # pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::builder()
///     .base_url(DEVOPS_BASE_URL)?
///     .application_token("AstraCS:...")?
///     .build()
///     .await?;
/// let ops = AstraOps::new(&client);
/// let dbs = ops.get_databases().await?;
/// println!("status={} databases={}", dbs.status, dbs.data);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AstraOps {
    client: Client,
}

impl AstraOps {
    pub fn new(client: &Client) -> AstraOps {
        AstraOps {
            client: client.clone(),
        }
    }

    async fn call(&self, method: Method, segments: &[&str], body: Option<Value>) -> Result<ApiResponse, AstraError> {
        let mut path = PATH_PREFIX.to_string();
        for seg in segments {
            path.push('/');
            path.push_str(&path_segment(seg)?);
        }
        let mut opts = RequestOptions::new();
        if let Some(b) = body {
            opts = opts.body(b);
        }
        self.client.request(method, &path, opts).await
    }

    pub async fn get_databases(&self) -> Result<ApiResponse, AstraError> {
        self.call(Method::GET, &["databases"], None).await
    }

    pub async fn create_database(&self, definition: &Value) -> Result<ApiResponse, AstraError> {
        self.call(Method::POST, &["databases"], Some(definition.clone()))
            .await
    }

    pub async fn get_database(&self, database: &str) -> Result<ApiResponse, AstraError> {
        self.call(Method::GET, &["databases", database], None)
            .await
    }

    pub async fn create_keyspace(&self, database: &str, keyspace: &str) -> Result<ApiResponse, AstraError> {
        self.call(
            Method::POST,
            &["databases", database, "keyspaces", keyspace],
            None,
        )
        .await
    }

    pub async fn terminate_database(&self, database: &str) -> Result<ApiResponse, AstraError> {
        self.call(Method::POST, &["databases", database, "terminate"], None)
            .await
    }

    pub async fn park_database(&self, database: &str) -> Result<ApiResponse, AstraError> {
        self.call(Method::POST, &["databases", database, "park"], None)
            .await
    }

    pub async fn unpark_database(&self, database: &str) -> Result<ApiResponse, AstraError> {
        self.call(Method::POST, &["databases", database, "unpark"], None)
            .await
    }

    pub async fn resize_database(&self, database: &str, options: &Value) -> Result<ApiResponse, AstraError> {
        self.call(
            Method::POST,
            &["databases", database, "resize"],
            Some(options.clone()),
        )
        .await
    }

    pub async fn reset_database_password(
        &self,
        database: &str,
        options: &Value,
    ) -> Result<ApiResponse, AstraError> {
        self.call(
            Method::POST,
            &["databases", database, "resetPassword"],
            Some(options.clone()),
        )
        .await
    }

    pub async fn get_available_regions(&self) -> Result<ApiResponse, AstraError> {
        self.call(Method::GET, &["availableRegions"], None).await
    }

    pub async fn get_roles(&self) -> Result<ApiResponse, AstraError> {
        self.call(Method::GET, &["organizations", "roles"], None).await
    }

    pub async fn create_role(&self, definition: &Value) -> Result<ApiResponse, AstraError> {
        self.call(Method::POST, &["organizations", "roles"], Some(definition.clone()))
            .await
    }

    pub async fn get_role(&self, role: &str) -> Result<ApiResponse, AstraError> {
        self.call(Method::GET, &["organizations", "roles", role], None)
            .await
    }

    pub async fn update_role(&self, role: &str, definition: &Value) -> Result<ApiResponse, AstraError> {
        self.call(
            Method::PUT,
            &["organizations", "roles", role],
            Some(definition.clone()),
        )
        .await
    }

    pub async fn delete_role(&self, role: &str) -> Result<ApiResponse, AstraError> {
        self.call(Method::DELETE, &["organizations", "roles", role], None)
            .await
    }

    pub async fn invite_user(&self, definition: &Value) -> Result<ApiResponse, AstraError> {
        self.call(Method::PUT, &["organizations", "users"], Some(definition.clone()))
            .await
    }

    pub async fn get_users(&self) -> Result<ApiResponse, AstraError> {
        self.call(Method::GET, &["organizations", "users"], None).await
    }

    pub async fn get_user(&self, user: &str) -> Result<ApiResponse, AstraError> {
        self.call(Method::GET, &["organizations", "users", user], None)
            .await
    }

    pub async fn remove_user(&self, user: &str) -> Result<ApiResponse, AstraError> {
        self.call(Method::DELETE, &["organizations", "users", user], None)
            .await
    }

    pub async fn update_user_roles(&self, user: &str, roles: &Value) -> Result<ApiResponse, AstraError> {
        self.call(
            Method::PUT,
            &["organizations", "users", user, "roles"],
            Some(roles.clone()),
        )
        .await
    }

    /// List the client id / secret pairs (tokens) of the organization.
    pub async fn get_clients(&self) -> Result<ApiResponse, AstraError> {
        self.call(Method::GET, &["clientIdSecrets"], None).await
    }

    pub async fn create_token(&self, roles: &Value) -> Result<ApiResponse, AstraError> {
        self.call(Method::POST, &["clientIdSecrets"], Some(roles.clone()))
            .await
    }

    pub async fn delete_token(&self, client_id: &str) -> Result<ApiResponse, AstraError> {
        self.call(Method::DELETE, &["clientIdSecrets", client_id], None)
            .await
    }

    pub async fn get_organization(&self) -> Result<ApiResponse, AstraError> {
        self.call(Method::GET, &["currentOrg"], None).await
    }
}
