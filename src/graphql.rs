//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::client::{path_segment, Client, RequestOptions};
use crate::error::{ia_err, AstraError, AstraErrorCode};
use serde_json::{json, Value};
use std::result::Result;

const SCHEMA_PATH: &str = "/api/graphql-schema";
const KEYSPACE_PATH: &str = "/api/graphql";

/// Passthrough client for the GraphQL endpoints.
///
/// Queries are posted through the authenticated [`Client`], so they get the same
/// credential handling (including reauthentication) as every other request.
#[derive(Debug, Clone)]
pub struct AstraGraphQL {
    client: Client,
}

impl AstraGraphQL {
    pub fn new(client: &Client) -> AstraGraphQL {
        AstraGraphQL {
            client: client.clone(),
        }
    }

    /// URL of the schema endpoint.
    pub fn schema_url(&self) -> String {
        format!("{}{}", self.client.base_url(), SCHEMA_PATH)
    }

    /// URL of the data endpoint for one keyspace.
    pub fn keyspace_url(&self, keyspace: &str) -> String {
        format!(
            "{}{}/{}",
            self.client.base_url(),
            KEYSPACE_PATH,
            urlencoding::encode(keyspace)
        )
    }

    /// Run a query or mutation against the schema endpoint.
    pub async fn execute_schema(&self, query: &str, variables: Option<&Value>) -> Result<Value, AstraError> {
        self.execute(SCHEMA_PATH, query, variables).await
    }

    /// Run a query or mutation against a keyspace's data endpoint.
    pub async fn execute_keyspace(
        &self,
        keyspace: &str,
        query: &str,
        variables: Option<&Value>,
    ) -> Result<Value, AstraError> {
        if keyspace.is_empty() {
            return ia_err!("keyspace must not be empty");
        }
        self.execute(&format!("{}/{}", KEYSPACE_PATH, path_segment(keyspace)?), query, variables)
            .await
    }

    /// Post `{query, variables}` to `path` and return the `data` member of the result.
    ///
    /// A response with no data and a list of `errors` is returned as an error.
    pub async fn execute(&self, path: &str, query: &str, variables: Option<&Value>) -> Result<Value, AstraError> {
        let body = json!({
            "query": query,
            "variables": variables.cloned().unwrap_or(json!({})),
        });
        let resp = self
            .client
            .post(path, Some(body), RequestOptions::new())
            .await?;
        if let Some(errors) = resp.data.get("errors").filter(|e| e.is_array()) {
            let mut err = AstraError::new(
                AstraErrorCode::RequestFailed,
                &format!("graphql request returned errors: {}", errors),
            );
            err.status = Some(resp.status);
            err.body = Some(resp.data.to_string());
            return Err(err);
        }
        Ok(resp.data)
    }
}
