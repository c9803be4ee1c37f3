//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::client::{path_segment, Client, RequestOptions};
use crate::error::AstraError;
use reqwest::Method;
use serde_json::Value;
use std::result::Result;

/// Default base path of the schema API.
pub const SCHEMAS_BASE_PATH: &str = "/api/rest/v2/schemas";

/// Client for the schema API: keyspaces, tables, columns, indexes and
/// user-defined types. Every method returns the unwrapped response data.
#[derive(Debug, Clone)]
pub struct AstraSchemas {
    client: Client,
    base_path: String,
}

impl AstraSchemas {
    pub fn new(client: &Client) -> AstraSchemas {
        AstraSchemas {
            client: client.clone(),
            base_path: SCHEMAS_BASE_PATH.to_string(),
        }
    }

    /// Use a different base path, for servers that mount the schema API elsewhere.
    pub fn base_path(mut self, base_path: &str) -> Self {
        self.base_path = base_path.trim_end_matches('/').to_string();
        self
    }

    // Each segment is percent-encoded and appended to `{base}/keyspaces`
    async fn call(&self, method: Method, segments: &[&str], body: Option<&Value>) -> Result<Value, AstraError> {
        let mut path = format!("{}/keyspaces", self.base_path);
        for seg in segments {
            path.push('/');
            path.push_str(&path_segment(seg)?);
        }
        let mut opts = RequestOptions::new();
        if let Some(b) = body {
            opts = opts.body(b.clone());
        }
        let resp = self.client.request(method, &path, opts).await?;
        Ok(resp.data)
    }

    pub async fn get_keyspaces(&self) -> Result<Value, AstraError> {
        self.call(Method::GET, &[], None).await
    }

    pub async fn get_keyspace(&self, keyspace: &str) -> Result<Value, AstraError> {
        self.call(Method::GET, &[keyspace], None).await
    }

    pub async fn create_keyspace(&self, definition: &Value) -> Result<Value, AstraError> {
        self.call(Method::POST, &[], Some(definition)).await
    }

    pub async fn delete_keyspace(&self, keyspace: &str) -> Result<Value, AstraError> {
        self.call(Method::DELETE, &[keyspace], None).await
    }

    pub async fn create_table(&self, keyspace: &str, definition: &Value) -> Result<Value, AstraError> {
        self.call(Method::POST, &[keyspace, "tables"], Some(definition))
            .await
    }

    pub async fn get_tables(&self, keyspace: &str) -> Result<Value, AstraError> {
        self.call(Method::GET, &[keyspace, "tables"], None)
            .await
    }

    pub async fn get_table(&self, keyspace: &str, table: &str) -> Result<Value, AstraError> {
        self.call(Method::GET, &[keyspace, "tables", table], None)
            .await
    }

    pub async fn update_table(&self, keyspace: &str, table: &str, definition: &Value) -> Result<Value, AstraError> {
        self.call(
            Method::PUT,
            &[keyspace, "tables", table],
            Some(definition),
        )
        .await
    }

    pub async fn delete_table(&self, keyspace: &str, table: &str) -> Result<Value, AstraError> {
        self.call(Method::DELETE, &[keyspace, "tables", table], None)
            .await
    }

    pub async fn create_column(&self, keyspace: &str, table: &str, definition: &Value) -> Result<Value, AstraError> {
        self.call(
            Method::POST,
            &[keyspace, "tables", table, "columns"],
            Some(definition),
        )
        .await
    }

    pub async fn get_columns(&self, keyspace: &str, table: &str) -> Result<Value, AstraError> {
        self.call(
            Method::GET,
            &[keyspace, "tables", table, "columns"],
            None,
        )
        .await
    }

    pub async fn get_column(&self, keyspace: &str, table: &str, column: &str) -> Result<Value, AstraError> {
        self.call(
            Method::GET,
            &[keyspace, "tables", table, "columns", column],
            None,
        )
        .await
    }

    pub async fn update_column(
        &self,
        keyspace: &str,
        table: &str,
        column: &str,
        definition: &Value,
    ) -> Result<Value, AstraError> {
        self.call(
            Method::PUT,
            &[keyspace, "tables", table, "columns", column],
            Some(definition),
        )
        .await
    }

    pub async fn delete_column(&self, keyspace: &str, table: &str, column: &str) -> Result<Value, AstraError> {
        self.call(
            Method::DELETE,
            &[keyspace, "tables", table, "columns", column],
            None,
        )
        .await
    }

    pub async fn get_indexes(&self, keyspace: &str, table: &str) -> Result<Value, AstraError> {
        self.call(
            Method::GET,
            &[keyspace, "tables", table, "indexes"],
            None,
        )
        .await
    }

    pub async fn create_index(&self, keyspace: &str, table: &str, definition: &Value) -> Result<Value, AstraError> {
        self.call(
            Method::POST,
            &[keyspace, "tables", table, "indexes"],
            Some(definition),
        )
        .await
    }

    pub async fn delete_index(&self, keyspace: &str, table: &str, index: &str) -> Result<Value, AstraError> {
        self.call(
            Method::DELETE,
            &[keyspace, "tables", table, "indexes", index],
            None,
        )
        .await
    }

    pub async fn get_types(&self, keyspace: &str) -> Result<Value, AstraError> {
        self.call(Method::GET, &[keyspace, "types"], None)
            .await
    }

    pub async fn get_type(&self, keyspace: &str, type_name: &str) -> Result<Value, AstraError> {
        self.call(Method::GET, &[keyspace, "types", type_name], None)
            .await
    }

    pub async fn create_type(&self, keyspace: &str, definition: &Value) -> Result<Value, AstraError> {
        self.call(Method::POST, &[keyspace, "types"], Some(definition))
            .await
    }

    pub async fn update_type(&self, keyspace: &str, definition: &Value) -> Result<Value, AstraError> {
        self.call(Method::PUT, &[keyspace, "types"], Some(definition))
            .await
    }

    pub async fn delete_type(&self, keyspace: &str, type_name: &str) -> Result<Value, AstraError> {
        self.call(
            Method::DELETE,
            &[keyspace, "types", type_name],
            None,
        )
        .await
    }
}
