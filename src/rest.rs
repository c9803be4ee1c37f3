//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::client::{encode_path, path_segment, Client, RequestOptions};
use crate::error::AstraError;
use crate::query::canonicalize;
use serde_json::Value;
use std::result::Result;

/// Default base path of the row API.
pub const REST_BASE_PATH: &str = "/api/rest/v2/keyspaces";

/// Client for the table row API.
///
/// `key_path` arguments are the primary key values joined with `/`, for example
/// `"cliff/2024"` for a table keyed on `(name, year)`.
#[derive(Debug, Clone)]
pub struct AstraRest {
    client: Client,
    base_path: String,
}

impl AstraRest {
    pub fn new(client: &Client) -> AstraRest {
        AstraRest {
            client: client.clone(),
            base_path: REST_BASE_PATH.to_string(),
        }
    }

    pub fn base_path(mut self, base_path: &str) -> Self {
        self.base_path = base_path.trim_end_matches('/').to_string();
        self
    }

    fn table_path(&self, keyspace: &str, table: &str) -> Result<String, AstraError> {
        Ok(format!(
            "{}/{}/{}",
            self.base_path,
            path_segment(keyspace)?,
            path_segment(table)?
        ))
    }

    fn row_path(&self, keyspace: &str, table: &str, key_path: &str) -> Result<String, AstraError> {
        Ok(format!(
            "{}/{}",
            self.table_path(keyspace, table)?,
            encode_path(key_path)?
        ))
    }

    /// Search a table. `query` is a filter in the same form the document API accepts;
    /// `params` are passed through as extra query parameters (`page-size`, `fields`, ...).
    pub async fn search_table(
        &self,
        keyspace: &str,
        table: &str,
        query: &Value,
        params: &[(&str, &str)],
    ) -> Result<Value, AstraError> {
        let filter = canonicalize(query)?;
        let mut opts = RequestOptions::new().param("where", &serde_json::to_string(&filter)?);
        for (k, v) in params {
            opts = opts.param(k, v);
        }
        let resp = self.client.get(&self.table_path(keyspace, table)?, opts).await?;
        Ok(resp.data)
    }

    pub async fn add_row(&self, keyspace: &str, table: &str, row: &Value) -> Result<Value, AstraError> {
        let resp = self
            .client
            .post(
                &self.table_path(keyspace, table)?,
                Some(row.clone()),
                RequestOptions::new(),
            )
            .await?;
        Ok(resp.data)
    }

    pub async fn get_rows(
        &self,
        keyspace: &str,
        table: &str,
        key_path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, AstraError> {
        let mut opts = RequestOptions::new();
        for (k, v) in params {
            opts = opts.param(k, v);
        }
        let resp = self
            .client
            .get(
                &self.row_path(keyspace, table, key_path)?,
                opts,
            )
            .await?;
        Ok(resp.data)
    }

    pub async fn replace_rows(
        &self,
        keyspace: &str,
        table: &str,
        key_path: &str,
        row: &Value,
    ) -> Result<Value, AstraError> {
        let resp = self
            .client
            .put(
                &self.row_path(keyspace, table, key_path)?,
                row.clone(),
                RequestOptions::new(),
            )
            .await?;
        Ok(resp.data)
    }

    pub async fn update_rows(
        &self,
        keyspace: &str,
        table: &str,
        key_path: &str,
        row: &Value,
    ) -> Result<Value, AstraError> {
        let resp = self
            .client
            .patch(
                &self.row_path(keyspace, table, key_path)?,
                row.clone(),
                RequestOptions::new(),
            )
            .await?;
        Ok(resp.data)
    }

    pub async fn delete_rows(&self, keyspace: &str, table: &str, key_path: &str) -> Result<Value, AstraError> {
        let resp = self
            .client
            .delete(
                &self.row_path(keyspace, table, key_path)?,
                RequestOptions::new(),
            )
            .await?;
        Ok(resp.data)
    }
}
