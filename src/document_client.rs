//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::client::{encode_path, path_segment, ApiResponse, Client, RequestOptions};
use crate::error::{ia_err, AstraError};
use crate::query::canonicalize;
use serde_derive::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::result::Result;
use std::time::Duration;
use tracing::debug;

const DEFAULT_PAGE_SIZE: u32 = 20;
const NAMESPACES_PATH: &str = "/api/rest/v2/namespaces";

/// Entry point to the path-addressed document API.
///
/// ```no_run
/// # use astra_rust_sdk::{Client, DocumentClient};
/// # use serde_json::json;
/// # #[tokio::main]
/// # pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::builder().from_environment()?.build().await?;
/// let users = DocumentClient::new(&client).namespace("app").collection("users");
/// let res = users.create(Some("cliff"), &json!({"name": "Cliff"})).await?;
/// let doc = users.get(&res.document_id).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DocumentClient {
    client: Client,
}

impl DocumentClient {
    pub fn new(client: &Client) -> DocumentClient {
        DocumentClient {
            client: client.clone(),
        }
    }

    pub fn namespace(&self, name: &str) -> Namespace {
        Namespace {
            client: self.client.clone(),
            name: name.to_string(),
        }
    }

    /// The underlying transport.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// A document namespace (keyspace).
#[derive(Debug, Clone)]
pub struct Namespace {
    client: Client,
    name: String,
}

impl Namespace {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collection(&self, name: &str) -> Collection {
        Collection {
            client: self.client.clone(),
            namespace: self.name.clone(),
            name: name.to_string(),
            timeout: None,
        }
    }

    fn collections_path(&self) -> Result<String, AstraError> {
        Ok(format!("{}/{}/collections", NAMESPACES_PATH, path_segment(&self.name)?))
    }

    /// Create an empty collection in this namespace.
    pub async fn create_collection(&self, name: &str) -> Result<Collection, AstraError> {
        path_segment(name)?;
        debug!("creating collection {}.{}", self.name, name);
        self.client
            .post(
                &self.collections_path()?,
                Some(json!({ "name": name })),
                RequestOptions::new(),
            )
            .await?;
        Ok(self.collection(name))
    }

    /// Delete a collection and all of its documents.
    pub async fn delete_collection(&self, name: &str) -> Result<(), AstraError> {
        debug!("deleting collection {}.{}", self.name, name);
        self.client
            .delete(
                &format!("{}/{}", self.collections_path()?, path_segment(name)?),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    /// List the collections in this namespace, as returned by the server.
    pub async fn list_collections(&self) -> Result<Value, AstraError> {
        let resp = self
            .client
            .get(&self.collections_path()?, RequestOptions::new())
            .await?;
        Ok(resp.data)
    }
}

/// Options for [`Collection::find()`].
#[derive(Default, Debug, Clone)]
pub struct FindOptions {
    pub(crate) page_size: Option<u32>,
    pub(crate) page_state: Option<String>,
    pub(crate) fields: Option<Vec<String>>,
}

impl FindOptions {
    pub fn new() -> FindOptions {
        FindOptions {
            ..Default::default()
        }
    }
    /// Number of documents per page. The default is 20.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
    /// Continue from the `page_state` of a previous [`FindResult`].
    pub fn page_state(mut self, page_state: &str) -> Self {
        self.page_state = Some(page_state.to_string());
        self
    }
    /// Only return the given fields of each document.
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }
}

/// One page of results from [`Collection::find()`].
#[derive(Default, Debug, Clone, PartialEq)]
pub struct FindResult {
    /// Matching documents keyed by document id, in server order.
    pub documents: Map<String, Value>,
    /// Cursor for the next page, if there is one.
    pub page_state: Option<String>,
    pub count: Option<u64>,
}

impl FindResult {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.documents.into_iter().map(|(_, v)| v).collect()
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteResult {
    #[serde(rename = "documentId", default)]
    pub document_id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(rename = "documentIds", default)]
    pub document_ids: Vec<String>,
}

/// Acknowledgment of a delete, carrying the path that was deleted.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct DeleteAck {
    pub path: String,
}

/// A collection of JSON documents addressed by path.
///
/// Paths have the form `documentId` or `documentId/nested/field`.
#[derive(Debug, Clone)]
pub struct Collection {
    client: Client,
    namespace: String,
    name: String,
    timeout: Option<Duration>,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Use the given timeout for every request made through this collection.
    pub fn timeout(mut self, t: Duration) -> Self {
        self.timeout = Some(t);
        self
    }

    fn options(&self) -> RequestOptions {
        match self.timeout {
            Some(t) => RequestOptions::new().timeout(t),
            None => RequestOptions::new(),
        }
    }

    // Namespace and collection names are encoded as single segments
    fn base_path(&self) -> Result<String, AstraError> {
        Ok(format!(
            "{}/{}/collections/{}",
            NAMESPACES_PATH,
            path_segment(&self.namespace)?,
            path_segment(&self.name)?
        ))
    }

    fn path_for(&self, path: &str) -> Result<String, AstraError> {
        if path.trim_matches('/').is_empty() {
            return ia_err!("document path must not be empty");
        }
        Ok(format!("{}/{}", self.base_path()?, encode_path(path)?))
    }

    /// Get the document (or sub-document) at `path`.
    ///
    /// Returns `None` if nothing is stored there.
    pub async fn get(&self, path: &str) -> Result<Option<Value>, AstraError> {
        let full = self.path_for(path)?;
        match self.client.get(&full, self.options()).await {
            Ok(resp) if resp.status == 204 => Ok(None),
            Ok(resp) => Ok(Some(resp.data)),
            Err(e) if e.is_status(404) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Return one page of documents matching `filter`.
    ///
    /// Literal values in the filter are treated as equality matches. An empty
    /// filter returns all documents.
    pub async fn find(&self, filter: &Value, options: &FindOptions) -> Result<FindResult, AstraError> {
        let resp = self.find_raw(filter, options, DEFAULT_PAGE_SIZE).await?;
        let documents = match resp.data {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        Ok(FindResult {
            documents,
            page_state: resp.page_state,
            count: resp.count,
        })
    }

    async fn find_raw(
        &self,
        filter: &Value,
        options: &FindOptions,
        default_page_size: u32,
    ) -> Result<ApiResponse, AstraError> {
        let filter = canonicalize(filter)?;
        let mut opts = self.options();
        if !filter.is_empty() {
            opts = opts.param("where", &serde_json::to_string(&filter)?);
        }
        let page_size = options.page_size.unwrap_or(default_page_size);
        opts = opts.param("page-size", &page_size.to_string());
        if let Some(ps) = &options.page_state {
            opts = opts.param("page-state", ps);
        }
        if let Some(f) = &options.fields {
            opts = opts.param("fields", &serde_json::to_string(f)?);
        }
        match self.client.get(&self.base_path()?, opts).await {
            Err(e) if e.is_status(404) => Ok(ApiResponse {
                status: 404,
                data: Value::Null,
                page_state: None,
                count: None,
            }),
            other => other,
        }
    }

    /// Return the first document matching `filter`, or `None`.
    pub async fn find_one(&self, filter: &Value, options: &FindOptions) -> Result<Option<Value>, AstraError> {
        Ok(self.find_one_entry(filter, options).await?.map(|(_, v)| v))
    }

    /// Like [`find_one()`](Collection::find_one()), but also returns the document id.
    pub async fn find_one_entry(
        &self,
        filter: &Value,
        options: &FindOptions,
    ) -> Result<Option<(String, Value)>, AstraError> {
        let options = FindOptions {
            page_size: Some(1),
            ..options.clone()
        };
        let resp = self.find_raw(filter, &options, 1).await?;
        match resp.data {
            Value::Object(m) => Ok(m.into_iter().next()),
            _ => Ok(None),
        }
    }

    /// Store `document`. With a path, the document is written at that path;
    /// without one, the server assigns a new document id.
    pub async fn create(&self, path: Option<&str>, document: &Value) -> Result<WriteResult, AstraError> {
        match path {
            Some(p) => self.replace(p, document).await,
            None => {
                let resp = self
                    .client
                    .post(&self.base_path()?, Some(document.clone()), self.options())
                    .await?;
                Self::write_result(resp, "")
            }
        }
    }

    /// Merge `partial` into whatever is stored at `path`.
    pub async fn update(&self, path: &str, partial: &Value) -> Result<WriteResult, AstraError> {
        let full = self.path_for(path)?;
        let resp = self.client.patch(&full, partial.clone(), self.options()).await?;
        Self::write_result(resp, path)
    }

    /// Replace whatever is stored at `path` with `document`.
    pub async fn replace(&self, path: &str, document: &Value) -> Result<WriteResult, AstraError> {
        let full = self.path_for(path)?;
        let resp = self.client.put(&full, document.clone(), self.options()).await?;
        Self::write_result(resp, path)
    }

    /// Delete whatever is stored at `path`. Deleting a missing path succeeds.
    pub async fn delete(&self, path: &str) -> Result<DeleteAck, AstraError> {
        let full = self.path_for(path)?;
        match self.client.delete(&full, self.options()).await {
            Ok(_) => {}
            Err(e) if e.is_status(404) => {
                debug!("delete of missing path {}", full);
            }
            Err(e) => return Err(e),
        }
        Ok(DeleteAck {
            path: path.to_string(),
        })
    }

    /// Write several documents in one request, using each document's `id_field`
    /// member as its document id.
    pub async fn batch(&self, documents: &[Value], id_field: &str) -> Result<BatchResult, AstraError> {
        let opts = self.options().param("id-path", id_field);
        let resp = self
            .client
            .post(
                &format!("{}/batch", self.base_path()?),
                Some(Value::Array(documents.to_vec())),
                opts,
            )
            .await?;
        Ok(serde_json::from_value(resp.data).unwrap_or_default())
    }

    /// Append `value` to the array at `path`, returning the resulting array.
    pub async fn push(&self, path: &str, value: &Value) -> Result<Value, AstraError> {
        self.function(path, json!({"operation": "$push", "value": value}))
            .await
    }

    /// Remove and return the last element of the array at `path`.
    pub async fn pop(&self, path: &str) -> Result<Value, AstraError> {
        self.function(path, json!({"operation": "$pop"})).await
    }

    async fn function(&self, path: &str, body: Value) -> Result<Value, AstraError> {
        let full = format!("{}/function", self.path_for(path)?);
        let resp = self.client.post(&full, Some(body), self.options()).await?;
        Ok(resp.data)
    }

    fn write_result(resp: ApiResponse, path: &str) -> Result<WriteResult, AstraError> {
        let mut res: WriteResult = serde_json::from_value(resp.data).unwrap_or_default();
        if res.document_id.is_empty() {
            res.document_id = document_id_of(path).to_string();
        }
        Ok(res)
    }
}

// The document id is the first segment of a document path
fn document_id_of(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_of() {
        assert_eq!(document_id_of("cliff"), "cliff");
        assert_eq!(document_id_of("/cliff/address/city"), "cliff");
        assert_eq!(document_id_of(""), "");
    }

    #[test]
    fn test_find_result_values_keep_order() {
        let mut documents = Map::new();
        documents.insert("b".to_string(), json!({"n": 2}));
        documents.insert("a".to_string(), json!({"n": 1}));
        let r = FindResult {
            documents,
            page_state: None,
            count: None,
        };
        assert_eq!(r.len(), 2);
        assert_eq!(r.into_values(), vec![json!({"n": 2}), json!({"n": 1})]);
    }

    #[test]
    fn test_find_options() {
        let o = FindOptions::new()
            .page_size(5)
            .page_state("abc")
            .fields(&["name", "age"]);
        assert_eq!(o.page_size, Some(5));
        assert_eq!(o.page_state.as_deref(), Some("abc"));
        assert_eq!(o.fields, Some(vec!["name".to_string(), "age".to_string()]));
    }
}
