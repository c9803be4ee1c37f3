//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::client::path_segment;
use crate::compat::cursor::FindCursor;
use crate::compat::object_id::new_object_id;
use crate::document_client::{self, FindOptions};
use crate::error::{ia_err, unsupported_err, AstraError, AstraErrorCode};
use crate::query::{canonicalize_filter, lookup_dotted, QueryOptions, UpdateSpec};
use derive_builder::Builder;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::result::Result;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Which version of a document an update returns.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnDocument {
    /// The document as it was before the update.
    #[default]
    Before,
    /// The document as it is after the update.
    After,
}

/// Options for the update and replace operations of a compat [`Collection`].
#[derive(Default, Debug, Clone, Builder)]
#[builder(default)]
pub struct UpdateOptions {
    /// Insert when nothing matches. Not supported: requesting it is an error.
    pub upsert: bool,
    pub return_document: ReturnDocument,
    #[builder(setter(strip_option))]
    pub collation: Option<Value>,
}

impl UpdateOptions {
    fn query_options(&self) -> QueryOptions {
        QueryOptions {
            collation: self.collation.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertOneResult {
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertManyResult {
    pub inserted_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
    /// The matched document, before or after the update per [`ReturnDocument`].
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteResult {
    pub deleted_count: u64,
    /// The deleted document, for single-document deletes.
    pub value: Option<Value>,
}

/// What a compat [`Collection`] can do natively. All of these are `false`:
/// increments and multi-document updates are emulated client-side, and the
/// rest are unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub atomic_increment: bool,
    pub native_update_many: bool,
    pub upsert: bool,
    pub collation: bool,
    pub streaming_cursor: bool,
}

/// A document-database style collection, emulated on top of a
/// [`document_client::Collection`].
///
/// Documents are addressed by their document id, which for documents inserted
/// through this type is the `_id` member. Note that increments and multi-document
/// updates are emulated client-side and are not atomic: see [`Collection::capabilities()`].
#[derive(Debug, Clone)]
pub struct Collection {
    pub(crate) inner: document_client::Collection,
}

impl Collection {
    pub(crate) fn new(inner: document_client::Collection) -> Collection {
        Collection { inner }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// The underlying path-addressed collection.
    pub fn documents(&self) -> &document_client::Collection {
        &self.inner
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            atomic_increment: false,
            native_update_many: false,
            upsert: false,
            collation: false,
            streaming_cursor: false,
        }
    }

    /// Insert one document, assigning a new object id to `_id` if it has none.
    pub async fn insert_one(&self, document: Value) -> Result<InsertOneResult, AstraError> {
        let (id, doc) = with_object_id(document)?;
        let res = self.inner.create(Some(&id), &doc).await?;
        let inserted_id = if res.document_id.is_empty() {
            id
        } else {
            res.document_id
        };
        Ok(InsertOneResult { inserted_id })
    }

    /// Insert several documents in one batch request.
    pub async fn insert_many(&self, documents: Vec<Value>) -> Result<InsertManyResult, AstraError> {
        let mut ids = Vec::with_capacity(documents.len());
        let mut docs = Vec::with_capacity(documents.len());
        for d in documents {
            let (id, doc) = with_object_id(d)?;
            ids.push(id);
            docs.push(doc);
        }
        let res = self.inner.batch(&docs, "_id").await?;
        let inserted_ids = if res.document_ids.is_empty() {
            ids
        } else {
            res.document_ids
        };
        Ok(InsertManyResult { inserted_ids })
    }

    /// Apply `update` to the first document matching `filter`.
    ///
    /// Returns `None` if nothing matches. `$set` and plain members are merged into
    /// the document; `$inc` is applied locally from the fetched value and written back.
    pub async fn update_one(
        &self,
        filter: &Value,
        update: &Value,
        options: &UpdateOptions,
    ) -> Result<Option<UpdateResult>, AstraError> {
        if options.upsert {
            return unsupported_err!("upsert is not supported");
        }
        let filter = canonicalize_filter(filter, &options.query_options())?;
        let spec = UpdateSpec::parse(update)?;
        let (id, before) = match self
            .inner
            .find_one_entry(&Value::Object(filter), &FindOptions::new())
            .await?
        {
            Some(e) => e,
            None => return Ok(None),
        };
        let patch = spec.patch_for(&before)?;
        let after = spec.apply(&before)?;
        debug!("updating document {} in {}", id, self.name());
        self.inner.update(&id, &Value::Object(patch)).await?;
        let value = match options.return_document {
            ReturnDocument::Before => before,
            ReturnDocument::After => after,
        };
        Ok(Some(UpdateResult {
            matched_count: 1,
            modified_count: 1,
            value: Some(value),
        }))
    }

    pub async fn find_one_and_update(
        &self,
        filter: &Value,
        update: &Value,
        options: &UpdateOptions,
    ) -> Result<Option<UpdateResult>, AstraError> {
        self.update_one(filter, update, options).await
    }

    /// Apply `update` to every document matching `filter`.
    ///
    /// The updates are sent concurrently. A failure to update one document is
    /// logged and does not stop the others.
    pub async fn update_many(
        &self,
        filter: &Value,
        update: &Value,
        options: &UpdateOptions,
    ) -> Result<(), AstraError> {
        if options.upsert {
            return unsupported_err!("upsert is not supported");
        }
        let filter = canonicalize_filter(filter, &options.query_options())?;
        let spec = UpdateSpec::parse(update)?;
        let matches = self.find_all(&Value::Object(filter)).await?;
        debug!("updating {} documents in {}", matches.len(), self.name());

        let mut set = JoinSet::new();
        for (id, doc) in matches {
            let patch = match spec.patch_for(&doc) {
                Ok(p) => p,
                Err(e) => {
                    warn!("skipping update of document {}: {}", id, e);
                    continue;
                }
            };
            let inner = self.inner.clone();
            set.spawn(async move {
                let res = inner.update(&id, &Value::Object(patch)).await;
                (id, res)
            });
        }
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, Ok(_))) => {}
                Ok((id, Err(e))) => warn!("update of document {} failed: {}", id, e),
                Err(e) => warn!("update task failed: {}", e),
            }
        }
        Ok(())
    }

    /// Replace the first document matching `filter` with `document`.
    pub async fn replace_one(
        &self,
        filter: &Value,
        document: &Value,
        options: &UpdateOptions,
    ) -> Result<Option<UpdateResult>, AstraError> {
        if options.upsert {
            return unsupported_err!("upsert is not supported");
        }
        let filter = canonicalize_filter(filter, &options.query_options())?;
        let (id, before) = match self
            .inner
            .find_one_entry(&Value::Object(filter), &FindOptions::new())
            .await?
        {
            Some(e) => e,
            None => return Ok(None),
        };
        self.inner.replace(&id, document).await?;
        let value = match options.return_document {
            ReturnDocument::Before => before,
            ReturnDocument::After => document.clone(),
        };
        Ok(Some(UpdateResult {
            matched_count: 1,
            modified_count: 1,
            value: Some(value),
        }))
    }

    /// Return a cursor over the documents matching `filter`. Nothing is fetched
    /// until the cursor is consumed.
    pub fn find(&self, filter: &Value, options: &QueryOptions) -> Result<FindCursor, AstraError> {
        let filter = canonicalize_filter(filter, options)?;
        let mut find_options = FindOptions::new();
        if let Some(n) = options.page_size {
            find_options = find_options.page_size(n);
        }
        if let Some(ps) = &options.page_state {
            find_options = find_options.page_state(ps);
        }
        Ok(FindCursor::new(self.inner.clone(), filter, find_options))
    }

    pub async fn find_one(&self, filter: &Value, options: &QueryOptions) -> Result<Option<Value>, AstraError> {
        let filter = canonicalize_filter(filter, options)?;
        self.inner
            .find_one(&Value::Object(filter), &FindOptions::new())
            .await
    }

    /// The distinct values of `field` over all documents matching `filter`.
    ///
    /// Array values are flattened. Values are returned in the order first seen.
    pub async fn distinct(&self, field: &str, filter: &Value) -> Result<Vec<Value>, AstraError> {
        let matches = self.find_all(filter).await?;
        let mut out: Vec<Value> = Vec::new();
        for (_, doc) in &matches {
            let candidates = match lookup_dotted(doc, field) {
                None => continue,
                Some(Value::Array(a)) => a.clone(),
                Some(v) => vec![v.clone()],
            };
            for c in candidates {
                if !out.contains(&c) {
                    out.push(c);
                }
            }
        }
        Ok(out)
    }

    /// Count the documents matching `filter`.
    ///
    /// This is the server-reported count when there is one; otherwise it is the
    /// number of documents in the first page of results, so it may undercount.
    pub async fn count_documents(&self, filter: &Value, options: &QueryOptions) -> Result<u64, AstraError> {
        let filter = canonicalize_filter(filter, options)?;
        let mut find_options = FindOptions::new();
        if let Some(n) = options.page_size {
            find_options = find_options.page_size(n);
        }
        let res = self
            .inner
            .find(&Value::Object(filter), &find_options)
            .await?;
        Ok(res.count.unwrap_or(res.documents.len() as u64))
    }

    pub async fn count(&self, filter: &Value, options: &QueryOptions) -> Result<u64, AstraError> {
        self.count_documents(filter, options).await
    }

    /// Indexes are managed by the server. The index specification is returned as is.
    pub async fn create_index(&self, index: Value) -> Result<Value, AstraError> {
        Ok(index)
    }

    /// Delete the first document matching `filter`, returning it.
    pub async fn find_one_and_delete(
        &self,
        filter: &Value,
        options: &QueryOptions,
    ) -> Result<Option<DeleteResult>, AstraError> {
        let filter = canonicalize_filter(filter, options)?;
        let (id, doc) = match self
            .inner
            .find_one_entry(&Value::Object(filter), &FindOptions::new())
            .await?
        {
            Some(e) => e,
            None => return Ok(None),
        };
        self.inner.delete(&id).await?;
        Ok(Some(DeleteResult {
            deleted_count: 1,
            value: Some(doc),
        }))
    }

    pub async fn delete_one(&self, filter: &Value, options: &QueryOptions) -> Result<Option<DeleteResult>, AstraError> {
        self.find_one_and_delete(filter, options).await
    }

    pub async fn find_one_and_remove(
        &self,
        filter: &Value,
        options: &QueryOptions,
    ) -> Result<Option<DeleteResult>, AstraError> {
        self.find_one_and_delete(filter, options).await
    }

    /// Delete every document matching `filter`.
    ///
    /// The deletes are sent concurrently. If any of them fails, the failure is
    /// logged and `None` is returned; documents already deleted stay deleted.
    pub async fn delete_many(&self, filter: &Value, options: &QueryOptions) -> Result<Option<DeleteResult>, AstraError> {
        let filter = canonicalize_filter(filter, options)?;
        let matches = self.find_all(&Value::Object(filter)).await?;
        debug!("deleting {} documents from {}", matches.len(), self.name());

        let mut set = JoinSet::new();
        for (id, _) in matches {
            let inner = self.inner.clone();
            set.spawn(async move {
                let res = inner.delete(&id).await;
                (id, res)
            });
        }
        let mut deleted = 0u64;
        let mut failed = false;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, Ok(_))) => deleted += 1,
                Ok((id, Err(e))) => {
                    warn!("delete of document {} failed: {}", id, e);
                    failed = true;
                }
                Err(e) => {
                    warn!("delete task failed: {}", e);
                    failed = true;
                }
            }
        }
        if failed {
            return Ok(None);
        }
        Ok(Some(DeleteResult {
            deleted_count: deleted,
            value: None,
        }))
    }

    pub async fn remove(&self, filter: &Value, options: &QueryOptions) -> Result<Option<DeleteResult>, AstraError> {
        self.delete_many(filter, options).await
    }

    /// Aggregation pipelines are not supported.
    pub async fn aggregate(&self, _pipeline: &[Value]) -> Result<Vec<Value>, AstraError> {
        unsupported_err!("aggregate is not supported")
    }

    // Every matching (id, document) pair, following page state to the end.
    // A page state the server already returned is an error.
    async fn find_all(&self, filter: &Value) -> Result<Vec<(String, Value)>, AstraError> {
        let mut out = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut options = FindOptions::new();
        loop {
            let page = self.inner.find(filter, &options).await?;
            out.extend(page.documents);
            match page.page_state {
                Some(ps) if !ps.is_empty() => {
                    if !seen.insert(ps.clone()) {
                        return Err(AstraError::new(
                            AstraErrorCode::InvalidResponse,
                            &format!("server repeated page state '{}'", ps),
                        ));
                    }
                    options = FindOptions::new().page_state(&ps);
                }
                _ => break,
            }
        }
        Ok(out)
    }
}

// Make sure the document has an `_id`, returning it as a path segment.
fn with_object_id(document: Value) -> Result<(String, Value), AstraError> {
    let mut fields: Map<String, Value> = match document {
        Value::Object(m) => m,
        other => return ia_err!("document must be a JSON object, got {}", other),
    };
    let id = match fields.get("_id") {
        None | Some(Value::Null) => {
            let id = new_object_id();
            fields.insert("_id".to_string(), Value::String(id.clone()));
            id
        }
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => return ia_err!("unusable _id {}", other),
    };
    // the id is a single path segment
    if id.contains('/') {
        return ia_err!("_id '{}' must not contain '/'", id);
    }
    path_segment(&id)?;
    Ok((id, Value::Object(fields)))
}
