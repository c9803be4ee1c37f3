//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::document_client::{Collection, FindOptions};
use crate::error::{unsupported_err, AstraError};
use serde_json::{Map, Value};

/// A single-use cursor returned by [`compat::Collection::find()`](crate::compat::Collection::find()).
///
/// The filter is translated when the cursor is created; nothing is fetched until
/// [`to_vec()`](FindCursor::to_vec()) is called, which makes exactly one request
/// and returns that page of documents in server order.
#[derive(Debug)]
pub struct FindCursor {
    collection: Collection,
    filter: Map<String, Value>,
    options: FindOptions,
}

impl FindCursor {
    pub(crate) fn new(collection: Collection, filter: Map<String, Value>, options: FindOptions) -> FindCursor {
        FindCursor {
            collection,
            filter,
            options,
        }
    }

    /// The translated filter this cursor will send.
    pub fn filter(&self) -> &Map<String, Value> {
        &self.filter
    }

    pub async fn to_vec(self) -> Result<Vec<Value>, AstraError> {
        let res = self
            .collection
            .find(&Value::Object(self.filter), &self.options)
            .await?;
        Ok(res.into_values())
    }

    /// Streaming is not supported: this always fails with `UnsupportedFeature`.
    pub fn stream(self) -> Result<(), AstraError> {
        unsupported_err!("Streaming cursors are not supported")
    }
}
