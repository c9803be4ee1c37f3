//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! A document-database style API (clients, databases, collections and cursors)
//! emulated over the path-addressed document API.
//!
//! Filters use the familiar `{"field": value}` and `{"field": {"$gt": value}}` forms.
//! Some operations are emulated client-side and are neither atomic nor complete:
//! `$inc` is a read-modify-write, `update_many` and `delete_many` fan out one
//! request per document, and upserts, collations, aggregation and streaming
//! cursors are not supported. [`Collection::capabilities()`] reports this.
//!
mod client;
mod collection;
mod cursor;
mod db;
mod object_id;

pub use client::{MongoClient, MongoClientOptions, MongoClientOptionsBuilder};
pub use collection::{
    Capabilities, Collection, DeleteResult, InsertManyResult, InsertOneResult, ReturnDocument,
    UpdateOptions, UpdateOptionsBuilder, UpdateResult,
};
pub use cursor::FindCursor;
pub use db::Db;
pub use object_id::new_object_id;
