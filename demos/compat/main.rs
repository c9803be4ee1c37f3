//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//

// This is an example program showing the document-database style compat layer.
// It connects with a connection uri, inserts a few documents, updates, counts and
// searches them, and then deletes them again.

// To run this example:
//    ASTRA_URI="https://<db id>-<region>.apps.astra.datastax.com/<keyspace>?astraApplicationToken=AstraCS:..." \
//      cargo run --example compat
//
// for extra output:
//    RUST_LOG=debug cargo run --example compat

use astra_rust_sdk::compat::{MongoClient, ReturnDocument, UpdateOptions, UpdateOptionsBuilder};
use astra_rust_sdk::QueryOptions;
use serde_json::json;
use std::error::Error;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_ansi(false)
        .compact()
        .init();

    let uri = std::env::var("ASTRA_URI")?;
    info!("Connecting...");
    let client = MongoClient::connect_uri(&uri).await?;
    let db = client.db(None)?;
    let people = db.create_collection("people").await;

    // Increments and multi-document updates are done client-side
    println!("Capabilities={:?}", people.capabilities());

    let res = people
        .insert_many(vec![
            json!({"name": "Ann", "age": 30, "tags": ["a", "b"]}),
            json!({"name": "Bob", "age": 40, "tags": ["b", "c"]}),
        ])
        .await?;
    println!("InsertManyResult={:?}", res);

    let res = people.insert_one(json!({"name": "Cat", "age": 40})).await?;
    println!("InsertOneResult={:?}", res);

    let after = UpdateOptionsBuilder::default()
        .return_document(ReturnDocument::After)
        .build()?;
    let res = people
        .update_one(
            &json!({"name": "Ann"}),
            &json!({"$set": {"city": "Paris"}, "$inc": {"age": 1}}),
            &after,
        )
        .await?;
    println!("UpdateResult={:?}", res);

    people
        .update_many(
            &json!({"age": {"$gte": 40}}),
            &json!({"$set": {"senior": true}}),
            &UpdateOptions::default(),
        )
        .await?;

    let opts = QueryOptions::default();
    let seniors = people
        .find(&json!({"senior": true}), &opts)?
        .to_vec()
        .await?;
    println!("Seniors={:?}", seniors);
    println!("Tags={:?}", people.distinct("tags", &json!({})).await?);
    println!("Count={}", people.count_documents(&json!({}), &opts).await?);

    let res = people.delete_many(&json!({}), &opts).await?;
    println!("DeleteResult={:?}", res);
    db.drop_collection("people").await;

    Ok(())
}
