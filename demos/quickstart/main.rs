//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//

// This is an example program showing how an Astra Client and DocumentClient
// can be used. It creates a collection, writes a document with a nested
// sub-document, reads, updates and searches it, and then deletes it again.

// To run this example:
//    ASTRA_DB_ID=... ASTRA_DB_REGION=... ASTRA_DB_APPLICATION_TOKEN=... \
//      cargo run --example quickstart
//
// for extra output:
//    RUST_LOG=debug cargo run --example quickstart
//
// or, for a LOT of tracing output:
//    RUST_LOG=trace cargo run --example quickstart

use astra_rust_sdk::AstraError;
use astra_rust_sdk::Client;
use astra_rust_sdk::DocumentClient;
use astra_rust_sdk::FindOptions;
use serde_json::json;
use std::error::Error;
use std::time::Duration;
use tracing::info;

// This method shows various ways to configure an Astra Client.
async fn get_client() -> Result<Client, AstraError> {
    // Note: later methods called on this builder will override earlier methods.
    // This allows for setting desired defaults that can be overridden by, for example,
    // .from_environment().
    Client::builder()
        // For a local Stargate: base url, auth url, username and password.
        // Note an explicit base url wins over database id and region.
        // .base_url("http://localhost:8082")?
        // .auth_url("http://localhost:8081/v1/auth")?
        // .credentials("cassandra", "cassandra")?
        //
        // For Astra, using database id and region:
        // .database_id("3c8ba5b5-1a32-4a97-b2b8-2e7a0b1c1e55")?
        // .database_region("us-east1")?
        // .application_token("AstraCS:...")?
        //
        // To read settings from a section of ~/.astrarc:
        // .from_default_config_file()?
        //
        // To read all of the above from environment variables:
        // or, to override above from environment;
        .from_environment()?
        //
        // Optional: set a different default timeout (default is 10 seconds)
        .timeout(Duration::from_secs(15))?
        //
        // Build the client
        .build()
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Set up a tracing subscriber to see output based on RUST_LOG environment setting
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_ansi(false)
        .compact()
        .init();

    // Create a client. This should be used throughout the program
    info!("Creating new client...");
    let client = get_client().await?;

    let namespace = std::env::var("ASTRA_DB_KEYSPACE").unwrap_or_else(|_| "app".to_string());
    let ns = DocumentClient::new(&client).namespace(&namespace);
    let users = ns.create_collection("testusers").await?;

    // Write a document at a chosen id
    let res = users
        .create(
            Some("cliff"),
            &json!({"firstName": "Cliff", "lastName": "Wicklow", "age": 42}),
        )
        .await?;
    println!("WriteResult={:?}", res);

    // Write a sub-document
    users
        .create(
            Some("cliff/addresses"),
            &json!({"home": {"city": "New York", "state": "NY"}}),
        )
        .await?;

    // Read it back
    let doc = users.get("cliff").await?;
    println!("Document={:?}", doc);
    if doc.is_none() {
        return Err("get should have returned a document, but did not".into());
    }

    // Merge into the nested document
    users
        .update("cliff/addresses/home", &json!({"city": "Buffalo"}))
        .await?;
    let home = users.get("cliff/addresses/home").await?;
    println!("Home={:?}", home);

    // write in some more documents, so the search below has more to return
    for i in 20..30 {
        let _ = users
            .create(None, &json!({"firstName": "somename", "age": i}))
            .await?;
    }

    // Plain values mean equality
    let found = users
        .find(&json!({"firstName": "Cliff"}), &FindOptions::new())
        .await?;
    println!("FindResult = {:?}", found);

    // Operators, with paging
    let mut options = FindOptions::new().page_size(5);
    loop {
        let page = users.find(&json!({"age": {"$gte": 25}}), &options).await?;
        println!("Page = {:?}", page.documents.keys().collect::<Vec<_>>());
        match page.page_state {
            Some(ps) if !ps.is_empty() => options = FindOptions::new().page_size(5).page_state(&ps),
            _ => break,
        }
    }

    // Delete the document, and drop the collection
    let ack = users.delete("cliff").await?;
    println!("DeleteAck={:?}", ack);
    ns.delete_collection("testusers").await?;

    Ok(())
}
