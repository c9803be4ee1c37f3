//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::client::Client;
use crate::client_builder::ClientBuilder;
use crate::document_client::DocumentClient;
use crate::error::AstraError;
use crate::graphql::AstraGraphQL;
use crate::ops::AstraOps;
use crate::rest::AstraRest;
use crate::schemas::AstraSchemas;

/// All the API clients for one database, sharing one authenticated [`Client`].
///
/// The DevOps API lives on a different host, so [`AstraOps`] is only present if
/// attached with [`with_ops()`](AstraClient::with_ops()).
#[derive(Debug, Clone)]
pub struct AstraClient {
    pub documents: DocumentClient,
    pub schemas: AstraSchemas,
    pub rest: AstraRest,
    pub graphql: AstraGraphQL,
    pub ops: Option<AstraOps>,
    client: Client,
}

impl AstraClient {
    pub fn new(client: &Client) -> AstraClient {
        AstraClient {
            documents: DocumentClient::new(client),
            schemas: AstraSchemas::new(client),
            rest: AstraRest::new(client),
            graphql: AstraGraphQL::new(client),
            ops: None,
            client: client.clone(),
        }
    }

    /// Build the transport from `builder` and wrap it.
    pub async fn connect(builder: ClientBuilder) -> Result<AstraClient, AstraError> {
        let client = builder.build().await?;
        Ok(AstraClient::new(&client))
    }

    /// Attach a DevOps API client, built on its own transport.
    pub fn with_ops(mut self, ops_client: &Client) -> Self {
        self.ops = Some(AstraOps::new(ops_client));
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}
