//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::compat::collection::Collection;
use crate::document_client::Namespace;
use tracing::warn;

/// A database: one document namespace.
#[derive(Debug, Clone)]
pub struct Db {
    namespace: Namespace,
}

impl Db {
    pub(crate) fn new(namespace: Namespace) -> Db {
        Db { namespace }
    }

    pub fn name(&self) -> &str {
        self.namespace.name()
    }

    pub fn collection(&self, name: &str) -> Collection {
        Collection::new(self.namespace.collection(name))
    }

    /// Create a collection. Failures (including "already exists") are logged and ignored.
    pub async fn create_collection(&self, name: &str) -> Collection {
        if let Err(e) = self.namespace.create_collection(name).await {
            warn!("create collection {} failed: {}", name, e);
        }
        self.collection(name)
    }

    /// Drop a collection. Failures are logged and ignored.
    pub async fn drop_collection(&self, name: &str) {
        if let Err(e) = self.namespace.delete_collection(name).await {
            warn!("drop collection {} failed: {}", name, e);
        }
    }

    /// Namespaces are not dropped through this API: this does nothing.
    pub async fn drop_database(&self) {}
}
