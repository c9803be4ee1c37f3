//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::AstraError;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

/// The future returned by [`TokenProvider::get_token()`].
pub type TokenFuture = Pin<Box<dyn Future<Output = Result<String, AstraError>> + Send>>;

/// Trait defining a caller-supplied source of session tokens.
///
/// A provider is invoked once when the [`Client`](crate::Client) is built and again
/// every time the client needs to reauthenticate after an expired session.
///
/// ```no_run
/// use astra_rust_sdk::{AstraError, TokenFuture, TokenProvider};
///
/// #[derive(Debug)]
/// struct VaultTokens;
///
/// impl TokenProvider for VaultTokens {
///     fn get_token(&self) -> TokenFuture {
///         Box::pin(async { Ok("token-from-vault".to_string()) })
///     }
/// }
/// ```
pub trait TokenProvider: Send + Sync + Debug {
    /// Returns a fresh session token.
    fn get_token(&self) -> TokenFuture;
}

/// Trait defining a hook that is told about every new session token.
///
/// This allows applications to cache the token externally (in a file, a shared
/// store, etc.) and hand it back later via
/// [`ClientBuilder::auth_token()`](crate::ClientBuilder::auth_token()).
pub trait TokenPersister: Send + Sync + Debug {
    /// Called with the new token whenever the stored session token changes.
    fn set_token(&self, token: &str);
}
