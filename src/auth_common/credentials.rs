//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::auth_common::token_provider::TokenProvider;
use crate::error::{config_err, AstraError};
use std::sync::Arc;

/// The source of the credential that governs a [`Client`](crate::Client)'s authorization header.
///
/// Exactly one source is selected when the client is built, in this precedence order:
/// application token, pre-supplied session token, token callback, username/password.
#[derive(Clone)]
pub enum CredentialSource {
    /// A long-lived application token. Never refreshed.
    ApplicationToken(String),
    /// A session token supplied by the caller. If it expires, `refresh` (a token
    /// callback or a username/password pair, when configured) is used to get a new one.
    SessionToken {
        token: String,
        refresh: Option<Box<CredentialSource>>,
    },
    /// Session tokens are obtained from a caller-supplied [`TokenProvider`].
    TokenCallback(Arc<dyn TokenProvider>),
    /// Session tokens are obtained by exchanging a username and password.
    PasswordExchange { username: String, password: String },
}

impl CredentialSource {
    /// Returns true if this is an application token, which never triggers reauthentication.
    pub fn is_application_token(&self) -> bool {
        matches!(self, CredentialSource::ApplicationToken(_))
    }

    /// Returns a short name for the kind of credential, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialSource::ApplicationToken(_) => "application-token",
            CredentialSource::SessionToken { .. } => "session-token",
            CredentialSource::TokenCallback(_) => "token-callback",
            CredentialSource::PasswordExchange { .. } => "password-exchange",
        }
    }

    // Select the credential source from whatever pieces were configured.
    pub(crate) fn resolve(
        application_token: Option<&str>,
        auth_token: Option<&str>,
        token_provider: Option<&Arc<dyn TokenProvider>>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<CredentialSource, AstraError> {
        let exchange = match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() => Some(CredentialSource::PasswordExchange {
                username: u.to_string(),
                password: p.to_string(),
            }),
            _ => None,
        };
        let callback = token_provider.map(|p| CredentialSource::TokenCallback(p.clone()));

        if let Some(t) = application_token.filter(|t| !t.is_empty()) {
            return Ok(CredentialSource::ApplicationToken(t.to_string()));
        }
        if let Some(t) = auth_token.filter(|t| !t.is_empty()) {
            let refresh = callback.or(exchange).map(Box::new);
            return Ok(CredentialSource::SessionToken {
                token: t.to_string(),
                refresh,
            });
        }
        if let Some(c) = callback {
            return Ok(c);
        }
        if let Some(e) = exchange {
            return Ok(e);
        }
        config_err!(
            "no usable credentials: set an application token, an auth token, a token provider, or a username and password"
        )
    }
}

// Never print secrets in debug output
impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::ApplicationToken(_) => write!(f, "ApplicationToken(****)"),
            CredentialSource::SessionToken { refresh, .. } => f
                .debug_struct("SessionToken")
                .field("token", &"****")
                .field("refresh", refresh)
                .finish(),
            CredentialSource::TokenCallback(p) => f.debug_tuple("TokenCallback").field(p).finish(),
            CredentialSource::PasswordExchange { username, .. } => f
                .debug_struct("PasswordExchange")
                .field("username", username)
                .field("password", &"****")
                .finish(),
        }
    }
}
