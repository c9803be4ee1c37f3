//
// Copyright (c) 2024 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use num_enum::TryFromPrimitive;

include!(concat!(env!("OUT_DIR"), "/ua.rs"));

pub(crate) fn sdk_version() -> &'static str {
    SDK_VERSION
}

pub(crate) fn user_agent() -> &'static str {
    USER_AGENT
}

pub(crate) fn requested_with() -> &'static str {
    REQUESTED_WITH
}

/// The error type returned by every fallible operation in this library.
///
/// For request failures, [`status`](AstraError::status) and [`body`](AstraError::body)
/// carry the upstream HTTP status and response text so callers can inspect them.
#[derive(Debug, Clone)]
pub struct AstraError {
    pub code: AstraErrorCode,
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<String>,
}

impl std::error::Error for AstraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::fmt::Display for AstraError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(s) = self.status {
            return write!(
                f,
                "code={:?} status={} message=\"{}\"",
                self.code, s, self.message
            );
        }
        write!(f, "code={:?} message=\"{}\"", self.code, self.message)
    }
}

impl AstraError {
    pub fn new(code: AstraErrorCode, msg: &str) -> AstraError {
        AstraError {
            code,
            message: msg.to_string(),
            status: None,
            body: None,
        }
    }

    /// Create a [`AstraErrorCode::RequestFailed`] error carrying the upstream status and body.
    pub fn request_failed(status: u16, body: &str) -> AstraError {
        AstraError {
            code: AstraErrorCode::RequestFailed,
            message: format!(
                "request failed with http status {} ({})",
                status,
                sdk_version()
            ),
            status: Some(status),
            body: Some(body.to_string()),
        }
    }

    pub fn from_int(icode: i32, msg: &str) -> AstraError {
        if let Ok(code) = AstraErrorCode::try_from(icode) {
            return AstraError::new(code, msg);
        }
        AstraError::new(
            AstraErrorCode::UnknownError,
            &format!("Invalid integer error code {}", icode),
        )
    }

    /// Returns true if this is a request failure with the given http status.
    pub fn is_status(&self, status: u16) -> bool {
        self.status == Some(status)
    }

    /// Returns true for errors in the request category (http errors, timeouts, bad bodies),
    /// as opposed to configuration or caller errors.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self.code,
            AstraErrorCode::RequestFailed
                | AstraErrorCode::RequestTimeout
                | AstraErrorCode::InvalidResponse
        )
    }
}

macro_rules! ia_error {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        crate::error::AstraError::new(
            crate::error::AstraErrorCode::IllegalArgument,
            &format!("{} ({})", m, crate::error::sdk_version()),
        )
    }};
}

pub(crate) use ia_error;

macro_rules! ia_err {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        Err(crate::error::AstraError::new(
            crate::error::AstraErrorCode::IllegalArgument,
            &format!("{} ({})", m, crate::error::sdk_version()),
        ))
    }};
}

pub(crate) use ia_err;

macro_rules! config_err {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        Err(crate::error::AstraError::new(
            crate::error::AstraErrorCode::Configuration,
            &format!("{} ({})", m, crate::error::sdk_version()),
        ))
    }};
}

pub(crate) use config_err;

macro_rules! auth_err {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        Err(crate::error::AstraError::new(
            crate::error::AstraErrorCode::AuthenticationFailure,
            &format!("{} ({})", m, crate::error::sdk_version()),
        ))
    }};
}

pub(crate) use auth_err;

macro_rules! unsupported_err {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        Err(crate::error::AstraError::new(
            crate::error::AstraErrorCode::UnsupportedFeature,
            &format!("{} ({})", m, crate::error::sdk_version()),
        ))
    }};
}

pub(crate) use unsupported_err;

impl From<reqwest::Error> for AstraError {
    fn from(e: reqwest::Error) -> Self {
        let mut code = AstraErrorCode::RequestFailed;
        if e.is_timeout() {
            code = AstraErrorCode::RequestTimeout;
        }
        AstraError {
            code,
            message: format!("reqwest error: {} ({})", e, sdk_version()),
            status: e.status().map(|s| s.as_u16()),
            body: None,
        }
    }
}

impl From<reqwest::header::InvalidHeaderValue> for AstraError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        ia_error!("invalid header value: {}", e.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderName> for AstraError {
    fn from(e: reqwest::header::InvalidHeaderName) -> Self {
        ia_error!("invalid header name: {}", e.to_string())
    }
}

impl From<url::ParseError> for AstraError {
    fn from(e: url::ParseError) -> Self {
        AstraError::new(
            AstraErrorCode::Configuration,
            &format!("error parsing url: {} ({})", e, sdk_version()),
        )
    }
}

impl From<serde_json::Error> for AstraError {
    fn from(e: serde_json::Error) -> Self {
        AstraError::new(
            AstraErrorCode::InvalidResponse,
            &format!("json error: {} ({})", e, sdk_version()),
        )
    }
}

// AstraErrorCode represents the error code.
//
// 1. Codes for errors raised while constructing a client range from 1 to 50(exclusive).
// These are never retried.
//
// 2. Codes for caller errors detected by the SDK range from 50 to 100(exclusive).
//
// 3. Codes for request and server issues begin at 100.
//
#[derive(Debug, Clone, Copy, Eq, PartialEq, TryFromPrimitive)]
#[repr(i32)]
pub enum AstraErrorCode {
    /// NoError represents there is no error.
    NoError = 0,

    /// Configuration error represents an unusable base URL or credential source.
    Configuration = 1,

    /// EnvironmentRestriction error represents an attempt to create a client in
    /// a host environment where the transport is not allowed (a browser).
    EnvironmentRestriction = 2,

    /// AuthenticationFailure represents a credential exchange that did not yield
    /// a usable token.
    AuthenticationFailure = 3,

    /// IllegalArgument error represents the application provided an illegal
    /// argument for the operation.
    IllegalArgument = 50,

    /// UnsupportedFeature error represents a request for a capability the SDK
    /// does not implement, such as collations, streaming cursors or upserts.
    UnsupportedFeature = 51,

    /// RequestFailed represents a non-2xx response (other than a recovered 401)
    /// or a network error. The upstream status and body are attached when available.
    RequestFailed = 100,

    /// RequestTimeout error represents the request did not complete when the
    /// specified timeout duration elapsed. Timeouts are never retried.
    RequestTimeout = 101,

    /// InvalidResponse represents a response body that could not be decoded.
    InvalidResponse = 102,

    /// UnknownError represents an unknown error.
    UnknownError = 125,
}
