//! Authorization flow error types.
//!
//! This module defines the error taxonomy for the flow engine and its mapping
//! onto the OAuth 2.0 wire format:
//!
//! - **Validation errors** - malformed or missing caller input, detected before
//!   any downstream dispatch. Always HTTP 400, field-level.
//! - **Business errors** - a recognized domain rule was violated (bad
//!   credentials, no issuable token, invalid authorization state). Each carries
//!   a stable [`BusinessCode`] that maps to an OAuth error token and HTTP 401.
//! - **Unexpected errors** - everything else. Always collapse to
//!   `server_error` / HTTP 500 with a generic description; the underlying
//!   message is only ever logged, never surfaced.

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Errors that can occur while driving the authorization flows.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// The caller supplied a malformed or missing value for a request field.
    #[error("Invalid value for '{field}': {message}")]
    Validation {
        /// The offending request field.
        field: String,
        /// Description of why the value was rejected.
        message: String,
    },

    /// A domain rule was violated while executing a dispatched operation.
    #[error("{0}")]
    Business(BusinessCode),

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error. Logged, never surfaced.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Validation` error for the given field.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Business` error from a stable business code.
    #[must_use]
    pub fn business(code: BusinessCode) -> Self {
        Self::Business(code)
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if this is a business error.
    #[must_use]
    pub fn is_business(&self) -> bool {
        matches!(self, Self::Business(_))
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> OAuthErrorCode {
        match self {
            Self::Validation { .. } => OAuthErrorCode::InvalidRequest,
            Self::Business(code) => code.oauth_error_code(),
            Self::Internal { .. } => OAuthErrorCode::ServerError,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Business(_) => StatusCode::UNAUTHORIZED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the description surfaced to the caller.
    ///
    /// Validation and business errors carry their resolved description;
    /// internal errors collapse to a generic message so raw failure detail
    /// never crosses the wire.
    #[must_use]
    pub fn public_description(&self) -> String {
        match self {
            Self::Validation { .. } | Self::Business(_) => self.to_string(),
            Self::Internal { .. } => "Unable to process the request".to_string(),
        }
    }
}

/// Stable business error codes raised by dispatched commands and queries.
///
/// Each code resolves to a fixed, human-readable description and an OAuth 2.0
/// error token. New codes are append-only; the descriptions are part of the
/// wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusinessCode {
    /// The authorization-code flow could not authorize the user.
    UnableToAuthorizeUser,
    /// The client id/secret pair could not be authenticated.
    UnableToAuthenticateClient,
    /// No token could be resolved for the session-authenticated user.
    CannotRetrieveTokenForUser,
    /// The requested grant cannot produce a token for an authenticated client.
    CannotRetrieveTokenForClient,
    /// No bearer token could be issued for the authenticated client.
    CannotIssueBearerTokenForClient,
    /// No bearer token could be resolved for the authenticated user.
    CannotResolveBearerTokenForUser,
}

impl BusinessCode {
    /// Returns the fixed description for this code.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnableToAuthorizeUser => "Unable to authorize the user",
            Self::UnableToAuthenticateClient => "Unable to authenticate client",
            Self::CannotRetrieveTokenForUser => "Cannot retrieve token for authenticated user",
            Self::CannotRetrieveTokenForClient => "Cannot retrieve token for authenticated client",
            Self::CannotIssueBearerTokenForClient => {
                "Cannot retrieve JWT bearer token for authenticated client"
            }
            Self::CannotResolveBearerTokenForUser => {
                "Cannot retrieve JWT bearer token for authenticated user"
            }
        }
    }

    /// Returns the OAuth 2.0 error code for this business code.
    #[must_use]
    pub fn oauth_error_code(&self) -> OAuthErrorCode {
        match self {
            Self::UnableToAuthorizeUser => OAuthErrorCode::AccessDenied,
            Self::UnableToAuthenticateClient => OAuthErrorCode::InvalidClient,
            Self::CannotRetrieveTokenForUser
            | Self::CannotRetrieveTokenForClient
            | Self::CannotIssueBearerTokenForClient
            | Self::CannotResolveBearerTokenForUser => OAuthErrorCode::UnauthorizedClient,
        }
    }
}

impl fmt::Display for BusinessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// OAuth 2.0 error codes used by this server.
///
/// Defined in RFC 6749 Sections 4.1.2.1 and 5.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthErrorCode {
    /// The request is missing a required parameter or is otherwise malformed.
    InvalidRequest,
    /// The requested scope is invalid, unknown, or malformed.
    InvalidScope,
    /// The server does not support obtaining a code using this method.
    UnsupportedResponseType,
    /// Client authentication failed.
    InvalidClient,
    /// The client is not authorized to use this grant.
    UnauthorizedClient,
    /// The resource owner or authorization server denied the request.
    AccessDenied,
    /// The server encountered an unexpected condition.
    ServerError,
}

impl OAuthErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidScope => "invalid_scope",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidClient => "invalid_client",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::AccessDenied => "access_denied",
            Self::ServerError => "server_error",
        }
    }
}

impl fmt::Display for OAuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// OAuth 2.0 error body returned by every endpoint in this module.
///
/// `error_uri` and `state` are always present on the wire (`null` when
/// absent) so client UIs can correlate failures with the request they sent.
///
/// # Example
///
/// ```json
/// {
///   "error": "invalid_request",
///   "error_description": "Value for 'client_id' has not been given",
///   "error_uri": null,
///   "state": "abc123"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthErrorBody {
    /// OAuth 2.0 error code.
    pub error: OAuthErrorCode,
    /// Human-readable error description.
    pub error_description: String,
    /// URI with further error information. Unused, always `null`.
    pub error_uri: Option<String>,
    /// The client-supplied `state` value, echoed verbatim.
    pub state: Option<String>,
}

impl OAuthErrorBody {
    /// Creates a new error body.
    #[must_use]
    pub fn new(
        error: OAuthErrorCode,
        description: impl Into<String>,
        state: Option<String>,
    ) -> Self {
        Self {
            error,
            error_description: description.into(),
            error_uri: None,
            state,
        }
    }

    /// Builds an error body from an [`AuthError`], echoing the given state.
    #[must_use]
    pub fn from_error(error: &AuthError, state: Option<String>) -> Self {
        Self::new(error.oauth_error_code(), error.public_description(), state)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Internal { .. }) {
            tracing::error!(error = %self, "Unexpected error while processing request");
        }
        let status = self.http_status();
        let body = OAuthErrorBody::from_error(&self, None);
        (status, Json(body)).into_response()
    }
}
