//! Authorization request validation.
//!
//! Pure validation of the `/authorize` query parameters, performed before any
//! state is created or anything is dispatched. Every rejection echoes the
//! original `state` value unchanged so the client UI can correlate the
//! failure.

use serde::Deserialize;
use url::Url;

use crate::error::{OAuthErrorBody, OAuthErrorCode};
use crate::oauth::state::AuthorizationState;

/// Raw `/authorize` query parameters.
///
/// All fields are optional at the wire level; validation decides which
/// absences are fatal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizeParams {
    /// Must be `"code"`.
    #[serde(default)]
    pub response_type: Option<String>,
    /// Client identifier.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Absolute redirect URI.
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Requested scopes, space-delimited.
    #[serde(default)]
    pub scope: Option<String>,
    /// Opaque client correlation value, echoed back verbatim.
    #[serde(default)]
    pub state: Option<String>,
}

/// A structured `/authorize` rejection.
///
/// Always HTTP 400; the body carries the OAuth error code, a resolved
/// description and the echoed `state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRejection {
    /// OAuth 2.0 error code.
    pub code: OAuthErrorCode,
    /// Human-readable description.
    pub description: String,
    /// The client-supplied `state`, echoed verbatim.
    pub state: Option<String>,
}

impl AuthorizeRejection {
    fn new(code: OAuthErrorCode, description: impl Into<String>, state: Option<&String>) -> Self {
        Self {
            code,
            description: description.into(),
            state: state.cloned(),
        }
    }

    /// Builds the OAuth error body for this rejection.
    #[must_use]
    pub fn into_body(self) -> OAuthErrorBody {
        OAuthErrorBody::new(self.code, self.description, self.state)
    }
}

fn is_blank(value: Option<&String>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Validates raw `/authorize` parameters into an [`AuthorizationState`].
///
/// Side-effect free. The redirect URI check is deliberately asymmetric: a
/// blank value reports the missing parameter, while a present-but-relative
/// value reports only the generic authorization failure.
pub fn validate_authorization_request(
    params: &AuthorizeParams,
) -> Result<AuthorizationState, AuthorizeRejection> {
    let state = params.state.as_ref();

    if is_blank(params.response_type.as_ref()) {
        return Err(AuthorizeRejection::new(
            OAuthErrorCode::InvalidRequest,
            "Value for 'response_type' has not been given",
            state,
        ));
    }
    let response_type = params.response_type.as_deref().unwrap_or_default().trim();
    if response_type != "code" {
        return Err(AuthorizeRejection::new(
            OAuthErrorCode::UnsupportedResponseType,
            format!("Value '{response_type}' for 'response_type' is not supported"),
            state,
        ));
    }

    if is_blank(params.client_id.as_ref()) {
        return Err(AuthorizeRejection::new(
            OAuthErrorCode::InvalidRequest,
            "Value for 'client_id' has not been given",
            state,
        ));
    }
    let client_id = params.client_id.as_deref().unwrap_or_default().trim();

    if is_blank(params.redirect_uri.as_ref()) {
        return Err(AuthorizeRejection::new(
            OAuthErrorCode::InvalidRequest,
            "Value for 'redirect_uri' has not been given",
            state,
        ));
    }
    let redirect_uri = params.redirect_uri.as_deref().unwrap_or_default().trim();
    let redirect_uri = match Url::parse(redirect_uri) {
        Ok(uri) => uri,
        Err(_) => {
            return Err(AuthorizeRejection::new(
                OAuthErrorCode::InvalidRequest,
                "Unable to authorize the user",
                state,
            ));
        }
    };

    if is_blank(params.scope.as_ref()) {
        return Err(AuthorizeRejection::new(
            OAuthErrorCode::InvalidScope,
            "Value for 'scope' has not been given",
            state,
        ));
    }
    let scopes: Vec<String> = params
        .scope
        .as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .map(String::from)
        .collect();

    Ok(AuthorizationState::new(
        response_type,
        client_id,
        redirect_uri,
        scopes,
        params.state.clone(),
    ))
}
