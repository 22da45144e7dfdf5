//! ACME http-01 challenge pass-through handler.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::AuthError;
use crate::http::SecurityState;

/// Query parameters for the ACME challenge endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcmeChallengeParams {
    /// The challenge token handed out by the ACME server.
    #[serde(rename = "challengeToken", default)]
    pub challenge_token: Option<String>,
}

/// Handler for `GET /security/acme-challenge?challengeToken=`.
///
/// Thin pass-through to the challenge resolver: known tokens stream their
/// key-authorization bytes back, everything else is a 400.
pub async fn acme_challenge_handler(
    State(state): State<SecurityState>,
    Query(params): Query<AcmeChallengeParams>,
) -> Result<Response, AuthError> {
    let token = params.challenge_token.as_deref().unwrap_or_default().trim();
    if token.is_empty() {
        return Err(AuthError::validation(
            "challengeToken",
            "Value for 'challengeToken' has not been given",
        ));
    }

    let body = state
        .challenges
        .resolve_challenge(token)
        .await?
        .ok_or_else(|| {
            AuthError::validation("challengeToken", "Value is not a known challenge token")
        })?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        body,
    )
        .into_response())
}
