//! Authorization endpoint and callback handlers.
//!
//! `GET /security/authorize` validates the request, seals the authorization
//! state and redirects the browser to the external login surface. `GET
//! /security/authorize/callback` reenters the flow after the external
//! identity provider has signed the user in, promotes the external identity
//! to an internal one, recovers the sealed state and issues the
//! authorization code.
//!
//! Every callback exit signs the internal session scheme out exactly once,
//! success included, after the deny/issue decision is made. The session only
//! exists to ferry the external authentication result into code issuance.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::AuthResult;
use crate::error::{AuthError, BusinessCode, OAuthErrorBody, OAuthErrorCode};
use crate::http::SecurityState;
use crate::oauth::state::AuthorizationState;
use crate::oauth::validate::{AuthorizeParams, validate_authorization_request};
use crate::session::SessionContext;
use crate::types::{EMAIL_CLAIM, INTERNAL_AUTHENTICATION_TYPE};

/// Query parameter carrying the opaque state to the login surface.
pub const AUTHORIZATION_STATE_PARAM: &str = "authorizationState";

/// Handler for `GET /security/authorize`.
///
/// On a valid request the response is a 302 redirect to the configured login
/// surface with the sealed authorization state appended as the
/// `authorizationState` query parameter. On an invalid request the response
/// is a 400 OAuth error body echoing the caller's `state`.
pub async fn authorize_handler(
    State(state): State<SecurityState>,
    Query(params): Query<AuthorizeParams>,
) -> Response {
    tracing::debug!(
        client_id = params.client_id.as_deref().unwrap_or(""),
        "Authorization request received"
    );

    let auth_state = match validate_authorization_request(&params) {
        Ok(auth_state) => auth_state,
        Err(rejection) => {
            tracing::warn!(error = %rejection.code, "Authorization request rejected");
            return (StatusCode::BAD_REQUEST, Json(rejection.into_body())).into_response();
        }
    };

    let opaque = match state.state_codec.protect(&auth_state) {
        Ok(opaque) => opaque,
        Err(err) => {
            tracing::error!(error = %err, "Failed to protect authorization state");
            let body = OAuthErrorBody::from_error(&err, params.state.clone());
            return (err.http_status(), Json(body)).into_response();
        }
    };

    let mut location = state.config.login_url.clone();
    location
        .query_pairs_mut()
        .append_pair(AUTHORIZATION_STATE_PARAM, &opaque);

    tracing::info!(client_id = auth_state.client_id(), "Redirecting to login surface");
    found_redirect(location.as_str())
}

/// Handler for `GET /security/authorize/callback`.
///
/// Reads the external authentication result from the session, walks the
/// issuance state machine and either 301-redirects back to the client with
/// `code` and `state` query parameters, or returns the mapped OAuth error.
/// Both outcomes sign the internal scheme out exactly once.
pub async fn callback_handler(
    State(state): State<SecurityState>,
    headers: HeaderMap,
) -> Response {
    let ctx = SessionContext::new(&headers);

    let result = run_callback(&state, &ctx).await;

    // Single sign-out per request, after the deny/issue decision.
    if let Err(sign_out_err) = state.session.sign_out(&ctx, None).await {
        tracing::error!(error = %sign_out_err, "Failed to sign out after callback");
    }

    match result {
        Ok(location) => {
            tracing::info!("Authorization code issued, redirecting to client");
            moved_permanently_redirect(location.as_str())
        }
        Err(err) => {
            tracing::warn!(error = %err, "Authorization callback denied");
            callback_error_response(&err)
        }
    }
}

/// Drives the callback state machine up to the client redirect URL.
///
/// Any error return means "denied"; the caller owns the single sign-out on
/// both outcomes. Sign-in happens as soon as an internal identity is
/// obtained, before state recovery and code issuance are known to succeed.
async fn run_callback(state: &SecurityState, ctx: &SessionContext) -> AuthResult<Url> {
    let outcome = state.session.authenticate_external(ctx).await?;
    let Some(external_identity) = outcome.authenticated_identity() else {
        return Err(denied());
    };

    let external_user_identifier = external_identity
        .find_claim(EMAIL_CLAIM)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(denied)?;

    let internal_identity = state
        .users
        .authenticate_external_user(
            external_user_identifier,
            &external_identity.claims,
            INTERNAL_AUTHENTICATION_TYPE,
            &outcome.properties.items,
            state.protector.as_ref(),
        )
        .await?
        .ok_or_else(denied)?;

    // Not transactional with code issuance: the sign-in fires even if the
    // remaining steps deny.
    state
        .session
        .sign_in(ctx, &internal_identity, Some(&outcome.properties))
        .await?;

    let opaque = outcome.properties.authorization_state().ok_or_else(denied)?;
    let auth_state = state.state_codec.unprotect(opaque).ok_or_else(denied)?;

    let issued = state
        .codes
        .generate_authorization_code(&internal_identity, &auth_state, &state.state_codec)
        .await?
        .ok_or_else(denied)?;

    client_redirect_url(&issued)
}

fn denied() -> AuthError {
    AuthError::business(BusinessCode::UnableToAuthorizeUser)
}

/// Builds `redirectUri?code=<value>&state=<raw>` from an issued state.
fn client_redirect_url(issued: &AuthorizationState) -> AuthResult<Url> {
    let code = issued.authorization_code().ok_or_else(denied)?;

    let mut location = issued.redirect_uri().clone();
    {
        let mut pairs = location.query_pairs_mut();
        pairs.append_pair("code", code.value());
        if let Some(external_state) = issued.external_state() {
            pairs.append_pair("state", external_state);
        }
    }
    Ok(location)
}

/// Maps a denied callback onto the OAuth error wire shape.
///
/// Business denials keep their description under `access_denied`; unexpected
/// failures collapse to a generic `server_error` message.
fn callback_error_response(err: &AuthError) -> Response {
    let (status, code, description) = match err {
        AuthError::Validation { .. } => (
            StatusCode::BAD_REQUEST,
            OAuthErrorCode::InvalidRequest,
            err.public_description(),
        ),
        AuthError::Business(business) => (
            StatusCode::UNAUTHORIZED,
            OAuthErrorCode::AccessDenied,
            business.description().to_string(),
        ),
        AuthError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            OAuthErrorCode::ServerError,
            BusinessCode::UnableToAuthorizeUser.description().to_string(),
        ),
    };

    let body = OAuthErrorBody::new(code, description, None);
    (status, Json(body)).into_response()
}

/// 302 redirect to the login surface.
fn found_redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// 301 redirect back to the client. Permanent, method not preserved.
fn moved_permanently_redirect(location: &str) -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}
