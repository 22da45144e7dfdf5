//! Token endpoint handler.
//!
//! `POST /security/acquiretoken` serves two entry points sharing one output
//! contract: a session-claim flow (no `Authorization` header) that projects
//! the token already encoded in the caller's session, and a Basic-auth flow
//! that authenticates a client secret and mints a fresh token.
//!
//! The Basic-auth flow signs the internal scheme out before returning on
//! every outcome except the two early validation rejections (blank
//! `grantType`, malformed `authorization` header), so it never leaves a
//! lingering session.

use axum::Form;
use axum::extract::rejection::FormRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::AuthResult;
use crate::error::{AuthError, BusinessCode};
use crate::http::SecurityState;
use crate::oauth::token::{
    CLIENT_CREDENTIALS_GRANT, TokenRequest, is_supported_grant_type, parse_basic_authorization,
};
use crate::session::SessionContext;
use crate::types::{INTERNAL_AUTHENTICATION_TYPE, Token};

/// Handler for `POST /security/acquiretoken`.
///
/// Accepts `grantType` from the form body or the query string. Success is a
/// 200 token projection with `Cache-Control: no-store`; failures map through
/// the shared OAuth error layer.
pub async fn acquire_token_handler(
    State(state): State<SecurityState>,
    Query(query): Query<TokenRequest>,
    headers: HeaderMap,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> Response {
    // Query-only callers may omit the form body entirely.
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let grant_type = if form.grant_type().is_empty() {
        query.grant_type().to_string()
    } else {
        form.grant_type().to_string()
    };

    tracing::debug!(grant_type = %grant_type, "Token request received");

    if grant_type.is_empty() {
        return AuthError::validation("grantType", "Value for 'grantType' has not been given")
            .into_response();
    }

    let ctx = SessionContext::new(&headers);

    let result = match headers.get(header::AUTHORIZATION) {
        None => session_grant(&state, &ctx, &grant_type).await,
        Some(authorization) => {
            let result = header_grant(&state, &ctx, &grant_type, authorization).await;

            // Early validation rejections never touch the session; every
            // other outcome, success included, signs out.
            let skip_sign_out = matches!(&result, Err(err) if err.is_validation());
            if !skip_sign_out {
                if let Err(sign_out_err) = state.session.sign_out(&ctx, None).await {
                    tracing::error!(error = %sign_out_err, "Failed to sign out after token request");
                }
            }
            result
        }
    };

    match result {
        Ok(token) => {
            tracing::info!(grant_type = %grant_type, "Token issued");
            token_response(&token)
        }
        Err(err) => {
            tracing::warn!(grant_type = %grant_type, error = %err, "Token request denied");
            err.into_response()
        }
    }
}

/// Session-claim flow: projects the token already held by the caller's
/// internal session. Only the `client_credentials` literal is accepted.
async fn session_grant(
    state: &SecurityState,
    ctx: &SessionContext,
    grant_type: &str,
) -> AuthResult<Token> {
    if grant_type != CLIENT_CREDENTIALS_GRANT {
        return Err(AuthError::business(BusinessCode::CannotRetrieveTokenForUser));
    }

    let outcome = state.session.authenticate_internal(ctx).await?;
    let identity = outcome
        .authenticated_identity()
        .ok_or_else(|| AuthError::business(BusinessCode::CannotRetrieveTokenForUser))?;

    state
        .tokens
        .resolve_user_token(identity)
        .await?
        .ok_or_else(|| AuthError::business(BusinessCode::CannotRetrieveTokenForUser))
}

/// Basic-auth flow: authenticates the client secret, signs the internal
/// scheme in and mints a token. The caller signs out afterwards.
async fn header_grant(
    state: &SecurityState,
    ctx: &SessionContext,
    grant_type: &str,
    authorization: &HeaderValue,
) -> AuthResult<Token> {
    if !is_supported_grant_type(grant_type) {
        return Err(AuthError::business(BusinessCode::CannotRetrieveTokenForClient));
    }

    let authorization = authorization.to_str().map_err(|_| {
        AuthError::validation(
            "authorization",
            "Value should match the pattern 'Basic <credentials>'",
        )
    })?;
    if authorization.trim().is_empty() {
        return Err(AuthError::validation(
            "authorization",
            "Value for 'authorization' has not been given",
        ));
    }
    let credentials = parse_basic_authorization(authorization)?;

    let client = state
        .clients
        .authenticate_client_secret(
            &credentials.client_id,
            &credentials.client_secret,
            INTERNAL_AUTHENTICATION_TYPE,
            state.protector.as_ref(),
        )
        .await?
        .ok_or_else(|| AuthError::business(BusinessCode::UnableToAuthenticateClient))?;

    let identity = client
        .authenticated_identity()
        .ok_or_else(|| AuthError::business(BusinessCode::UnableToAuthenticateClient))?;

    state.session.sign_in(ctx, identity, None).await?;

    state
        .tokens
        .generate_client_token(identity)
        .await?
        .ok_or_else(|| AuthError::business(BusinessCode::CannotIssueBearerTokenForClient))
}

/// 200 token projection. Bearer material is never cacheable.
fn token_response(token: &Token) -> Response {
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, "no-store, no-cache")],
        axum::Json(token),
    )
        .into_response()
}
