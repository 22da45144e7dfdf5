//! User-info projection handler.

use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};

use crate::error::{AuthError, BusinessCode};
use crate::http::SecurityState;
use crate::session::SessionContext;

/// Handler for `GET /security/userinfo`.
///
/// Resolves the caller's current token from the internal session and returns
/// its access-token string verbatim as the body. When no token resolves, the
/// business error propagates to the shared error layer instead of being
/// converted here.
pub async fn userinfo_handler(
    State(state): State<SecurityState>,
    headers: HeaderMap,
) -> Result<Response, AuthError> {
    let ctx = SessionContext::new(&headers);

    let outcome = state.session.authenticate_internal(&ctx).await?;
    let identity = outcome
        .authenticated_identity()
        .ok_or_else(|| AuthError::business(BusinessCode::CannotResolveBearerTokenForUser))?;

    let token = state
        .tokens
        .resolve_user_token(identity)
        .await?
        .ok_or_else(|| AuthError::business(BusinessCode::CannotResolveBearerTokenForUser))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        token.access_token,
    )
        .into_response())
}
