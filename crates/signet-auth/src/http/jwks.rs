//! JWKS publication handler.

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::AuthError;
use crate::http::SecurityState;

/// Handler for `GET /security/jsonwebkeys`.
///
/// Returns the current public key set as `{"keys": [...]}`. Always 200; an
/// empty set is a valid document. Public keys are cacheable.
pub async fn jwks_handler(State(state): State<SecurityState>) -> Result<Response, AuthError> {
    let key_set = state.keys.json_web_key_set().await?;

    tracing::debug!(key_count = key_set.keys.len(), "Serving JWKS document");
    Ok((
        [(header::CACHE_CONTROL, "public, max-age=3600")],
        Json(key_set),
    )
        .into_response())
}
