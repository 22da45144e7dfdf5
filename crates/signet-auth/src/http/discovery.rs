//! OpenID Connect discovery handler.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::error::AuthError;
use crate::http::{SecurityState, paths};
use crate::types::ProviderEndpoints;

/// Handler for `GET /.well-known/openid-configuration`.
///
/// Endpoint URIs are composed from the current request's scheme and host, so
/// the document follows whatever public name the server is reached under.
pub async fn openid_configuration_handler(
    State(state): State<SecurityState>,
    headers: HeaderMap,
) -> Result<Response, AuthError> {
    let base = SecurityState::request_base_url(&headers)?;
    let endpoints = resolve_endpoints(&base)?;

    let document = state.metadata.provider_configuration(endpoints).await?;
    Ok(Json(document).into_response())
}

/// Joins the sibling action paths onto the request base URL.
pub fn resolve_endpoints(base: &Url) -> Result<ProviderEndpoints, AuthError> {
    let join = |path: &str| {
        base.join(path)
            .map_err(|e| AuthError::internal(format!("Failed to resolve endpoint URI: {e}")))
    };

    Ok(ProviderEndpoints {
        authorization_endpoint: join(paths::AUTHORIZE)?,
        token_endpoint: join(paths::ACQUIRE_TOKEN)?,
        jwks_uri: join(paths::JSON_WEB_KEYS)?,
        userinfo_endpoint: join(paths::USERINFO)?,
    })
}
