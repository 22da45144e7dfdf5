//! HTTP endpoint surface of the flow engine.
//!
//! Every endpoint shares one [`SecurityState`] and is mounted by
//! [`security_router`]. Handlers own the protocol state machines; all
//! business decisions run behind the dispatch seams in [`crate::bus`].

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use url::Url;

use crate::bus::{
    AuthorizationCodeIssuer, ChallengeResolver, ClientAuthenticator, KeySetProvider,
    MetadataProvider, TokenIssuer, UserAuthenticator,
};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::oauth::state::AuthorizationStateCodec;
use crate::protect::Protector;
use crate::session::SessionService;

pub mod acme;
pub mod authorize;
pub mod discovery;
pub mod jwks;
pub mod token;
pub mod userinfo;

/// Route paths served by [`security_router`].
pub mod paths {
    /// Authorization endpoint.
    pub const AUTHORIZE: &str = "/security/authorize";
    /// Callback reentry point after external sign-in.
    pub const CALLBACK: &str = "/security/authorize/callback";
    /// Token endpoint.
    pub const ACQUIRE_TOKEN: &str = "/security/acquiretoken";
    /// JWKS document.
    pub const JSON_WEB_KEYS: &str = "/security/jsonwebkeys";
    /// User-info endpoint.
    pub const USERINFO: &str = "/security/userinfo";
    /// OpenID Connect discovery document.
    pub const OPENID_CONFIGURATION: &str = "/.well-known/openid-configuration";
    /// ACME http-01 challenge pass-through.
    pub const ACME_CHALLENGE: &str = "/security/acme-challenge";
}

/// Shared state for all security endpoints.
#[derive(Clone)]
pub struct SecurityState {
    /// Flow engine configuration.
    pub config: AuthConfig,
    /// Payload protector backing the state codec.
    pub protector: Arc<dyn Protector>,
    /// Authorization-state codec over the protector.
    pub state_codec: Arc<AuthorizationStateCodec>,
    /// Session scheme operations.
    pub session: Arc<dyn SessionService>,
    /// Client secret authentication.
    pub clients: Arc<dyn ClientAuthenticator>,
    /// External-to-internal user promotion.
    pub users: Arc<dyn UserAuthenticator>,
    /// Authorization code issuance.
    pub codes: Arc<dyn AuthorizationCodeIssuer>,
    /// Bearer token issuance and resolution.
    pub tokens: Arc<dyn TokenIssuer>,
    /// Signing key publication.
    pub keys: Arc<dyn KeySetProvider>,
    /// Provider metadata assembly.
    pub metadata: Arc<dyn MetadataProvider>,
    /// ACME challenge resolution.
    pub challenges: Arc<dyn ChallengeResolver>,
}

impl SecurityState {
    /// Resolves the absolute base URL of the current request from its
    /// `Host` header and, when present, `x-forwarded-proto`.
    pub fn request_base_url(headers: &HeaderMap) -> Result<Url, AuthError> {
        let host = headers
            .get(axum::http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| AuthError::internal("Request has no usable Host header"))?;

        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("http");

        Url::parse(&format!("{scheme}://{host}"))
            .map_err(|e| AuthError::internal(format!("Failed to resolve request base URL: {e}")))
    }
}

/// Builds the security endpoint router over the given state.
pub fn security_router(state: SecurityState) -> Router {
    Router::new()
        .route(paths::AUTHORIZE, get(authorize::authorize_handler))
        .route(paths::CALLBACK, get(authorize::callback_handler))
        .route(paths::ACQUIRE_TOKEN, post(token::acquire_token_handler))
        .route(paths::JSON_WEB_KEYS, get(jwks::jwks_handler))
        .route(paths::USERINFO, get(userinfo::userinfo_handler))
        .route(
            paths::OPENID_CONFIGURATION,
            get(discovery::openid_configuration_handler),
        )
        .route(paths::ACME_CHALLENGE, get(acme::acme_challenge_handler))
        .with_state(state)
}
