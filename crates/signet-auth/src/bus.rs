//! Command and query dispatch seams.
//!
//! Business operations run behind these traits; the flow engine owns the
//! protocol state machine and nothing else. Implementations return typed
//! results (`Ok(None)` when a recognized rule yields nothing) or raise typed
//! [`AuthError`](crate::error::AuthError)s, which the HTTP boundary maps
//! exhaustively onto status codes and OAuth error bodies.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::AuthResult;
use crate::oauth::state::{AuthorizationState, AuthorizationStateCodec};
use crate::protect::Protector;
use crate::types::{Claim, ClaimsIdentity, ClientSecretIdentity, JsonWebKeySet,
    OpenIdProviderConfiguration, ProviderEndpoints, Token};

/// Authenticates clients by id/secret pair.
#[async_trait]
pub trait ClientAuthenticator: Send + Sync {
    /// Authenticates a client secret, establishing an identity under the
    /// given authentication type. Returns `None` when the credentials are
    /// not recognized.
    async fn authenticate_client_secret(
        &self,
        client_id: &str,
        client_secret: &str,
        authentication_type: &str,
        protector: &dyn Protector,
    ) -> AuthResult<Option<ClientSecretIdentity>>;
}

/// Promotes an externally authenticated user to an internal identity.
#[async_trait]
pub trait UserAuthenticator: Send + Sync {
    /// Authenticates the external user identified by `external_user_identifier`
    /// (its email-equivalent claim value), carrying over the external claim
    /// set and the raw session-properties item map. Returns `None` when no
    /// internal identity can be established.
    async fn authenticate_external_user(
        &self,
        external_user_identifier: &str,
        claims: &[Claim],
        authentication_type: &str,
        items: &BTreeMap<String, String>,
        protector: &dyn Protector,
    ) -> AuthResult<Option<ClaimsIdentity>>;
}

/// Mints single-use authorization codes.
#[async_trait]
pub trait AuthorizationCodeIssuer: Send + Sync {
    /// Generates an authorization code bound to the recovered authorization
    /// state. Returns the state with its code attached, or `None` when no
    /// code can be issued. The codec is passed along so the command can
    /// unprotect nested state material.
    async fn generate_authorization_code(
        &self,
        identity: &ClaimsIdentity,
        state: &AuthorizationState,
        codec: &AuthorizationStateCodec,
    ) -> AuthResult<Option<AuthorizationState>>;
}

/// Issues and resolves bearer tokens.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Generates a bearer token for an authenticated client identity.
    async fn generate_client_token(
        &self,
        identity: &ClaimsIdentity,
    ) -> AuthResult<Option<Token>>;

    /// Resolves the token encoded in the given session identity's claims.
    async fn resolve_user_token(&self, identity: &ClaimsIdentity) -> AuthResult<Option<Token>>;
}

/// Publishes the current signing key set.
#[async_trait]
pub trait KeySetProvider: Send + Sync {
    /// Returns the current key set. An empty set is valid.
    async fn json_web_key_set(&self) -> AuthResult<JsonWebKeySet>;
}

/// Assembles the provider metadata document.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Returns the metadata document for the given resolved endpoint URIs.
    async fn provider_configuration(
        &self,
        endpoints: ProviderEndpoints,
    ) -> AuthResult<OpenIdProviderConfiguration>;
}

/// Resolves ACME http-01 challenge tokens.
#[async_trait]
pub trait ChallengeResolver: Send + Sync {
    /// Returns the key-authorization bytes for a challenge token, or `None`
    /// when the token is unknown.
    async fn resolve_challenge(&self, challenge_token: &str) -> AuthResult<Option<Vec<u8>>>;
}
