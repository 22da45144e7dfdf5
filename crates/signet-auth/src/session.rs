//! Session authentication service interface.
//!
//! Cookie transport and external identity-provider federation are outside this
//! engine; both are reached through [`SessionService`]. Implementations are
//! expected to resolve the caller's session from the opaque per-request
//! [`SessionContext`] (typically via cookies handled by outer middleware) and
//! never to hold session state in process-wide globals.

use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::types::ClaimsIdentity;

/// Session-properties item key carrying the protected authorization state.
pub const AUTHORIZATION_STATE_ITEM: &str = "authorizationState";

/// Ephemeral key/value properties attached to a session sign-in.
///
/// Items are kept in a sorted map so equality and serialization are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProperties {
    /// The raw item map.
    pub items: BTreeMap<String, String>,
}

impl SessionProperties {
    /// Creates empty session properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item.
    #[must_use]
    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.insert(key.into(), value.into());
        self
    }

    /// Returns the protected authorization-state item, if present.
    #[must_use]
    pub fn authorization_state(&self) -> Option<&str> {
        self.items.get(AUTHORIZATION_STATE_ITEM).map(String::as_str)
    }
}

/// Opaque per-request context handed to the session service.
///
/// Wraps the request headers; the engine never inspects it.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    headers: HeaderMap,
}

impl SessionContext {
    /// Creates a context for the current request.
    #[must_use]
    pub fn new(headers: &HeaderMap) -> Self {
        Self {
            headers: headers.clone(),
        }
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Result of resolving an authentication scheme for the current request.
#[derive(Debug, Clone, Default)]
pub struct AuthenticateOutcome {
    /// Whether the scheme produced a usable result.
    pub succeeded: bool,
    /// The resolved identity, if any.
    pub identity: Option<ClaimsIdentity>,
    /// The session properties captured at sign-in time.
    pub properties: SessionProperties,
}

impl AuthenticateOutcome {
    /// Creates a successful outcome.
    #[must_use]
    pub fn success(identity: ClaimsIdentity, properties: SessionProperties) -> Self {
        Self {
            succeeded: true,
            identity: Some(identity),
            properties,
        }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failure() -> Self {
        Self::default()
    }

    /// Returns the identity when the outcome succeeded and the identity is
    /// authenticated.
    #[must_use]
    pub fn authenticated_identity(&self) -> Option<&ClaimsIdentity> {
        if !self.succeeded {
            return None;
        }
        self.identity.as_ref().filter(|i| i.is_authenticated())
    }
}

/// External and internal session scheme operations.
///
/// `sign_in` and `sign_out` always act on the internal scheme; the external
/// scheme is only ever read, after the upstream identity provider completes
/// its own flow out-of-band.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Reads the external identity-provider authentication result.
    async fn authenticate_external(&self, ctx: &SessionContext)
    -> AuthResult<AuthenticateOutcome>;

    /// Reads the internal scheme's authentication result.
    async fn authenticate_internal(&self, ctx: &SessionContext)
    -> AuthResult<AuthenticateOutcome>;

    /// Signs the internal scheme in with the given identity and properties.
    async fn sign_in(
        &self,
        ctx: &SessionContext,
        identity: &ClaimsIdentity,
        properties: Option<&SessionProperties>,
    ) -> AuthResult<()>;

    /// Signs the internal scheme out.
    async fn sign_out(
        &self,
        ctx: &SessionContext,
        properties: Option<&SessionProperties>,
    ) -> AuthResult<()>;
}
