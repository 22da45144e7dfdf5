//! Core data types shared across the authorization flows.
//!
//! Claims identities are modeled as an ordered list of string claims plus an
//! authentication-type tag identifying the trust domain that issued them,
//! rather than any framework-specific principal object.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

/// Claim type carrying the user's email address.
///
/// An external identity must expose a non-blank claim of this type to be
/// promotable to an internal identity.
pub const EMAIL_CLAIM: &str = "email";

/// Authentication-type tag for identities issued by this server.
pub const INTERNAL_AUTHENTICATION_TYPE: &str = "internal";

/// A single key/value assertion about a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// The claim type (e.g. `"email"`, `"name"`).
    #[serde(rename = "type")]
    pub claim_type: String,
    /// The claim value.
    pub value: String,
}

impl Claim {
    /// Creates a new claim.
    #[must_use]
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// A named, authenticated-or-not bundle of claims about a principal.
///
/// Claims are kept in insertion order; the same claim type may appear more
/// than once. The identity counts as authenticated when it carries an
/// authentication-type tag, mirroring the session service's contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsIdentity {
    /// The trust domain that issued this identity, if any.
    pub authentication_type: Option<String>,
    /// Ordered claim list.
    pub claims: Vec<Claim>,
}

impl ClaimsIdentity {
    /// Creates an authenticated identity issued by the given trust domain.
    #[must_use]
    pub fn authenticated(authentication_type: impl Into<String>, claims: Vec<Claim>) -> Self {
        Self {
            authentication_type: Some(authentication_type.into()),
            claims,
        }
    }

    /// Creates an unauthenticated identity carrying the given claims.
    #[must_use]
    pub fn unauthenticated(claims: Vec<Claim>) -> Self {
        Self {
            authentication_type: None,
            claims,
        }
    }

    /// Returns `true` when this identity was issued by a trust domain.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authentication_type.is_some()
    }

    /// Returns the value of the first claim of the given type.
    #[must_use]
    pub fn find_claim(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// Appends a claim, preserving order.
    pub fn add_claim(&mut self, claim: Claim) {
        self.claims.push(claim);
    }
}

/// Result of authenticating a client via `client_id:client_secret`.
#[derive(Debug, Clone)]
pub struct ClientSecretIdentity {
    /// Bearer string for downstream identity lookups. Not the access token.
    pub token: String,
    /// The claims identity established for the client, if any.
    pub identity: Option<ClaimsIdentity>,
}

impl ClientSecretIdentity {
    /// Creates a new client secret identity.
    #[must_use]
    pub fn new(token: impl Into<String>, identity: ClaimsIdentity) -> Self {
        Self {
            token: token.into(),
            identity: Some(identity),
        }
    }

    /// Returns the authenticated claims identity, if present.
    #[must_use]
    pub fn authenticated_identity(&self) -> Option<&ClaimsIdentity> {
        self.identity.as_ref().filter(|i| i.is_authenticated())
    }
}

/// Final bearer credential returned to a caller.
///
/// Serialized with camelCase field names per the token endpoint contract;
/// `expires` is always normalized to UTC on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Token type, e.g. "Bearer".
    pub token_type: String,
    /// The opaque or JWT access token.
    pub access_token: String,
    /// Absolute expiry timestamp, UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub expires: OffsetDateTime,
}

impl Token {
    /// Creates a new token, normalizing the expiry to UTC.
    #[must_use]
    pub fn new(
        token_type: impl Into<String>,
        access_token: impl Into<String>,
        expires: OffsetDateTime,
    ) -> Self {
        Self {
            token_type: token_type.into(),
            access_token: access_token.into(),
            expires: expires.to_offset(time::UtcOffset::UTC),
        }
    }

    /// Returns `true` when the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires <= OffsetDateTime::now_utc()
    }
}

/// A single public signing key, RFC 7517 wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key type (e.g. "RSA").
    pub kty: String,
    /// Key identifier.
    pub kid: String,
    /// Intended key use, typically "sig".
    #[serde(rename = "use")]
    pub use_: String,
    /// Signing algorithm (e.g. "RS256").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// RSA modulus, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

/// The published set of public keys used to verify issued tokens.
///
/// Append-only; keys are rotated out-of-band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    /// The keys, each with a unique key id.
    pub keys: Vec<JsonWebKey>,
}

/// Absolute endpoint URIs resolved from the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    /// The authorization endpoint.
    pub authorization_endpoint: Url,
    /// The token endpoint.
    pub token_endpoint: Url,
    /// The JWKS document URI.
    pub jwks_uri: Url,
    /// The user-info endpoint.
    pub userinfo_endpoint: Url,
}

/// OpenID Connect provider metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenIdProviderConfiguration {
    /// Issuer identifier.
    pub issuer: Url,
    /// The authorization endpoint.
    pub authorization_endpoint: Url,
    /// The token endpoint.
    pub token_endpoint: Url,
    /// The JWKS document URI.
    pub jwks_uri: Url,
    /// The user-info endpoint.
    pub userinfo_endpoint: Url,
    /// Supported response types.
    pub response_types_supported: Vec<String>,
    /// Supported grant types.
    pub grant_types_supported: Vec<String>,
    /// Supported subject identifier types.
    pub subject_types_supported: Vec<String>,
    /// Supported token endpoint client authentication methods.
    pub token_endpoint_auth_methods_supported: Vec<String>,
}

impl OpenIdProviderConfiguration {
    /// Builds the metadata document for the given issuer and endpoints with
    /// this server's static capability set.
    #[must_use]
    pub fn new(issuer: Url, endpoints: ProviderEndpoints) -> Self {
        Self {
            issuer,
            authorization_endpoint: endpoints.authorization_endpoint,
            token_endpoint: endpoints.token_endpoint,
            jwks_uri: endpoints.jwks_uri,
            userinfo_endpoint: endpoints.userinfo_endpoint,
            response_types_supported: vec!["code".to_string()],
            grant_types_supported: vec![
                "authorization_code".to_string(),
                "client_credentials".to_string(),
            ],
            subject_types_supported: vec!["public".to_string()],
            token_endpoint_auth_methods_supported: vec!["client_secret_basic".to_string()],
        }
    }
}
