//! OAuth 2.0 / OpenID Connect authorization flow engine.
//!
//! This crate implements the security endpoint surface of an authorization
//! server: the authorization-code flow across an untrusted browser redirect,
//! client-credentials token issuance, user-info projection, JWKS publication
//! and provider-metadata discovery.
//!
//! The engine owns the protocol state machines and nothing else. Business
//! decisions (credential checks, code and token minting, key material) run
//! behind the narrow async seams in [`bus`]; session transport runs behind
//! [`session::SessionService`]. The only cross-request state is the
//! [`oauth::AuthorizationState`] blob, sealed by a [`protect::Protector`]
//! and carried through the client's browser.
//!
//! # Architecture
//!
//! ```text
//! browser -> http::authorize (validate, seal state, 302 to login surface)
//!         -> external IdP signs the user in out-of-band
//!         -> http::authorize callback (promote identity, unseal state,
//!            issue code, 301 back to the client)
//! client  -> http::token (code or client-credentials exchange)
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod protect;
pub mod session;
pub mod types;

pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, BusinessCode, OAuthErrorBody, OAuthErrorCode};
pub use http::{SecurityState, security_router};
pub use oauth::{AuthorizationCode, AuthorizationState, AuthorizationStateCodec};
pub use protect::{AesGcmProtector, Protector};
pub use session::{AuthenticateOutcome, SessionContext, SessionProperties, SessionService};
pub use types::{Claim, ClaimsIdentity, Token};

/// Result type used throughout the flow engine.
pub type AuthResult<T> = Result<T, AuthError>;
