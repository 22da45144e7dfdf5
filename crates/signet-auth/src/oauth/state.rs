//! Authorization state and its protected wire codec.
//!
//! One [`AuthorizationState`] represents one in-flight authorization-code
//! grant attempt. It is created on a valid `/authorize` request, sealed into
//! an opaque string carried through the external login redirect, rehydrated
//! when the callback or the token exchange presents that string, and
//! discarded after the code is redeemed or the protection TTL lapses.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::AuthResult;
use crate::error::AuthError;
use crate::protect::{Protector, purposes};

/// A single-use, short-lived authorization code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    value: String,
}

impl AuthorizationCode {
    /// Creates a new authorization code.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Returns the code value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// One in-flight authorization-code-grant attempt.
///
/// Immutable once created; the only permitted transition is attaching an
/// authorization code via [`AuthorizationState::with_authorization_code`].
/// Field order is fixed by declaration so the serialized shape is
/// deterministic for a given logical state.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationState {
    response_type: String,
    client_id: String,
    redirect_uri: Url,
    scopes: Vec<String>,
    external_state: Option<String>,
    client_secret: Option<String>,
    authorization_code: Option<AuthorizationCode>,
}

impl AuthorizationState {
    /// Creates a new authorization state for a validated `/authorize` request.
    #[must_use]
    pub fn new(
        response_type: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: Url,
        scopes: Vec<String>,
        external_state: Option<String>,
    ) -> Self {
        Self {
            response_type: response_type.into(),
            client_id: client_id.into(),
            redirect_uri,
            scopes,
            external_state,
            client_secret: None,
            authorization_code: None,
        }
    }

    /// Attaches the client secret. Carried only inside the protected blob,
    /// never echoed.
    #[must_use]
    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// The single permitted transition: attaches an issued authorization code.
    #[must_use]
    pub fn with_authorization_code(mut self, code: AuthorizationCode) -> Self {
        self.authorization_code = Some(code);
        self
    }

    /// The response type, always `"code"`.
    #[must_use]
    pub fn response_type(&self) -> &str {
        &self.response_type
    }

    /// The requesting client's identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The absolute redirect URI the client will be sent back to.
    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    /// The requested scopes in request order.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// The client-supplied correlation state, if any.
    #[must_use]
    pub fn external_state(&self) -> Option<&str> {
        self.external_state.as_deref()
    }

    /// The carried client secret, if any.
    #[must_use]
    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    /// The attached authorization code, if one has been issued.
    #[must_use]
    pub fn authorization_code(&self) -> Option<&AuthorizationCode> {
        self.authorization_code.as_ref()
    }
}

impl std::fmt::Debug for AuthorizationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationState")
            .field("response_type", &self.response_type)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("scopes", &self.scopes)
            .field("external_state", &self.external_state)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("authorization_code", &self.authorization_code.is_some())
            .finish()
    }
}

/// Seals and unseals [`AuthorizationState`] for the redirect hop.
///
/// Serialization shape is deterministic; the sealed ciphertext is not, and
/// callers must treat the output as opaque. Unsealing fails closed: any
/// malformed, truncated, expired, or wrong-purpose input is "no state".
#[derive(Clone)]
pub struct AuthorizationStateCodec {
    protector: Arc<dyn Protector>,
}

impl AuthorizationStateCodec {
    /// Creates a codec over the given protector.
    #[must_use]
    pub fn new(protector: Arc<dyn Protector>) -> Self {
        Self { protector }
    }

    /// Returns the underlying protector.
    #[must_use]
    pub fn protector(&self) -> &dyn Protector {
        self.protector.as_ref()
    }

    /// Seals an authorization state into an opaque, URL-safe string.
    pub fn protect(&self, state: &AuthorizationState) -> AuthResult<String> {
        let plaintext = serde_json::to_vec(state)
            .map_err(|e| AuthError::internal(format!("Failed to serialize authorization state: {e}")))?;
        let sealed = self
            .protector
            .protect(&plaintext, purposes::AUTHORIZATION_STATE)?;
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Unseals an opaque string back into an authorization state.
    ///
    /// Returns `None` for anything not produced by [`Self::protect`] with the
    /// matching purpose and key.
    #[must_use]
    pub fn unprotect(&self, opaque: &str) -> Option<AuthorizationState> {
        let sealed = URL_SAFE_NO_PAD.decode(opaque).ok()?;
        let plaintext = self
            .protector
            .unprotect(&sealed, purposes::AUTHORIZATION_STATE)?;
        serde_json::from_slice(&plaintext).ok()
    }
}

impl std::fmt::Debug for AuthorizationStateCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationStateCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protect::AesGcmProtector;

    fn sample_state() -> AuthorizationState {
        AuthorizationState::new(
            "code",
            "abc",
            Url::parse("https://client.example/cb").unwrap(),
            vec!["profile".to_string(), "email".to_string()],
            Some("xyz".to_string()),
        )
    }

    fn codec() -> AuthorizationStateCodec {
        AuthorizationStateCodec::new(Arc::new(AesGcmProtector::new(
            AesGcmProtector::generate_key(),
        )))
    }

    #[test]
    fn test_round_trip_law() {
        let codec = codec();
        let state = sample_state();

        let opaque = codec.protect(&state).unwrap();
        let recovered = codec.unprotect(&opaque).unwrap();
        assert_eq!(recovered, state);
    }

    #[test]
    fn test_round_trip_preserves_code_and_secret() {
        let codec = codec();
        let state = sample_state()
            .with_client_secret("s3cret")
            .with_authorization_code(AuthorizationCode::new("issued-code"));

        let recovered = codec.unprotect(&codec.protect(&state).unwrap()).unwrap();
        assert_eq!(recovered.client_secret(), Some("s3cret"));
        assert_eq!(
            recovered.authorization_code().map(AuthorizationCode::value),
            Some("issued-code")
        );
    }

    #[test]
    fn test_unprotect_garbage_is_absent() {
        let codec = codec();
        assert!(codec.unprotect("").is_none());
        assert!(codec.unprotect("not base64 !!!").is_none());
        assert!(codec.unprotect("dmFsaWQtYjY0LWJ1dC1ub3Qtc2VhbGVk").is_none());
    }

    #[test]
    fn test_unprotect_wrong_key_is_absent() {
        let state = sample_state();
        let opaque = codec().protect(&state).unwrap();
        assert!(codec().unprotect(&opaque).is_none());
    }

    #[test]
    fn test_serialized_shape_is_deterministic() {
        let json_a = serde_json::to_string(&sample_state()).unwrap();
        let json_b = serde_json::to_string(&sample_state()).unwrap();
        assert_eq!(json_a, json_b);

        // Field order is fixed by declaration.
        let response_type = json_a.find("responseType").unwrap();
        let client_id = json_a.find("clientId").unwrap();
        let redirect_uri = json_a.find("redirectUri").unwrap();
        let scopes = json_a.find("scopes").unwrap();
        assert!(response_type < client_id);
        assert!(client_id < redirect_uri);
        assert!(redirect_uri < scopes);
    }

    #[test]
    fn test_code_attach_transition() {
        let state = sample_state();
        assert!(state.authorization_code().is_none());

        let issued = state.clone().with_authorization_code(AuthorizationCode::new("c0de"));
        assert_eq!(
            issued.authorization_code().map(AuthorizationCode::value),
            Some("c0de")
        );
        // Everything else is untouched.
        assert_eq!(issued.client_id(), state.client_id());
        assert_eq!(issued.scopes(), state.scopes());
        assert_eq!(issued.external_state(), state.external_state());
    }

    #[test]
    fn test_debug_redacts_client_secret() {
        let state = sample_state().with_client_secret("top-secret");
        let debug = format!("{state:?}");
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
