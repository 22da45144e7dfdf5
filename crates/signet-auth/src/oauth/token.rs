//! Token endpoint wire types and Basic credential parsing.
//!
//! The token endpoint accepts `application/x-www-form-urlencoded` bodies with
//! a camelCase `grantType` field, and client credentials via HTTP Basic auth.
//! Client id and secret are 32 lowercase-hex-character tokens; anything else
//! is rejected before any dispatch.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::Deserialize;

use crate::error::AuthError;

/// Grant types supported by the Authorization-header-driven token flow.
static SUPPORTED_GRANT_TYPES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(authorization_code|client_credentials)$").expect("valid regex"));

/// `Basic <base64>` authorization header shape.
static BASIC_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Basic\s+([A-Za-z0-9+/]+={0,2})$").expect("valid regex"));

/// Decoded Basic payload shape: two 32-hex-character tokens.
static CLIENT_ID_AND_SECRET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-f0-9]{32}):([a-f0-9]{32})$").expect("valid regex"));

/// The grant literal for the client-credentials grant.
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// Token request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type. `authorization_code` or `client_credentials`.
    #[serde(rename = "grantType", default)]
    pub grant_type: Option<String>,
}

impl TokenRequest {
    /// Returns the trimmed grant type, or an empty string when absent.
    #[must_use]
    pub fn grant_type(&self) -> &str {
        self.grant_type.as_deref().unwrap_or_default().trim()
    }
}

/// Returns `true` when the grant literal is supported by the
/// Authorization-header-driven flow.
#[must_use]
pub fn is_supported_grant_type(grant_type: &str) -> bool {
    SUPPORTED_GRANT_TYPES.is_match(grant_type)
}

/// A parsed `clientId:clientSecret` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// The client identifier, 32 lowercase hex characters.
    pub client_id: String,
    /// The client secret, 32 lowercase hex characters.
    pub client_secret: String,
}

/// Parses an `Authorization: Basic <base64(clientId:clientSecret)>` value.
///
/// Every failure is a validation error on the `authorization` field; the
/// offending value is never echoed back.
pub fn parse_basic_authorization(value: &str) -> Result<ClientCredentials, AuthError> {
    let captures = BASIC_SCHEME.captures(value.trim()).ok_or_else(|| {
        AuthError::validation(
            "authorization",
            "Value should match the pattern 'Basic <credentials>'",
        )
    })?;

    let decoded = STANDARD.decode(&captures[1]).map_err(|_| {
        AuthError::validation(
            "authorization",
            "Value should match the pattern 'Basic <credentials>'",
        )
    })?;

    let credentials = String::from_utf8(decoded).map_err(|_| {
        AuthError::validation(
            "authorization",
            "Value should match the pattern '<clientId>:<clientSecret>'",
        )
    })?;

    let captures = CLIENT_ID_AND_SECRET.captures(&credentials).ok_or_else(|| {
        AuthError::validation(
            "authorization",
            "Value should match the pattern '<clientId>:<clientSecret>'",
        )
    })?;

    Ok(ClientCredentials {
        client_id: captures[1].to_string(),
        client_secret: captures[2].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_ID: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const CLIENT_SECRET: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn basic_header(payload: &str) -> String {
        format!("Basic {}", STANDARD.encode(payload))
    }

    #[test]
    fn test_supported_grant_types() {
        assert!(is_supported_grant_type("authorization_code"));
        assert!(is_supported_grant_type("client_credentials"));
        assert!(!is_supported_grant_type("refresh_token"));
        assert!(!is_supported_grant_type("password"));
        assert!(!is_supported_grant_type(""));
        assert!(!is_supported_grant_type("client_credentials "));
    }

    #[test]
    fn test_parse_valid_basic_authorization() {
        let header = basic_header(&format!("{CLIENT_ID}:{CLIENT_SECRET}"));
        let credentials = parse_basic_authorization(&header).unwrap();
        assert_eq!(credentials.client_id, CLIENT_ID);
        assert_eq!(credentials.client_secret, CLIENT_SECRET);
    }

    #[test]
    fn test_parse_tolerates_extra_scheme_whitespace() {
        let encoded = STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}"));
        let credentials = parse_basic_authorization(&format!("Basic   {encoded}")).unwrap();
        assert_eq!(credentials.client_id, CLIENT_ID);
    }

    #[test]
    fn test_parse_rejects_non_basic_scheme() {
        let err = parse_basic_authorization("Bearer some-token").unwrap_err();
        match err {
            AuthError::Validation { field, .. } => assert_eq!(field, "authorization"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_malformed_base64() {
        let err = parse_basic_authorization("Basic !!!not-base64!!!").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_parse_rejects_non_hex_credentials() {
        // Right shape, wrong alphabet.
        let err = parse_basic_authorization(&basic_header(
            "ZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZ:bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        ))
        .unwrap_err();
        assert!(err.is_validation());

        // Wrong length.
        let err = parse_basic_authorization(&basic_header("abc:def")).unwrap_err();
        assert!(err.is_validation());

        // Missing separator.
        let err = parse_basic_authorization(&basic_header(CLIENT_ID)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_token_request_grant_type_trimmed() {
        let request = TokenRequest {
            grant_type: Some("  client_credentials  ".to_string()),
        };
        assert_eq!(request.grant_type(), "client_credentials");
        assert_eq!(TokenRequest::default().grant_type(), "");
    }

    #[test]
    fn test_token_request_wire_field_name() {
        let request: TokenRequest =
            serde_json::from_value(serde_json::json!({"grantType": "client_credentials"}))
                .unwrap();
        assert_eq!(request.grant_type(), "client_credentials");

        // Absent on the wire is a valid request shape.
        let request: TokenRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(request.grant_type(), "");
    }
}
