//! OAuth 2.0 protocol types and pure flow logic.
//!
//! - [`state`] - the authorization state carried through the external login
//!   redirect, and its protect/unprotect codec
//! - [`validate`] - authorization request validation
//! - [`token`] - token endpoint wire types and Basic credential parsing

pub mod state;
pub mod token;
pub mod validate;

pub use state::{AuthorizationCode, AuthorizationState, AuthorizationStateCodec};
pub use token::{ClientCredentials, TokenRequest, parse_basic_authorization};
pub use validate::{AuthorizeParams, AuthorizeRejection, validate_authorization_request};
