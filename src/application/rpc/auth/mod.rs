//! Token based authentication for the RPC server.
//!
//! Callers present an HS256 JSON web token. Verifying it yields a
//! [Credential] holding the caller's [Permissions], which the dispatcher
//! checks against the permission each method requires.
pub mod error;
pub mod permission;
pub mod secret;
pub mod token;
pub mod verifier;

pub use error::AuthError;
pub use permission::Permission;
pub use permission::Permissions;
pub use secret::JwtSecret;
pub use token::Credential;
pub use token::Token;
pub use verifier::CredentialVerifier;
pub use verifier::JwtVerifier;
