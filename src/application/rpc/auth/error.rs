use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// enumerates possible token verification and issuance errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AuthError {
    /// malformed, unparseable or wrongly signed token
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// token is past its validity window
    #[error("token expired")]
    ExpiredToken,

    /// token was explicitly invalidated
    #[error("token revoked")]
    RevokedToken,

    /// requested permission is outside the closed set
    #[error("unsupported permission: {0}")]
    UnsupportedPermission(String),

    /// token could not be minted
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// enumerates possible key file load and store errors
#[derive(Debug, thiserror::Error)]
#[error("key file error: {}, path: {}", self.error, self.path.display())]
pub struct KeyFileError {
    /// file path
    pub path: PathBuf,

    /// source file
    pub source_file: &'static str,

    /// source line
    pub source_line: u32,

    /// filesystem error
    #[source]
    pub error: tokio::io::Error,
}
