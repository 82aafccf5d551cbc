use serde::Deserialize;
use serde::Serialize;

use crate::application::logging::LogError;
use crate::application::records::RecordError;
use crate::application::rpc::auth::AuthError;
use crate::application::rpc::auth::Permission;
use crate::application::rpc::core::model::json::JsonError;

pub type RpcResult<T> = Result<T, RpcError>;

/// Failure of a single call.
///
/// Every kind is terminal for the call and reaches the caller unchanged, so
/// a client can tell a stale token (refresh it) from a missing privilege
/// (escalate) from a permanent failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RpcError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("token revoked")]
    RevokedToken,

    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("permission denied: {method} requires {required}")]
    PermissionDenied {
        method: String,
        required: Permission,
    },

    #[error("unsupported permission: {0}")]
    UnsupportedPermission(String),

    #[error("call cancelled")]
    Cancelled,

    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// protocol level failure reported by the transport, client side only.
    #[error("server error: {0}")]
    Server(JsonError),
}

impl RpcError {
    /// JSON-RPC error code this kind travels with
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidToken(_) => 1,
            Self::ExpiredToken => 2,
            Self::RevokedToken => 3,
            Self::UnknownMethod(_) => JsonError::MethodNotFound.code(),
            Self::PermissionDenied { .. } => 4,
            Self::UnsupportedPermission(_) => 5,
            Self::Cancelled => 6,
            Self::Handler(HandlerError::InvalidParams(_)) => JsonError::InvalidParams.code(),
            Self::Handler(_) => JsonError::SERVER_ERROR_CODE,
            Self::Server(e) => e.code(),
        }
    }

    /// true for errors a client can resolve by presenting another token
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken(_) | Self::ExpiredToken | Self::RevokedToken
        )
    }
}

impl From<AuthError> for RpcError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(reason) => Self::InvalidToken(reason),
            AuthError::ExpiredToken => Self::ExpiredToken,
            AuthError::RevokedToken => Self::RevokedToken,
            AuthError::UnsupportedPermission(name) => Self::UnsupportedPermission(name),
            AuthError::Signing(reason) => Self::Handler(HandlerError::Internal(reason)),
        }
    }
}

impl From<LogError> for RpcError {
    fn from(err: LogError) -> Self {
        Self::Handler(HandlerError::Log(err))
    }
}

impl From<RecordError> for RpcError {
    fn from(err: RecordError) -> Self {
        Self::Handler(HandlerError::Record(err))
    }
}

/// Failure reported by a method handler or one of its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[non_exhaustive]
pub enum HandlerError {
    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_distinct_code() {
        let errors = [
            RpcError::InvalidToken("x".to_string()),
            RpcError::ExpiredToken,
            RpcError::RevokedToken,
            RpcError::UnknownMethod("x".to_string()),
            RpcError::PermissionDenied {
                method: "x".to_string(),
                required: Permission::Admin,
            },
            RpcError::UnsupportedPermission("x".to_string()),
            RpcError::Cancelled,
            RpcError::Handler(HandlerError::InvalidParams("x".to_string())),
            RpcError::Handler(HandlerError::Internal("x".to_string())),
        ];

        let codes: std::collections::HashSet<i32> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(errors.len(), codes.len());
    }

    #[test]
    fn auth_errors_keep_their_kind() {
        assert_eq!(RpcError::ExpiredToken, AuthError::ExpiredToken.into());
        assert_eq!(RpcError::RevokedToken, AuthError::RevokedToken.into());
        assert_eq!(
            RpcError::UnsupportedPermission("root".to_string()),
            AuthError::UnsupportedPermission("root".to_string()).into()
        );
        assert!(RpcError::from(AuthError::InvalidToken("bad".to_string())).is_auth_failure());
        assert!(!RpcError::Cancelled.is_auth_failure());
    }

    #[test]
    fn collaborator_errors_become_handler_errors() {
        let err: RpcError = LogError::UnknownCategory("miner".to_string()).into();
        assert!(matches!(err, RpcError::Handler(HandlerError::Log(_))));
        assert_eq!(JsonError::SERVER_ERROR_CODE, err.code());
    }
}
