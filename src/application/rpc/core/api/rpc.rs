use async_trait::async_trait;

use crate::application::rpc::auth::Permissions;
use crate::application::rpc::auth::Token;
use crate::application::rpc::core::context::CallContext;
pub use crate::application::rpc::core::error::RpcError;
pub use crate::application::rpc::core::error::RpcResult;
use crate::application::rpc::core::model::message::*;
use crate::application::rpc::core::model::record::QuerySignRecordParams;
use crate::application::rpc::core::model::record::SignRecord;
use crate::application::rpc::core::model::version::VersionInfo;

/// The methods of the common service.
///
/// Implemented by the server, which does the work, and by every
/// [Transport](super::client::transport::Transport), which forwards the call.
/// The `*_call` methods take and return the wire messages; the others are
/// conveniences on top of them.
///
/// Permission checks are not part of this trait. The dispatcher performs them
/// before a `*_call` method runs.
#[async_trait]
pub trait CommonApi: Send + Sync {
    /// permissions granted by `token`
    async fn auth_verify(&self, ctx: &CallContext, token: &str) -> RpcResult<Permissions> {
        let request = AuthVerifyRequest {
            token: token.to_string(),
        };
        Ok(self.auth_verify_call(ctx, request).await?.permissions)
    }

    /// a new token granting exactly `permissions`
    async fn auth_new(&self, ctx: &CallContext, permissions: &Permissions) -> RpcResult<Token> {
        let request = AuthNewRequest {
            permissions: permissions.names(),
        };
        Ok(self.auth_new_call(ctx, request).await?.token)
    }

    async fn auth_revoke(&self, ctx: &CallContext, token: &str) -> RpcResult<()> {
        let request = AuthRevokeRequest {
            token: token.to_string(),
        };
        self.auth_revoke_call(ctx, request).await.map(|_| ())
    }

    /// names of the log categories whose level can be set
    async fn log_list(&self, ctx: &CallContext) -> RpcResult<Vec<String>> {
        Ok(self.log_list_call(ctx, LogListRequest {}).await?.categories)
    }

    async fn log_set_level(&self, ctx: &CallContext, category: &str, level: &str) -> RpcResult<()> {
        let request = LogSetLevelRequest {
            category: category.to_string(),
            level: level.to_string(),
        };
        self.log_set_level_call(ctx, request).await.map(|_| ())
    }

    async fn list_signed_record(
        &self,
        ctx: &CallContext,
        params: &QuerySignRecordParams,
    ) -> RpcResult<Vec<SignRecord>> {
        let request = ListSignedRecordRequest {
            params: Some(params.clone()),
        };
        Ok(self.list_signed_record_call(ctx, request).await?.records)
    }

    async fn version(&self, ctx: &CallContext) -> RpcResult<VersionInfo> {
        Ok(self.version_call(ctx, VersionRequest {}).await?.info)
    }

    async fn auth_verify_call(
        &self,
        ctx: &CallContext,
        request: AuthVerifyRequest,
    ) -> RpcResult<AuthVerifyResponse>;

    async fn auth_new_call(
        &self,
        ctx: &CallContext,
        request: AuthNewRequest,
    ) -> RpcResult<AuthNewResponse>;

    async fn auth_revoke_call(
        &self,
        ctx: &CallContext,
        request: AuthRevokeRequest,
    ) -> RpcResult<AuthRevokeResponse>;

    async fn log_list_call(
        &self,
        ctx: &CallContext,
        request: LogListRequest,
    ) -> RpcResult<LogListResponse>;

    async fn log_set_level_call(
        &self,
        ctx: &CallContext,
        request: LogSetLevelRequest,
    ) -> RpcResult<LogSetLevelResponse>;

    async fn list_signed_record_call(
        &self,
        ctx: &CallContext,
        request: ListSignedRecordRequest,
    ) -> RpcResult<ListSignedRecordResponse>;

    async fn version_call(
        &self,
        ctx: &CallContext,
        request: VersionRequest,
    ) -> RpcResult<VersionResponse>;
}
