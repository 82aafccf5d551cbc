use async_trait::async_trait;
use tracing::info;

use crate::application::rpc::auth::Permissions;
use crate::application::rpc::core::api::rpc::*;
use crate::application::rpc::core::context::CallContext;
use crate::application::rpc::core::model::message::*;
use crate::application::rpc::server::rpc::CommonServer;
use crate::macros::fn_name;
use crate::macros::log_slow_scope;

#[async_trait]
impl CommonApi for CommonServer {
    async fn auth_verify_call(
        &self,
        _ctx: &CallContext,
        request: AuthVerifyRequest,
    ) -> RpcResult<AuthVerifyResponse> {
        log_slow_scope!(fn_name!());

        let credential = self.verifier.verify(request.token.as_bytes()).await?;

        Ok(AuthVerifyResponse {
            permissions: credential.permissions,
        })
    }

    async fn auth_new_call(
        &self,
        _ctx: &CallContext,
        request: AuthNewRequest,
    ) -> RpcResult<AuthNewResponse> {
        log_slow_scope!(fn_name!());

        let permissions = Permissions::try_from_names(&request.permissions)?;
        let token = self.verifier.issue(&permissions).await?;

        Ok(AuthNewResponse { token })
    }

    async fn auth_revoke_call(
        &self,
        _ctx: &CallContext,
        request: AuthRevokeRequest,
    ) -> RpcResult<AuthRevokeResponse> {
        log_slow_scope!(fn_name!());

        self.verifier.revoke(request.token.as_bytes()).await?;

        Ok(AuthRevokeResponse)
    }

    async fn log_list_call(
        &self,
        _ctx: &CallContext,
        _: LogListRequest,
    ) -> RpcResult<LogListResponse> {
        Ok(LogListResponse {
            categories: self.log.list(),
        })
    }

    async fn log_set_level_call(
        &self,
        _ctx: &CallContext,
        request: LogSetLevelRequest,
    ) -> RpcResult<LogSetLevelResponse> {
        log_slow_scope!(fn_name!());

        self.log.set_level(&request.category, &request.level)?;
        info!(
            "log level of {} set to {}",
            request.category, request.level
        );

        Ok(LogSetLevelResponse)
    }

    async fn list_signed_record_call(
        &self,
        _ctx: &CallContext,
        request: ListSignedRecordRequest,
    ) -> RpcResult<ListSignedRecordResponse> {
        log_slow_scope!(fn_name!());

        let params = request.params.unwrap_or_default();
        let records = self.records.query(&params).await?;

        Ok(ListSignedRecordResponse { records })
    }

    async fn version_call(
        &self,
        _ctx: &CallContext,
        _: VersionRequest,
    ) -> RpcResult<VersionResponse> {
        Ok(VersionResponse {
            info: self.version.clone(),
        })
    }
}
