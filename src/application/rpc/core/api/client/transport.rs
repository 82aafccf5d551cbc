use async_trait::async_trait;

use crate::application::rpc::core::error::RpcResult;

/// Carries a JSON-RPC call to a server and back.
///
/// Every transport is a [CommonApi](crate::application::rpc::core::api::rpc::CommonApi).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, method: &str, params: serde_json::Value) -> RpcResult<serde_json::Value>;
}
