use std::sync::Arc;

use serde_json::Value;
use strum::Display;
use tracing::debug;
use tracing::trace;

use crate::application::rpc::auth::CredentialVerifier;
use crate::application::rpc::core::api::ops::METHOD_NAMESPACE;
use crate::application::rpc::core::api::registry::MethodDescriptor;
use crate::application::rpc::core::api::registry::MethodRegistry;
use crate::application::rpc::core::context::CallContext;
use crate::application::rpc::core::error::RpcError;
use crate::application::rpc::core::error::RpcResult;
use crate::macros::fn_name;
use crate::macros::log_slow_scope;

/// Stages a single call passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CallState {
    Received,
    PermissionChecked,
    Invoked,
    Completed,
    Failed,
}

/// follows one call through its states and logs each transition
#[derive(Debug)]
struct CallTracker<'a> {
    method: &'a str,
    state: CallState,
}

impl<'a> CallTracker<'a> {
    fn new(method: &'a str) -> Self {
        trace!("{method}: {}", CallState::Received);
        Self {
            method,
            state: CallState::Received,
        }
    }

    fn enter(&mut self, next: CallState) {
        trace!("{}: {} -> {}", self.method, self.state, next);
        self.state = next;
    }

    fn finish(mut self, result: &RpcResult<Value>) {
        match result {
            Ok(_) => self.enter(CallState::Completed),
            Err(e) => {
                debug!("{} failed in state {}: {e}", self.method, self.state);
                self.enter(CallState::Failed);
            }
        }
    }
}

/// Routes calls through the permission gate into the method table.
///
/// Every call verifies the presented token, resolves the method and checks
/// the caller's permissions, in that order, before the handler runs. A
/// failure at any step ends the call without invoking the handler.
#[derive(Debug)]
pub struct Dispatcher {
    registry: MethodRegistry,
    verifier: Arc<dyn CredentialVerifier>,
}

impl Dispatcher {
    pub fn new(registry: MethodRegistry, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { registry, verifier }
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// runs `method` for the caller presenting `token`.
    ///
    /// `method` may carry the namespace prefix of the wider service family.
    /// Missing params are treated as an empty positional list.
    pub async fn dispatch(
        &self,
        ctx: &CallContext,
        token: &[u8],
        method: &str,
        params: Value,
    ) -> RpcResult<Value> {
        log_slow_scope!(fn_name!() + "::" + method);

        let mut call = CallTracker::new(method);
        let result = self.run(ctx, token, method, params, &mut call).await;
        call.finish(&result);

        result
    }

    async fn run(
        &self,
        ctx: &CallContext,
        token: &[u8],
        method: &str,
        params: Value,
        call: &mut CallTracker<'_>,
    ) -> RpcResult<Value> {
        let descriptor = self.authorize(ctx, token, method).await?;
        call.enter(CallState::PermissionChecked);

        if ctx.is_cancelled() {
            return Err(RpcError::Cancelled);
        }

        let params = match params {
            Value::Null => Value::Array(vec![]),
            params => params,
        };

        call.enter(CallState::Invoked);
        descriptor.invoke(ctx.clone(), params).await
    }

    /// checks that the holder of `token` may call `method`.
    ///
    /// Token verification runs first, so an unknown method is only reported
    /// to authenticated callers.
    pub async fn authorize(
        &self,
        ctx: &CallContext,
        token: &[u8],
        method: &str,
    ) -> RpcResult<&MethodDescriptor> {
        if ctx.is_cancelled() {
            return Err(RpcError::Cancelled);
        }

        let credential = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(RpcError::Cancelled),
            verified = self.verifier.verify(token) => verified?,
        };

        let name = method.strip_prefix(METHOD_NAMESPACE).unwrap_or(method);
        let descriptor = self
            .registry
            .get(name)
            .ok_or_else(|| RpcError::UnknownMethod(method.to_string()))?;

        if !credential.allows(descriptor.permission()) {
            return Err(RpcError::PermissionDenied {
                method: descriptor.name().to_string(),
                required: descriptor.permission(),
            });
        }

        Ok(descriptor)
    }
}
