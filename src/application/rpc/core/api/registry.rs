use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::application::rpc::auth::Permission;
use crate::application::rpc::core::api::rpc::CommonApi;
use crate::application::rpc::core::context::CallContext;
use crate::application::rpc::core::error::RpcResult;

type HandlerFn = Box<dyn Fn(CallContext, Value) -> BoxFuture<'static, RpcResult<Value>> + Send + Sync>;

/// A method's name, the permission it requires and its handler.
pub struct MethodDescriptor {
    name: &'static str,
    permission: Permission,
    handler: HandlerFn,
}

impl std::fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

impl MethodDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// runs the handler without any permission check.
    pub(crate) async fn invoke(&self, ctx: CallContext, params: Value) -> RpcResult<Value> {
        (self.handler)(ctx, params).await
    }
}

/// Collects the method table. [RegistryBuilder::build] freezes it.
pub struct RegistryBuilder {
    methods: HashMap<&'static str, MethodDescriptor>,
    api: Arc<dyn CommonApi>,
}

impl std::fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

impl RegistryBuilder {
    pub fn new(api: Arc<dyn CommonApi>) -> Self {
        Self {
            methods: HashMap::new(),
            api,
        }
    }

    /// registers `f` as the handler of `name`.
    ///
    /// Registering a name twice replaces the earlier entry.
    pub fn insert<F, Fut>(&mut self, name: &'static str, permission: Permission, f: F)
    where
        F: Fn(Arc<dyn CommonApi>, CallContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcResult<Value>> + Send + 'static,
    {
        let api = self.api.clone();
        let descriptor = MethodDescriptor {
            name,
            permission,
            handler: Box::new(move |ctx, params| f(api.clone(), ctx, params).boxed()),
        };

        if self.methods.insert(name, descriptor).is_some() {
            tracing::warn!("method {name} registered twice; keeping the last handler");
        }
    }

    pub fn build(self) -> MethodRegistry {
        MethodRegistry {
            methods: self.methods,
        }
    }
}

/// Immutable method table.
///
/// Built once at startup and shared read-only between all calls.
#[derive(Debug)]
pub struct MethodRegistry {
    methods: HashMap<&'static str, MethodDescriptor>,
}

impl MethodRegistry {
    pub fn get(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// registered method names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
