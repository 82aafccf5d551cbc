use common_rpc_macros::Router;
use common_rpc_macros::Routes;
use serde::Deserialize;
use serde::Serialize;

use crate::application::rpc::auth::Permission;
use crate::application::rpc::core::api::client::transport::Transport;
use crate::application::rpc::core::api::registry::MethodRegistry;
use crate::application::rpc::core::api::registry::RegistryBuilder;
use crate::application::rpc::core::api::rpc::CommonApi;
use crate::application::rpc::core::context::CallContext;
use crate::application::rpc::core::error::HandlerError;
use crate::application::rpc::core::error::RpcError;
use crate::application::rpc::core::error::RpcResult;
use crate::application::rpc::core::model::message::*;

/// RPC interface version.
pub const RPC_API_VERSION: semver::Version = semver::Version::new(1, 0, 0);

/// Namespace prefix clients of the wider service family put in front of
/// method names, eg `Filecoin.AuthVerify`.
pub const METHOD_NAMESPACE: &str = "Filecoin.";

/// Every method of the common service with the permission it requires.
#[derive(Router, Routes, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommonMethods {
    #[permission(Permission::Read)]
    AuthVerify,

    #[permission(Permission::Admin)]
    AuthNew,

    /// invalidates a token before it expires.
    #[permission(Permission::Admin)]
    AuthRevoke,

    #[permission(Permission::Read)]
    LogList,

    #[permission(Permission::Write)]
    LogSetLevel,

    #[permission(Permission::Read)]
    ListSignedRecord,

    #[permission(Permission::Read)]
    Version,
}

impl CommonMethods {
    /// looks up a method by wire name, with or without namespace prefix
    pub fn from_method_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix(METHOD_NAMESPACE).unwrap_or(name);
        Self::ALL.into_iter().find(|m| m.method_name() == name)
    }
}
