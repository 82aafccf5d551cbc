use std::sync::Arc;

use crate::application::logging::LogService;
use crate::application::records::RecordStore;
use crate::application::rpc::auth::CredentialVerifier;
use crate::application::rpc::core::api::ops::RPC_API_VERSION;
use crate::application::rpc::core::model::version::VersionInfo;

/// Serves the common methods by delegating to its collaborators.
///
/// Holds no state of its own; cloning is cheap.
#[derive(Clone, Debug)]
pub struct CommonServer {
    pub(crate) verifier: Arc<dyn CredentialVerifier>,
    pub(crate) log: Arc<dyn LogService>,
    pub(crate) records: Arc<dyn RecordStore>,
    pub(crate) version: VersionInfo,
}

impl CommonServer {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        log: Arc<dyn LogService>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            verifier,
            log,
            records,
            version: VersionInfo {
                version: crate::VERSION.to_string(),
                api_version: RPC_API_VERSION,
            },
        }
    }
}
