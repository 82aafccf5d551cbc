use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use rand::distr::Alphanumeric;
use rand::distr::SampleString;
use wallet_common::application::config::cli_args::Args;
use wallet_common::application::config::data_directory::DataDirectory;
use wallet_common::application::logging::LogLevels;
use wallet_common::application::rpc::core::api::client::http::HttpTransport;
use wallet_common::application::rpc::server::http::RPC_PATH;
use wallet_common::ServiceHandle;

/// A wallet-common service on a random local port with its own data
/// directory.
pub struct ServiceNode {
    pub handle: ServiceHandle,
    pub admin_token: String,
}

impl ServiceNode {
    /// Create a randomly named `DataDirectory` so tests can run in parallel
    /// without sharing a token secret.
    pub fn integration_test_data_directory() -> anyhow::Result<DataDirectory> {
        let mut rng = rand::rng();
        let user = std::env::var("USER").unwrap_or_else(|_| "default".to_string());
        let tmp_root: PathBuf = std::env::temp_dir()
            .join(format!("wallet-common-integration-tests-{}", user))
            .join(Path::new(&Alphanumeric.sample_string(&mut rng, 16)));

        DataDirectory::get(Some(tmp_root))
    }

    pub fn default_args() -> anyhow::Result<Args> {
        let mut args = Args::default();
        args.data_dir = Some(Self::integration_test_data_directory()?.root_dir_path());
        args.rpc_port = 0;

        Ok(args)
    }

    pub async fn start(args: Args) -> anyhow::Result<Self> {
        let handle = wallet_common::initialize(args, Arc::new(LogLevels::detached())).await?;
        let admin_token =
            tokio::fs::read_to_string(handle.data_directory().admin_token_file_path()).await?;

        Ok(Self {
            handle,
            admin_token: admin_token.trim().to_string(),
        })
    }

    pub async fn start_default() -> anyhow::Result<Self> {
        Self::start(Self::default_args()?).await
    }

    pub fn url(&self) -> String {
        format!("http://{}{}", self.handle.local_addr(), RPC_PATH)
    }

    /// client presenting `token`
    pub fn client(&self, token: impl Into<String>) -> HttpTransport {
        HttpTransport::new(self.url()).with_token(token.into())
    }

    pub fn admin_client(&self) -> HttpTransport {
        self.client(self.admin_token.clone())
    }
}
