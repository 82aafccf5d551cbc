// If code coverage tool `cargo-llvm-cov` is running with the nightly toolchain,
// enable the unstable “coverage” attribute. This allows using the annotation
// `#[coverage(off)]` to explicitly exclude certain parts of the code from
// being considered as “code under test.” Most prominently, the annotation
// should be added to every `#[cfg(test)]` module. Since the “coverage”
// feature is enable only conditionally, the annotation to use is:
// `#[cfg_attr(coverage_nightly, coverage(off))]`.
//
// See also:
// - https://github.com/taiki-e/cargo-llvm-cov#exclude-code-from-coverage
// - https://github.com/rust-lang/rust/issues/84605
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod application;
pub mod macros;


use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use application::config::cli_args;
use strum::IntoEnumIterator;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::warn;

use crate::application::config::data_directory::DataDirectory;
use crate::application::logging::LogService;
use crate::application::records::MemoryRecordStore;
use crate::application::rpc::auth::secret::write_file_atomic;
use crate::application::rpc::auth::CredentialVerifier;
use crate::application::rpc::auth::JwtSecret;
use crate::application::rpc::auth::JwtVerifier;
use crate::application::rpc::auth::Permission;
use crate::application::rpc::auth::Permissions;
use crate::application::rpc::core::api::dispatcher::Dispatcher;
use crate::application::rpc::core::api::ops::CommonMethods;
use crate::application::rpc::server::http;
use crate::application::rpc::server::rpc::CommonServer;

pub const SUCCESS_EXIT_CODE: i32 = 0;
pub const SERVER_FAILED_EXIT_CODE: i32 = 1;

/// Build version reported by the `Version` method.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Slow scope threshold in seconds, unless overridden by
/// `LOG_SLOW_SCOPE_THRESHOLD`.
const DEFAULT_SLOW_SCOPE_THRESHOLD: f64 = 0.001;

/// Sets up the common service and starts serving RPC requests.
///
/// Loads or creates the token secret in the data directory, writes an admin
/// token file unless disabled, assembles the method table and binds the RPC
/// listener. The returned handle owns the running server.
pub async fn initialize(
    cli_args: cli_args::Args,
    log: Arc<dyn LogService>,
) -> Result<ServiceHandle> {
    info!("Starting wallet-common {VERSION}.");

    let data_directory = DataDirectory::get(cli_args.data_dir.clone())?;
    DataDirectory::create_dir_if_not_exists(&data_directory.root_dir_path()).await?;
    info!("Data directory is {}", data_directory);

    let secret = JwtSecret::load_or_create(&data_directory).await?;
    let verifier = Arc::new(JwtVerifier::new(&secret, cli_args.token_lifetime()));

    if cli_args.disable_admin_token_file {
        info!("Admin token file disabled.");
    } else {
        let admin_token = verifier
            .issue(&Permission::iter().collect::<Permissions>())
            .await?;
        let path = data_directory.admin_token_file_path();
        write_file_atomic(&path, admin_token.as_bytes()).await?;
        info!("Admin token written to {}", path.display());
    }

    let record_store = Arc::new(MemoryRecordStore::new());
    let server = CommonServer::new(verifier.clone(), log, record_store.clone());
    let registry = CommonMethods::new_registry(Arc::new(server));
    info!("Registered {} RPC methods.", registry.len());
    let dispatcher = Arc::new(Dispatcher::new(registry, verifier));

    let listener = TcpListener::bind(cli_args.rpc_socket_addr())
        .await
        .with_context(|| {
            format!(
                "Failed to bind RPC listener to {}. Is an instance of this program already running?",
                cli_args.rpc_socket_addr()
            )
        })?;
    let local_addr = listener.local_addr()?;

    let shutdown = CancellationToken::new();
    let server_task = tokio::spawn(http::serve(listener, dispatcher, shutdown.clone()));

    Ok(ServiceHandle {
        local_addr,
        data_directory,
        record_store,
        shutdown,
        server_task,
    })
}

/// A running common service.
#[derive(Debug)]
pub struct ServiceHandle {
    local_addr: SocketAddr,
    data_directory: DataDirectory,
    record_store: Arc<MemoryRecordStore>,
    shutdown: CancellationToken,
    server_task: JoinHandle<std::io::Result<()>>,
}

impl ServiceHandle {
    /// address the RPC server actually listens on
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn data_directory(&self) -> &DataDirectory {
        &self.data_directory
    }

    /// the store `ListSignedRecord` reads from; the signing side appends to
    /// it.
    pub fn record_store(&self) -> Arc<MemoryRecordStore> {
        self.record_store.clone()
    }

    /// stops accepting requests and waits for in-flight ones to finish
    pub async fn shutdown(self) -> Result<()> {
        self.shutdown.cancel();
        self.server_task.await??;
        Ok(())
    }

    /// serves until ctrl-c or until the server fails, and returns the exit
    /// code.
    pub async fn run(mut self) -> Result<i32> {
        let served = tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for ctrl-c")?;
                info!("Received ctrl-c, shutting down.");
                None
            }
            served = &mut self.server_task => Some(served),
        };

        match served {
            None => {
                self.shutdown().await?;
                Ok(SUCCESS_EXIT_CODE)
            }
            Some(served) => match served? {
                Ok(()) => Ok(SUCCESS_EXIT_CODE),
                Err(e) => {
                    warn!("RPC server stopped: {e}");
                    Ok(SERVER_FAILED_EXIT_CODE)
                }
            },
        }
    }
}

/// for logging how long a scope takes to execute.
///
/// Nothing is logged unless execution duration reaches the threshold, in
/// seconds.
///
/// for convenience see macro crate::macros::log_slow_scope
#[derive(Debug, Clone)]
pub struct ScopeDurationLogger<'a> {
    start: Instant,
    description: &'a str,
    log_slow_fn_threshold: f64,
    location: &'static std::panic::Location<'static>,
}

impl<'a> ScopeDurationLogger<'a> {
    #[track_caller]
    pub fn new_with_threshold(description: &'a str, log_slow_fn_threshold: f64) -> Self {
        Self {
            start: Instant::now(),
            description,
            log_slow_fn_threshold,
            location: std::panic::Location::caller(),
        }
    }

    /// threshold from `LOG_SLOW_SCOPE_THRESHOLD`; unset or unparseable
    /// values fall back to one millisecond.
    #[track_caller]
    pub fn new_default_threshold(description: &'a str) -> Self {
        Self::new_with_threshold(
            description,
            env::var("LOG_SLOW_SCOPE_THRESHOLD")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_SLOW_SCOPE_THRESHOLD),
        )
    }
}

impl Drop for ScopeDurationLogger<'_> {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();

        if duration >= self.log_slow_fn_threshold {
            tracing::debug!(
                "executed {} in {} secs.  exceeds slow fn threshold of {} secs.  location: {}",
                self.description,
                duration,
                self.log_slow_fn_threshold,
                self.location,
            );
        }
    }
}
