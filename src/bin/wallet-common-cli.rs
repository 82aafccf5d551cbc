use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use clap::Parser;
use clap::Subcommand;
use wallet_common::application::config::data_directory::DataDirectory;
use wallet_common::application::rpc::auth::Permission;
use wallet_common::application::rpc::auth::Permissions;
use wallet_common::application::rpc::core::api::client::http::HttpTransport;
use wallet_common::application::rpc::core::api::rpc::CommonApi;
use wallet_common::application::rpc::core::context::CallContext;
use wallet_common::application::rpc::core::model::record::MsgType;
use wallet_common::application::rpc::core::model::record::QuerySignRecordParams;
use wallet_common::application::rpc::server::http::RPC_PATH;

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the permissions a token grants.
    AuthVerify { token: String },

    /// Mint a token granting the given permissions (requires admin).
    AuthNew {
        #[clap(required = true)]
        permissions: Vec<Permission>,
    },

    /// Invalidate a token before it expires (requires admin).
    AuthRevoke { token: String },

    /// List the log categories whose level can be set.
    LogList,

    /// Set the level of a log category (requires write).
    LogSetLevel { category: String, level: String },

    /// List signing records, newest first.
    ListSignedRecord {
        #[clap(long)]
        signer: Option<String>,

        #[clap(long)]
        id: Option<String>,

        #[clap(long)]
        msg_type: Option<MsgType>,

        /// only records created after this instant (rfc3339)
        #[clap(long)]
        after: Option<DateTime<Utc>>,

        /// only records created before this instant (rfc3339)
        #[clap(long)]
        before: Option<DateTime<Utc>>,

        /// 0 lists all matching records
        #[clap(long, default_value = "0")]
        limit: usize,

        #[clap(long, default_value = "0")]
        skip: usize,

        /// only records whose signing failed
        #[clap(long)]
        is_error: bool,
    },

    /// Show build and API version of the service.
    Version,
}

#[derive(Debug, Parser)]
#[clap(name = "wallet-common-cli", about = "An RPC client for wallet-common")]
struct Config {
    /// Sets the server address to connect to.
    #[clap(long, default_value = "http://127.0.0.1:5678")]
    url: String,

    /// Token to authenticate with. Defaults to the admin token file in the
    /// data directory.
    #[clap(long)]
    token: Option<String>,

    /// Data directory holding the admin token file.
    #[clap(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

impl Config {
    async fn token(&self) -> Result<String> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }

        let data_directory = DataDirectory::get(self.data_dir.clone())?;
        let path = data_directory.admin_token_file_path();
        let token = tokio::fs::read_to_string(&path).await.with_context(|| {
            format!(
                "Could not read token file {}. Is wallet-common running, or pass --token.",
                path.display()
            )
        })?;

        Ok(token.trim().to_string())
    }

    fn endpoint(&self) -> String {
        let url = self.url.trim_end_matches('/');
        if url.ends_with(RPC_PATH) {
            url.to_string()
        } else {
            format!("{url}{RPC_PATH}")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Config = Config::parse();
    let client = HttpTransport::new(args.endpoint()).with_token(args.token().await?);
    let ctx = CallContext::new();

    match args.command {
        Command::AuthVerify { token } => {
            let permissions = client.auth_verify(&ctx, &token).await?;
            println!("{}", permissions.names().join(","));
        }
        Command::AuthNew { permissions } => {
            let permissions: Permissions = permissions.into_iter().collect();
            let token = client.auth_new(&ctx, &permissions).await?;
            println!("{}", token.as_str().unwrap_or_default());
        }
        Command::AuthRevoke { token } => {
            client.auth_revoke(&ctx, &token).await?;
            println!("Token revoked.");
        }
        Command::LogList => {
            for category in client.log_list(&ctx).await? {
                println!("{category}");
            }
        }
        Command::LogSetLevel { category, level } => {
            client.log_set_level(&ctx, &category, &level).await?;
            println!("Log level of {category} set to {level}.");
        }
        Command::ListSignedRecord {
            signer,
            id,
            msg_type,
            after,
            before,
            limit,
            skip,
            is_error,
        } => {
            let params = QuerySignRecordParams {
                signer,
                id,
                msg_type,
                after,
                before,
                limit,
                skip,
                is_error,
            };
            let records = client.list_signed_record(&ctx, &params).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Version => {
            let info = client.version(&ctx).await?;
            println!("{info}");
        }
    }

    Ok(())
}
