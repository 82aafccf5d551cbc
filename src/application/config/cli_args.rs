use std::net::IpAddr;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// The `wallet-common` command-line program starts the common wallet RPC
/// service.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about)]
pub struct Args {
    /// The data directory that contains the token signing secret and the
    /// admin token file.
    ///
    /// The default varies by operating system, e.g.
    ///
    /// Linux:   /home/alice/.local/share/wallet-common
    ///
    /// Windows: C:\Users\Alice\AppData\Roaming\wallet-common\data
    ///
    /// macOS:   /Users/Alice/Library/Application Support/wallet-common
    #[clap(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Port on which to listen for RPC connections.
    ///
    /// 0 lets the operating system pick a free port.
    #[clap(long, default_value = "5678", value_name = "PORT")]
    pub rpc_port: u16,

    /// IP on which to listen for RPC connections.
    #[clap(long, default_value = "127.0.0.1")]
    pub rpc_listen_addr: IpAddr,

    /// How long newly issued tokens stay valid.
    ///
    /// E.g. --token-lifetime 30days, --token-lifetime 12h
    #[clap(long, default_value = "365days", value_name = "DURATION")]
    pub token_lifetime: humantime::Duration,

    /// Do not write an admin token to the data directory at startup.
    ///
    /// The token file grants full access to the service. On unix it is
    /// readable by the service user only. Without the token file, admin
    /// tokens can only be minted by a client that already holds one.
    #[clap(long)]
    pub disable_admin_token_file: bool,

    /// Enable tokio tracing for consumption by the tokio-console application.
    ///
    /// Requires a build with the `tokio-console` feature.
    #[clap(long)]
    pub tokio_console: bool,
}

impl Args {
    /// Socket the RPC server binds to.
    pub fn rpc_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.rpc_listen_addr, self.rpc_port)
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime.into()
    }
}

impl Default for Args {
    fn default() -> Self {
        let empty: Vec<String> = vec![];
        Self::parse_from(empty)
    }
}
