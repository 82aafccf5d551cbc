use std::process;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use wallet_common::application::config::cli_args;
use wallet_common::application::logging::LogLevels;

pub fn main() -> Result<()> {
    let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()?;

    let run_result = tokio_runtime.block_on(async {
        // Fetch the CLI arguments
        let args = cli_args::Args::parse();

        #[cfg(not(feature = "tokio-console"))]
        let log_levels = {
            use std::io::Write;
            if args.tokio_console {
                let mut stderr = std::io::BufWriter::new(std::io::stderr().lock());
                writeln!(stderr, "tokio-console support not included in this build.")?;
                writeln!(stderr, "To use the tokio-console command-line argument,")?;
                writeln!(stderr, "please build with the tokio-console feature-flag.")?;
                stderr.flush()?;
                anyhow::bail!("tokio-console not included. Build with tokio-console feature-flag.");
            }

            LogLevels::init_global()?
        };

        // LogSetLevel only records levels while traces go to tokio-console.
        #[cfg(feature = "tokio-console")]
        let log_levels = if args.tokio_console {
            console_subscriber::init();
            LogLevels::detached()
        } else {
            LogLevels::init_global()?
        };

        wallet_common::initialize(args, Arc::new(log_levels))
            .await?
            .run()
            .await
    });

    tokio_runtime.shutdown_timeout(tokio::time::Duration::from_secs(10));

    process::exit(run_result?)
}
