use clap::Parser;
use refsync_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    if let Err(err) = logging::init_logging(&args.log_level) {
        eprintln!("refsync error: {:#}", err);
        std::process::exit(1);
    }

    match cli::run(args).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("refsync error: {:#}", err);
            std::process::exit(1);
        }
    }
}
