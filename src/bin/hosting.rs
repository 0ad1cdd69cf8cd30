//! Hosting Binary
//!
//! Serves the slope dashboard API over HTTP.

use clap::Parser;
use roadslope::analysis::*;
use roadslope::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, help = "Bind address; defaults to BIND_ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log();
    kys();
    let args = Args::parse();
    let config = Config::from_env()?;
    let bind = args.bind.unwrap_or_else(|| config.bind.clone());
    let client = database::db(&config).await?;
    Server::run(API::new(client, &config)?, &bind).await?;
    Ok(())
}
