//! Analysis Binary
//!
//! Interactive REPL over regions, slope statistics and DTM metadata.

use roadslope::analysis::*;
use roadslope::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log();
    kys();
    let config = Config::from_env()?;
    let client = database::db(&config).await?;
    CLI::from(API::new(client, &config)?).run().await
}
