//! Pipeline Binary
//!
//! Runs point extraction and segment slope derivation for one region.

use clap::Parser;
use roadslope::database::Check;
use roadslope::pipeline::*;
use roadslope::region::Registry;
use roadslope::*;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, short, help = "Region name; defaults to REGION or the built-in default")]
    region: Option<String>,
    #[arg(long, help = "Print table status for the region and exit")]
    status: bool,
    #[arg(long, help = "Run against an in-memory store and print the statements")]
    dry_run: bool,
    #[arg(long, help = "List registered regions and exit")]
    list: bool,
    #[arg(long, help = "Directory holding stage templates")]
    queries: Option<PathBuf>,
    #[arg(long, help = "JSON file with additional regions")]
    regions: Option<PathBuf>,
    #[arg(long, value_parser = timeout, help = "Per-stage timeout, e.g. 90s or 10m")]
    timeout: Option<Duration>,
    #[arg(long, help = "Skip the per-region advisory lock")]
    no_lock: bool,
}

fn timeout(raw: &str) -> std::result::Result<Duration, String> {
    config::parse_duration(raw).ok_or_else(|| format!("invalid duration {:?}", raw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log();
    kys();
    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(queries) = args.queries {
        config.queries = queries;
    }
    if let Some(regions) = args.regions {
        config.regions_file = Some(regions);
    }
    if let Some(timeout) = args.timeout {
        config.stage_timeout = timeout;
    }
    if args.no_lock {
        config.advisory_lock = false;
    }
    let registry = Registry::seeded(&config)?;
    if args.list {
        for region in registry.regions() {
            println!("{}", region);
        }
        return Ok(());
    }
    let region = registry.resolve(args.region.as_deref())?;
    let ref area = Identifier::sanitize(region.name())?;
    let tables = vec![
        DTM.to_string(),
        ROADS.to_string(),
        points_table(area),
        segments_table(area),
    ];
    log::info!("region {}", region);
    if args.dry_run {
        let store = MemoryStore::seeded(&[DTM, ROADS]);
        let executor = Executor::configured(store, &config);
        executor.run(&StageSpec::standard(), Some(region)).await?;
        for (sql, params) in executor.store().statements() {
            let params = params.iter().map(|p| p.to_string()).collect::<Vec<_>>();
            println!("{};\n-- [{}]\n", sql, params.join(", "));
        }
        return Ok(());
    }
    let client = database::db(&config).await?;
    if args.status {
        client.status(&tables).await;
        return Ok(());
    }
    let executor = Executor::configured(client.clone(), &config);
    for result in executor.run(&StageSpec::standard(), Some(region)).await? {
        log::info!("{}", result);
    }
    client.status(&tables).await;
    Ok(())
}
