//! Region-scoped road slope analysis over a PostGIS terrain model.
//!
//! - [`region`] — named bounding boxes, validation, drawn regions
//! - [`transform`] — reprojection between the working and display CRS
//! - [`pipeline`] — ordered SQL stages with identifier and value channels
//! - [`slope`] — categories, per-category geometry, statistics, histogram
//! - [`database`] — PostgreSQL reads and status checks
//! - [`analysis`] — REPL and HTTP surfaces
pub mod config;
pub mod error;
pub mod pipeline;
pub mod region;
pub mod slope;
pub mod transform;

#[cfg(feature = "database")]
pub mod analysis;
#[cfg(feature = "database")]
pub mod database;

pub use config::Config;
pub use error::Error;
pub use error::Result;

/// Initialize combined terminal and file logging.
#[cfg(feature = "database")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate termination.
/// A stage interrupted this way is rolled back by the server when the session drops.
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("violent interrupt received, exiting immediately");
            std::process::exit(0);
        }
    });
}
