//! PostgreSQL access for the analysis surfaces.
//!
//! - [`db()`] connects using the configured database URL
//! - [`Source`] reads slope tables and raster metadata
//! - [`Check`] reports which pipeline tables exist and how large they are
#![cfg(feature = "database")]

mod check;
mod source;

pub use check::*;
pub use source::*;

use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;
use tokio_postgres::Client;

/// Connects to PostgreSQL and drives the connection on a background task.
pub async fn db(config: &Config) -> Result<Arc<Client>> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(config.database_url()?, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok(Arc::new(client))
}
