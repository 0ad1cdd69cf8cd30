//! Interactive and HTTP surfaces over the slope tables.
#![cfg(feature = "database")]

mod api;
mod cli;
mod handlers;
mod query;
mod request;
mod response;
mod server;

pub use api::*;
pub use cli::*;
#[cfg(feature = "server")]
pub use handlers::*;
pub use query::*;
pub use request::*;
pub use response::*;
#[cfg(feature = "server")]
pub use server::*;
