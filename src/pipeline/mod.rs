//! Region-scoped SQL stages with two substitution channels.
//!
//! Structural placeholders (`{{name_area}}`) resolve to sanitized identifiers
//! and are spliced as text. Bound placeholders (`:minx`) become positional
//! parameters and only ever travel through the driver.
mod bound;
mod catalog;
#[cfg(any(test, feature = "database"))]
mod dry_run;
mod executor;
mod identifier;
mod stage;
mod store;
mod template;

pub use bound::*;
pub use catalog::*;
#[cfg(any(test, feature = "database"))]
pub use dry_run::*;
pub use executor::*;
pub use identifier::*;
pub use stage::*;
pub use store::*;
pub use template::*;

#[cfg(test)]
mod tests;
