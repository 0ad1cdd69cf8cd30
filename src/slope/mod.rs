//! Classification, aggregation and statistics over per-segment slopes.
mod aggregate;
mod category;
mod histogram;
mod segment;
mod summary;

pub use aggregate::*;
pub use category::*;
pub use histogram::*;
pub use segment::*;
pub use summary::*;
