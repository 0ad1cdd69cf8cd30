mod crs;
mod mercator;
mod transformer;

pub use crs::*;
pub use transformer::*;
