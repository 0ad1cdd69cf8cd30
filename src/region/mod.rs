mod bbox;
mod drawing;
#[allow(clippy::module_inception)]
mod region;
mod registry;

pub use bbox::*;
pub use drawing::*;
pub use region::*;
pub use registry::*;
