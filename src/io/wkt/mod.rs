//! Reading and writing WKT-encoded geometries.

mod reader;
mod writer;

pub use reader::parse_wkt;
pub use writer::{to_wkt, write_wkt};
