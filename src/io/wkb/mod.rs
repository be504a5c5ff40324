//! Reading and writing WKB-encoded geometries, in both the ISO and the extended OGC flavors.

pub(crate) mod common;
mod reader;
mod writer;

pub use common::{Endianness, WkbVariant};
pub use reader::parse_wkb;
pub use writer::{to_wkb, wkb_size, write_wkb};
