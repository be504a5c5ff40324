//! Conversion between [`Geometry`][crate::geometry::Geometry] and GeoJSON geometry objects.
//!
//! JSON handling is delegated to `serde_json` and the `geojson` crate. Only the linear kinds
//! exist in GeoJSON; curves must be linearized before writing.

mod reader;
mod writer;

pub use reader::{geometry_from_geojson, parse_geojson};
pub use writer::{to_geojson, to_geojson_string};
