//! Readers and writers of the geometry encodings understood by the factory: WKT, WKB, FGF and
//! GeoJSON, plus conversion into `geo` types.

pub mod fgf;
pub mod geo;
pub mod geojson;
pub mod wkb;
pub mod wkt;
