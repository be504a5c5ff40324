//! Conversion to and from [`geo`] types. Only X and Y survive the conversion.

mod scalar;

pub use scalar::{geometry_to_geo, line_string_to_geo, polygon_to_geo};
