//! The in-memory geometry model.
//!
//! [`Geometry`] is a closed enum over every supported kind. Geometries own their members
//! exclusively; the only shared piece is the read-only [`SpatialRef`] descriptor.

pub use collection::Collection;
pub use coord::Coord;
pub use crs::{CrsKind, SpatialRef};
pub use curve::SimpleCurve;
pub use dimension::Dimension;
pub use envelope::Envelope;
pub use geometry_type::GeometryType;
pub use point::Point;
pub use scalar::{Geometry, GeometryParts};

mod collection;
mod coord;
mod crs;
mod curve;
mod dimension;
mod envelope;
mod geometry_type;
mod point;
mod ring;
mod scalar;
