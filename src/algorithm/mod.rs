//! Algorithms on [`Geometry`](crate::geometry::Geometry) values: arc stroking and detection,
//! type coercion, ring organization, set operations and coordinate transformation.

pub mod curve;
pub mod force;
pub mod organize;
#[cfg(feature = "proj")]
pub mod proj;
pub mod setops;
pub mod transform;

pub use organize::organize_polygons;
