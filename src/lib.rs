//! Construction, coercion and conversion of vector geometries.
//!
//! [`GeometryFactory`] is the entry point: it parses WKT, WKB, FGF and GeoJSON into the
//! [`Geometry`](geometry::Geometry) model, organizes loose rings into polygons, forces a
//! geometry into another kind, strokes and recovers circular arcs, and reprojects geometries
//! with antimeridian and pole corrections. Each of these is also available as a free function
//! in [`algorithm`] and [`io`].

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub use factory::GeometryFactory;

pub mod algorithm;
pub mod error;
mod factory;
pub mod geometry;
pub mod io;
pub mod options;
#[cfg(test)]
pub(crate) mod test;
