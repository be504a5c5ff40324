//! Polygon set predicates and overlays, behind an injectable provider.
//!
//! The ring organizer and the dateline corrector only need a handful of predicates and two
//! overlays. Every answer is optional: a provider returns `None` when it cannot decide, and the
//! caller falls back to its own heuristic.

mod geo;
#[cfg(feature = "geos")]
mod geos;
mod heuristic;

pub use self::geo::GeoSetOperations;
#[cfg(feature = "geos")]
pub use self::geos::GeosSetOperations;
pub use heuristic::HeuristicSetOperations;

use crate::geometry::Geometry;

/// Set predicates and overlays on polygonal geometries.
pub trait SetOperations {
    /// Whether `a` contains `b`.
    fn contains(&self, a: &Geometry, b: &Geometry) -> Option<bool>;

    /// Whether the interiors of `a` and `b` intersect while neither contains the other.
    fn overlaps(&self, a: &Geometry, b: &Geometry) -> Option<bool>;

    /// Whether `a` and `b` meet only along their boundaries.
    fn touches(&self, a: &Geometry, b: &Geometry) -> Option<bool>;

    /// The part of `a` outside `b`.
    fn difference(&self, a: &Geometry, b: &Geometry) -> Option<Geometry>;

    /// The part of `a` inside `b`.
    fn intersection(&self, a: &Geometry, b: &Geometry) -> Option<Geometry>;
}
