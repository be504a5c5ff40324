use serde::{Deserialize, Serialize};

use crate::geometry::Envelope;

/// The broad category of a coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrsKind {
    /// Longitude/latitude in degrees.
    Geographic,
    /// Planar easting/northing.
    Projected,
    /// Anything else (engineering, geocentric, ...).
    Other,
}

/// A read-only descriptor of a coordinate reference system.
///
/// Geometries only hold this behind an [`Arc`][std::sync::Arc]; the CRS catalog and projection
/// math live in an external [`CoordinateTransform`][crate::algorithm::transform::CoordinateTransform].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialRef {
    name: String,
    kind: CrsKind,
    /// West, south, east, north, in degrees.
    area_of_use: Option<Envelope>,
}

impl SpatialRef {
    pub fn new(name: impl Into<String>, kind: CrsKind) -> Self {
        Self {
            name: name.into(),
            kind,
            area_of_use: None,
        }
    }

    pub fn geographic(name: impl Into<String>) -> Self {
        Self::new(name, CrsKind::Geographic)
    }

    pub fn projected(name: impl Into<String>) -> Self {
        Self::new(name, CrsKind::Projected)
    }

    pub fn with_area_of_use(mut self, west: f64, south: f64, east: f64, north: f64) -> Self {
        self.area_of_use = Some(Envelope::from_bounds(west, south, east, north));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CrsKind {
        self.kind
    }

    pub fn is_geographic(&self) -> bool {
        self.kind == CrsKind::Geographic
    }

    pub fn is_projected(&self) -> bool {
        self.kind == CrsKind::Projected
    }

    pub fn area_of_use(&self) -> Option<&Envelope> {
        self.area_of_use.as_ref()
    }

    /// Whether the area of use is unknown, reaches a pole or the antimeridian, or wraps
    /// around it (west greater than east).
    pub fn has_global_area_of_use(&self) -> bool {
        match &self.area_of_use {
            None => true,
            Some(area) => {
                area.miny == -90.
                    || area.maxy == 90.
                    || area.minx == -180.
                    || area.maxx == 180.
                    || area.minx > area.maxx
            }
        }
    }
}

// Envelope is serialized as a plain bounding box.
impl Serialize for Envelope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.minx, self.miny, self.maxx, self.maxy].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [minx, miny, maxx, maxy] = <[f64; 4]>::deserialize(deserializer)?;
        Ok(Envelope::from_bounds(minx, miny, maxx, maxy))
    }
}
