use std::sync::Arc;

use crate::geometry::{Coord, Dimension, SpatialRef};

/// A single position, possibly empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    pub coord: Option<Coord>,
    pub(crate) dim: Dimension,
    pub(crate) crs: Option<Arc<SpatialRef>>,
}

impl Point {
    pub fn new(coord: Coord, dim: Dimension) -> Self {
        Self {
            coord: Some(coord),
            dim,
            crs: None,
        }
    }

    pub fn empty(dim: Dimension) -> Self {
        Self {
            coord: None,
            dim,
            crs: None,
        }
    }

    pub fn dimension(&self) -> Dimension {
        self.dim
    }

    pub fn x(&self) -> Option<f64> {
        self.coord.map(|c| c.x)
    }

    pub fn y(&self) -> Option<f64> {
        self.coord.map(|c| c.y)
    }
}
