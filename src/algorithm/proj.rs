use std::sync::Arc;

use proj::Proj;

use crate::algorithm::transform::CoordinateTransform;
use crate::error::{GeoFactoryError, Result};
use crate::geometry::{Coord, SpatialRef};

/// A [`CoordinateTransform`] backed by PROJ.
///
/// The [`SpatialRef`] names are handed to PROJ as CRS definitions (`EPSG:4326`, a PROJ string,
/// WKT...). Only X and Y are transformed.
pub struct ProjTransform {
    proj: Proj,
    source: Arc<SpatialRef>,
    target: Arc<SpatialRef>,
}

impl ProjTransform {
    pub fn new(source: Arc<SpatialRef>, target: Arc<SpatialRef>) -> Result<Self> {
        let proj = Proj::new_known_crs(source.name(), target.name(), None).map_err(|err| {
            GeoFactoryError::TransformFailed(format!(
                "Cannot create a transform from {} to {}: {err}",
                source.name(),
                target.name()
            ))
        })?;
        Ok(Self {
            proj,
            source,
            target,
        })
    }
}

impl CoordinateTransform for ProjTransform {
    fn transform(&self, coords: &mut [Coord]) -> bool {
        let mut ok = true;
        for coord in coords.iter_mut() {
            match self.proj.convert((coord.x, coord.y)) {
                Ok((x, y)) if x.is_finite() && y.is_finite() => {
                    coord.x = x;
                    coord.y = y;
                }
                Ok(_) => ok = false,
                Err(err) => {
                    log::debug!("PROJ failed on ({}, {}): {err}", coord.x, coord.y);
                    ok = false;
                }
            }
        }
        ok
    }

    fn inverse(&self) -> Option<Box<dyn CoordinateTransform>> {
        ProjTransform::new(self.target.clone(), self.source.clone())
            .map_err(|err| log::debug!("{err}"))
            .ok()
            .map(|t| Box::new(t) as Box<dyn CoordinateTransform>)
    }

    fn source_crs(&self) -> Option<Arc<SpatialRef>> {
        Some(self.source.clone())
    }

    fn target_crs(&self) -> Option<Arc<SpatialRef>> {
        Some(self.target.clone())
    }
}
