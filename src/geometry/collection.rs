use std::sync::Arc;

use crate::error::{GeoFactoryError, Result};
use crate::geometry::{Dimension, Geometry, SpatialRef};

/// Relative tolerance under which the start of an appended compound curve component is
/// snapped onto the end of the previous one.
const CURVE_JOIN_TOLERANCE: f64 = 1e-14;

/// An ordered sequence of owned member geometries.
///
/// Backs every kind that is built out of other geometries: the multi kinds, polygons (whose
/// members are rings, exterior first), compound curves, polyhedral surfaces and TINs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collection {
    pub members: Vec<Geometry>,
    pub(crate) dim: Dimension,
    pub(crate) crs: Option<Arc<SpatialRef>>,
}

impl Collection {
    pub fn new(members: Vec<Geometry>, dim: Dimension) -> Self {
        Self {
            members,
            dim,
            crs: None,
        }
    }

    pub fn empty(dim: Dimension) -> Self {
        Self::new(vec![], dim)
    }

    pub fn dimension(&self) -> Dimension {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.iter().all(|m| m.is_empty())
    }

    /// Append a member, widening the dimension of either side so they agree.
    pub fn push(&mut self, mut member: Geometry) {
        let dim = self.dim.union(member.dimension());
        if dim != self.dim {
            self.set_dimension(dim);
        }
        if member.dimension() != dim {
            member.set_dimension(dim);
        }
        if member.crs().is_none() {
            member.assign_crs(self.crs.clone());
        }
        self.members.push(member);
    }

    /// Append a component to a compound curve.
    ///
    /// The start of `curve` must coincide with the end of the previous component (up to a
    /// relative 1e-14); it is then snapped onto it exactly.
    pub fn push_curve(&mut self, mut curve: Geometry) -> Result<()> {
        if let Some(previous) = self.members.last() {
            let end = previous.end_point().ok_or_else(|| {
                GeoFactoryError::General("Cannot append to an empty curve".to_string())
            })?;
            if let Some(start) = curve.start_point() {
                if (end.x - start.x).abs() > CURVE_JOIN_TOLERANCE * start.x.abs()
                    || (end.y - start.y).abs() > CURVE_JOIN_TOLERANCE * start.y.abs()
                    || (end.z - start.z).abs() > CURVE_JOIN_TOLERANCE * start.z.abs()
                {
                    return Err(GeoFactoryError::General(format!(
                        "Non contiguous curves: ({} {}) then ({} {})",
                        end.x, end.y, start.x, start.y
                    )));
                }
                if let Some(first) = curve.as_curve_mut().and_then(|c| c.coords.first_mut()) {
                    *first = end;
                }
            }
        }
        self.push(curve);
        Ok(())
    }

    pub(crate) fn set_dimension(&mut self, dim: Dimension) {
        self.members.iter_mut().for_each(|m| m.set_dimension(dim));
        self.dim = dim;
    }
}
