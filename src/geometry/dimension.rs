use std::fmt::Display;

use crate::error::{GeoFactoryError, Result};

/// The coordinate dimension of a geometry.
///
/// Z and M are independent flags, so a geometry may carry a measure without an elevation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimension {
    /// Two-dimensional.
    #[default]
    XY,

    /// Three-dimensional.
    XYZ,

    /// XYM (2D with measure).
    XYM,

    /// XYZM (3D with measure).
    XYZM,
}

impl Dimension {
    /// Build a dimension out of the two independent flags.
    pub fn from_flags(has_z: bool, has_m: bool) -> Self {
        match (has_z, has_m) {
            (false, false) => Dimension::XY,
            (true, false) => Dimension::XYZ,
            (false, true) => Dimension::XYM,
            (true, true) => Dimension::XYZM,
        }
    }

    pub fn has_z(&self) -> bool {
        matches!(self, Dimension::XYZ | Dimension::XYZM)
    }

    pub fn has_m(&self) -> bool {
        matches!(self, Dimension::XYM | Dimension::XYZM)
    }

    /// Returns the number of dimensions.
    pub fn size(&self) -> usize {
        match self {
            Dimension::XY => 2,
            Dimension::XYZ => 3,
            Dimension::XYM => 3,
            Dimension::XYZM => 4,
        }
    }

    /// The dimension holding every ordinate present in either input.
    pub fn union(&self, other: Dimension) -> Dimension {
        Dimension::from_flags(
            self.has_z() || other.has_z(),
            self.has_m() || other.has_m(),
        )
    }
}

impl TryFrom<usize> for Dimension {
    type Error = GeoFactoryError;

    fn try_from(value: usize) -> Result<Self> {
        match value {
            2 => Ok(Dimension::XY),
            3 => Ok(Dimension::XYZ),
            4 => Ok(Dimension::XYZM),
            _ => Err(GeoFactoryError::General(format!(
                "Unsupported dimension {value}"
            ))),
        }
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::XY => write!(f, "XY"),
            Dimension::XYZ => write!(f, "XYZ"),
            Dimension::XYM => write!(f, "XYM"),
            Dimension::XYZM => write!(f, "XYZM"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_round_trip() {
        for dim in [
            Dimension::XY,
            Dimension::XYZ,
            Dimension::XYM,
            Dimension::XYZM,
        ] {
            assert_eq!(Dimension::from_flags(dim.has_z(), dim.has_m()), dim);
        }
    }

    #[test]
    fn union_keeps_both_flags() {
        assert_eq!(Dimension::XYZ.union(Dimension::XYM), Dimension::XYZM);
        assert_eq!(Dimension::XY.union(Dimension::XY), Dimension::XY);
    }

    #[test]
    fn from_size() {
        assert_eq!(Dimension::try_from(3).unwrap(), Dimension::XYZ);
        assert!(Dimension::try_from(5).is_err());
    }
}
