/// A single vertex.
///
/// `z` and `m` are always stored; whether they are meaningful is decided by the
/// [`Dimension`][crate::geometry::Dimension] of the owning geometry. Ordinates a geometry does
/// not carry are kept at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub m: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: 0.,
            m: 0.,
        }
    }

    pub fn new_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, m: 0. }
    }

    pub fn new_zm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self { x, y, z, m }
    }

    /// Planar equality, ignoring Z and M.
    pub fn equals_2d(&self, other: &Coord) -> bool {
        self.x == other.x && self.y == other.y
    }

    pub fn is_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

impl From<geo::Coord> for Coord {
    fn from(value: geo::Coord) -> Self {
        Coord::new(value.x, value.y)
    }
}

impl From<Coord> for geo::Coord {
    fn from(value: Coord) -> Self {
        geo::coord! { x: value.x, y: value.y }
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Coord::new(x, y)
    }
}
