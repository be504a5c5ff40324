//! Circular arcs: stroking them into line strings and recovering them from line strings.
//!
//! Line strings produced in [`IntermediatePoint::Stealth`](crate::options::IntermediatePoint)
//! mode carry the exact position of each arc's intermediate point in the low mantissa bits of
//! a few vertices (see [`pack_ratio`]), so that [`curve_from_line_string`] restores the
//! original arc.

mod detect;
mod ellipse;
mod hidden;
mod linearize;
mod parameters;
mod stroke;

pub use detect::curve_from_line_string;
pub use ellipse::approximate_arc_angles;
pub use hidden::{
    decode_alpha_ratio, encode_alpha_ratio, hidden_value, pack_ratio, set_hidden_value,
    unpack_ratio, unpack_ratio_reversed, HIDDEN_SENTINEL,
};
pub use linearize::{CurveGeometry, Linearize};
pub(crate) use linearize::linearize_curve;
pub use parameters::{curve_parameters, ArcParameters};
pub use stroke::curve_to_line_string;

use crate::options::FactoryOptions;

/// The angular step, in degrees, used to stroke arcs under `options`.
///
/// Values outside [0.01, 180] are clamped, with a warning the first time.
pub fn default_arc_step_size(options: &FactoryOptions) -> f64 {
    options.default_arc_step_size()
}
