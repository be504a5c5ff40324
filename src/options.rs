//! Options threaded through the factory entry points.
//!
//! Algorithms never look at the process environment; [`FactoryOptions::from_env`] resolves the
//! `GEOFACTORY_*` variables once and the resulting struct is passed down explicitly.

use std::str::FromStr;
use std::sync::Once;

use serde::{Deserialize, Serialize};

use crate::error::{GeoFactoryError, Result};

/// Default angular step, in degrees, when stroking arcs.
pub const DEFAULT_ARC_STEP_SIZE: f64 = 4.;

/// Default width, in degrees, of the band each side of the antimeridian used by
/// dateline wrapping.
pub const DEFAULT_DATELINE_OFFSET: f64 = 10.;

const MIN_ARC_STEP_SIZE: f64 = 1e-2;
const MAX_ARC_STEP_SIZE: f64 = 180.;

/// How the intermediate point of an arc is kept when the arc is stroked into a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntermediatePoint {
    /// Not emitted, but its angular position is hidden in the low bits of the stroked
    /// vertices so that the arc can be rebuilt exactly.
    #[default]
    Stealth,
    /// Emitted as an explicit vertex.
    Yes,
    /// Dropped.
    No,
}

impl FromStr for IntermediatePoint {
    type Err = GeoFactoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "STEALTH" => Ok(Self::Stealth),
            "YES" | "TRUE" | "ON" => Ok(Self::Yes),
            "NO" | "FALSE" | "OFF" => Ok(Self::No),
            _ => Err(GeoFactoryError::General(format!(
                "Unsupported ADD_INTERMEDIATE_POINT value: {s}"
            ))),
        }
    }
}

/// Strategy used to assemble loose rings into polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizeMethod {
    /// Full nesting analysis.
    #[default]
    Default,
    /// Every ring becomes its own polygon.
    Skip,
    /// Clockwise rings are outers and counter-clockwise rings are holes.
    OnlyCcw,
    /// Like [`OrganizeMethod::OnlyCcw`], and each hole directly follows its outer ring.
    CcwInnerJustAfterCwOuter,
}

impl FromStr for OrganizeMethod {
    type Err = GeoFactoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DEFAULT" => Ok(Self::Default),
            "SKIP" => Ok(Self::Skip),
            "ONLY_CCW" => Ok(Self::OnlyCcw),
            "CCW_INNER_JUST_AFTER_CW_OUTER" => Ok(Self::CcwInnerJustAfterCwOuter),
            _ => Err(GeoFactoryError::General(format!(
                "Unrecognized value for METHOD option: {s}"
            ))),
        }
    }
}

impl OrganizeMethod {
    /// Parse a method name, falling back to [`OrganizeMethod::Default`] with a warning.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|err| {
            log::warn!("{err}");
            Self::Default
        })
    }
}

/// How arcs are stroked into line strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeOptions {
    /// Largest angular step in degrees. Zero or less selects [`DEFAULT_ARC_STEP_SIZE`].
    pub max_angle_step_degrees: f64,
    pub add_intermediate_point: IntermediatePoint,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            max_angle_step_degrees: DEFAULT_ARC_STEP_SIZE,
            add_intermediate_point: IntermediatePoint::Stealth,
        }
    }
}

/// Factory-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryOptions {
    /// Angular step in degrees used when stroking arcs (`GEOFACTORY_ARC_STEPSIZE`).
    pub arc_step_size: f64,
    /// Largest distance between consecutive stroked ellipse vertices, 0 for no limit
    /// (`GEOFACTORY_ARC_MAX_GAP`).
    pub arc_max_gap: f64,
    /// Linearize curve kinds as soon as they are read (`GEOFACTORY_STROKE_CURVE`).
    pub stroke_curves: bool,
    /// Overrides the method requested from the ring organizer
    /// (`GEOFACTORY_ORGANIZE_POLYGONS`).
    pub organize_method: Option<OrganizeMethod>,
    /// `GEOFACTORY_ADD_INTERMEDIATE_POINT`
    pub add_intermediate_point: IntermediatePoint,
}

impl Default for FactoryOptions {
    fn default() -> Self {
        Self {
            arc_step_size: DEFAULT_ARC_STEP_SIZE,
            arc_max_gap: 0.,
            stroke_curves: false,
            organize_method: None,
            add_intermediate_point: IntermediatePoint::Stealth,
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_uppercase().as_str(),
        "YES" | "TRUE" | "ON" | "1"
    )
}

impl FactoryOptions {
    /// Read the `GEOFACTORY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build options from an arbitrary key lookup. Unset or unparsable keys keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        if let Some(v) = lookup("GEOFACTORY_ARC_STEPSIZE") {
            match v.trim().parse() {
                Ok(step) => options.arc_step_size = step,
                Err(_) => log::warn!("Ignoring invalid GEOFACTORY_ARC_STEPSIZE value: {v}"),
            }
        }
        if let Some(v) = lookup("GEOFACTORY_ARC_MAX_GAP") {
            match v.trim().parse() {
                Ok(gap) => options.arc_max_gap = gap,
                Err(_) => log::warn!("Ignoring invalid GEOFACTORY_ARC_MAX_GAP value: {v}"),
            }
        }
        if let Some(v) = lookup("GEOFACTORY_STROKE_CURVE") {
            options.stroke_curves = parse_bool(v.trim());
        }
        if let Some(v) = lookup("GEOFACTORY_ORGANIZE_POLYGONS") {
            if !v.is_empty() {
                options.organize_method = Some(OrganizeMethod::parse_lenient(v.trim()));
            }
        }
        if let Some(v) = lookup("GEOFACTORY_ADD_INTERMEDIATE_POINT") {
            match v.trim().parse() {
                Ok(mode) => options.add_intermediate_point = mode,
                Err(err) => log::warn!("{err}"),
            }
        }
        options
    }

    /// The arc step size clamped to [0.01, 180] degrees.
    pub fn default_arc_step_size(&self) -> f64 {
        static TOO_SMALL: Once = Once::new();
        static TOO_LARGE: Once = Once::new();
        if self.arc_step_size < MIN_ARC_STEP_SIZE {
            TOO_SMALL.call_once(|| {
                log::warn!(
                    "Too small value for the arc step size. Clamping it to {MIN_ARC_STEP_SIZE}"
                )
            });
            MIN_ARC_STEP_SIZE
        } else if self.arc_step_size > MAX_ARC_STEP_SIZE {
            TOO_LARGE.call_once(|| {
                log::warn!(
                    "Too large value for the arc step size. Clamping it to {MAX_ARC_STEP_SIZE}"
                )
            });
            MAX_ARC_STEP_SIZE
        } else {
            self.arc_step_size
        }
    }

    /// Stroke settings derived from these options.
    pub fn stroke_options(&self) -> StrokeOptions {
        StrokeOptions {
            max_angle_step_degrees: self.default_arc_step_size(),
            add_intermediate_point: self.add_intermediate_point,
        }
    }
}

/// Options of [`transform_with_options`][crate::algorithm::transform::transform_with_options].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Split geometries that cross the antimeridian after transformation (`WRAPDATELINE`).
    pub wrap_dateline: bool,
    /// Half-width in degrees of the band each side of the antimeridian (`DATELINEOFFSET`).
    pub dateline_offset: f64,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            wrap_dateline: false,
            dateline_offset: DEFAULT_DATELINE_OFFSET,
        }
    }
}

impl TransformOptions {
    /// Parse `KEY=VALUE` pairs. Keys are case-insensitive; unknown keys are ignored with a
    /// debug message.
    ///
    /// ```
    /// use geofactory::options::TransformOptions;
    ///
    /// let options = TransformOptions::from_key_values(["WRAPDATELINE=YES", "DATELINEOFFSET=5"]);
    /// assert!(options.wrap_dateline);
    /// assert_eq!(options.dateline_offset, 5.);
    /// ```
    pub fn from_key_values<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Self {
        let mut options = Self::default();
        for pair in pairs {
            let Some((key, value)) = pair.split_once('=') else {
                log::debug!("Ignoring transform option without a value: {pair}");
                continue;
            };
            match key.trim().to_ascii_uppercase().as_str() {
                "WRAPDATELINE" => options.wrap_dateline = parse_bool(value.trim()),
                "DATELINEOFFSET" => {
                    options.dateline_offset = value.trim().parse().unwrap_or(f64::NAN)
                }
                _ => log::debug!("Ignoring unknown transform option: {pair}"),
            }
        }
        options.dateline_offset = options.effective_dateline_offset();
        options
    }

    /// The dateline offset, reset to the default when outside (0, 360).
    pub fn effective_dateline_offset(&self) -> f64 {
        if self.dateline_offset > 0. && self.dateline_offset < 360. {
            self.dateline_offset
        } else {
            DEFAULT_DATELINE_OFFSET
        }
    }
}
