//! Defines [`GeoFactoryError`], representing all errors returned by this crate.

use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GeoFactoryError {
    /// The input buffer ended before the declared content did.
    ///
    /// This is the only parser error that may be recovered from, by supplying more bytes.
    #[error("Not enough data: {0}")]
    NotEnoughData(String),

    /// A malformed byte pattern or text token was encountered.
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// The input is well formed but encodes a geometry kind that is not handled.
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometryType(String),

    /// The coordinate transformation collaborator reported a failure.
    #[error("Coordinate transformation failed: {0}")]
    TransformFailed(String),

    /// General error.
    #[error("General error: {0}")]
    General(String),

    /// [geos::Error]
    #[cfg(feature = "geos")]
    #[error(transparent)]
    GeosError(#[from] geos::Error),

    /// [proj::ProjError]
    #[cfg(feature = "proj")]
    #[error(transparent)]
    ProjError(#[from] proj::ProjError),

    /// [std::io::Error]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// [serde_json::Error]
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, GeoFactoryError>;
