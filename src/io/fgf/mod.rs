//! Reading and writing FGF, the little-endian binary geometry encoding of FDO.
//!
//! FGF type codes run from 0 (no geometry) to 13. Only the linear kinds and their
//! collections (codes 1 to 7) carry a geometry; the curve codes are recognized but not
//! supported.

mod reader;
mod writer;

pub use reader::{parse_fgf, parse_fgf_with_limit};
pub use writer::{fgf_size, to_fgf, write_fgf};

/// Bit of the FGF dimension flag set when vertices carry Z.
pub(crate) const FGF_DIM_Z: u32 = 0x01;

/// Bit of the FGF dimension flag set when vertices carry M.
pub(crate) const FGF_DIM_M: u32 = 0x02;
