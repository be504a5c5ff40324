//! Hiding the position of an arc's intermediate point inside stroked vertices.
//!
//! The angular ratio `(alpha1 - alpha0) / (alpha2 - alpha0)` is quantized to 32 bits and split
//! into two 16-bit halves. Each half is stored one byte in the least significant mantissa byte
//! of `x` and one byte in that of `y` of a stroked vertex, which moves the vertex by a few ULPs
//! at most.

use crate::geometry::Coord;

/// Quantization scale of the angular ratio.
pub(crate) const HIDDEN_ALPHA_SCALE: u32 = u32::MAX - 1;

const HALF_WIDTH: u32 = 16;
const HALF_MASK: u32 = (1 << HALF_WIDTH) - 1;

/// The value stored in vertices that carry no part of the ratio.
pub const HIDDEN_SENTINEL: u16 = 0xFFFF;

fn set_low_byte(value: f64, byte: u8) -> f64 {
    f64::from_bits((value.to_bits() & !0xFF) | u64::from(byte))
}

fn low_byte(value: f64) -> u8 {
    (value.to_bits() & 0xFF) as u8
}

/// Store `value` in the low mantissa bytes of `coord`: the low byte in `x`, the high byte in
/// `y`.
pub fn set_hidden_value(value: u16, coord: &mut Coord) {
    coord.x = set_low_byte(coord.x, (value & 0xFF) as u8);
    coord.y = set_low_byte(coord.y, (value >> 8) as u8);
}

/// Read back a value stored by [`set_hidden_value`].
pub fn hidden_value(coord: &Coord) -> u16 {
    u16::from(low_byte(coord.x)) | (u16::from(low_byte(coord.y)) << 8)
}

/// Quantize an angular ratio in [0, 1] to 32 bits.
pub fn encode_alpha_ratio(ratio: f64) -> u32 {
    let mut value = 0.5 + f64::from(HIDDEN_ALPHA_SCALE) * ratio;
    if value < 0. {
        log::warn!("Negative arc alpha ratio: {value}");
        value = -value;
    } else if value.is_nan() || value >= f64::from(u32::MAX) {
        log::warn!("Arc alpha ratio too large: {value}");
        value = f64::from(u32::MAX);
    }
    value as u32
}

/// Inverse of [`encode_alpha_ratio`].
pub fn decode_alpha_ratio(value: u32) -> f64 {
    f64::from(value) / f64::from(HIDDEN_ALPHA_SCALE)
}

/// Split a quantized ratio across two consecutive vertices, low half first.
pub fn pack_ratio(value: u32, first: &mut Coord, second: &mut Coord) {
    set_hidden_value((value & HALF_MASK) as u16, first);
    set_hidden_value((value >> HALF_WIDTH) as u16, second);
}

/// Read a ratio split by [`pack_ratio`] across two consecutive vertices.
pub fn unpack_ratio(first: &Coord, second: &Coord) -> u32 {
    u32::from(hidden_value(first)) | (u32::from(hidden_value(second)) << HALF_WIDTH)
}

/// Like [`unpack_ratio`], for the pair walked in the opposite direction.
pub fn unpack_ratio_reversed(first: &Coord, second: &Coord) -> u32 {
    (u32::from(hidden_value(first)) << HALF_WIDTH) | u32::from(hidden_value(second))
}

/// Stamp the ratio onto the interior vertices of a stroked arc.
///
/// `interior` holds the stroked vertices without the arc end points; its length must be even
/// and at least 6. The first pair receives the ratio, the last pair the ratio with its halves
/// swapped, and every pair in between the sentinel, so that the bytes read the same in both
/// walking directions.
pub(crate) fn stamp_interior(value: u32, interior: &mut [Coord]) {
    debug_assert!(interior.len() >= 6 && interior.len() % 2 == 0);
    let low = (value & HALF_MASK) as u16;
    let high = (value >> HALF_WIDTH) as u16;
    let last_pair = interior.len() - 2;
    for (index, pair) in interior.chunks_exact_mut(2).enumerate() {
        let (a, b) = match index * 2 {
            0 => (low, high),
            i if i == last_pair => (high, low),
            _ => (HIDDEN_SENTINEL, HIDDEN_SENTINEL),
        };
        set_hidden_value(a, &mut pair[0]);
        set_hidden_value(b, &mut pair[1]);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn value_survives_in_low_bytes() {
        let mut coord = Coord::new(123.456, -98.765);
        set_hidden_value(0xBEEF, &mut coord);
        assert_eq!(hidden_value(&coord), 0xBEEF);
        assert_abs_diff_eq!(coord.x, 123.456, epsilon = 1e-12);
        assert_abs_diff_eq!(coord.y, -98.765, epsilon = 1e-12);
    }

    #[test]
    fn ratio_pair() {
        let value = encode_alpha_ratio(0.3);
        let mut first = Coord::new(1., 2.);
        let mut second = Coord::new(3., 4.);
        pack_ratio(value, &mut first, &mut second);
        assert_eq!(unpack_ratio(&first, &second), value);
        // Read from the other end, the pair appears swapped.
        assert_eq!(unpack_ratio_reversed(&second, &first), value);
        assert_abs_diff_eq!(decode_alpha_ratio(value), 0.3, epsilon = 1e-9);
    }

    #[test]
    fn stamped_interior_is_symmetric() {
        let value = encode_alpha_ratio(0.25);
        let mut interior: Vec<Coord> = (0..8).map(|i| Coord::new(i as f64, 1.)).collect();
        stamp_interior(value, &mut interior);
        assert_eq!(unpack_ratio(&interior[0], &interior[1]), value);
        assert_eq!(hidden_value(&interior[2]), HIDDEN_SENTINEL);
        assert_eq!(unpack_ratio_reversed(&interior[6], &interior[7]), value);
        let reversed: Vec<Coord> = interior.iter().rev().copied().collect();
        assert_eq!(unpack_ratio(&reversed[0], &reversed[1]), value);
    }
}
