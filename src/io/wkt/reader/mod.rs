//! Parse Well-Known Text into a [`Geometry`].

use std::sync::Arc;

use crate::error::{GeoFactoryError, Result};
use crate::geometry::{Coord, Dimension, Geometry, GeometryType, SpatialRef};
use crate::io::wkb::common::{is_compatible_sub_type, MAX_RECURSION_LEVEL};

/// Keywords recognized at the start of a geometry. A bare LINEARRING is not accepted.
const KEYWORDS: [GeometryType; 15] = [
    GeometryType::Point,
    GeometryType::LineString,
    GeometryType::Polygon,
    GeometryType::Triangle,
    GeometryType::GeometryCollection,
    GeometryType::MultiPolygon,
    GeometryType::MultiPoint,
    GeometryType::MultiLineString,
    GeometryType::CircularString,
    GeometryType::CompoundCurve,
    GeometryType::CurvePolygon,
    GeometryType::MultiCurve,
    GeometryType::MultiSurface,
    GeometryType::PolyhedralSurface,
    GeometryType::Tin,
];

/// Parse one WKT geometry from the front of `text`.
///
/// Returns the geometry and the unconsumed remainder of the input, so that several geometries
/// can be read in sequence.
///
/// ```
/// use geofactory::io::wkt::parse_wkt;
///
/// let (geom, rest) = parse_wkt("LINESTRING Z (0 0 1, 1 1 2) POINT (3 4)", None).unwrap();
/// assert!(geom.has_z());
/// let (point, rest) = parse_wkt(rest, None).unwrap();
/// assert_eq!(point.to_string(), "POINT (3 4)");
/// assert!(rest.is_empty());
/// ```
pub fn parse_wkt(text: &str, crs: Option<Arc<SpatialRef>>) -> Result<(Geometry, &str)> {
    let mut tokenizer = WktTokenizer::new(text);
    let mut geom = tokenizer.read_tagged_geometry(0)?;
    geom.assign_crs(crs);
    tokenizer.skip_whitespace();
    Ok((geom, tokenizer.rest()))
}

fn corrupt(message: impl Into<String>) -> GeoFactoryError {
    GeoFactoryError::CorruptData(message.into())
}

/// Ordinates seen so far for one geometry.
#[derive(Debug, Clone, Copy, Default)]
struct DimState {
    explicit: Option<Dimension>,
    has_z: bool,
    has_m: bool,
}

impl DimState {
    fn new(explicit: Option<Dimension>) -> Self {
        Self {
            explicit,
            ..Default::default()
        }
    }

    fn dimension(&self) -> Dimension {
        self.explicit
            .unwrap_or_else(|| Dimension::from_flags(self.has_z, self.has_m))
    }
}

struct WktTokenizer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> WktTokenizer<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.text.as_bytes().get(self.pos).copied()
    }

    fn consume(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: u8) -> Result<()> {
        if self.consume(ch) {
            Ok(())
        } else {
            Err(corrupt(format!(
                "Expected '{}' at offset {} of WKT",
                ch as char, self.pos
            )))
        }
    }

    fn peek_word(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let rest = self.rest();
        let len = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();
        (len > 0).then(|| &rest[..len])
    }

    fn read_word(&mut self) -> Option<&'a str> {
        let word = self.peek_word()?;
        self.pos += word.len();
        Some(word)
    }

    fn next_is_number(&mut self) -> bool {
        matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.')
        )
    }

    fn read_number(&mut self) -> Result<f64> {
        self.skip_whitespace();
        let (value, len) = lexical_core::parse_partial::<f64>(self.rest().as_bytes())
            .map_err(|e| corrupt(format!("Invalid number at offset {} of WKT: {e}", self.pos)))?;
        self.pos += len;
        Ok(value)
    }

    /// Read the geometry keyword and its optional Z/M/ZM qualifier.
    fn read_header(&mut self) -> Result<(GeometryType, Option<Dimension>)> {
        let word = self
            .read_word()
            .ok_or_else(|| corrupt("Missing geometry keyword in WKT"))?
            .to_ascii_uppercase();

        let (geometry_type, suffix) = KEYWORDS
            .iter()
            .filter_map(|t| word.strip_prefix(t.name()).map(|suffix| (*t, suffix)))
            .min_by_key(|(_, suffix)| suffix.len())
            .ok_or_else(|| corrupt(format!("Unknown WKT geometry keyword {word}")))?;

        let mut explicit = parse_dimension_flag(suffix)
            .ok_or_else(|| corrupt(format!("Unknown WKT geometry keyword {word}")))?;

        if explicit.is_none() {
            if let Some(flag) = self.peek_word() {
                if let Some(dim) = parse_dimension_flag(&flag.to_ascii_uppercase()).flatten() {
                    self.pos += flag.len();
                    explicit = Some(dim);
                }
            }
        }
        Ok((geometry_type, explicit))
    }

    /// Consume either `EMPTY` (returning true) or an opening parenthesis.
    fn read_empty_or_open(&mut self) -> Result<bool> {
        if let Some(word) = self.peek_word() {
            if word.eq_ignore_ascii_case("EMPTY") {
                self.pos += word.len();
                return Ok(true);
            }
            return Err(corrupt(format!("Unexpected token {word} in WKT")));
        }
        self.expect(b'(')?;
        Ok(false)
    }

    fn read_coord(&mut self, dims: &mut DimState) -> Result<Coord> {
        let mut values = [0.; 4];
        let mut count = 0;
        while count < 4 && (count < 2 || self.next_is_number()) {
            values[count] = self.read_number()?;
            count += 1;
        }

        let mut coord = Coord::new(values[0], values[1]);
        match dims.explicit {
            Some(dim) if dim.size() != count => {
                return Err(corrupt(format!(
                    "Coordinate with {count} ordinates in a {dim} geometry"
                )))
            }
            Some(Dimension::XYM) => coord.m = values[2],
            _ => {
                if count >= 3 {
                    coord.z = values[2];
                    dims.has_z = true;
                }
                if count == 4 {
                    coord.m = values[3];
                    dims.has_m = true;
                }
            }
        }
        Ok(coord)
    }

    /// Read `x y, x y, ...)`; the opening parenthesis is already consumed.
    fn read_coord_list(&mut self, dims: &mut DimState) -> Result<Vec<Coord>> {
        let mut coords = vec![self.read_coord(dims)?];
        while self.consume(b',') {
            coords.push(self.read_coord(dims)?);
        }
        self.expect(b')')?;
        Ok(coords)
    }

    fn read_tagged_geometry(&mut self, level: usize) -> Result<Geometry> {
        let (geometry_type, explicit) = self.read_header()?;
        let mut dims = DimState::new(explicit);
        let mut geom = self.read_body(geometry_type, &mut dims, level)?;
        let dim = match geometry_type {
            GeometryType::GeometryCollection => explicit.unwrap_or(geom.dimension()),
            _ => dims.dimension(),
        };
        geom.set_dimension(dim);
        Ok(geom)
    }

    /// Read a member of a curve-capable collection, which may carry its own keyword.
    fn read_member(
        &mut self,
        parent: GeometryType,
        untagged: GeometryType,
        dims: &mut DimState,
        level: usize,
    ) -> Result<Geometry> {
        match self.peek_word() {
            Some(word) if !word.eq_ignore_ascii_case("EMPTY") => {
                let (member_type, _) = self.read_header()?;
                if !is_compatible_sub_type(parent, member_type) {
                    return Err(corrupt(format!(
                        "{member_type} cannot be a member of {parent}"
                    )));
                }
                self.read_body(member_type, dims, level + 1)
            }
            _ => self.read_body(untagged, dims, level + 1),
        }
    }

    fn read_body(
        &mut self,
        geometry_type: GeometryType,
        dims: &mut DimState,
        level: usize,
    ) -> Result<Geometry> {
        if level >= MAX_RECURSION_LEVEL {
            return Err(corrupt(format!(
                "Too many recursion levels ({level}) while parsing WKT geometry"
            )));
        }

        let mut geom = Geometry::empty(geometry_type, Dimension::XY);
        if self.read_empty_or_open()? {
            return Ok(geom);
        }

        match geometry_type {
            GeometryType::Point => {
                let coord = self.read_coord(dims)?;
                self.expect(b')')?;
                geom = Geometry::point(coord, Dimension::XYZM);
            }
            GeometryType::LineString | GeometryType::CircularString | GeometryType::LinearRing => {
                let coords = self.read_coord_list(dims)?;
                geom = Geometry::new_curve(geometry_type, coords, Dimension::XYZM);
            }
            _ => {
                let Some(collection) = geom.as_collection_mut() else {
                    return Err(corrupt(format!("Unexpected {geometry_type} body")));
                };
                // Ordinates are settled once the whole geometry is read; collections of tagged
                // geometries instead widen as members are pushed.
                if geometry_type != GeometryType::GeometryCollection {
                    collection.set_dimension(Dimension::XYZM);
                }
                loop {
                    let member = match geometry_type {
                        GeometryType::Polygon | GeometryType::Triangle => {
                            self.read_body(GeometryType::LinearRing, dims, level + 1)?
                        }
                        GeometryType::MultiPoint => {
                            // Both the ISO (each point parenthesized) and the bare form.
                            if self.next_is_number() {
                                Geometry::point(self.read_coord(dims)?, Dimension::XYZM)
                            } else {
                                self.read_body(GeometryType::Point, dims, level + 1)?
                            }
                        }
                        GeometryType::MultiLineString => {
                            self.read_body(GeometryType::LineString, dims, level + 1)?
                        }
                        GeometryType::MultiPolygon | GeometryType::PolyhedralSurface => {
                            self.read_body(GeometryType::Polygon, dims, level + 1)?
                        }
                        GeometryType::Tin => {
                            self.read_body(GeometryType::Triangle, dims, level + 1)?
                        }
                        GeometryType::CompoundCurve
                        | GeometryType::CurvePolygon
                        | GeometryType::MultiCurve => self.read_member(
                            geometry_type,
                            GeometryType::LineString,
                            dims,
                            level,
                        )?,
                        GeometryType::MultiSurface => self.read_member(
                            geometry_type,
                            GeometryType::Polygon,
                            dims,
                            level,
                        )?,
                        _ => self.read_tagged_geometry(level + 1)?,
                    };

                    if geometry_type == GeometryType::CompoundCurve {
                        collection.push_curve(member)?;
                    } else {
                        collection.push(member);
                    }

                    if !self.consume(b',') {
                        break;
                    }
                }
                self.expect(b')')?;
            }
        }
        Ok(geom)
    }
}

/// `Some(None)` for no qualifier, `Some(Some(dim))` for Z/M/ZM, `None` for anything else.
fn parse_dimension_flag(flag: &str) -> Option<Option<Dimension>> {
    match flag {
        "" => Some(None),
        "Z" => Some(Some(Dimension::XYZ)),
        "M" => Some(Some(Dimension::XYM)),
        "ZM" => Some(Some(Dimension::XYZM)),
        _ => None,
    }
}
