use geos::Geom;

use crate::algorithm::setops::SetOperations;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::io::wkb::{parse_wkb, write_wkb, wkb_size, Endianness, WkbVariant};

/// Set operations backed by the GEOS library, exchanging geometries through WKB.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeosSetOperations;

fn to_geos(geom: &Geometry) -> Result<geos::Geometry> {
    let mut buf = Vec::with_capacity(wkb_size(geom));
    write_wkb(&mut buf, geom, Endianness::LittleEndian, WkbVariant::OldOgc)?;
    Ok(geos::Geometry::new_from_wkb(&buf)?)
}

fn from_geos(geom: &geos::Geometry, like: &Geometry) -> Result<Geometry> {
    let buf = geom.to_wkb()?;
    let (out, _) = parse_wkb(&buf, like.crs().cloned())?;
    Ok(out)
}

fn predicate(
    a: &Geometry,
    b: &Geometry,
    op: impl Fn(&geos::Geometry, &geos::Geometry) -> geos::GResult<bool>,
) -> Option<bool> {
    let result = || -> Result<bool> { Ok(op(&to_geos(a)?, &to_geos(b)?)?) };
    result()
        .map_err(|err| log::debug!("GEOS predicate failed: {err}"))
        .ok()
}

fn overlay(
    a: &Geometry,
    b: &Geometry,
    op: impl Fn(&geos::Geometry, &geos::Geometry) -> geos::GResult<geos::Geometry>,
) -> Option<Geometry> {
    let result = || -> Result<Geometry> { from_geos(&op(&to_geos(a)?, &to_geos(b)?)?, a) };
    result()
        .map_err(|err| log::debug!("GEOS overlay failed: {err}"))
        .ok()
}

impl SetOperations for GeosSetOperations {
    fn contains(&self, a: &Geometry, b: &Geometry) -> Option<bool> {
        predicate(a, b, |a, b| a.contains(b))
    }

    fn overlaps(&self, a: &Geometry, b: &Geometry) -> Option<bool> {
        predicate(a, b, |a, b| a.overlaps(b))
    }

    fn touches(&self, a: &Geometry, b: &Geometry) -> Option<bool> {
        predicate(a, b, |a, b| a.touches(b))
    }

    fn difference(&self, a: &Geometry, b: &Geometry) -> Option<Geometry> {
        overlay(a, b, |a, b| a.difference(b))
    }

    fn intersection(&self, a: &Geometry, b: &Geometry) -> Option<Geometry> {
        overlay(a, b, |a, b| a.intersection(b))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::polygon::square;

    #[test]
    fn predicates() {
        let ops = GeosSetOperations;
        assert_eq!(ops.contains(&square(0., 0., 10.), &square(2., 2., 2.)), Some(true));
        assert_eq!(ops.overlaps(&square(0., 0., 4.), &square(2., 2., 4.)), Some(true));
        assert!(ops.difference(&square(0., 0., 4.), &square(2., 2., 4.)).is_some());
    }
}
