use crate::algorithm::curve::Linearize;
use crate::algorithm::force::primitive::as_line_string;
use crate::geometry::{Coord, Geometry, GeometryType};
use crate::options::StrokeOptions;

fn same_point(a: &Coord, b: &Coord) -> bool {
    a.x == b.x && a.y == b.y && a.z == b.z
}

/// Start and end of a line string with at least two vertices.
fn line_ends(geom: &Geometry) -> Option<(Coord, Coord)> {
    match geom {
        Geometry::LineString(c) if c.num_coords() >= 2 => Some((c.start()?, c.end()?)),
        _ => None,
    }
}

/// Append `tail` to `head`, dropping the vertex they share.
fn append_line(head: &mut Geometry, tail: Geometry) {
    if let (Some(head), Geometry::LineString(tail)) = (head.as_curve_mut(), tail) {
        head.coords.extend(tail.coords.into_iter().skip(1));
    }
}

/// Repeatedly join pairs of line strings that share an end point.
fn merge_touching_lines(lines: &mut Vec<Geometry>, only_in_order: bool) {
    let mut i0 = 0;
    while i0 < lines.len() {
        let Some((start0, end0)) = line_ends(&lines[i0]) else {
            i0 += 1;
            continue;
        };

        let mut merged = false;
        for i1 in i0 + 1..lines.len() {
            let Some((mut start1, mut end1)) = line_ends(&lines[i1]) else {
                continue;
            };
            if !only_in_order && (same_point(&end0, &end1) || same_point(&start0, &start1)) {
                lines[i1].reverse();
                std::mem::swap(&mut start1, &mut end1);
            }
            if same_point(&end0, &start1) {
                let tail = lines.remove(i1);
                append_line(&mut lines[i0], tail);
                merged = true;
                break;
            }
            if same_point(&end1, &start0) {
                let tail = lines.remove(i0);
                append_line(&mut lines[i1 - 1], tail);
                merged = true;
                break;
            }
        }
        if !merged {
            i0 += 1;
        }
    }
}

/// Convert to a LineString.
///
/// A polygon without holes yields its exterior ring and curves are linearized. The members of
/// a GeometryCollection, MultiLineString or MultiCurve are joined wherever the end of one
/// line string is the start of another; unless `only_in_order` is set, members are also
/// reversed to make their end points meet. When several pieces remain the (linearized)
/// collection is returned.
///
/// ```
/// use geofactory::algorithm::force::force_to_line_string;
/// use geofactory::geometry::GeometryType;
/// use geofactory::io::wkt::parse_wkt;
/// use geofactory::options::StrokeOptions;
///
/// let (mls, _) = parse_wkt("MULTILINESTRING ((0 0,1 0),(2 0,1 0))", None).unwrap();
/// let line = force_to_line_string(mls, false, &StrokeOptions::default());
/// assert_eq!(line.geometry_type(), GeometryType::LineString);
/// assert_eq!(line.num_points(), 3);
/// ```
pub fn force_to_line_string(
    geom: Geometry,
    only_in_order: bool,
    options: &StrokeOptions,
) -> Geometry {
    use GeometryType::*;
    let crs = geom.crs().cloned();
    let dim = geom.dimension();
    match geom.geometry_type() {
        LineString | LinearRing => return as_line_string(geom),
        Polygon | CurvePolygon => {
            if geom.num_members() > 1 {
                return geom;
            }
            return match geom.into_members().pop() {
                Some(ring) => force_to_line_string(ring.with_crs(crs), only_in_order, options),
                None => Geometry::empty(LineString, dim).with_crs(crs),
            };
        }
        CircularString | CompoundCurve => return geom.linearize(options),
        GeometryCollection | MultiLineString | MultiCurve => {}
        _ => return geom,
    }

    let geom = if geom.has_curve_geometry(false) {
        geom.linearize(options)
    } else {
        geom
    };
    let kind = geom.geometry_type();
    let mut lines = geom.into_members();
    if lines.is_empty() {
        return Geometry::empty(LineString, dim).with_crs(crs);
    }

    merge_touching_lines(&mut lines, only_in_order);
    if lines.len() == 1 {
        if let Some(line) = lines.pop() {
            return line.with_crs(crs);
        }
    }
    Geometry::new_collection(kind, lines, dim).with_crs(crs)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::Dimension;
    use crate::test::linestring::{ls0, ls1, ls2};
    use crate::test::polygon::{square, square_with_hole};

    fn multi_line_string(lines: Vec<Geometry>) -> Geometry {
        Geometry::new_collection(GeometryType::MultiLineString, lines, Dimension::XY)
    }

    #[test]
    fn joins_lines_in_order() {
        let line = force_to_line_string(
            multi_line_string(vec![ls1(), ls0()]),
            true,
            &StrokeOptions::default(),
        );
        assert_eq!(line.geometry_type(), GeometryType::LineString);
        let coords = &line.as_curve().unwrap().coords;
        assert_eq!(
            coords,
            &vec![Coord::new(0., 1.), Coord::new(1., 2.), Coord::new(3., 4.)]
        );
    }

    #[test]
    fn reversal_needs_permission() {
        // ls2 runs backwards from the end of ls1.
        let mls = multi_line_string(vec![ls0(), ls1(), ls2()]);
        let kept = force_to_line_string(mls.clone(), true, &StrokeOptions::default());
        assert_eq!(kept.geometry_type(), GeometryType::MultiLineString);
        assert_eq!(kept.num_members(), 2);

        let joined = force_to_line_string(mls, false, &StrokeOptions::default());
        assert_eq!(joined.geometry_type(), GeometryType::LineString);
        assert_eq!(joined.num_points(), 4);
        assert_eq!(joined.end_point(), Some(Coord::new(5., 6.)));
    }

    #[test]
    fn polygon_exterior() {
        let line = force_to_line_string(square(0., 0., 1.), true, &StrokeOptions::default());
        assert_eq!(line.geometry_type(), GeometryType::LineString);
        assert!(line.is_closed());

        let holed = force_to_line_string(square_with_hole(), true, &StrokeOptions::default());
        assert_eq!(holed, square_with_hole());
    }

    #[test]
    fn empty_collection() {
        let line = force_to_line_string(
            multi_line_string(vec![]),
            true,
            &StrokeOptions::default(),
        );
        assert_eq!(line.geometry_type(), GeometryType::LineString);
        assert!(line.is_empty());
    }
}
