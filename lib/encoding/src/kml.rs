//! KML geometry markup.
//!
//! Output-only. Multi-part geometries nest their members in a
//! `<MultiGeometry>` element; coordinates are `x,y` tuples in source order.

use itertools::Itertools;
use spatial_fusion_model::{Coord, Geometry, LineString, Polygon, SpatialGeometry};

/// Renders a geometry as KML markup.
pub fn write_kml(value: &SpatialGeometry) -> String {
    let mut out = String::new();
    write_geometry(&mut out, value.geometry());
    out
}

fn write_geometry(out: &mut String, geom: &Geometry<f64>) {
    match geom {
        Geometry::Point(p) => {
            out.push_str("<Point>");
            write_coordinates(out, std::slice::from_ref(&p.0));
            out.push_str("</Point>");
        }
        Geometry::LineString(ls) => write_linestring(out, ls),
        Geometry::Polygon(p) => write_polygon(out, p),
        Geometry::MultiPoint(mp) => {
            out.push_str("<MultiGeometry>");
            for p in &mp.0 {
                write_geometry(out, &Geometry::Point(*p));
            }
            out.push_str("</MultiGeometry>");
        }
        Geometry::MultiLineString(mls) => {
            out.push_str("<MultiGeometry>");
            for ls in &mls.0 {
                write_linestring(out, ls);
            }
            out.push_str("</MultiGeometry>");
        }
        Geometry::MultiPolygon(mp) => {
            out.push_str("<MultiGeometry>");
            for p in &mp.0 {
                write_polygon(out, p);
            }
            out.push_str("</MultiGeometry>");
        }
        Geometry::GeometryCollection(gc) => {
            out.push_str("<MultiGeometry>");
            for g in &gc.0 {
                write_geometry(out, g);
            }
            out.push_str("</MultiGeometry>");
        }
        Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {}
    }
}

fn write_linestring(out: &mut String, ls: &LineString<f64>) {
    out.push_str("<LineString>");
    write_coordinates(out, &ls.0);
    out.push_str("</LineString>");
}

fn write_polygon(out: &mut String, polygon: &Polygon<f64>) {
    out.push_str("<Polygon>");
    out.push_str("<outerBoundaryIs><LinearRing>");
    write_coordinates(out, &polygon.exterior().0);
    out.push_str("</LinearRing></outerBoundaryIs>");
    for ring in polygon.interiors() {
        out.push_str("<innerBoundaryIs><LinearRing>");
        write_coordinates(out, &ring.0);
        out.push_str("</LinearRing></innerBoundaryIs>");
    }
    out.push_str("</Polygon>");
}

fn write_coordinates(out: &mut String, coords: &[Coord<f64>]) {
    let body = coords.iter().map(|c| format!("{},{}", c.x, c.y)).join(" ");
    out.push_str(&format!("<coordinates>{body}</coordinates>"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ewkt::parse_ewkt;

    #[test]
    fn point_markup() {
        let value = parse_ewkt("POINT (1 2)").unwrap();
        assert_eq!(
            write_kml(&value),
            "<Point><coordinates>1,2</coordinates></Point>"
        );
    }

    #[test]
    fn multi_geometry_nests_members() {
        let value = parse_ewkt("MULTIPOINT ((1 1), (2 2))").unwrap();
        assert_eq!(
            write_kml(&value),
            "<MultiGeometry><Point><coordinates>1,1</coordinates></Point>\
             <Point><coordinates>2,2</coordinates></Point></MultiGeometry>"
        );
    }
}
