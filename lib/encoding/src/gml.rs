//! GML 2 geometry markup.
//!
//! Output-only, following the `gml:` element grammar for the seven standard
//! geometry types. Coordinates are rendered in source order as
//! `x,y` tuples separated by spaces; no reprojection takes place.

use itertools::Itertools;
use spatial_fusion_model::{Coord, Geometry, LineString, Polygon, SpatialGeometry};

/// Renders a geometry as GML 2 markup.
pub fn write_gml(value: &SpatialGeometry) -> String {
    let mut out = String::new();
    write_geometry(&mut out, value.geometry());
    out
}

fn write_geometry(out: &mut String, geom: &Geometry<f64>) {
    match geom {
        Geometry::Point(p) => {
            out.push_str("<gml:Point>");
            write_coordinates(out, std::slice::from_ref(&p.0));
            out.push_str("</gml:Point>");
        }
        Geometry::LineString(ls) => write_linestring(out, ls),
        Geometry::Polygon(p) => write_polygon(out, p),
        Geometry::MultiPoint(mp) => {
            out.push_str("<gml:MultiPoint>");
            for p in &mp.0 {
                out.push_str("<gml:pointMember>");
                write_geometry(out, &Geometry::Point(*p));
                out.push_str("</gml:pointMember>");
            }
            out.push_str("</gml:MultiPoint>");
        }
        Geometry::MultiLineString(mls) => {
            out.push_str("<gml:MultiLineString>");
            for ls in &mls.0 {
                out.push_str("<gml:lineStringMember>");
                write_linestring(out, ls);
                out.push_str("</gml:lineStringMember>");
            }
            out.push_str("</gml:MultiLineString>");
        }
        Geometry::MultiPolygon(mp) => {
            out.push_str("<gml:MultiPolygon>");
            for p in &mp.0 {
                out.push_str("<gml:polygonMember>");
                write_polygon(out, p);
                out.push_str("</gml:polygonMember>");
            }
            out.push_str("</gml:MultiPolygon>");
        }
        Geometry::GeometryCollection(gc) => {
            out.push_str("<gml:MultiGeometry>");
            for g in &gc.0 {
                out.push_str("<gml:geometryMember>");
                write_geometry(out, g);
                out.push_str("</gml:geometryMember>");
            }
            out.push_str("</gml:MultiGeometry>");
        }
        Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {}
    }
}

fn write_linestring(out: &mut String, ls: &LineString<f64>) {
    out.push_str("<gml:LineString>");
    write_coordinates(out, &ls.0);
    out.push_str("</gml:LineString>");
}

fn write_polygon(out: &mut String, polygon: &Polygon<f64>) {
    out.push_str("<gml:Polygon>");
    out.push_str("<gml:outerBoundaryIs><gml:LinearRing>");
    write_coordinates(out, &polygon.exterior().0);
    out.push_str("</gml:LinearRing></gml:outerBoundaryIs>");
    for ring in polygon.interiors() {
        out.push_str("<gml:innerBoundaryIs><gml:LinearRing>");
        write_coordinates(out, &ring.0);
        out.push_str("</gml:LinearRing></gml:innerBoundaryIs>");
    }
    out.push_str("</gml:Polygon>");
}

fn write_coordinates(out: &mut String, coords: &[Coord<f64>]) {
    let body = coords.iter().map(|c| format!("{},{}", c.x, c.y)).join(" ");
    out.push_str(&format!("<gml:coordinates>{body}</gml:coordinates>"));
}
