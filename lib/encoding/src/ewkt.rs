//! Extended well-known text.
//!
//! The text form is always the extended convention: an `SRID=n;` prefix is
//! emitted only when a reference id other than the unspecified value is set,
//! otherwise the bare well-known text is produced. Z/M geometries carry the
//! `Z`/`M`/`ZM` tag. `ST_AsText` and `ST_AsEWKT` are aliases of this writer.

use crate::ordinates::{OrdBuilder, OrdCursor};
use crate::CodecError;
use itertools::Itertools;
use spatial_fusion_model::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon, SpatialGeometry, UNKNOWN_SRID,
};
use std::str::FromStr;

/// Renders a geometry in the extended well-known text convention.
pub fn write_ewkt(value: &SpatialGeometry) -> String {
    let mut out = String::new();
    if value.srid() != UNKNOWN_SRID {
        out.push_str(&format!("SRID={};", value.srid()));
    }
    let mut cursor = OrdCursor::new(value.z_ordinates(), value.m_ordinates());
    write_geometry(&mut out, value, value.geometry(), &mut cursor);
    out
}

/// Parses well-known text, with or without an `SRID=n;` prefix.
pub fn parse_ewkt(text: &str) -> Result<SpatialGeometry, CodecError> {
    let text = text.trim();
    let (srid, body) = split_srid_prefix(text)?;
    let parsed = wkt::Wkt::<f64>::from_str(body)
        .map_err(|e| CodecError::InvalidWkt(e.to_string()))?;
    let mut ordinates = OrdBuilder::new();
    let geom = convert(parsed, &mut ordinates)?;
    let (dim, z, m) = ordinates.finish();
    Ok(SpatialGeometry::try_new(geom, srid, dim, z, m)?)
}

fn split_srid_prefix(text: &str) -> Result<(i32, &str), CodecError> {
    let Some(rest) = text.strip_prefix("SRID=") else {
        return Ok((UNKNOWN_SRID, text));
    };
    let Some((srid, body)) = rest.split_once(';') else {
        return Err(CodecError::InvalidWkt(
            "missing ';' after SRID prefix".to_owned(),
        ));
    };
    let srid = srid
        .trim()
        .parse::<i32>()
        .map_err(|e| CodecError::InvalidWkt(format!("invalid SRID '{srid}': {e}")))?;
    Ok((srid, body))
}

fn write_geometry(
    out: &mut String,
    value: &SpatialGeometry,
    geom: &Geometry<f64>,
    cursor: &mut OrdCursor<'_>,
) {
    let tag = value.dim().wkt_tag();
    match geom {
        Geometry::Point(p) => {
            out.push_str(&format!("POINT{tag} ({})", coord_text(p.0, cursor)));
        }
        Geometry::LineString(ls) => {
            out.push_str(&format!("LINESTRING{tag}"));
            write_coord_seq(out, &ls.0, cursor);
        }
        Geometry::Polygon(p) => {
            out.push_str(&format!("POLYGON{tag}"));
            write_rings(out, p, cursor);
        }
        Geometry::MultiPoint(mp) => {
            if mp.0.is_empty() {
                out.push_str(&format!("MULTIPOINT{tag} EMPTY"));
            } else {
                let body = mp
                    .0
                    .iter()
                    .map(|p| format!("({})", coord_text(p.0, cursor)))
                    .join(", ");
                out.push_str(&format!("MULTIPOINT{tag} ({body})"));
            }
        }
        Geometry::MultiLineString(mls) => {
            out.push_str(&format!("MULTILINESTRING{tag}"));
            if mls.0.is_empty() {
                out.push_str(" EMPTY");
            } else {
                out.push_str(" (");
                for (i, ls) in mls.0.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_coord_seq_bare(out, &ls.0, cursor);
                }
                out.push(')');
            }
        }
        Geometry::MultiPolygon(mp) => {
            out.push_str(&format!("MULTIPOLYGON{tag}"));
            if mp.0.is_empty() {
                out.push_str(" EMPTY");
            } else {
                out.push_str(" (");
                for (i, p) in mp.0.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_rings_bare(out, p, cursor);
                }
                out.push(')');
            }
        }
        Geometry::GeometryCollection(gc) => {
            out.push_str(&format!("GEOMETRYCOLLECTION{tag}"));
            if gc.0.is_empty() {
                out.push_str(" EMPTY");
            } else {
                out.push_str(" (");
                for (i, g) in gc.0.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_geometry(out, value, g, cursor);
                }
                out.push(')');
            }
        }
        // Canonicalized away at construction time.
        Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
            out.push_str("GEOMETRYCOLLECTION EMPTY");
        }
    }
}

fn write_coord_seq(out: &mut String, coords: &[Coord<f64>], cursor: &mut OrdCursor<'_>) {
    if coords.is_empty() {
        out.push_str(" EMPTY");
    } else {
        out.push(' ');
        write_coord_seq_bare(out, coords, cursor);
    }
}

fn write_coord_seq_bare(out: &mut String, coords: &[Coord<f64>], cursor: &mut OrdCursor<'_>) {
    let body = coords.iter().map(|c| coord_text(*c, cursor)).join(", ");
    out.push_str(&format!("({body})"));
}

fn write_rings(out: &mut String, polygon: &Polygon<f64>, cursor: &mut OrdCursor<'_>) {
    if polygon.exterior().0.is_empty() {
        out.push_str(" EMPTY");
    } else {
        out.push(' ');
        write_rings_bare(out, polygon, cursor);
    }
}

fn write_rings_bare(out: &mut String, polygon: &Polygon<f64>, cursor: &mut OrdCursor<'_>) {
    out.push('(');
    write_coord_seq_bare(out, &polygon.exterior().0, cursor);
    for ring in polygon.interiors() {
        out.push_str(", ");
        write_coord_seq_bare(out, &ring.0, cursor);
    }
    out.push(')');
}

fn coord_text(c: Coord<f64>, cursor: &mut OrdCursor<'_>) -> String {
    let (z, m) = cursor.next();
    let mut text = format!("{} {}", c.x, c.y);
    if let Some(z) = z {
        text.push_str(&format!(" {z}"));
    }
    if let Some(m) = m {
        text.push_str(&format!(" {m}"));
    }
    text
}

fn convert(parsed: wkt::Wkt<f64>, ord: &mut OrdBuilder) -> Result<Geometry<f64>, CodecError> {
    Ok(match parsed {
        wkt::Wkt::Point(p) => match p.0 {
            Some(c) => Geometry::Point(Point(convert_coord(c, ord)?)),
            // There is no empty point in the kernel model; canonicalize to the
            // empty collection.
            None => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
        },
        wkt::Wkt::LineString(ls) => Geometry::LineString(convert_line(ls, ord)?),
        wkt::Wkt::Polygon(p) => Geometry::Polygon(convert_polygon(p, ord)?),
        wkt::Wkt::MultiPoint(mp) => {
            let points = mp
                .0
                .into_iter()
                .map(|p| match p.0 {
                    Some(c) => Ok(Point(convert_coord(c, ord)?)),
                    None => Err(CodecError::InvalidWkt(
                        "EMPTY member in MULTIPOINT".to_owned(),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Geometry::MultiPoint(MultiPoint(points))
        }
        wkt::Wkt::MultiLineString(mls) => {
            let lines = mls
                .0
                .into_iter()
                .map(|ls| convert_line(ls, ord))
                .collect::<Result<Vec<_>, _>>()?;
            Geometry::MultiLineString(MultiLineString(lines))
        }
        wkt::Wkt::MultiPolygon(mp) => {
            let polygons = mp
                .0
                .into_iter()
                .map(|p| convert_polygon(p, ord))
                .collect::<Result<Vec<_>, _>>()?;
            Geometry::MultiPolygon(MultiPolygon(polygons))
        }
        wkt::Wkt::GeometryCollection(gc) => {
            let members = gc
                .0
                .into_iter()
                .map(|g| convert(g, ord))
                .collect::<Result<Vec<_>, _>>()?;
            Geometry::GeometryCollection(GeometryCollection(members))
        }
    })
}

fn convert_line(
    ls: wkt::types::LineString<f64>,
    ord: &mut OrdBuilder,
) -> Result<LineString<f64>, CodecError> {
    let coords = ls
        .0
        .into_iter()
        .map(|c| convert_coord(c, ord))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString(coords))
}

fn convert_polygon(
    p: wkt::types::Polygon<f64>,
    ord: &mut OrdBuilder,
) -> Result<Polygon<f64>, CodecError> {
    let mut rings = p
        .0
        .into_iter()
        .map(|ls| convert_line(ls, ord))
        .collect::<Result<Vec<_>, _>>()?;
    if rings.is_empty() {
        return Ok(Polygon::new(LineString(Vec::new()), Vec::new()));
    }
    let exterior = rings.remove(0);
    Ok(Polygon::new(exterior, rings))
}

fn convert_coord(
    c: wkt::types::Coord<f64>,
    ord: &mut OrdBuilder,
) -> Result<Coord<f64>, CodecError> {
    if !ord.push(c.z, c.m) {
        return Err(CodecError::InvalidWkt(
            "mixed coordinate dimensions".to_owned(),
        ));
    }
    Ok(Coord { x: c.x, y: c.y })
}
