//! Extended well-known binary.
//!
//! Output always uses the extended convention: little-endian, with the
//! PostGIS dimensionality flags (`Z` 0x8000_0000, `M` 0x4000_0000) and, when a
//! reference id is set, the SRID flag (0x2000_0000) plus the id word on the
//! outermost geometry. `ST_AsBinary` and `ST_AsEWKB` are aliases of this
//! writer and produce byte-identical output. The reader accepts both byte
//! orders and plain (non-extended) WKB.

use crate::ordinates::{OrdBuilder, OrdCursor};
use crate::CodecError;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use spatial_fusion_model::{
    Coord, CoordDim, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon, SpatialGeometry, UNKNOWN_SRID,
};
use std::io::Cursor;

const FLAG_Z: u32 = 0x8000_0000;
const FLAG_M: u32 = 0x4000_0000;
const FLAG_SRID: u32 = 0x2000_0000;

const TYPE_POINT: u32 = 1;
const TYPE_LINESTRING: u32 = 2;
const TYPE_POLYGON: u32 = 3;
const TYPE_MULTIPOINT: u32 = 4;
const TYPE_MULTILINESTRING: u32 = 5;
const TYPE_MULTIPOLYGON: u32 = 6;
const TYPE_GEOMETRYCOLLECTION: u32 = 7;

/// Serializes a geometry in the extended well-known binary convention.
pub fn write_ewkb(value: &SpatialGeometry) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    let mut cursor = OrdCursor::new(value.z_ordinates(), value.m_ordinates());
    write_geometry(&mut out, value.geometry(), value.dim(), value.srid(), &mut cursor)?;
    Ok(out)
}

/// Deserializes well-known binary, extended or plain, of either byte order.
pub fn parse_ewkb(bytes: &[u8]) -> Result<SpatialGeometry, CodecError> {
    let mut reader = Cursor::new(bytes);
    let mut ordinates = OrdBuilder::new();
    let mut srid = UNKNOWN_SRID;
    let geom = read_geometry(&mut reader, &mut ordinates, &mut srid)?;
    let (dim, z, m) = ordinates.finish();
    Ok(SpatialGeometry::try_new(geom, srid, dim, z, m)?)
}

fn type_code(geom: &Geometry<f64>) -> u32 {
    match geom {
        Geometry::Point(_) => TYPE_POINT,
        Geometry::Line(_) | Geometry::LineString(_) => TYPE_LINESTRING,
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => TYPE_POLYGON,
        Geometry::MultiPoint(_) => TYPE_MULTIPOINT,
        Geometry::MultiLineString(_) => TYPE_MULTILINESTRING,
        Geometry::MultiPolygon(_) => TYPE_MULTIPOLYGON,
        Geometry::GeometryCollection(_) => TYPE_GEOMETRYCOLLECTION,
    }
}

fn write_geometry(
    out: &mut Vec<u8>,
    geom: &Geometry<f64>,
    dim: CoordDim,
    srid: i32,
    cursor: &mut OrdCursor<'_>,
) -> Result<(), CodecError> {
    out.write_u8(1)?;
    let mut ty = type_code(geom);
    if dim.has_z() {
        ty |= FLAG_Z;
    }
    if dim.has_m() {
        ty |= FLAG_M;
    }
    if srid != UNKNOWN_SRID {
        ty |= FLAG_SRID;
    }
    out.write_u32::<LittleEndian>(ty)?;
    if srid != UNKNOWN_SRID {
        out.write_u32::<LittleEndian>(srid as u32)?;
    }

    match geom {
        Geometry::Point(p) => write_coord(out, p.0, cursor)?,
        Geometry::LineString(ls) => write_coords(out, &ls.0, cursor)?,
        Geometry::Polygon(p) => write_rings(out, p, cursor)?,
        Geometry::MultiPoint(mp) => {
            out.write_u32::<LittleEndian>(mp.0.len() as u32)?;
            for point in &mp.0 {
                write_geometry(out, &Geometry::Point(*point), dim, UNKNOWN_SRID, cursor)?;
            }
        }
        Geometry::MultiLineString(mls) => {
            out.write_u32::<LittleEndian>(mls.0.len() as u32)?;
            for ls in &mls.0 {
                write_geometry(
                    out,
                    &Geometry::LineString(ls.clone()),
                    dim,
                    UNKNOWN_SRID,
                    cursor,
                )?;
            }
        }
        Geometry::MultiPolygon(mp) => {
            out.write_u32::<LittleEndian>(mp.0.len() as u32)?;
            for p in &mp.0 {
                write_geometry(out, &Geometry::Polygon(p.clone()), dim, UNKNOWN_SRID, cursor)?;
            }
        }
        Geometry::GeometryCollection(gc) => {
            out.write_u32::<LittleEndian>(gc.0.len() as u32)?;
            for g in &gc.0 {
                write_geometry(out, g, dim, UNKNOWN_SRID, cursor)?;
            }
        }
        // Canonicalized away at construction time.
        Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
            return Err(CodecError::InvalidWkb(
                "non-canonical geometry variant".to_owned(),
            ));
        }
    }
    Ok(())
}

fn write_coord(
    out: &mut Vec<u8>,
    c: Coord<f64>,
    cursor: &mut OrdCursor<'_>,
) -> Result<(), CodecError> {
    let (z, m) = cursor.next();
    out.write_f64::<LittleEndian>(c.x)?;
    out.write_f64::<LittleEndian>(c.y)?;
    if let Some(z) = z {
        out.write_f64::<LittleEndian>(z)?;
    }
    if let Some(m) = m {
        out.write_f64::<LittleEndian>(m)?;
    }
    Ok(())
}

fn write_coords(
    out: &mut Vec<u8>,
    coords: &[Coord<f64>],
    cursor: &mut OrdCursor<'_>,
) -> Result<(), CodecError> {
    out.write_u32::<LittleEndian>(coords.len() as u32)?;
    for c in coords {
        write_coord(out, *c, cursor)?;
    }
    Ok(())
}

fn write_rings(
    out: &mut Vec<u8>,
    polygon: &Polygon<f64>,
    cursor: &mut OrdCursor<'_>,
) -> Result<(), CodecError> {
    let rings = 1 + polygon.interiors().len();
    if polygon.exterior().0.is_empty() && polygon.interiors().is_empty() {
        out.write_u32::<LittleEndian>(0)?;
        return Ok(());
    }
    out.write_u32::<LittleEndian>(rings as u32)?;
    write_coords(out, &polygon.exterior().0, cursor)?;
    for ring in polygon.interiors() {
        write_coords(out, &ring.0, cursor)?;
    }
    Ok(())
}

/// Per-geometry decoding state: byte order plus the dimension flags of the
/// current header.
struct Header {
    little: bool,
    base_type: u32,
    has_z: bool,
    has_m: bool,
}

fn read_header(
    reader: &mut Cursor<&[u8]>,
    srid: &mut i32,
) -> Result<Header, CodecError> {
    let order = reader.read_u8()?;
    let little = match order {
        0 => false,
        1 => true,
        other => {
            return Err(CodecError::InvalidWkb(format!(
                "invalid byte-order marker {other}"
            )))
        }
    };
    let ty = read_u32(reader, little)?;
    let has_z = ty & FLAG_Z != 0;
    let has_m = ty & FLAG_M != 0;
    if ty & FLAG_SRID != 0 {
        let value = read_u32(reader, little)? as i32;
        // Only the outermost id is kept; nested ids are redundant.
        if *srid == UNKNOWN_SRID {
            *srid = value;
        }
    }
    let mut base_type = ty & 0x0000_FFFF;
    // ISO WKB encodes dimensionality by adding 1000/2000/3000 to the type.
    let iso = base_type / 1000;
    base_type %= 1000;
    Ok(Header {
        little,
        base_type,
        has_z: has_z || iso == 1 || iso == 3,
        has_m: has_m || iso == 2 || iso == 3,
    })
}

fn read_geometry(
    reader: &mut Cursor<&[u8]>,
    ord: &mut OrdBuilder,
    srid: &mut i32,
) -> Result<Geometry<f64>, CodecError> {
    let header = read_header(reader, srid)?;
    let little = header.little;
    Ok(match header.base_type {
        TYPE_POINT => Geometry::Point(Point(read_coord(reader, &header, ord)?)),
        TYPE_LINESTRING => Geometry::LineString(read_line(reader, &header, ord)?),
        TYPE_POLYGON => Geometry::Polygon(read_polygon(reader, &header, ord)?),
        TYPE_MULTIPOINT => {
            let n = read_u32(reader, little)?;
            let mut points = Vec::with_capacity(n as usize);
            for _ in 0..n {
                match read_geometry(reader, ord, srid)? {
                    Geometry::Point(p) => points.push(p),
                    _ => {
                        return Err(CodecError::InvalidWkb(
                            "MULTIPOINT member is not a point".to_owned(),
                        ))
                    }
                }
            }
            Geometry::MultiPoint(MultiPoint(points))
        }
        TYPE_MULTILINESTRING => {
            let n = read_u32(reader, little)?;
            let mut lines = Vec::with_capacity(n as usize);
            for _ in 0..n {
                match read_geometry(reader, ord, srid)? {
                    Geometry::LineString(ls) => lines.push(ls),
                    _ => {
                        return Err(CodecError::InvalidWkb(
                            "MULTILINESTRING member is not a linestring".to_owned(),
                        ))
                    }
                }
            }
            Geometry::MultiLineString(MultiLineString(lines))
        }
        TYPE_MULTIPOLYGON => {
            let n = read_u32(reader, little)?;
            let mut polygons = Vec::with_capacity(n as usize);
            for _ in 0..n {
                match read_geometry(reader, ord, srid)? {
                    Geometry::Polygon(p) => polygons.push(p),
                    _ => {
                        return Err(CodecError::InvalidWkb(
                            "MULTIPOLYGON member is not a polygon".to_owned(),
                        ))
                    }
                }
            }
            Geometry::MultiPolygon(MultiPolygon(polygons))
        }
        TYPE_GEOMETRYCOLLECTION => {
            let n = read_u32(reader, little)?;
            let mut members = Vec::with_capacity(n as usize);
            for _ in 0..n {
                members.push(read_geometry(reader, ord, srid)?);
            }
            Geometry::GeometryCollection(GeometryCollection(members))
        }
        other => {
            return Err(CodecError::InvalidWkb(format!(
                "unsupported geometry type code {other}"
            )))
        }
    })
}

fn read_u32(reader: &mut Cursor<&[u8]>, little: bool) -> Result<u32, CodecError> {
    Ok(if little {
        reader.read_u32::<LittleEndian>()?
    } else {
        reader.read_u32::<BigEndian>()?
    })
}

fn read_f64(reader: &mut Cursor<&[u8]>, little: bool) -> Result<f64, CodecError> {
    Ok(if little {
        reader.read_f64::<LittleEndian>()?
    } else {
        reader.read_f64::<BigEndian>()?
    })
}

fn read_coord(
    reader: &mut Cursor<&[u8]>,
    header: &Header,
    ord: &mut OrdBuilder,
) -> Result<Coord<f64>, CodecError> {
    let x = read_f64(reader, header.little)?;
    let y = read_f64(reader, header.little)?;
    let z = if header.has_z {
        Some(read_f64(reader, header.little)?)
    } else {
        None
    };
    let m = if header.has_m {
        Some(read_f64(reader, header.little)?)
    } else {
        None
    };
    if !ord.push(z, m) {
        return Err(CodecError::InvalidWkb(
            "mixed coordinate dimensions".to_owned(),
        ));
    }
    Ok(Coord { x, y })
}

fn read_line(
    reader: &mut Cursor<&[u8]>,
    header: &Header,
    ord: &mut OrdBuilder,
) -> Result<LineString<f64>, CodecError> {
    let n = read_u32(reader, header.little)?;
    let mut coords = Vec::with_capacity(n as usize);
    for _ in 0..n {
        coords.push(read_coord(reader, header, ord)?);
    }
    Ok(LineString(coords))
}

fn read_polygon(
    reader: &mut Cursor<&[u8]>,
    header: &Header,
    ord: &mut OrdBuilder,
) -> Result<Polygon<f64>, CodecError> {
    let n = read_u32(reader, header.little)?;
    if n == 0 {
        return Ok(Polygon::new(LineString(Vec::new()), Vec::new()));
    }
    let exterior = read_line(reader, header, ord)?;
    let mut interiors = Vec::with_capacity(n as usize - 1);
    for _ in 1..n {
        interiors.push(read_line(reader, header, ord)?);
    }
    Ok(Polygon::new(exterior, interiors))
}
