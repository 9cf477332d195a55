mod cell;
mod error;
mod ewkb;
mod ewkt;
mod geohash;
mod geojson;
mod gml;
mod kml;
mod ordinates;

pub use self::cell::{s2_cell_ids, MAX_LEVEL};
pub use self::error::CodecError;
pub use self::ewkb::{parse_ewkb, write_ewkb};
pub use self::ewkt::{parse_ewkt, write_ewkt};
pub use self::geohash::{geohash, MAX_PRECISION};
pub use self::geojson::{parse_geojson, write_geojson};
pub use self::gml::write_gml;
pub use self::kml::write_kml;
