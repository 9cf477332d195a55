//! S2 cell identifier encoding for spatial-index functions.

use crate::CodecError;
use geo::CoordsIter;
use s2::cellid::CellID;
use s2::latlng::LatLng;
use spatial_fusion_model::SpatialGeometry;

/// Deepest S2 cell level.
pub const MAX_LEVEL: i32 = 30;

/// Returns the ordered, distinct S2 cell ids covering the geometry's
/// vertices at the given level.
///
/// Coordinates are interpreted as lon/lat degrees. The covering is
/// vertex-based: every coordinate of the geometry contributes the cell that
/// contains it. Ids are sorted ascending and deduplicated, so equal inputs
/// produce identical arrays.
pub fn s2_cell_ids(value: &SpatialGeometry, level: i32) -> Result<Vec<i64>, CodecError> {
    if !(0..=MAX_LEVEL).contains(&level) {
        return Err(CodecError::OutOfRange {
            arg: "level",
            min: 0,
            max: i64::from(MAX_LEVEL),
            value: i64::from(level),
        });
    }
    let mut ids = value
        .geometry()
        .coords_iter()
        .map(|c| {
            let cell = CellID::from(LatLng::from_degrees(c.y, c.x));
            cell.parent(u64::from(level as u32)).0 as i64
        })
        .collect::<Vec<_>>();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}
