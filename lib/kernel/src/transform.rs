//! Coordinate reference system transforms.
//!
//! The transform kernel is `proj4rs` with its built-in EPSG definition table.
//! Building a projection pair is comparatively expensive, so pairs are cached
//! per (source, target) reference id. The cache is the one piece of shared
//! state in this layer: a concurrent map with at-most-one initialization per
//! key, safe for reads from any number of engine worker threads.

use crate::{KernelError, KernelResult};
use dashmap::DashMap;
use geo::MapCoords;
use geo_types::{Coord, Geometry};
use proj4rs::proj::Proj;
use std::sync::Arc;

/// Process-scoped cache of prepared projection pairs.
#[derive(Default)]
pub struct TransformCache {
    pairs: DashMap<(i32, i32), Arc<ProjPair>>,
}

impl std::fmt::Debug for TransformCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformCache")
            .field("pairs", &self.pairs.len())
            .finish()
    }
}

struct ProjPair {
    source: Proj,
    target: Proj,
}

impl TransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reprojects every coordinate from the `source` to the `target` reference
    /// system.
    ///
    /// With `lenient` unset, any coordinate the kernel cannot map fails the
    /// whole call; no partially transformed geometry is ever returned. With
    /// `lenient` set, unmappable coordinates keep their source values.
    pub fn transform(
        &self,
        geom: &Geometry<f64>,
        source: i32,
        target: i32,
        lenient: bool,
    ) -> KernelResult<Geometry<f64>> {
        let pair = self.pair(source, target)?;
        if lenient {
            return Ok(geom.map_coords(|c| project(&pair, c).unwrap_or(c)));
        }
        geom.try_map_coords(|c| project(&pair, c))
    }

    fn pair(&self, source: i32, target: i32) -> KernelResult<Arc<ProjPair>> {
        let entry = self
            .pairs
            .entry((source, target))
            .or_try_insert_with(|| {
                Ok::<_, KernelError>(Arc::new(ProjPair {
                    source: resolve(source)?,
                    target: resolve(target)?,
                }))
            })?;
        Ok(Arc::clone(entry.value()))
    }
}

/// Looks up an EPSG definition for a reference id.
fn resolve(srid: i32) -> KernelResult<Proj> {
    let code = u16::try_from(srid).map_err(|_| KernelError::UnknownCrs(srid.to_string()))?;
    Proj::from_epsg_code(code).map_err(|_| KernelError::UnknownCrs(srid.to_string()))
}

fn project(pair: &ProjPair, c: Coord<f64>) -> KernelResult<Coord<f64>> {
    // proj4rs works in radians for geographic systems.
    let mut point = if pair.source.is_latlong() {
        (c.x.to_radians(), c.y.to_radians())
    } else {
        (c.x, c.y)
    };
    proj4rs::transform::transform(&pair.source, &pair.target, &mut point)
        .map_err(|e| KernelError::Transform(e.to_string()))?;
    if pair.target.is_latlong() {
        Ok(Coord {
            x: point.0.to_degrees(),
            y: point.1.to_degrees(),
        })
    } else {
        Ok(Coord {
            x: point.0,
            y: point.1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo_types::point;

    #[test]
    fn wgs84_to_web_mercator_and_back() {
        let cache = TransformCache::new();
        let zurich = Geometry::Point(point! { x: 8.5417, y: 47.3769 });
        let projected = cache.transform(&zurich, 4326, 3857, false).unwrap();
        let Geometry::Point(p) = projected else {
            panic!("expected a point");
        };
        assert_relative_eq!(p.x(), 950_843.0, epsilon = 100.0);
        assert_relative_eq!(p.y(), 6_003_342.0, epsilon = 2_000.0);

        let Geometry::Point(back) = cache
            .transform(&Geometry::Point(p), 3857, 4326, false)
            .unwrap()
        else {
            panic!("expected a point");
        };
        assert_relative_eq!(back.x(), 8.5417, epsilon = 1e-6);
        assert_relative_eq!(back.y(), 47.3769, epsilon = 1e-6);
    }

    #[test]
    fn unknown_reference_id_fails_without_partial_output() {
        let cache = TransformCache::new();
        let p = Geometry::Point(point! { x: 1.0, y: 2.0 });
        let result = cache.transform(&p, 4326, 999_999, false);
        assert!(matches!(result, Err(KernelError::UnknownCrs(_))));
        let result = cache.transform(&p, -1, 4326, false);
        assert!(matches!(result, Err(KernelError::UnknownCrs(_))));
    }

    #[test]
    fn pairs_are_cached_per_key() {
        let cache = TransformCache::new();
        let p = Geometry::Point(point! { x: 8.0, y: 47.0 });
        let first = cache.transform(&p, 4326, 3857, false).unwrap();
        let second = cache.transform(&p, 4326, 3857, false).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.pairs.len(), 1);
    }
}
