//! Structural accessors and predicates.
//!
//! Accessors asked for a component that does not exist answer null (never an
//! error); the predicate family answers `false` for null input.

use super::{nullable, nullable_geom};
use crate::CatalogBuilder;
use spatial_fusion_kernel::{accessor, KernelError};
use spatial_fusion_model::{Geometry, ValueKind as K};

pub(super) fn register(b: &mut CatalogBuilder) {
    b.function("ST_Dimension")
        .overload(&[K::Geometry], K::Integer, |args| {
            Ok(accessor::dimension(args.geometry(0)?.geometry()).into())
        });
    b.function("ST_CoordDim")
        .overload(&[K::Geometry], K::Integer, |args| {
            Ok(args.geometry(0)?.dim().ordinates().into())
        });
    b.function("ST_NDims")
        .overload(&[K::Geometry], K::Integer, |args| {
            Ok(args.geometry(0)?.dim().ordinates().into())
        });

    b.function("ST_X").overload(&[K::Geometry], K::Double, |args| {
        Ok(nullable(accessor::x(args.geometry(0)?.geometry())))
    });
    b.function("ST_Y").overload(&[K::Geometry], K::Double, |args| {
        Ok(nullable(accessor::y(args.geometry(0)?.geometry())))
    });
    b.function("ST_Z").overload(&[K::Geometry], K::Double, |args| {
        let g = args.geometry(0)?;
        let z = match g.geometry() {
            Geometry::Point(_) => g.z_ordinates().first().copied(),
            _ => None,
        };
        Ok(nullable(z))
    });
    b.function("ST_XMin").overload(&[K::Geometry], K::Double, |args| {
        Ok(nullable(accessor::x_min(args.geometry(0)?.geometry())))
    });
    b.function("ST_XMax").overload(&[K::Geometry], K::Double, |args| {
        Ok(nullable(accessor::x_max(args.geometry(0)?.geometry())))
    });
    b.function("ST_YMin").overload(&[K::Geometry], K::Double, |args| {
        Ok(nullable(accessor::y_min(args.geometry(0)?.geometry())))
    });
    b.function("ST_YMax").overload(&[K::Geometry], K::Double, |args| {
        Ok(nullable(accessor::y_max(args.geometry(0)?.geometry())))
    });
    b.function("ST_ZMin").overload(&[K::Geometry], K::Double, |args| {
        let z = args.geometry(0)?.z_ordinates().iter().copied().reduce(f64::min);
        Ok(nullable(z))
    });
    b.function("ST_ZMax").overload(&[K::Geometry], K::Double, |args| {
        let z = args.geometry(0)?.z_ordinates().iter().copied().reduce(f64::max);
        Ok(nullable(z))
    });

    b.function("ST_NPoints")
        .overload(&[K::Geometry], K::Integer, |args| {
            Ok(accessor::num_points(args.geometry(0)?.geometry()).into())
        });
    b.function("ST_NumPoints")
        .overload(&[K::Geometry], K::Integer, |args| {
            // Unlike ST_NPoints this is defined for linestrings only.
            match args.geometry(0)?.geometry() {
                Geometry::LineString(ls) => Ok((ls.0.len() as i32).into()),
                other => Err(KernelError::invalid(format!(
                    "vertex count requires a linestring, got {}",
                    spatial_fusion_model::type_name(other)
                ))
                .into()),
            }
        });
    b.function("ST_NumGeometries")
        .overload(&[K::Geometry], K::Integer, |args| {
            Ok(accessor::num_geometries(args.geometry(0)?.geometry()).into())
        });
    b.function("ST_NumInteriorRings")
        .overload(&[K::Geometry], K::Integer, |args| {
            Ok(nullable(accessor::num_interior_rings(
                args.geometry(0)?.geometry(),
            )))
        });
    b.function("ST_NRings")
        .overload(&[K::Geometry], K::Integer, |args| {
            Ok(accessor::num_rings(args.geometry(0)?.geometry())?.into())
        });

    b.function("ST_GeometryN")
        .overload(&[K::Geometry, K::Integer], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(nullable_geom(g, accessor::geometry_n(g.geometry(), args.integer(1)?)))
        });
    b.function("ST_PointN")
        .overload(&[K::Geometry, K::Integer], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(nullable_geom(g, accessor::point_n(g.geometry(), args.integer(1)?)))
        });
    b.function("ST_InteriorRingN")
        .overload(&[K::Geometry, K::Integer], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(nullable_geom(
                g,
                accessor::interior_ring_n(g.geometry(), args.integer(1)?),
            ))
        });
    b.function("ST_ExteriorRing")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(nullable_geom(g, accessor::exterior_ring(g.geometry())))
        });
    b.function("ST_StartPoint")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(nullable_geom(g, accessor::start_point(g.geometry())))
        });
    b.function("ST_EndPoint")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(nullable_geom(g, accessor::end_point(g.geometry())))
        });

    b.function("ST_SRID")
        .overload(&[K::Geometry], K::Integer, |args| {
            Ok(args.geometry(0)?.srid().into())
        });

    b.function("ST_IsEmpty").predicate(&[K::Geometry], |args| {
        Ok(args.geometry(0)?.is_empty().into())
    });
    b.function("ST_IsClosed").predicate(&[K::Geometry], |args| {
        Ok(accessor::is_closed(args.geometry(0)?.geometry()).into())
    });
    b.function("ST_IsRing").predicate(&[K::Geometry], |args| {
        Ok(accessor::is_ring(args.geometry(0)?.geometry()).into())
    });
    b.function("ST_IsSimple").predicate(&[K::Geometry], |args| {
        Ok(accessor::is_simple(args.geometry(0)?.geometry()).into())
    });
    b.function("ST_IsValid").predicate(&[K::Geometry], |args| {
        Ok(accessor::is_valid(args.geometry(0)?.geometry()).into())
    });
}
