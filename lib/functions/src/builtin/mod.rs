//! Builtin function registrations.
//!
//! One submodule per catalog family. Every default for a trailing optional
//! parameter is a named constant next to its registration; defaults are fixed
//! per-function catalog policy, not caller-configurable.

mod accessor;
mod constructive;
mod editor;
mod measure;
mod serial;

use crate::CatalogBuilder;
use spatial_fusion_kernel::transform::TransformCache;
use spatial_fusion_model::{Geometry, SpatialGeometry, SpatialValue};
use std::sync::Arc;

/// Installs every builtin descriptor into the builder.
///
/// The coordinate-transform cache is created here and moved into the
/// `ST_Transform` bindings; it is the only shared state any binding owns.
pub(crate) fn register_builtins(builder: &mut CatalogBuilder) {
    let transforms = Arc::new(TransformCache::new());
    measure::register(builder);
    accessor::register(builder);
    constructive::register(builder);
    editor::register(builder, &transforms);
    serial::register(builder);
}

/// Wraps an optional scalar, mapping absence onto SQL null.
fn nullable<T: Into<SpatialValue>>(value: Option<T>) -> SpatialValue {
    value.map_or(SpatialValue::Null, Into::into)
}

/// Wraps an optional kernel geometry, inheriting the source's reference id.
fn nullable_geom(source: &SpatialGeometry, geom: Option<Geometry<f64>>) -> SpatialValue {
    match geom {
        Some(g) => source.derive(g).into(),
        None => SpatialValue::Null,
    }
}
