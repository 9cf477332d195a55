use crate::{Args, FunctionError};
use itertools::Itertools;
use spatial_fusion_model::{SpatialValue, ValueKind};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// The invocation bound to one signature.
///
/// Bindings receive fully dispatched, null-screened arguments and return one
/// engine value. They are shared between alias descriptors, hence the
/// reference counting.
pub type BindingFn = Arc<dyn Fn(&Args<'_>) -> Result<SpatialValue, FunctionError> + Send + Sync>;

/// One accepted parameter-kind sequence and its return kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<ValueKind>,
    returns: ValueKind,
}

impl Signature {
    pub fn new(params: Vec<ValueKind>, returns: ValueKind) -> Self {
        Self { params, returns }
    }

    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    pub fn returns(&self) -> ValueKind {
        self.returns
    }

    /// Exact positional match. No widening between kinds, ever: a
    /// GEOMETRY_ARRAY argument does not match a GEOMETRY parameter and
    /// INTEGER does not match DOUBLE.
    pub fn matches(&self, kinds: &[ValueKind]) -> bool {
        self.params.len() == kinds.len()
            && self.params.iter().zip(kinds).all(|(p, k)| p == k)
    }

    /// Runtime variant of [Self::matches]: a null value carries no kind and is
    /// admitted at any position; its treatment is the null policy's business.
    pub(crate) fn admits(&self, values: &[SpatialValue]) -> bool {
        self.params.len() == values.len()
            && self
                .params
                .iter()
                .zip(values)
                .all(|(p, v)| v.kind().map_or(true, |k| k == *p))
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}) -> {}",
            self.params.iter().join(", "),
            self.returns
        )
    }
}

/// What an invocation does when any argument is null.
///
/// The policy is declared per overload at registration time, so the per-family
/// behavior is enumerated in the catalog instead of assumed uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullPolicy {
    /// Any null argument makes the result null.
    #[default]
    Propagate,
    /// Predicate-style checks answer `false` for null input.
    FalseOnNull,
    /// Multi-valued results collapse to their empty value for null input.
    EmptyOnNull,
}

/// One signature together with its null policy and binding.
#[derive(Clone)]
pub struct Overload {
    signature: Signature,
    null_policy: NullPolicy,
    binding: BindingFn,
}

impl Overload {
    pub(crate) fn new(signature: Signature, null_policy: NullPolicy, binding: BindingFn) -> Self {
        Self {
            signature,
            null_policy,
            binding,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn null_policy(&self) -> NullPolicy {
        self.null_policy
    }

    /// Runs the binding after applying the null policy.
    pub fn invoke(
        &self,
        function: &str,
        values: &[SpatialValue],
    ) -> Result<SpatialValue, FunctionError> {
        if values.iter().any(SpatialValue::is_null) {
            return Ok(match self.null_policy {
                NullPolicy::Propagate => SpatialValue::Null,
                NullPolicy::FalseOnNull => SpatialValue::Boolean(false),
                NullPolicy::EmptyOnNull => match self.signature.returns() {
                    ValueKind::Bytes => SpatialValue::Bytes(Vec::new()),
                    _ => SpatialValue::GeometryArray(Vec::new()),
                },
            });
        }
        (self.binding)(&Args::new(function, values))
    }
}

impl Debug for Overload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overload")
            .field("signature", &self.signature.to_string())
            .field("null_policy", &self.null_policy)
            .finish_non_exhaustive()
    }
}

/// Catalog entry for one named operation: its overloads in declaration order.
///
/// Names are case-sensitive and unique within a catalog. Descriptors are
/// created once at catalog build and immutable afterwards.
#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    name: &'static str,
    overloads: Vec<Overload>,
}

impl FunctionDescriptor {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            overloads: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, overload: Overload) {
        self.overloads.push(overload);
    }

    pub(crate) fn with_overloads(name: &'static str, overloads: Vec<Overload>) -> Self {
        Self { name, overloads }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn overloads(&self) -> &[Overload] {
        &self.overloads
    }

    /// Selects the overload whose parameter kinds match exactly, if any.
    ///
    /// Build-time validation guarantees at most one can match, so the first
    /// hit is the only hit.
    pub fn resolve(&self, kinds: &[ValueKind]) -> Option<&Overload> {
        self.overloads.iter().find(|o| o.signature.matches(kinds))
    }

    /// Selects the first overload admitting the runtime values, treating
    /// nulls as wildcards.
    pub(crate) fn resolve_values(&self, values: &[SpatialValue]) -> Option<&Overload> {
        self.overloads.iter().find(|o| o.signature.admits(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_is_exact_and_positional() {
        let sig = Signature::new(
            vec![ValueKind::Geometry, ValueKind::Double],
            ValueKind::Geometry,
        );
        assert!(sig.matches(&[ValueKind::Geometry, ValueKind::Double]));
        assert!(!sig.matches(&[ValueKind::Geometry, ValueKind::Integer]));
        assert!(!sig.matches(&[ValueKind::GeometryArray, ValueKind::Double]));
        assert!(!sig.matches(&[ValueKind::Geometry]));
    }

    #[test]
    fn null_values_are_wildcards_at_runtime() {
        let sig = Signature::new(
            vec![ValueKind::Geometry, ValueKind::Double],
            ValueKind::Geometry,
        );
        assert!(sig.admits(&[SpatialValue::Null, SpatialValue::Double(1.0)]));
        assert!(!sig.admits(&[SpatialValue::Null, SpatialValue::Integer(1)]));
    }

    #[test]
    fn signature_renders_kind_sequence() {
        let sig = Signature::new(
            vec![ValueKind::Geometry, ValueKind::Integer],
            ValueKind::GeometryArray,
        );
        assert_eq!(sig.to_string(), "(GEOMETRY, INTEGER) -> GEOMETRY_ARRAY");
    }
}
