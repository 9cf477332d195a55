use crate::descriptor::{BindingFn, FunctionDescriptor, NullPolicy, Overload, Signature};
use crate::{Args, FunctionError, RegistrationError, ResolutionError};
use itertools::Itertools;
use spatial_fusion_model::{SpatialValue, ValueKind};
use std::collections::HashMap;
use std::sync::Arc;

/// The authoritative set of spatial functions, keyed by case-sensitive name.
///
/// Built once by [FunctionCatalog::build], read-only afterwards. Lookups of
/// unregistered names are a compile-time condition for the hosting engine
/// ([ResolutionError::FunctionNotFound]), distinct from row-level failures.
#[derive(Debug)]
pub struct FunctionCatalog {
    functions: HashMap<&'static str, Arc<FunctionDescriptor>>,
}

impl FunctionCatalog {
    /// Builds the full builtin catalog.
    ///
    /// Registration is eager and total: every descriptor is installed and
    /// validated before the catalog is handed out. The coordinate-transform
    /// cache is created here and moved into the one binding family that needs
    /// it.
    pub fn build() -> Result<Self, RegistrationError> {
        let mut builder = CatalogBuilder::new();
        crate::builtin::register_builtins(&mut builder);
        builder.finish()
    }

    pub fn descriptor(&self, name: &str) -> Result<&Arc<FunctionDescriptor>, ResolutionError> {
        self.functions
            .get(name)
            .ok_or_else(|| ResolutionError::FunctionNotFound(name.to_owned()))
    }

    /// Resolves a call site to exactly one overload.
    ///
    /// A pure function of `(name, kinds)`: no side effects, safe to memoize
    /// per call site.
    pub fn resolve(
        &self,
        name: &str,
        kinds: &[ValueKind],
    ) -> Result<ResolvedCall<'_>, ResolutionError> {
        let descriptor = self.descriptor(name)?;
        let overload = descriptor
            .resolve(kinds)
            .ok_or_else(|| ResolutionError::NoMatchingOverload {
                function: name.to_owned(),
                supplied: kinds.iter().join(", "),
            })?;
        Ok(ResolvedCall {
            name: descriptor.name(),
            overload,
        })
    }

    /// Resolves against the runtime values and invokes in one step.
    ///
    /// Null arguments carry no kind and admit any overload; the first
    /// admitting overload in declaration order wins, which makes the choice
    /// deterministic.
    pub fn invoke(
        &self,
        name: &str,
        values: &[SpatialValue],
    ) -> Result<SpatialValue, FunctionError> {
        let descriptor = self.descriptor(name)?;
        let overload = descriptor.resolve_values(values).ok_or_else(|| {
            ResolutionError::NoMatchingOverload {
                function: name.to_owned(),
                supplied: values
                    .iter()
                    .map(|v| match v.kind() {
                        Some(kind) => kind.to_string(),
                        None => "NULL".to_owned(),
                    })
                    .join(", "),
            }
        })?;
        overload.invoke(descriptor.name(), values)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// One resolved call site: the function name and its selected overload.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedCall<'a> {
    name: &'static str,
    overload: &'a Overload,
}

impl ResolvedCall<'_> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn signature(&self) -> &Signature {
        self.overload.signature()
    }

    pub fn invoke(&self, values: &[SpatialValue]) -> Result<SpatialValue, FunctionError> {
        self.overload.invoke(self.name, values)
    }
}

/// Accumulates descriptors and validates them into a [FunctionCatalog].
///
/// Everything is checked in [CatalogBuilder::finish]: duplicate names,
/// duplicate parameter-kind sequences within one function, parameter kinds
/// that are return-only, and dangling alias targets. A defect anywhere fails
/// the whole build.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    descriptors: Vec<FunctionDescriptor>,
    aliases: Vec<(&'static str, &'static str)>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a descriptor for `name`; overloads are attached on the returned
    /// builder.
    pub fn function(&mut self, name: &'static str) -> FunctionBuilder<'_> {
        self.descriptors.push(FunctionDescriptor::new(name));
        FunctionBuilder { builder: self }
    }

    /// Registers `alias` as a second name for `target`, sharing the identical
    /// overloads and bindings, so both names behave byte-identically.
    pub fn alias(&mut self, alias: &'static str, target: &'static str) {
        self.aliases.push((alias, target));
    }

    pub fn finish(mut self) -> Result<FunctionCatalog, RegistrationError> {
        for (alias, target) in std::mem::take(&mut self.aliases) {
            let source = self
                .descriptors
                .iter()
                .find(|d| d.name() == target)
                .ok_or_else(|| RegistrationError::UnknownAliasTarget {
                    alias: alias.to_owned(),
                    target: target.to_owned(),
                })?;
            self.descriptors.push(FunctionDescriptor::with_overloads(
                alias,
                source.overloads().to_vec(),
            ));
        }

        let mut functions = HashMap::with_capacity(self.descriptors.len());
        for descriptor in self.descriptors {
            validate(&descriptor)?;
            let name = descriptor.name();
            if functions.insert(name, Arc::new(descriptor)).is_some() {
                return Err(RegistrationError::DuplicateName(name.to_owned()));
            }
        }
        Ok(FunctionCatalog { functions })
    }
}

fn validate(descriptor: &FunctionDescriptor) -> Result<(), RegistrationError> {
    let overloads = descriptor.overloads();
    for overload in overloads {
        if let Some(kind) = overload
            .signature()
            .params()
            .iter()
            .find(|k| **k == ValueKind::PairGeometryDouble)
        {
            return Err(RegistrationError::InvalidParameterKind {
                function: descriptor.name().to_owned(),
                kind: *kind,
            });
        }
    }
    for (i, a) in overloads.iter().enumerate() {
        for b in overloads.iter().skip(i + 1) {
            if a.signature().matches(b.signature().params()) {
                return Err(RegistrationError::DuplicateSignature {
                    function: descriptor.name().to_owned(),
                    kinds: a.signature().params().iter().join(", "),
                });
            }
        }
    }
    Ok(())
}

/// Attaches overloads to the descriptor opened by [CatalogBuilder::function].
#[derive(Debug)]
pub struct FunctionBuilder<'a> {
    builder: &'a mut CatalogBuilder,
}

impl FunctionBuilder<'_> {
    fn push(self, params: &[ValueKind], returns: ValueKind, policy: NullPolicy, binding: BindingFn) -> Self {
        let overload = Overload::new(Signature::new(params.to_vec(), returns), policy, binding);
        if let Some(descriptor) = self.builder.descriptors.last_mut() {
            descriptor.push(overload);
        }
        self
    }

    /// An overload with the default null policy: any null argument makes the
    /// result null.
    pub fn overload(
        self,
        params: &[ValueKind],
        returns: ValueKind,
        binding: impl Fn(&Args<'_>) -> Result<SpatialValue, FunctionError> + Send + Sync + 'static,
    ) -> Self {
        self.push(params, returns, NullPolicy::Propagate, Arc::new(binding))
    }

    /// A BOOLEAN-returning overload answering `false` for null input.
    pub fn predicate(
        self,
        params: &[ValueKind],
        binding: impl Fn(&Args<'_>) -> Result<SpatialValue, FunctionError> + Send + Sync + 'static,
    ) -> Self {
        self.push(
            params,
            ValueKind::Boolean,
            NullPolicy::FalseOnNull,
            Arc::new(binding),
        )
    }

    /// A multi-valued overload collapsing to its empty value for null input.
    pub fn expanding(
        self,
        params: &[ValueKind],
        returns: ValueKind,
        binding: impl Fn(&Args<'_>) -> Result<SpatialValue, FunctionError> + Send + Sync + 'static,
    ) -> Self {
        self.push(params, returns, NullPolicy::EmptyOnNull, Arc::new(binding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &Args<'_>) -> Result<SpatialValue, FunctionError> {
        Ok(SpatialValue::Null)
    }

    #[test]
    fn duplicate_signature_fails_the_build() {
        let mut builder = CatalogBuilder::new();
        builder
            .function("ST_Scratch")
            .overload(&[ValueKind::Geometry], ValueKind::Double, noop)
            .overload(&[ValueKind::Geometry], ValueKind::Integer, noop);
        assert!(matches!(
            builder.finish(),
            Err(RegistrationError::DuplicateSignature { .. })
        ));
    }

    #[test]
    fn duplicate_name_fails_the_build() {
        let mut builder = CatalogBuilder::new();
        builder
            .function("ST_Scratch")
            .overload(&[ValueKind::Geometry], ValueKind::Double, noop);
        builder
            .function("ST_Scratch")
            .overload(&[ValueKind::Double], ValueKind::Double, noop);
        assert!(matches!(
            builder.finish(),
            Err(RegistrationError::DuplicateName(_))
        ));
    }

    #[test]
    fn pair_is_not_a_parameter_kind() {
        let mut builder = CatalogBuilder::new();
        builder.function("ST_Scratch").overload(
            &[ValueKind::PairGeometryDouble],
            ValueKind::Double,
            noop,
        );
        assert!(matches!(
            builder.finish(),
            Err(RegistrationError::InvalidParameterKind { .. })
        ));
    }

    #[test]
    fn alias_must_point_at_a_registered_function() {
        let mut builder = CatalogBuilder::new();
        builder.alias("ST_Other", "ST_Missing");
        assert!(matches!(
            builder.finish(),
            Err(RegistrationError::UnknownAliasTarget { .. })
        ));
    }

    #[test]
    fn resolution_distinguishes_unknown_name_from_unmatched_kinds() {
        let mut builder = CatalogBuilder::new();
        builder
            .function("ST_Scratch")
            .overload(&[ValueKind::Geometry], ValueKind::Double, noop);
        let catalog = builder.finish().unwrap();

        assert!(matches!(
            catalog.resolve("ST_Nope", &[ValueKind::Geometry]),
            Err(ResolutionError::FunctionNotFound(_))
        ));
        let err = catalog
            .resolve("ST_Scratch", &[ValueKind::Double, ValueKind::Double])
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("ST_Scratch"));
        assert!(message.contains("DOUBLE, DOUBLE"));
    }
}
