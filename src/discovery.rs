//! Upstream discovery boundary.
//!
//! The discovery collaborator scans whatever declarative source exists
//! (annotations, metadata, config) and hands over raw declarations. This
//! module normalizes that feed into [`ServiceDescriptor`]s: explicit
//! contract filters, per-interface fan-out, self contracts, constructor
//! parameter analysis (including deferred-factory unwrapping), and the
//! per-module facts a build pipeline can use for minimization.
//!
//! With the `serde` feature the whole feed (de)serializes, so a discovery
//! pass in another process can ship it over as JSON.

use std::collections::BTreeMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::descriptor::{DependencyDescriptor, ServiceDescriptor, TypeDescriptor};
use crate::error::{ConfigError, ConfigErrors};
use crate::lifetime::Lifetime;

/// Deferred-factory wrapper spellings recognized on constructor parameters.
/// Matched case-insensitively against the last path segment of the wrapper.
const DEFERRED_WRAPPERS: &[&str] = &["deferred", "lazy", "factory"];

/// One constructor parameter as reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawParameter {
    /// Declared parameter type, possibly a deferred-factory wrapper
    pub declared_type: String,
    /// Keyed-import id annotation, when present
    pub service_id: Option<String>,
}

impl RawParameter {
    /// A parameter of the given declared type with no import id.
    pub fn new(declared_type: impl Into<String>) -> Self {
        Self {
            declared_type: declared_type.into(),
            service_id: None,
        }
    }

    /// Sets the keyed-import id annotation.
    pub fn with_service_id(mut self, id: impl Into<String>) -> Self {
        self.service_id = Some(id.into());
        self
    }
}

/// One constructor as reported by discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstructorDeclaration {
    /// Parameters in declaration order
    pub parameters: Vec<RawParameter>,
}

impl ConstructorDeclaration {
    /// A constructor with the given parameters.
    pub fn new(parameters: impl IntoIterator<Item = RawParameter>) -> Self {
        Self {
            parameters: parameters.into_iter().collect(),
        }
    }
}

/// Arguments of the export annotation on a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportArguments {
    /// Explicit contract filter, when the annotation names one
    pub contract: Option<String>,
    /// Declared lifetime policy
    pub lifetime: Lifetime,
    /// Export id, when the annotation names one
    pub service_id: Option<String>,
}

impl ExportArguments {
    /// An export with the given lifetime and no contract filter or id.
    pub fn new(lifetime: Lifetime) -> Self {
        Self {
            contract: None,
            lifetime,
            service_id: None,
        }
    }

    /// Sets the explicit contract filter.
    pub fn with_contract(mut self, contract: impl Into<String>) -> Self {
        self.contract = Some(contract.into());
        self
    }

    /// Sets the export id.
    pub fn with_service_id(mut self, id: impl Into<String>) -> Self {
        self.service_id = Some(id.into());
        self
    }
}

/// One annotated declaration as reported by discovery, not yet normalized.
///
/// # Examples
///
/// ```rust
/// use forge_di::{
///     build_descriptors, ConstructorDeclaration, ExportArguments, Lifetime, RawDeclaration,
///     RawParameter, TypeDescriptor,
/// };
///
/// // One class implementing two interfaces fans out into two descriptors
/// // sharing the implementation and dependency list.
/// let declaration = RawDeclaration::new("app.AuditSink", "core", ExportArguments::new(Lifetime::Singleton))
///     .with_interface("app.ISink")
///     .with_interface("app.IFlushable")
///     .with_constructor(ConstructorDeclaration::new([
///         RawParameter::new("app.Clock"),
///         RawParameter::new("Lazy<app.Store>"),
///     ]));
///
/// let descriptors = build_descriptors(&[declaration]).unwrap();
/// assert_eq!(descriptors.len(), 2);
/// assert_eq!(descriptors[0].contract, TypeDescriptor::new("app.ISink"));
/// assert_eq!(descriptors[1].contract, TypeDescriptor::new("app.IFlushable"));
/// // The wrapper unwraps: contract app.Store, deferred.
/// assert!(descriptors[0].dependencies[1].deferred);
/// assert_eq!(descriptors[0].dependencies[1].contract, TypeDescriptor::new("app.Store"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawDeclaration {
    /// The annotated type itself
    pub declared_type: String,
    /// Interfaces the type implements, as reported by discovery
    pub implemented_interfaces: Vec<String>,
    /// Declared constructors; exactly one may be eligible
    pub constructors: Vec<ConstructorDeclaration>,
    /// The export annotation's arguments
    pub export: ExportArguments,
    /// Module the declaration came from
    pub module: String,
}

impl RawDeclaration {
    /// A declaration with no interfaces and no constructors (empty
    /// constructor list means a parameterless default constructor).
    pub fn new(
        declared_type: impl Into<String>,
        module: impl Into<String>,
        export: ExportArguments,
    ) -> Self {
        Self {
            declared_type: declared_type.into(),
            implemented_interfaces: Vec::new(),
            constructors: Vec::new(),
            export,
            module: module.into(),
        }
    }

    /// Adds an implemented interface.
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.implemented_interfaces.push(interface.into());
        self
    }

    /// Adds a constructor.
    pub fn with_constructor(mut self, constructor: ConstructorDeclaration) -> Self {
        self.constructors.push(constructor);
        self
    }
}

/// Splits a declared parameter type into its contract and deferredness.
///
/// A one-argument wrapper whose base name is a recognized deferred-factory
/// spelling unwraps to the inner type; anything else is the contract itself.
fn split_deferred(declared: &str) -> (&str, bool) {
    let declared = declared.trim();
    if let (Some(open), true) = (declared.find('<'), declared.ends_with('>')) {
        let wrapper = declared[..open].trim();
        let inner = declared[open + 1..declared.len() - 1].trim();
        let base = wrapper
            .rsplit(|c| c == '.' || c == ':')
            .next()
            .unwrap_or(wrapper);
        if !inner.is_empty()
            && !inner.contains(',')
            && DEFERRED_WRAPPERS.iter().any(|w| base.eq_ignore_ascii_case(w))
        {
            return (inner, true);
        }
    }
    (declared, false)
}

fn dependencies_of(
    declaration: &RawDeclaration,
) -> Result<SmallVec<[DependencyDescriptor; crate::descriptor::DEPS_INLINE]>, ConfigError> {
    let parameters: &[RawParameter] = match declaration.constructors.len() {
        0 => &[],
        1 => &declaration.constructors[0].parameters,
        count => {
            return Err(ConfigError::AmbiguousConstructor {
                declared_type: declaration.declared_type.clone(),
                count,
            })
        }
    };

    Ok(parameters
        .iter()
        .map(|parameter| {
            let (contract, deferred) = split_deferred(&parameter.declared_type);
            DependencyDescriptor {
                contract: TypeDescriptor::new(contract),
                service_id: parameter.service_id.as_deref().map(Arc::from),
                deferred,
            }
        })
        .collect())
}

fn contract_targets(declaration: &RawDeclaration) -> Result<Vec<TypeDescriptor>, ConfigError> {
    if let Some(explicit) = &declaration.export.contract {
        let explicit = TypeDescriptor::new(explicit);
        let implements = TypeDescriptor::new(&declaration.declared_type) == explicit
            || declaration
                .implemented_interfaces
                .iter()
                .any(|interface| TypeDescriptor::new(interface) == explicit);
        if !implements {
            return Err(ConfigError::ContractNotImplemented {
                declared_type: declaration.declared_type.clone(),
                contract: explicit.name().to_string(),
            });
        }
        return Ok(vec![explicit]);
    }
    if !declaration.implemented_interfaces.is_empty() {
        return Ok(declaration
            .implemented_interfaces
            .iter()
            .map(TypeDescriptor::new)
            .collect());
    }
    Ok(vec![TypeDescriptor::new(&declaration.declared_type)])
}

/// Normalizes a discovery feed into service descriptors.
///
/// Applies the export rules: an explicit contract filter yields exactly one
/// descriptor (and must actually be implemented by the declaring type);
/// otherwise implemented interfaces fan out one descriptor each; otherwise
/// the implementation is its own contract. Constructor parameters become the
/// dependency list in declaration order, unwrapping deferred-factory
/// wrappers.
///
/// All defects across the whole feed are aggregated into one
/// [`ConfigErrors`] failure.
pub fn build_descriptors(
    declarations: &[RawDeclaration],
) -> Result<Vec<ServiceDescriptor>, ConfigErrors> {
    let mut descriptors = Vec::new();
    let mut errors = Vec::new();

    for declaration in declarations {
        let dependencies = match dependencies_of(declaration) {
            Ok(dependencies) => dependencies,
            Err(error) => {
                errors.push(error);
                continue;
            }
        };
        let targets = match contract_targets(declaration) {
            Ok(targets) => targets,
            Err(error) => {
                errors.push(error);
                continue;
            }
        };

        let implementation = TypeDescriptor::new(&declaration.declared_type);
        let module: Arc<str> = Arc::from(declaration.module.as_str());
        let service_id: Option<Arc<str>> = declaration.export.service_id.as_deref().map(Arc::from);

        for contract in targets {
            descriptors.push(ServiceDescriptor {
                contract,
                implementation: implementation.clone(),
                dependencies: dependencies.clone(),
                lifetime: declaration.export.lifetime,
                service_id: service_id.clone(),
                module: module.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(descriptors)
    } else {
        Err(ConfigErrors::new(errors))
    }
}

/// Per-module facts a build pipeline can use to skip work.
///
/// A referencing build only needs scope plumbing for modules that define
/// Scoped services, and keyed lookup tables for modules that define named
/// services. These are minimization hints, never consulted for correctness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFacts {
    /// Module name
    pub module: Arc<str>,
    /// Whether the module defines any Scoped service
    pub defines_scoped: bool,
    /// Whether the module defines any named service
    pub defines_named: bool,
}

/// Collects per-module facts from a descriptor set, sorted by module name.
pub fn module_facts(descriptors: &[ServiceDescriptor]) -> Vec<ModuleFacts> {
    let mut by_module: BTreeMap<&str, (bool, bool)> = BTreeMap::new();
    for descriptor in descriptors {
        let entry = by_module.entry(descriptor.module()).or_default();
        entry.0 |= descriptor.lifetime == Lifetime::Scoped;
        entry.1 |= descriptor.is_named();
    }
    by_module
        .into_iter()
        .map(|(module, (defines_scoped, defines_named))| ModuleFacts {
            module: Arc::from(module),
            defines_scoped,
            defines_named,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_deferred_recognizes_wrappers() {
        assert_eq!(split_deferred("app.Store"), ("app.Store", false));
        assert_eq!(split_deferred("Lazy<app.Store>"), ("app.Store", true));
        assert_eq!(split_deferred("Deferred<app.Store>"), ("app.Store", true));
        assert_eq!(split_deferred("sys.lazy<app.Store>"), ("app.Store", true));
        assert_eq!(split_deferred("std::lazy<app.Store>"), ("app.Store", true));
    }

    #[test]
    fn split_deferred_rejects_non_wrappers() {
        // Unknown wrapper, multi-argument wrapper, empty argument
        assert_eq!(split_deferred("Vec<app.Store>"), ("Vec<app.Store>", false));
        assert_eq!(split_deferred("Lazy<a, b>"), ("Lazy<a, b>", false));
        assert_eq!(split_deferred("Lazy<>"), ("Lazy<>", false));
    }
}
