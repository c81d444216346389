//! Normalized service and dependency descriptors.
//!
//! This module contains the descriptor model handed over by the discovery
//! collaborator: one [`ServiceDescriptor`] per exported contract, each with
//! an ordered list of [`DependencyDescriptor`]s mirroring the constructor
//! parameter list.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::lifetime::Lifetime;

/// A fully-qualified type name used as a contract or implementation identity.
///
/// Descriptors are data produced at build time, so types are identified by
/// name rather than by `TypeId`. Two descriptors naming the same type with
/// different casing compare equal; the original spelling is preserved for
/// display and emission.
///
/// `TypeDescriptor` is immutable and cheap to clone.
///
/// # Examples
///
/// ```rust
/// use forge_di::TypeDescriptor;
///
/// let a = TypeDescriptor::new("App.Services.ILogger");
/// let b = TypeDescriptor::new("app.services.ilogger");
///
/// assert_eq!(a, b); // case-insensitive identity
/// assert_eq!(a.name(), "App.Services.ILogger"); // original spelling kept
/// ```
#[derive(Clone)]
pub struct TypeDescriptor {
    name: Arc<str>,
    folded: Arc<str>,
}

impl TypeDescriptor {
    /// Creates a descriptor for the given fully-qualified type name.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        Self {
            name: Arc::from(name),
            folded: Arc::from(name.to_lowercase().as_str()),
        }
    }

    /// The type name as originally spelled.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self.name)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for TypeDescriptor {}

impl PartialOrd for TypeDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeDescriptor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.folded.cmp(&other.folded)
    }
}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl From<&str> for TypeDescriptor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeDescriptor {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&TypeDescriptor> for TypeDescriptor {
    fn from(descriptor: &TypeDescriptor) -> Self {
        descriptor.clone()
    }
}

/// One constructor parameter of an exported service.
///
/// `deferred` marks a parameter that asks for a zero-argument factory of the
/// contract instead of an eagerly resolved instance; the factory resolves
/// against whatever scope is active when it is invoked.
///
/// Equality is by `(contract, service_id)`; deferredness does not change
/// which providers can satisfy the dependency.
///
/// # Examples
///
/// ```rust
/// use forge_di::{DependencyDescriptor, TypeDescriptor};
///
/// let logger = TypeDescriptor::new("app.ILogger");
///
/// let eager = DependencyDescriptor::new(logger.clone());
/// let lazy = DependencyDescriptor::deferred(logger.clone());
/// let keyed = DependencyDescriptor::new(logger).with_service_id("audit");
///
/// assert_eq!(eager, lazy); // deferredness is not identity
/// assert_ne!(eager, keyed);
/// assert_eq!(keyed.service_id(), Some("audit"));
/// ```
#[derive(Debug, Clone)]
pub struct DependencyDescriptor {
    /// Contract the parameter is resolved by
    pub contract: TypeDescriptor,
    /// Keyed-import id, when the parameter names one
    pub service_id: Option<Arc<str>>,
    /// Whether the parameter wants a zero-argument factory
    pub deferred: bool,
}

impl DependencyDescriptor {
    /// An eagerly resolved, unkeyed dependency on `contract`.
    pub fn new(contract: impl Into<TypeDescriptor>) -> Self {
        Self {
            contract: contract.into(),
            service_id: None,
            deferred: false,
        }
    }

    /// A deferred dependency on `contract`.
    pub fn deferred(contract: impl Into<TypeDescriptor>) -> Self {
        Self {
            contract: contract.into(),
            service_id: None,
            deferred: true,
        }
    }

    /// Sets the keyed-import id.
    pub fn with_service_id(mut self, id: impl AsRef<str>) -> Self {
        self.service_id = Some(Arc::from(id.as_ref()));
        self
    }

    /// The keyed-import id, or `None` for unkeyed dependencies.
    pub fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }

    /// Whether this dependency names a service id.
    pub fn is_named(&self) -> bool {
        self.service_id.is_some()
    }
}

impl PartialEq for DependencyDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.contract == other.contract && self.service_id == other.service_id
    }
}

impl Eq for DependencyDescriptor {}

impl Hash for DependencyDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.contract.hash(state);
        self.service_id.hash(state);
    }
}

/// Inline capacity for dependency lists; most constructors take few parameters.
pub(crate) const DEPS_INLINE: usize = 4;

/// One exported service, normalized.
///
/// A declaration exporting several interfaces fans out into one descriptor
/// per contract, all sharing the implementation and dependency list. The
/// dependency order equals the constructor parameter order.
///
/// Equality is by `(contract, implementation, service_id)`; discovering the
/// same triple twice collapses to one registration at plan build. `module`
/// is provenance only: it feeds the deterministic collection ordering and
/// per-module facts, never identity.
///
/// # Examples
///
/// ```rust
/// use forge_di::{DependencyDescriptor, Lifetime, ServiceDescriptor, TypeDescriptor};
///
/// let contract = TypeDescriptor::new("app.IMailer");
/// let implementation = TypeDescriptor::new("app.SmtpMailer");
///
/// let descriptor = ServiceDescriptor::new(contract, implementation, Lifetime::Scoped)
///     .with_dependency(DependencyDescriptor::new("app.ILogger"))
///     .with_service_id("smtp")
///     .with_module("mail");
///
/// assert_eq!(descriptor.lifetime, Lifetime::Scoped);
/// assert_eq!(descriptor.service_id(), Some("smtp"));
/// assert_eq!(descriptor.module(), "mail");
/// assert_eq!(descriptor.dependencies.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// Contract this provider is requested by
    pub contract: TypeDescriptor,
    /// Concrete implementation type
    pub implementation: TypeDescriptor,
    /// Constructor dependencies, in parameter order
    pub dependencies: SmallVec<[DependencyDescriptor; DEPS_INLINE]>,
    /// Caching policy
    pub lifetime: Lifetime,
    /// Export id, when the provider is named
    pub service_id: Option<Arc<str>>,
    /// Defining module, for deterministic ordering and module facts
    pub module: Arc<str>,
}

impl ServiceDescriptor {
    /// Creates a descriptor with no dependencies, no id, and an empty module.
    pub fn new(
        contract: impl Into<TypeDescriptor>,
        implementation: impl Into<TypeDescriptor>,
        lifetime: Lifetime,
    ) -> Self {
        Self {
            contract: contract.into(),
            implementation: implementation.into(),
            dependencies: SmallVec::new(),
            lifetime,
            service_id: None,
            module: Arc::from(""),
        }
    }

    /// Appends one constructor dependency.
    pub fn with_dependency(mut self, dependency: DependencyDescriptor) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Replaces the dependency list, preserving the given order.
    pub fn with_dependencies(
        mut self,
        dependencies: impl IntoIterator<Item = DependencyDescriptor>,
    ) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }

    /// Sets the export id.
    pub fn with_service_id(mut self, id: impl AsRef<str>) -> Self {
        self.service_id = Some(Arc::from(id.as_ref()));
        self
    }

    /// Sets the defining module.
    pub fn with_module(mut self, module: impl AsRef<str>) -> Self {
        self.module = Arc::from(module.as_ref());
        self
    }

    /// The export id, or `None` for unnamed providers.
    pub fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }

    /// Whether this provider is named.
    pub fn is_named(&self) -> bool {
        self.service_id.is_some()
    }

    /// The defining module name.
    pub fn module(&self) -> &str {
        &self.module
    }
}

impl PartialEq for ServiceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.contract == other.contract
            && self.implementation == other.implementation
            && self.service_id == other.service_id
    }
}

impl Eq for ServiceDescriptor {}

impl Hash for ServiceDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.contract.hash(state);
        self.implementation.hash(state);
        self.service_id.hash(state);
    }
}
