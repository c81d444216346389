//! Cache key types for constructed instances.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::descriptor::{ServiceDescriptor, TypeDescriptor};

/// Key for instance storage and lookup.
///
/// Keys identify cached instances in the process-wide and per-scope caches.
/// The contract is the primary dimension; the service id is the secondary,
/// keyed dimension: a named provider and an unnamed provider of the same
/// contract cache independently, as do two named providers with different
/// ids.
///
/// # Examples
///
/// ```rust
/// use forge_di::{ServiceKey, TypeDescriptor};
///
/// let contract = TypeDescriptor::new("app.ILogger");
///
/// let unnamed = ServiceKey::new(contract.clone());
/// let audit = ServiceKey::named(contract.clone(), "audit");
/// let console = ServiceKey::named(contract, "console");
///
/// assert_ne!(unnamed, audit);
/// assert_ne!(audit, console);
/// assert_eq!(unnamed.display_name(), "app.ILogger");
/// assert_eq!(audit.service_id(), Some("audit"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceKey {
    contract: TypeDescriptor,
    service_id: Option<Arc<str>>,
}

impl ServiceKey {
    /// Key for the unnamed provider of `contract`.
    pub fn new(contract: impl Into<TypeDescriptor>) -> Self {
        Self {
            contract: contract.into(),
            service_id: None,
        }
    }

    /// Key for the provider of `contract` named `id`.
    pub fn named(contract: impl Into<TypeDescriptor>, id: impl AsRef<str>) -> Self {
        Self {
            contract: contract.into(),
            service_id: Some(Arc::from(id.as_ref())),
        }
    }

    /// The cache key a descriptor's instances are stored under.
    pub fn of(descriptor: &ServiceDescriptor) -> Self {
        Self {
            contract: descriptor.contract.clone(),
            service_id: descriptor.service_id.clone(),
        }
    }

    /// The contract dimension of the key.
    pub fn contract(&self) -> &TypeDescriptor {
        &self.contract
    }

    /// The contract name for display in diagnostics.
    pub fn display_name(&self) -> &str {
        self.contract.name()
    }

    /// The service id for named keys, or `None` for unnamed keys.
    pub fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }

    /// Whether this key carries a service id.
    pub fn is_named(&self) -> bool {
        self.service_id.is_some()
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.service_id {
            Some(id) => write!(f, "ServiceKey({} @ {})", self.contract.name(), id),
            None => write!(f, "ServiceKey({})", self.contract.name()),
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.service_id {
            Some(id) => write!(f, "{} (id '{}')", self.contract.name(), id),
            None => f.write_str(self.contract.name()),
        }
    }
}

// Discriminated hash so an unnamed key never collides with a named key whose
// id hashes like the empty suffix.
impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.service_id {
            None => {
                0u8.hash(state);
                self.contract.hash(state);
            }
            Some(id) => {
                1u8.hash(state);
                self.contract.hash(state);
                id.hash(state);
            }
        }
    }
}

impl PartialOrd for ServiceKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServiceKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.contract
            .cmp(&other.contract)
            .then_with(|| self.service_id.cmp(&other.service_id))
    }
}
