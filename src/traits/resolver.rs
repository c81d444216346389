//! Resolver traits for service resolution.

use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::error::DiResult;
use crate::registration::{downcast, AnyArc};

/// Core resolver trait for object-safe, type-erased resolution.
///
/// This is the low-level seam between the resolution engine and its
/// consumers: everything is requested by contract descriptor and comes back
/// type-erased. Most users should use [`Resolver`], which adds typed
/// wrappers on top.
///
/// "No provider" outcomes are values, not errors: `Ok(None)` (or an empty
/// vector) is returned for an unregistered contract, an unknown id, or
/// single-value consumption of a Collection-mode contract, so callers may
/// probe speculatively for optional services.
pub trait ResolverCore: Send + Sync {
    /// Resolves the single unnamed provider of `contract`, if there is one.
    fn resolve_dyn(&self, contract: &TypeDescriptor) -> DiResult<Option<AnyArc>>;

    /// Resolves every unnamed provider of `contract`, in plan order.
    fn resolve_many_dyn(&self, contract: &TypeDescriptor) -> DiResult<Vec<AnyArc>>;

    /// Resolves the provider of `contract` registered under `id`, if any.
    fn resolve_named_dyn(&self, contract: &TypeDescriptor, id: &str) -> DiResult<Option<AnyArc>>;
}

/// High-level resolver interface with typed, downcasting methods.
///
/// Implemented by [`Container`](crate::Container) and
/// [`CallContext`](crate::CallContext), making them interchangeable for
/// resolution within their respective contexts.
///
/// # Examples
///
/// ```rust
/// use forge_di::{
///     ConstructorRegistry, Container, Lifetime, ResolutionPlan, Resolver,
///     ServiceDescriptor, TypeDescriptor,
/// };
///
/// struct Greeter { greeting: String }
///
/// let greeter = TypeDescriptor::new("app.Greeter");
/// let plan = ResolutionPlan::build(vec![
///     ServiceDescriptor::new(greeter.clone(), greeter.clone(), Lifetime::Singleton),
/// ]).unwrap();
/// let mut ctors = ConstructorRegistry::new();
/// ctors.register::<Greeter, _>("app.Greeter", |_| {
///     Ok(Greeter { greeting: "hello".to_string() })
/// });
/// let container = Container::build(plan, ctors).unwrap();
///
/// let resolved = container.resolve::<Greeter>(&greeter).unwrap().unwrap();
/// assert_eq!(resolved.greeting, "hello");
///
/// // Probing an unregistered contract is a None outcome, not an error.
/// let missing = container.resolve::<Greeter>(&TypeDescriptor::new("app.Absent")).unwrap();
/// assert!(missing.is_none());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves the single unnamed provider of `contract` as `T`.
    ///
    /// Returns `Ok(None)` when the contract is unregistered, has only named
    /// providers, or is Collection-mode (ambiguity is never auto-resolved).
    fn resolve<T: Send + Sync + 'static>(
        &self,
        contract: &TypeDescriptor,
    ) -> DiResult<Option<Arc<T>>> {
        self.resolve_dyn(contract)?.map(downcast::<T>).transpose()
    }

    /// Resolves every unnamed provider of `contract` as `T`, in plan order.
    ///
    /// A Single-mode contract yields a one-element sequence; a contract with
    /// no unnamed providers yields an empty one.
    fn resolve_many<T: Send + Sync + 'static>(
        &self,
        contract: &TypeDescriptor,
    ) -> DiResult<Vec<Arc<T>>> {
        self.resolve_many_dyn(contract)?
            .into_iter()
            .map(downcast::<T>)
            .collect()
    }

    /// Resolves the provider of `contract` registered under `id` as `T`.
    ///
    /// Returns `Ok(None)` for an unknown id.
    fn resolve_named<T: Send + Sync + 'static>(
        &self,
        contract: &TypeDescriptor,
        id: &str,
    ) -> DiResult<Option<Arc<T>>> {
        self.resolve_named_dyn(contract, id)?
            .map(downcast::<T>)
            .transpose()
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
