//! Deferred dependency handles.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::error::{DiError, DiResult};
use crate::provider::CallContext;
use crate::registration::{downcast, AnyArc};

/// A zero-argument factory for a constructor dependency declared deferred.
///
/// Instead of an eagerly resolved instance, the consuming constructor
/// receives a `Deferred` handle. Invoking it performs the resolution,
/// honoring the dependency's own service id and lifetime, against whatever
/// scope is active in the originating call context *at call time*, not at
/// construction time. That lets a Singleton safely hold an indirection to a
/// Scoped dependency without capturing a stale scope.
///
/// The handle is cheap to clone and can be invoked any number of times; a
/// Transient target yields a fresh instance per call.
///
/// # Examples
///
/// ```rust
/// use forge_di::{
///     ConstructorRegistry, Container, Deferred, DependencyDescriptor, Lifetime,
///     ResolutionPlan, Resolver, ServiceDescriptor, TypeDescriptor,
/// };
/// use std::sync::Arc;
///
/// struct Ticket;
/// struct Dispenser { tickets: Deferred }
///
/// let ticket = TypeDescriptor::new("app.Ticket");
/// let dispenser = TypeDescriptor::new("app.Dispenser");
///
/// let plan = ResolutionPlan::build(vec![
///     ServiceDescriptor::new(ticket.clone(), ticket.clone(), Lifetime::Transient),
///     ServiceDescriptor::new(dispenser.clone(), dispenser.clone(), Lifetime::Singleton)
///         .with_dependency(DependencyDescriptor::deferred(ticket.clone())),
/// ]).unwrap();
///
/// let mut ctors = ConstructorRegistry::new();
/// ctors.register::<Ticket, _>("app.Ticket", |_| Ok(Ticket));
/// ctors.register::<Dispenser, _>("app.Dispenser", |args| {
///     Ok(Dispenser { tickets: args.deferred(0)? })
/// });
///
/// let container = Container::build(plan, ctors).unwrap();
/// let d = container.resolve::<Dispenser>(&dispenser).unwrap().unwrap();
///
/// // A Transient target constructs fresh on every invocation.
/// let a = d.tickets.get_as::<Ticket>().unwrap();
/// let b = d.tickets.get_as::<Ticket>().unwrap();
/// assert!(!Arc::ptr_eq(&a, &b));
/// ```
#[derive(Clone)]
pub struct Deferred {
    ctx: CallContext,
    contract: TypeDescriptor,
    service_id: Option<Arc<str>>,
}

impl Deferred {
    pub(crate) fn new(
        ctx: CallContext,
        contract: TypeDescriptor,
        service_id: Option<Arc<str>>,
    ) -> Self {
        Self {
            ctx,
            contract,
            service_id,
        }
    }

    /// The contract this handle resolves.
    pub fn contract(&self) -> &TypeDescriptor {
        &self.contract
    }

    /// The service id this handle resolves by, if any.
    pub fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }

    /// Resolves the dependency now, type-erased.
    ///
    /// Plan validation guarantees a provider exists; the only way to come up
    /// empty is single-value consumption of a Collection-mode contract,
    /// which surfaces as [`DiError::Ambiguous`].
    pub fn get(&self) -> DiResult<AnyArc> {
        self.ctx
            .resolve_single(&self.contract, self.service_id.as_deref())?
            .ok_or_else(|| DiError::Ambiguous(self.contract.name().to_string()))
    }

    /// Resolves the dependency now, downcast to `T`.
    pub fn get_as<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        downcast(self.get()?)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.service_id {
            Some(id) => write!(f, "Deferred({} @ {})", self.contract.name(), id),
            None => write!(f, "Deferred({})", self.contract.name()),
        }
    }
}
