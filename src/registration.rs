//! Constructor registration types.
//!
//! Emission is a downstream collaborator, so the runtime engine receives its
//! constructors directly: one type-erased [`ServiceCtor`] per implementation,
//! invoked with the implementation's resolved dependencies in constructor
//! parameter order.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::deferred::Deferred;
use crate::descriptor::TypeDescriptor;
use crate::error::{DiError, DiResult};

/// Type-erased, thread-safe instance handle.
///
/// Every constructed service is stored and handed out as an `AnyArc`; typed
/// access goes through the downcasting helpers on [`Args`], [`Argument`] and
/// [`Resolver`](crate::Resolver).
pub type AnyArc = Arc<dyn Any + Send + Sync>;

pub(crate) fn downcast<T: Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<T>> {
    any.downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>().to_string()))
}

/// One resolved constructor dependency.
///
/// Eager dependencies arrive as an [`Argument::Instance`]; dependencies
/// declared deferred arrive as an [`Argument::Deferred`] factory handle.
#[derive(Clone)]
pub enum Argument {
    /// An eagerly resolved instance
    Instance(AnyArc),
    /// A zero-argument factory resolving at call time
    Deferred(Deferred),
}

impl Argument {
    /// The eagerly resolved instance, type-erased.
    pub fn instance(&self) -> DiResult<AnyArc> {
        match self {
            Argument::Instance(value) => Ok(value.clone()),
            Argument::Deferred(deferred) => {
                Err(DiError::TypeMismatch(deferred.contract().name().to_string()))
            }
        }
    }

    /// The eagerly resolved instance, downcast to `T`.
    pub fn instance_as<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        downcast(self.instance()?)
    }

    /// The deferred factory handle.
    pub fn deferred(&self) -> DiResult<Deferred> {
        match self {
            Argument::Deferred(deferred) => Ok(deferred.clone()),
            Argument::Instance(_) => {
                Err(DiError::TypeMismatch("deferred argument".to_string()))
            }
        }
    }
}

/// The resolved dependency list handed to a constructor.
///
/// Arguments appear in constructor parameter order, matching the
/// descriptor's dependency order.
///
/// # Examples
///
/// ```rust
/// use forge_di::{Args, DiResult};
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Stamper { clock: Arc<Clock> }
///
/// fn make_stamper(args: Args<'_>) -> DiResult<Stamper> {
///     Ok(Stamper { clock: args.instance_as::<Clock>(0)? })
/// }
/// ```
#[derive(Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Argument],
}

impl<'a> Args<'a> {
    pub(crate) fn new(values: &'a [Argument]) -> Self {
        Self { values }
    }

    /// Number of resolved arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for parameterless constructors.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The argument at `index`.
    pub fn get(&self, index: usize) -> DiResult<&Argument> {
        self.values.get(index).ok_or_else(|| {
            DiError::TypeMismatch(format!("constructor argument {} out of range", index))
        })
    }

    /// The argument at `index`, downcast to `T`.
    pub fn instance_as<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        self.get(index)?.instance_as::<T>()
    }

    /// The argument at `index` as a deferred factory handle.
    pub fn deferred(&self, index: usize) -> DiResult<Deferred> {
        self.get(index)?.deferred()
    }
}

/// Type-erased constructor for one implementation.
pub type ServiceCtor = Arc<dyn for<'a> Fn(Args<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// Registry mapping each implementation to its constructor.
///
/// One constructor per implementation serves every contract the
/// implementation was exported under; the engine resolves the dependency
/// list and invokes the constructor with it.
///
/// # Examples
///
/// ```rust
/// use forge_di::ConstructorRegistry;
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut ctors = ConstructorRegistry::new();
/// ctors.register::<Database, _>("app.Database", |_| {
///     Ok(Database { url: "postgres://localhost".to_string() })
/// });
/// ctors.register::<UserService, _>("app.UserService", |args| {
///     Ok(UserService { db: args.instance_as::<Database>(0)? })
/// });
///
/// assert_eq!(ctors.len(), 2);
/// assert!(ctors.contains(&"app.Database".into()));
/// ```
pub struct ConstructorRegistry {
    ctors: HashMap<TypeDescriptor, ServiceCtor, ahash::RandomState>,
}

impl ConstructorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            ctors: HashMap::default(),
        }
    }

    /// Registers a typed constructor for `implementation`.
    ///
    /// The factory returns the concrete instance; failures propagate
    /// verbatim to the `resolve*` caller and are never cached.
    pub fn register<T, F>(&mut self, implementation: impl Into<TypeDescriptor>, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(Args<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        let ctor: ServiceCtor = Arc::new(move |args| factory(args).map(|value| Arc::new(value) as AnyArc));
        self.ctors.insert(implementation.into(), ctor);
        self
    }

    /// Registers an already type-erased constructor for `implementation`.
    pub fn register_erased(&mut self, implementation: impl Into<TypeDescriptor>, ctor: ServiceCtor) -> &mut Self {
        self.ctors.insert(implementation.into(), ctor);
        self
    }

    /// Whether a constructor is registered for `implementation`.
    pub fn contains(&self, implementation: &TypeDescriptor) -> bool {
        self.ctors.contains_key(implementation)
    }

    pub(crate) fn get(&self, implementation: &TypeDescriptor) -> Option<&ServiceCtor> {
        self.ctors.get(implementation)
    }

    /// Number of registered constructors.
    pub fn len(&self) -> usize {
        self.ctors.len()
    }

    /// True when no constructors are registered.
    pub fn is_empty(&self) -> bool {
        self.ctors.is_empty()
    }
}

impl Default for ConstructorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
