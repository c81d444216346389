//! Container facade and resolution engine.
//!
//! This module contains the [`Container`] type composing the resolution
//! plan, the constructor registry, the lifetime caches and the scope
//! machinery, plus the engine that executes the plan on every `resolve*`
//! call.

use std::collections::HashSet;
use std::time::Instant;

use smallvec::SmallVec;
use std::sync::Arc;

use crate::deferred::Deferred;
use crate::descriptor::{DependencyDescriptor, ServiceDescriptor, TypeDescriptor, DEPS_INLINE};
use crate::error::{ConfigError, ConfigErrors, DiError, DiResult};
use crate::internal::InstanceCache;
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;
use crate::observer::Observers;
use crate::plan::ResolutionPlan;
use crate::registration::{AnyArc, Args, Argument, ConstructorRegistry};
use crate::traits::ResolverCore;

mod context;
mod scope;

pub use context::{CallContext, ScopeHandle};
use scope::{ScopeArena, ScopeState};

/// The synthesized dependency-injection container.
///
/// A `Container` is built once from a validated [`ResolutionPlan`] and a
/// [`ConstructorRegistry`], and is thereafter a passive, thread-safe
/// structure: `resolve*` may be invoked concurrently from any number of
/// threads. It owns the process-wide singleton cache and the root scope,
/// both alive for the container's whole lifetime.
///
/// Consumers request instances by contract (optionally by id) and never
/// construct service types directly. "Not registered" is a `None`/empty
/// outcome rather than an error, so optional services can be probed
/// speculatively.
///
/// The container's own `resolve*` methods run against an internal root
/// context; callers that begin scopes should create their own logical
/// context with [`Container::new_context`].
///
/// # Examples
///
/// ```rust
/// use forge_di::{
///     ConstructorRegistry, Container, DependencyDescriptor, Lifetime, ResolutionPlan,
///     Resolver, ServiceDescriptor, TypeDescriptor,
/// };
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let database = TypeDescriptor::new("app.Database");
/// let users = TypeDescriptor::new("app.UserService");
///
/// let plan = ResolutionPlan::build(vec![
///     ServiceDescriptor::new(database.clone(), database.clone(), Lifetime::Singleton),
///     ServiceDescriptor::new(users.clone(), users.clone(), Lifetime::Transient)
///         .with_dependency(DependencyDescriptor::new(database.clone())),
/// ]).unwrap();
///
/// let mut ctors = ConstructorRegistry::new();
/// ctors.register::<Database, _>("app.Database", |_| {
///     Ok(Database { url: "postgres://localhost".to_string() })
/// });
/// ctors.register::<UserService, _>("app.UserService", |args| {
///     Ok(UserService { db: args.instance_as::<Database>(0)? })
/// });
///
/// let container = Container::build(plan, ctors).unwrap();
/// let service = container.resolve::<UserService>(&users).unwrap().unwrap();
/// assert_eq!(service.db.url, "postgres://localhost");
/// ```
pub struct Container {
    core: Arc<ContainerCore>,
    root_ctx: CallContext,
}

pub(crate) struct ContainerCore {
    pub(crate) plan: ResolutionPlan,
    pub(crate) ctors: ConstructorRegistry,
    pub(crate) singletons: InstanceCache,
    pub(crate) root: Arc<ScopeState>,
    pub(crate) arena: ScopeArena,
    pub(crate) observers: Observers,
}

impl Container {
    /// Builds a container from a plan and its constructors.
    ///
    /// Fails fast, aggregated, if any implementation named by the plan has
    /// no registered constructor, the same boundary at which the planner
    /// reports its own configuration errors.
    pub fn build(plan: ResolutionPlan, ctors: ConstructorRegistry) -> Result<Self, ConfigErrors> {
        Self::build_with_observers(plan, ctors, Observers::new())
    }

    /// Builds a container with diagnostic observers attached.
    pub fn build_with_observers(
        plan: ResolutionPlan,
        ctors: ConstructorRegistry,
        observers: Observers,
    ) -> Result<Self, ConfigErrors> {
        let mut errors = Vec::new();
        let mut checked: HashSet<&TypeDescriptor, ahash::RandomState> = HashSet::default();
        for provider in plan.all_providers() {
            if checked.insert(&provider.implementation) && !ctors.contains(&provider.implementation)
            {
                errors.push(ConfigError::MissingConstructor {
                    implementation: provider.implementation.name().to_string(),
                });
            }
        }
        if !errors.is_empty() {
            return Err(ConfigErrors::new(errors));
        }

        let core = Arc::new(ContainerCore {
            plan,
            ctors,
            singletons: InstanceCache::new(),
            root: Arc::new(ScopeState::root()),
            arena: ScopeArena::new(),
            observers,
        });
        let root_ctx = CallContext::new(core.clone());
        Ok(Self { core, root_ctx })
    }

    /// Creates a fresh, isolated logical call context.
    pub fn new_context(&self) -> CallContext {
        CallContext::new(self.core.clone())
    }

    /// The container's own root context.
    pub fn root_context(&self) -> &CallContext {
        &self.root_ctx
    }

    /// Begins a scope on the root context.
    pub fn begin_scope(&self) -> ScopeHandle {
        self.root_ctx.begin_scope()
    }

    /// The plan this container executes.
    pub fn plan(&self) -> &ResolutionPlan {
        &self.core.plan
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        let mut plans: Vec<_> = self.core.plan.contracts().collect();
        plans.sort_by(|a, b| a.contract().cmp(b.contract()));
        for plan in plans {
            s.push_str(&format!("{} [{:?}]\n", plan.contract(), plan.mode()));
            for provider in plan.unnamed_providers() {
                s.push_str(&format!("  {} ({:?})\n", provider.implementation, provider.lifetime));
            }
            for (id, provider) in plan.named_providers() {
                s.push_str(&format!("  {} @ {} ({:?})\n", provider.implementation, id, provider.lifetime));
            }
        }
        s
    }
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            root_ctx: self.root_ctx.clone(),
        }
    }
}

impl ResolverCore for Container {
    fn resolve_dyn(&self, contract: &TypeDescriptor) -> DiResult<Option<AnyArc>> {
        self.root_ctx.resolve_dyn(contract)
    }

    fn resolve_many_dyn(&self, contract: &TypeDescriptor) -> DiResult<Vec<AnyArc>> {
        self.root_ctx.resolve_many_dyn(contract)
    }

    fn resolve_named_dyn(&self, contract: &TypeDescriptor, id: &str) -> DiResult<Option<AnyArc>> {
        self.root_ctx.resolve_named_dyn(contract, id)
    }
}

impl ResolverCore for CallContext {
    fn resolve_dyn(&self, contract: &TypeDescriptor) -> DiResult<Option<AnyArc>> {
        self.resolve_single(contract, None)
    }

    fn resolve_many_dyn(&self, contract: &TypeDescriptor) -> DiResult<Vec<AnyArc>> {
        self.resolve_all(contract)
    }

    fn resolve_named_dyn(&self, contract: &TypeDescriptor, id: &str) -> DiResult<Option<AnyArc>> {
        self.resolve_single(contract, Some(id))
    }
}

// ===== Resolution engine =====

impl CallContext {
    /// Single-value resolution: the unnamed provider of a Single-mode
    /// contract, or the named provider under `id`. Everything else is a
    /// defined empty outcome.
    pub(crate) fn resolve_single(
        &self,
        contract: &TypeDescriptor,
        id: Option<&str>,
    ) -> DiResult<Option<AnyArc>> {
        let Some(plan) = self.core.plan.contract_plan(contract) else {
            return Ok(None);
        };
        let descriptor = match id {
            Some(id) => plan.named(id),
            None => plan.single(),
        };
        match descriptor {
            Some(descriptor) => self.instantiate(descriptor).map(Some),
            None => Ok(None),
        }
    }

    /// Collection resolution: every unnamed provider in plan order.
    pub(crate) fn resolve_all(&self, contract: &TypeDescriptor) -> DiResult<Vec<AnyArc>> {
        let Some(plan) = self.core.plan.contract_plan(contract) else {
            return Ok(Vec::new());
        };
        let providers = plan.unnamed_providers();
        let mut instances = Vec::with_capacity(providers.len());
        for descriptor in providers {
            instances.push(self.instantiate(descriptor)?);
        }
        Ok(instances)
    }

    fn instantiate(&self, descriptor: &ServiceDescriptor) -> DiResult<AnyArc> {
        let key = ServiceKey::of(descriptor);
        if self.core.observers.has_observers() {
            let start = Instant::now();
            self.core.observers.resolving(&key);
            let result = self.instantiate_inner(descriptor, &key);
            match &result {
                Ok(_) => self.core.observers.resolved(&key, start.elapsed()),
                Err(error) => self
                    .core
                    .observers
                    .construction_failed(&key, &error.to_string()),
            }
            result
        } else {
            self.instantiate_inner(descriptor, &key)
        }
    }

    fn instantiate_inner(&self, descriptor: &ServiceDescriptor, key: &ServiceKey) -> DiResult<AnyArc> {
        match descriptor.lifetime {
            Lifetime::Transient => self.construct(descriptor),
            Lifetime::Singleton => self
                .core
                .singletons
                .get_or_create(key, || self.construct(descriptor)),
            Lifetime::Scoped => {
                let scope = self.active_scope();
                scope.cache.get_or_create(key, || self.construct(descriptor))
            }
        }
    }

    fn construct(&self, descriptor: &ServiceDescriptor) -> DiResult<AnyArc> {
        let mut arguments: SmallVec<[Argument; DEPS_INLINE]> =
            SmallVec::with_capacity(descriptor.dependencies.len());
        for dependency in &descriptor.dependencies {
            arguments.push(self.resolve_dependency(dependency)?);
        }
        let ctor = self
            .core
            .ctors
            .get(&descriptor.implementation)
            .ok_or_else(|| DiError::Construction {
                implementation: descriptor.implementation.name().to_string(),
                message: "no constructor registered".to_string(),
            })?;
        (ctor)(Args::new(&arguments))
    }

    fn resolve_dependency(&self, dependency: &DependencyDescriptor) -> DiResult<Argument> {
        if dependency.deferred {
            return Ok(Argument::Deferred(Deferred::new(
                self.clone(),
                dependency.contract.clone(),
                dependency.service_id.clone(),
            )));
        }
        match self.resolve_single(&dependency.contract, dependency.service_id())? {
            Some(instance) => Ok(Argument::Instance(instance)),
            // Plan validation guarantees a provider exists, so an empty
            // single-value result here means Collection-mode ambiguity.
            None => Err(DiError::Ambiguous(dependency.contract.name().to_string())),
        }
    }
}
