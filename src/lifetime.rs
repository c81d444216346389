//! Service lifetime definitions.

/// Service lifetimes controlling instance caching behavior
///
/// Defines how service instances are created, cached, and shared by a
/// container synthesized from a [`ResolutionPlan`](crate::ResolutionPlan).
/// Each lifetime has different identity and memory characteristics.
///
/// # Lifetime Characteristics
///
/// - **Singleton**: one instance per container, cached in the process-wide cache
/// - **Scoped**: one instance per scope, cached in the active scope's cache
/// - **Transient**: a fresh instance per resolution, never cached
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
/// struct Repository { db: Arc<Database> }
///
/// let database = TypeDescriptor::new("app.Database");
/// let repository = TypeDescriptor::new("app.Repository");
///
/// let plan = ResolutionPlan::build(vec![
///     // Singleton: one instance for the entire container
///     ServiceDescriptor::new(database.clone(), database.clone(), Lifetime::Singleton),
///     // Scoped: one instance per scope
///     ServiceDescriptor::new(repository.clone(), repository.clone(), Lifetime::Scoped)
///         .with_dependency(DependencyDescriptor::new(database.clone())),
/// ]).unwrap();
///
/// let mut ctors = ConstructorRegistry::new();
/// ctors.register::<Database, _>("app.Database", |_| {
///     Ok(Database { url: "postgres://localhost".to_string() })
/// });
/// ctors.register::<Repository, _>("app.Repository", |args| {
///     Ok(Repository { db: args.instance_as::<Database>(0)? })
/// });
///
/// let container = Container::build(plan, ctors).unwrap();
/// let ctx = container.new_context();
///
/// // Singleton: same instance across scopes
/// let db1 = container.resolve::<Database>(&database).unwrap().unwrap();
/// let scope = ctx.begin_scope();
/// let db2 = ctx.resolve::<Database>(&database).unwrap().unwrap();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// // Scoped: same within a scope, different across scopes
/// let repo1a = ctx.resolve::<Repository>(&repository).unwrap().unwrap();
/// let repo1b = ctx.resolve::<Repository>(&repository).unwrap().unwrap();
/// assert!(Arc::ptr_eq(&repo1a, &repo1b));
/// scope.dispose();
///
/// let scope2 = ctx.begin_scope();
/// let repo2 = ctx.resolve::<Repository>(&repository).unwrap().unwrap();
/// assert!(!Arc::ptr_eq(&repo1a, &repo2));
/// scope2.dispose();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifetime {
    /// Single instance per container, cached forever
    ///
    /// Singleton services are created once when first requested and then
    /// cached in the process-wide cache. The same instance is shared across
    /// all scopes and threads. Under a concurrent race exactly one
    /// constructed instance wins; losing constructions are discarded.
    Singleton,
    /// Single instance per scope, cached for the scope's lifetime
    ///
    /// Scoped services are created once per scope when first requested
    /// within that scope. A fresh scope never inherits entries from the
    /// scope that encloses it. Resolutions outside any begun scope cache
    /// into the root scope, which lives as long as the container.
    Scoped,
    /// New instance per resolution, never cached
    ///
    /// Transient services construct a fresh instance every time they are
    /// requested, recursively resolving each dependency according to that
    /// dependency's own lifetime. The instance is owned solely by the
    /// immediate caller.
    Transient,
}
