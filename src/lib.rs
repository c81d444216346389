//! # forge-di
//!
//! The dependency-graph resolution and lifetime-caching core for build-time
//! generated dependency-injection containers.
//!
//! A build-time discovery pass feeds this crate normalized service
//! descriptors: contract, implementation, ordered constructor dependencies,
//! lifetime, optional service id. The planner turns that flat set into a
//! conflict-free per-contract [`ResolutionPlan`]; the [`Container`] executes
//! the plan with exact caching and scoping semantics, without runtime type
//! scanning or reflection. Rendering the plan into generated source is a
//! downstream concern and no part of this crate.
//!
//! ## Features
//!
//! - **Deterministic planning**: single, collection, and id-disambiguated
//!   resolution decided once, per contract, at build time
//! - **Fail-fast validation**: duplicate ids, missing providers, and missing
//!   constructors surface as one aggregated failure before any resolution
//! - **Three lifetimes**: Singleton, Scoped, and Transient with
//!   single-winner concurrent caching
//! - **Nestable scopes**: explicit begin/dispose, leak-safe abandonment via
//!   generation-checked weak references
//! - **Deferred dependencies**: zero-argument factories resolving against
//!   the scope active at call time
//! - **Thread-safe**: passive structure, `resolve*` from any thread
//!
//! ## Quick Start
//!
//! ```rust
//! use forge_di::{
//!     ConstructorRegistry, Container, DependencyDescriptor, Lifetime, ResolutionPlan,
//!     Resolver, ServiceDescriptor, TypeDescriptor,
//! };
//! use std::sync::Arc;
//!
//! // Service implementations
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! // Descriptors, normally produced by the discovery collaborator
//! let database = TypeDescriptor::new("app.Database");
//! let users = TypeDescriptor::new("app.UserService");
//!
//! let plan = ResolutionPlan::build(vec![
//!     ServiceDescriptor::new(database.clone(), database.clone(), Lifetime::Singleton),
//!     ServiceDescriptor::new(users.clone(), users.clone(), Lifetime::Transient)
//!         .with_dependency(DependencyDescriptor::new(database.clone())),
//! ]).unwrap();
//!
//! // Constructors, normally rendered by the emission collaborator
//! let mut ctors = ConstructorRegistry::new();
//! ctors.register::<Database, _>("app.Database", |_| {
//!     Ok(Database { connection_string: "postgres://localhost".to_string() })
//! });
//! ctors.register::<UserService, _>("app.UserService", |args| {
//!     Ok(UserService { db: args.instance_as::<Database>(0)? })
//! });
//!
//! // Build and resolve
//! let container = Container::build(plan, ctors).unwrap();
//! let user_service = container.resolve::<UserService>(&users).unwrap().unwrap();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: created once, shared for the container's whole lifetime
//! - **Scoped**: one instance per scope (begin/dispose bounded)
//! - **Transient**: a fresh instance on every resolution
//!
//! ## Named Services
//!
//! Several providers of one contract can coexist when distinguished by id;
//! each follows its own lifetime rule independently.
//!
//! ```rust
//! use forge_di::{
//!     ConstructorRegistry, Container, Lifetime, ResolutionPlan, Resolver,
//!     ServiceDescriptor, TypeDescriptor,
//! };
//!
//! struct Endpoint { port: u16 }
//!
//! let endpoint = TypeDescriptor::new("app.Endpoint");
//! let plan = ResolutionPlan::build(vec![
//!     ServiceDescriptor::new(endpoint.clone(), "app.AdminEndpoint", Lifetime::Singleton)
//!         .with_service_id("admin"),
//!     ServiceDescriptor::new(endpoint.clone(), "app.PublicEndpoint", Lifetime::Singleton)
//!         .with_service_id("public"),
//! ]).unwrap();
//!
//! let mut ctors = ConstructorRegistry::new();
//! ctors.register::<Endpoint, _>("app.AdminEndpoint", |_| Ok(Endpoint { port: 9443 }));
//! ctors.register::<Endpoint, _>("app.PublicEndpoint", |_| Ok(Endpoint { port: 443 }));
//!
//! let container = Container::build(plan, ctors).unwrap();
//!
//! let admin = container.resolve_named::<Endpoint>(&endpoint, "admin").unwrap().unwrap();
//! let public = container.resolve_named::<Endpoint>(&endpoint, "public").unwrap().unwrap();
//! assert_eq!((admin.port, public.port), (9443, 443));
//!
//! // No unnamed provider exists, so unqualified resolution yields nothing.
//! assert!(container.resolve::<Endpoint>(&endpoint).unwrap().is_none());
//! ```
//!
//! ## Scoped Services
//!
//! ```rust
//! use forge_di::{
//!     ConstructorRegistry, Container, Lifetime, ResolutionPlan, Resolver,
//!     ServiceDescriptor, TypeDescriptor,
//! };
//! use std::sync::Arc;
//!
//! struct RequestId(u64);
//!
//! let request_id = TypeDescriptor::new("app.RequestId");
//! let plan = ResolutionPlan::build(vec![
//!     ServiceDescriptor::new(request_id.clone(), request_id.clone(), Lifetime::Scoped),
//! ]).unwrap();
//!
//! let mut ctors = ConstructorRegistry::new();
//! ctors.register::<RequestId, _>("app.RequestId", |_| Ok(RequestId(42)));
//!
//! let container = Container::build(plan, ctors).unwrap();
//! let ctx = container.new_context();
//!
//! let scope = ctx.begin_scope();
//! let a = ctx.resolve::<RequestId>(&request_id).unwrap().unwrap();
//! let b = ctx.resolve::<RequestId>(&request_id).unwrap().unwrap();
//! assert!(Arc::ptr_eq(&a, &b)); // same instance within the scope
//! scope.dispose();
//!
//! let scope2 = ctx.begin_scope();
//! let c = ctx.resolve::<RequestId>(&request_id).unwrap().unwrap();
//! assert!(!Arc::ptr_eq(&a, &c)); // a new scope starts empty
//! scope2.dispose();
//! ```

// Module declarations
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod plan;
pub mod provider;
pub mod registration;
pub mod traits;

mod deferred;

// Internal modules
mod internal;

// Re-export core types
pub use deferred::Deferred;
pub use descriptor::{DependencyDescriptor, ServiceDescriptor, TypeDescriptor};
pub use discovery::{
    build_descriptors, module_facts, ConstructorDeclaration, ExportArguments, ModuleFacts,
    RawDeclaration, RawParameter,
};
pub use error::{ConfigError, ConfigErrors, DiError, DiResult};
pub use key::ServiceKey;
pub use lifetime::Lifetime;
pub use observer::{DiObserver, LoggingObserver, Observers};
pub use plan::{ContractGroup, ContractPlan, ProviderMode, ResolutionPlan};
pub use provider::{CallContext, Container, ScopeHandle};
pub use registration::{AnyArc, Args, Argument, ConstructorRegistry, ServiceCtor};
pub use traits::{Resolver, ResolverCore};
