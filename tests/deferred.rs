/// Tests for deferred dependencies: zero-argument factories resolving
/// against whatever scope is active at call time.

use forge_di::{
    ConstructorRegistry, Container, Deferred, DependencyDescriptor, Lifetime, ResolutionPlan,
    Resolver, ServiceDescriptor, TypeDescriptor,
};
use std::sync::Arc;

struct Target {
    tag: &'static str,
}

struct Holder {
    target: Deferred,
}

fn holder_container(target_lifetime: Lifetime) -> (Container, TypeDescriptor, TypeDescriptor) {
    let target = TypeDescriptor::new("app.Target");
    let holder = TypeDescriptor::new("app.Holder");
    let plan = ResolutionPlan::build(vec![
        ServiceDescriptor::new(target.clone(), target.clone(), target_lifetime),
        ServiceDescriptor::new(holder.clone(), holder.clone(), Lifetime::Singleton)
            .with_dependency(DependencyDescriptor::deferred(target.clone())),
    ])
    .unwrap();

    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Target, _>("app.Target", |_| Ok(Target { tag: "t" }));
    ctors.register::<Holder, _>("app.Holder", |args| {
        Ok(Holder {
            target: args.deferred(0)?,
        })
    });
    (Container::build(plan, ctors).unwrap(), target, holder)
}

#[test]
fn test_deferred_transient_yields_fresh_instances() {
    let (container, _, holder) = holder_container(Lifetime::Transient);
    let resolved = container.resolve::<Holder>(&holder).unwrap().unwrap();

    let a = resolved.target.get_as::<Target>().unwrap();
    let b = resolved.target.get_as::<Target>().unwrap();
    assert_eq!(a.tag, "t");
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn test_deferred_singleton_yields_the_shared_instance() {
    let (container, target, holder) = holder_container(Lifetime::Singleton);
    let resolved = container.resolve::<Holder>(&holder).unwrap().unwrap();

    let via_deferred = resolved.target.get_as::<Target>().unwrap();
    let direct = container.resolve::<Target>(&target).unwrap().unwrap();
    assert!(Arc::ptr_eq(&via_deferred, &direct));
}

#[test]
fn test_deferred_scoped_resolves_against_scope_active_at_call_time() {
    let (container, target, holder) = holder_container(Lifetime::Scoped);
    let ctx = container.new_context();

    // The singleton holder is constructed before any scope exists; its
    // deferred handle must not capture a stale scope.
    let resolved = ctx.resolve::<Holder>(&holder).unwrap().unwrap();

    let scope_a = ctx.begin_scope();
    let a1 = resolved.target.get_as::<Target>().unwrap();
    let a2 = resolved.target.get_as::<Target>().unwrap();
    // Scope-tied: repeated invocation inside one scope hits its cache.
    assert!(Arc::ptr_eq(&a1, &a2));
    let direct_a = ctx.resolve::<Target>(&target).unwrap().unwrap();
    assert!(Arc::ptr_eq(&a1, &direct_a));
    scope_a.dispose();

    let scope_b = ctx.begin_scope();
    let b = resolved.target.get_as::<Target>().unwrap();
    assert!(!Arc::ptr_eq(&a1, &b));
    let direct_b = ctx.resolve::<Target>(&target).unwrap().unwrap();
    assert!(Arc::ptr_eq(&b, &direct_b));
    scope_b.dispose();
}

#[test]
fn test_deferred_honors_its_service_id() {
    struct Router {
        fallback: Deferred,
    }

    let sink = TypeDescriptor::new("app.ISink");
    let router = TypeDescriptor::new("app.Router");
    let plan = ResolutionPlan::build(vec![
        ServiceDescriptor::new(sink.clone(), "app.FileSink", Lifetime::Transient),
        ServiceDescriptor::new(sink.clone(), "app.NullSink", Lifetime::Transient)
            .with_service_id("null"),
        ServiceDescriptor::new(router.clone(), router.clone(), Lifetime::Transient)
            .with_dependency(DependencyDescriptor::deferred(sink.clone()).with_service_id("null")),
    ])
    .unwrap();

    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Target, _>("app.FileSink", |_| Ok(Target { tag: "file" }));
    ctors.register::<Target, _>("app.NullSink", |_| Ok(Target { tag: "null" }));
    ctors.register::<Router, _>("app.Router", |args| {
        Ok(Router {
            fallback: args.deferred(0)?,
        })
    });
    let container = Container::build(plan, ctors).unwrap();

    let resolved = container.resolve::<Router>(&router).unwrap().unwrap();
    assert_eq!(resolved.fallback.service_id(), Some("null"));
    let fallback = resolved.fallback.get_as::<Target>().unwrap();
    assert_eq!(fallback.tag, "null");
}

#[test]
fn test_deferred_exposes_its_contract() {
    let (container, target, holder) = holder_container(Lifetime::Transient);
    let resolved = container.resolve::<Holder>(&holder).unwrap().unwrap();

    assert_eq!(resolved.target.contract(), &target);
    assert_eq!(resolved.target.service_id(), None);
}
