use forge_di::{
    ConstructorRegistry, Container, DependencyDescriptor, DiError, Lifetime, ResolutionPlan,
    Resolver, ServiceDescriptor, TypeDescriptor,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct Sink {
    tag: &'static str,
}

#[test]
fn test_single_provider_with_dependencies() {
    #[derive(Debug)]
    struct Config {
        port: u16,
    }

    #[derive(Debug)]
    struct Server {
        config: Arc<Config>,
        name: String,
    }

    let config = TypeDescriptor::new("app.Config");
    let server = TypeDescriptor::new("app.Server");

    let plan = ResolutionPlan::build(vec![
        ServiceDescriptor::new(config.clone(), config.clone(), Lifetime::Singleton),
        ServiceDescriptor::new(server.clone(), server.clone(), Lifetime::Singleton)
            .with_dependency(DependencyDescriptor::new(config.clone())),
    ])
    .unwrap();

    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Config, _>("app.Config", |_| Ok(Config { port: 8080 }));
    ctors.register::<Server, _>("app.Server", |args| {
        Ok(Server {
            config: args.instance_as::<Config>(0)?,
            name: "MyServer".to_string(),
        })
    });

    let container = Container::build(plan, ctors).unwrap();
    let resolved = container.resolve::<Server>(&server).unwrap().unwrap();

    assert_eq!(resolved.config.port, 8080);
    assert_eq!(resolved.name, "MyServer");
}

#[test]
fn test_collection_resolution_returns_all_in_plan_order() {
    let sink = TypeDescriptor::new("app.ISink");
    let plan = ResolutionPlan::build(vec![
        ServiceDescriptor::new(sink.clone(), "app.FileSink", Lifetime::Transient).with_module("storage"),
        ServiceDescriptor::new(sink.clone(), "app.NetSink", Lifetime::Transient).with_module("net"),
        ServiceDescriptor::new(sink.clone(), "app.AuditSink", Lifetime::Transient).with_module("net"),
    ])
    .unwrap();

    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Sink, _>("app.FileSink", |_| Ok(Sink { tag: "file" }));
    ctors.register::<Sink, _>("app.NetSink", |_| Ok(Sink { tag: "net" }));
    ctors.register::<Sink, _>("app.AuditSink", |_| Ok(Sink { tag: "audit" }));

    let container = Container::build(plan, ctors).unwrap();

    let sinks = container.resolve_many::<Sink>(&sink).unwrap();
    let tags: Vec<_> = sinks.iter().map(|s| s.tag).collect();
    assert_eq!(tags, ["net", "audit", "file"]);

    // Single-value consumption of a Collection contract yields nothing.
    assert!(container.resolve::<Sink>(&sink).unwrap().is_none());
}

#[test]
fn test_single_mode_resolve_many_is_one_element() {
    let sink = TypeDescriptor::new("app.ISink");
    let plan = ResolutionPlan::build(vec![ServiceDescriptor::new(
        sink.clone(),
        "app.FileSink",
        Lifetime::Transient,
    )])
    .unwrap();
    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Sink, _>("app.FileSink", |_| Ok(Sink { tag: "file" }));
    let container = Container::build(plan, ctors).unwrap();

    let sinks = container.resolve_many::<Sink>(&sink).unwrap();
    assert_eq!(sinks.len(), 1);
    assert_eq!(sinks[0].tag, "file");

    // The sole provider serves single-value consumption too.
    let single = container.resolve::<Sink>(&sink).unwrap().unwrap();
    assert_eq!(single.tag, "file");
}

#[test]
fn test_named_only_contract() {
    let sink = TypeDescriptor::new("app.ISink");
    let plan = ResolutionPlan::build(vec![
        ServiceDescriptor::new(sink.clone(), "app.FileSink", Lifetime::Transient)
            .with_service_id("file"),
    ])
    .unwrap();
    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Sink, _>("app.FileSink", |_| Ok(Sink { tag: "file" }));
    let container = Container::build(plan, ctors).unwrap();

    // Only resolve_named succeeds.
    assert!(container.resolve::<Sink>(&sink).unwrap().is_none());
    assert!(container.resolve_many::<Sink>(&sink).unwrap().is_empty());
    let named = container.resolve_named::<Sink>(&sink, "file").unwrap().unwrap();
    assert_eq!(named.tag, "file");

    // Unknown id is a None outcome, not an error.
    assert!(container.resolve_named::<Sink>(&sink, "net").unwrap().is_none());
}

#[test]
fn test_named_providers_follow_lifetimes_independently() {
    let endpoint = TypeDescriptor::new("app.IEndpoint");
    let plan = ResolutionPlan::build(vec![
        ServiceDescriptor::new(endpoint.clone(), "app.AdminEndpoint", Lifetime::Singleton)
            .with_service_id("1"),
        ServiceDescriptor::new(endpoint.clone(), "app.PublicEndpoint", Lifetime::Singleton)
            .with_service_id("2"),
    ])
    .unwrap();

    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Sink, _>("app.AdminEndpoint", |_| Ok(Sink { tag: "admin" }));
    ctors.register::<Sink, _>("app.PublicEndpoint", |_| Ok(Sink { tag: "public" }));
    let container = Container::build(plan, ctors).unwrap();

    let one_a = container.resolve_named::<Sink>(&endpoint, "1").unwrap().unwrap();
    let one_b = container.resolve_named::<Sink>(&endpoint, "1").unwrap().unwrap();
    let two = container.resolve_named::<Sink>(&endpoint, "2").unwrap().unwrap();

    // Distinct instances per id, independent per-id singleton caching.
    assert!(!Arc::ptr_eq(&one_a, &two));
    assert!(Arc::ptr_eq(&one_a, &one_b));
    assert_eq!((one_a.tag, two.tag), ("admin", "public"));
}

#[test]
fn test_construction_failure_propagates_and_is_never_cached() {
    let attempts = Arc::new(AtomicU32::new(0));
    let attempts_clone = attempts.clone();

    let flaky = TypeDescriptor::new("app.Flaky");
    let plan = ResolutionPlan::build(vec![ServiceDescriptor::new(
        flaky.clone(),
        flaky.clone(),
        Lifetime::Singleton,
    )])
    .unwrap();

    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Sink, _>("app.Flaky", move |_| {
        if attempts_clone.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(DiError::Construction {
                implementation: "app.Flaky".to_string(),
                message: "first attempt fails".to_string(),
            })
        } else {
            Ok(Sink { tag: "ok" })
        }
    });
    let container = Container::build(plan, ctors).unwrap();

    // The failure reaches the caller verbatim.
    let error = container.resolve::<Sink>(&flaky).unwrap_err();
    assert!(matches!(error, DiError::Construction { .. }));

    // No poisoned slot: the retry constructs and the result is cached.
    let first = container.resolve::<Sink>(&flaky).unwrap().unwrap();
    let second = container.resolve::<Sink>(&flaky).unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_ambiguous_dependency_is_an_error() {
    #[derive(Debug)]
    struct Worker {
        #[allow(dead_code)]
        sink: Arc<Sink>,
    }

    let sink = TypeDescriptor::new("app.ISink");
    let worker = TypeDescriptor::new("app.Worker");
    let plan = ResolutionPlan::build(vec![
        ServiceDescriptor::new(sink.clone(), "app.FileSink", Lifetime::Transient),
        ServiceDescriptor::new(sink.clone(), "app.NetSink", Lifetime::Transient),
        ServiceDescriptor::new(worker.clone(), worker.clone(), Lifetime::Transient)
            .with_dependency(DependencyDescriptor::new(sink.clone())),
    ])
    .unwrap();

    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Sink, _>("app.FileSink", |_| Ok(Sink { tag: "file" }));
    ctors.register::<Sink, _>("app.NetSink", |_| Ok(Sink { tag: "net" }));
    ctors.register::<Worker, _>("app.Worker", |args| {
        Ok(Worker {
            sink: args.instance_as::<Sink>(0)?,
        })
    });
    let container = Container::build(plan, ctors).unwrap();

    // A top-level probe is a defined None; a constructor dependency cannot
    // be left unsatisfied, so it surfaces as an error.
    let error = container.resolve::<Worker>(&worker).unwrap_err();
    assert!(matches!(error, DiError::Ambiguous(name) if name == "app.ISink"));
}

#[test]
fn test_keyed_dependency_selects_named_provider() {
    struct Worker {
        sink: Arc<Sink>,
    }

    let sink = TypeDescriptor::new("app.ISink");
    let worker = TypeDescriptor::new("app.Worker");
    let plan = ResolutionPlan::build(vec![
        ServiceDescriptor::new(sink.clone(), "app.FileSink", Lifetime::Transient),
        ServiceDescriptor::new(sink.clone(), "app.AuditSink", Lifetime::Transient)
            .with_service_id("audit"),
        ServiceDescriptor::new(worker.clone(), worker.clone(), Lifetime::Transient)
            .with_dependency(DependencyDescriptor::new(sink.clone()).with_service_id("audit")),
    ])
    .unwrap();

    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Sink, _>("app.FileSink", |_| Ok(Sink { tag: "file" }));
    ctors.register::<Sink, _>("app.AuditSink", |_| Ok(Sink { tag: "audit" }));
    ctors.register::<Worker, _>("app.Worker", |args| {
        Ok(Worker {
            sink: args.instance_as::<Sink>(0)?,
        })
    });
    let container = Container::build(plan, ctors).unwrap();

    let resolved = container.resolve::<Worker>(&worker).unwrap().unwrap();
    assert_eq!(resolved.sink.tag, "audit");
}

#[test]
fn test_complex_dependency_graph_shares_singletons() {
    struct A {
        value: i32,
    }
    struct B {
        a: Arc<A>,
    }
    struct C {
        a: Arc<A>,
        b: Arc<B>,
    }

    let a = TypeDescriptor::new("app.A");
    let b = TypeDescriptor::new("app.B");
    let c = TypeDescriptor::new("app.C");
    let plan = ResolutionPlan::build(vec![
        ServiceDescriptor::new(a.clone(), a.clone(), Lifetime::Singleton),
        ServiceDescriptor::new(b.clone(), b.clone(), Lifetime::Singleton)
            .with_dependency(DependencyDescriptor::new(a.clone())),
        ServiceDescriptor::new(c.clone(), c.clone(), Lifetime::Singleton)
            .with_dependencies([
                DependencyDescriptor::new(a.clone()),
                DependencyDescriptor::new(b.clone()),
            ]),
    ])
    .unwrap();

    let mut ctors = ConstructorRegistry::new();
    ctors.register::<A, _>("app.A", |_| Ok(A { value: 100 }));
    ctors.register::<B, _>("app.B", |args| Ok(B { a: args.instance_as::<A>(0)? }));
    ctors.register::<C, _>("app.C", |args| {
        Ok(C {
            a: args.instance_as::<A>(0)?,
            b: args.instance_as::<B>(1)?,
        })
    });
    let container = Container::build(plan, ctors).unwrap();

    let resolved = container.resolve::<C>(&c).unwrap().unwrap();
    assert_eq!(resolved.a.value, 100);
    assert_eq!(resolved.b.a.value, 100);
    // A is a singleton, so both paths see the same instance.
    assert!(Arc::ptr_eq(&resolved.a, &resolved.b.a));
}

#[test]
fn test_transient_constructs_every_time() {
    let counter = Arc::new(Mutex::new(0));
    let counter_clone = counter.clone();

    let stamp = TypeDescriptor::new("app.Stamp");
    let plan = ResolutionPlan::build(vec![ServiceDescriptor::new(
        stamp.clone(),
        stamp.clone(),
        Lifetime::Transient,
    )])
    .unwrap();
    let mut ctors = ConstructorRegistry::new();
    ctors.register::<String, _>("app.Stamp", move |_| {
        let mut c = counter_clone.lock().unwrap();
        *c += 1;
        Ok(format!("instance-{}", *c))
    });
    let container = Container::build(plan, ctors).unwrap();

    let a = container.resolve::<String>(&stamp).unwrap().unwrap();
    let b = container.resolve::<String>(&stamp).unwrap().unwrap();
    let c = container.resolve::<String>(&stamp).unwrap().unwrap();

    assert_eq!(*a, "instance-1");
    assert_eq!(*b, "instance-2");
    assert_eq!(*c, "instance-3");
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&b, &c));
}

#[test]
fn test_type_mismatch_on_wrong_downcast() {
    let answer = TypeDescriptor::new("app.Answer");
    let plan = ResolutionPlan::build(vec![ServiceDescriptor::new(
        answer.clone(),
        answer.clone(),
        Lifetime::Singleton,
    )])
    .unwrap();
    let mut ctors = ConstructorRegistry::new();
    ctors.register::<usize, _>("app.Answer", |_| Ok(42usize));
    let container = Container::build(plan, ctors).unwrap();

    let error = container.resolve::<String>(&answer).unwrap_err();
    assert!(matches!(error, DiError::TypeMismatch(_)));
}

#[test]
fn test_missing_constructor_fails_container_build() {
    let sink = TypeDescriptor::new("app.ISink");
    let plan = ResolutionPlan::build(vec![
        ServiceDescriptor::new(sink.clone(), "app.FileSink", Lifetime::Transient),
        ServiceDescriptor::new(sink, "app.NetSink", Lifetime::Transient),
    ])
    .unwrap();

    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Sink, _>("app.FileSink", |_| Ok(Sink { tag: "file" }));
    // app.NetSink has no constructor registered.

    let errors = Container::build(plan, ctors).err().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors.to_string().contains("app.NetSink"));
}
