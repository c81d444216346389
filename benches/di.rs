use criterion::{black_box, criterion_group, criterion_main, Criterion};
use forge_di::{
    ConstructorRegistry, Container, DependencyDescriptor, Lifetime, ResolutionPlan, Resolver,
    ServiceDescriptor, TypeDescriptor,
};
use std::sync::Arc;

// ===== Micro Benchmarks =====

struct Payload {
    data: [u8; 64],
}

fn single_container(lifetime: Lifetime) -> (Container, TypeDescriptor) {
    let contract = TypeDescriptor::new("bench.Payload");
    let plan = ResolutionPlan::build(vec![ServiceDescriptor::new(
        contract.clone(),
        contract.clone(),
        lifetime,
    )])
    .unwrap();
    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Payload, _>("bench.Payload", |_| Ok(Payload { data: [0; 64] }));
    (Container::build(plan, ctors).unwrap(), contract)
}

fn bench_singleton_hit(c: &mut Criterion) {
    let (container, contract) = single_container(Lifetime::Singleton);

    // Prime the singleton
    let _ = container.resolve::<Payload>(&contract).unwrap();

    c.bench_function("singleton_hit", |b| {
        b.iter(|| {
            let v = container.resolve::<Payload>(&contract).unwrap().unwrap();
            black_box(&v.data);
        })
    });
}

fn bench_scoped_vs_transient(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoped_vs_transient");

    let (container, contract) = single_container(Lifetime::Scoped);
    let ctx = container.new_context();
    let scope = ctx.begin_scope();

    group.bench_function("scoped_hit", |b| {
        b.iter(|| {
            let v = ctx.resolve::<Payload>(&contract).unwrap().unwrap();
            black_box(&v.data);
        })
    });
    scope.dispose();

    let (container, contract) = single_container(Lifetime::Transient);
    group.bench_function("transient", |b| {
        b.iter(|| {
            let v = container.resolve::<Payload>(&contract).unwrap().unwrap();
            black_box(&v.data);
        })
    });

    group.finish();
}

fn bench_transient_with_dependencies(c: &mut Criterion) {
    struct Leaf;
    struct Node {
        leaf: Arc<Leaf>,
    }

    let leaf = TypeDescriptor::new("bench.Leaf");
    let node = TypeDescriptor::new("bench.Node");
    let plan = ResolutionPlan::build(vec![
        ServiceDescriptor::new(leaf.clone(), leaf.clone(), Lifetime::Singleton),
        ServiceDescriptor::new(node.clone(), node.clone(), Lifetime::Transient)
            .with_dependency(DependencyDescriptor::new(leaf.clone())),
    ])
    .unwrap();
    let mut ctors = ConstructorRegistry::new();
    ctors.register::<Leaf, _>("bench.Leaf", |_| Ok(Leaf));
    ctors.register::<Node, _>("bench.Node", |args| {
        Ok(Node {
            leaf: args.instance_as::<Leaf>(0)?,
        })
    });
    let container = Container::build(plan, ctors).unwrap();
    let _ = container.resolve::<Node>(&node).unwrap();

    c.bench_function("transient_with_singleton_dependency", |b| {
        b.iter(|| {
            let v = container.resolve::<Node>(&node).unwrap().unwrap();
            black_box(&v.leaf);
        })
    });
}

fn bench_collection_resolve(c: &mut Criterion) {
    struct Handler {
        tag: usize,
    }

    let contract = TypeDescriptor::new("bench.IHandler");
    let mut descriptors = Vec::new();
    let mut ctors = ConstructorRegistry::new();
    for i in 0..4 {
        let implementation = format!("bench.Handler{}", i);
        descriptors.push(ServiceDescriptor::new(
            contract.clone(),
            implementation.as_str(),
            Lifetime::Transient,
        ));
        ctors.register::<Handler, _>(implementation.as_str(), move |_| Ok(Handler { tag: i }));
    }
    let plan = ResolutionPlan::build(descriptors).unwrap();
    let container = Container::build(plan, ctors).unwrap();

    c.bench_function("collection_resolve_4", |b| {
        b.iter(|| {
            let all = container.resolve_many::<Handler>(&contract).unwrap();
            black_box(all.iter().map(|h| h.tag).sum::<usize>());
        })
    });
}

fn bench_scope_churn(c: &mut Criterion) {
    let (container, contract) = single_container(Lifetime::Scoped);
    let ctx = container.new_context();

    c.bench_function("begin_resolve_dispose", |b| {
        b.iter(|| {
            let scope = ctx.begin_scope();
            let v = ctx.resolve::<Payload>(&contract).unwrap().unwrap();
            black_box(&v.data);
            scope.dispose();
        })
    });
}

fn bench_plan_build(c: &mut Criterion) {
    c.bench_function("plan_build_50", |b| {
        b.iter(|| {
            let mut descriptors = Vec::with_capacity(50);
            for i in 0..50 {
                let name = format!("bench.Service{}", i);
                let mut descriptor =
                    ServiceDescriptor::new(name.as_str(), name.as_str(), Lifetime::Transient);
                if i > 0 {
                    descriptor = descriptor.with_dependency(DependencyDescriptor::new(
                        format!("bench.Service{}", i - 1).as_str(),
                    ));
                }
                descriptors.push(descriptor);
            }
            let plan = ResolutionPlan::build(descriptors).unwrap();
            black_box(plan.len());
        })
    });
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_scoped_vs_transient,
    bench_transient_with_dependencies,
    bench_collection_resolve,
    bench_scope_churn,
    bench_plan_build
);
criterion_main!(benches);
