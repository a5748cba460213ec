use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use semstore::rdf::{
    vocab, Literal, MaterializeOptions, NamedNode, PrefixMap, Quad, QuadStore, RdfFormat, Subject,
};

fn ex(local: impl std::fmt::Display) -> NamedNode {
    NamedNode::new(format!("http://example.org/{}", local)).unwrap()
}

/// People with a type, a name and a link to the next person
fn people(size: usize) -> Vec<Quad> {
    let rdf_type = NamedNode::new(vocab::RDF_TYPE).unwrap();
    let mut quads = Vec::with_capacity(size * 3);
    for i in 0..size {
        let person = ex(format!("person{}", i));
        quads.push(Quad::triple(person.clone(), rdf_type.clone(), ex("Person")));
        quads.push(Quad::triple(
            person.clone(),
            ex("name"),
            Literal::new_simple_literal(format!("Person{}", i)),
        ));
        quads.push(Quad::triple(person, ex("knows"), ex(format!("person{}", (i + 1) % size))));
    }
    quads
}

/// Benchmark quad insertion throughput
fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");

    for size in [100, 1000, 10_000].iter() {
        let quads = people(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let store: QuadStore = quads.iter().cloned().collect();
                criterion::black_box(store.len());
            });
        });
    }
    group.finish();
}

/// Benchmark indexed pattern matching
fn bench_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("match");

    for size in [100, 1000, 10_000].iter() {
        let store: QuadStore = people(*size).into_iter().collect();
        let subject: Subject = ex("person42").into();
        let knows = ex("knows");

        group.bench_with_input(BenchmarkId::new("subject", size), size, |b, _| {
            b.iter(|| criterion::black_box(store.match_quads(Some(&subject), None, None, None).len()));
        });
        group.bench_with_input(BenchmarkId::new("predicate", size), size, |b, _| {
            b.iter(|| criterion::black_box(store.match_quads(None, Some(&knows), None, None).len()));
        });
    }
    group.finish();
}

/// Benchmark set algebra on half-overlapping stores
fn bench_set_algebra(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_algebra");

    for size in [1000, 10_000].iter() {
        let quads = people(*size);
        let a: QuadStore = quads[..quads.len() / 2 + quads.len() / 4].iter().cloned().collect();
        let b: QuadStore = quads[quads.len() / 4..].iter().cloned().collect();

        group.bench_with_input(BenchmarkId::new("union", size), size, |bench, _| {
            bench.iter(|| criterion::black_box(a.union(&b).len()));
        });
        group.bench_with_input(BenchmarkId::new("difference", size), size, |bench, _| {
            bench.iter(|| criterion::black_box(a.difference(&b).len()));
        });
    }
    group.finish();
}

/// Benchmark materialization of a linked graph
fn bench_materialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize");
    let prefixes = PrefixMap::with_common_prefixes().with_prefix("ex", "http://example.org/");

    for size in [100, 1000, 10_000].iter() {
        let store: QuadStore = people(*size).into_iter().collect();
        group.bench_with_input(BenchmarkId::new("meshed", size), size, |b, _| {
            b.iter(|| criterion::black_box(store.materialize(&prefixes, MaterializeOptions::default()).len()));
        });
    }

    let store: QuadStore = people(100).into_iter().collect();
    let graph = store.materialize(&prefixes, MaterializeOptions::default());
    group.bench_function("to_json_100", |b| {
        b.iter(|| criterion::black_box(graph.to_json()));
    });
    group.finish();
}

/// Benchmark N-Quads export and re-import
fn bench_nquads(c: &mut Criterion) {
    let store: QuadStore = people(1000).into_iter().collect();
    let text = store.export_text(RdfFormat::NQuads, &PrefixMap::new()).unwrap();

    c.bench_function("nquads_export_1000", |b| {
        b.iter(|| criterion::black_box(store.export_text(RdfFormat::NQuads, &PrefixMap::new()).unwrap().len()));
    });
    c.bench_function("nquads_import_1000", |b| {
        b.iter(|| {
            let mut parsed = QuadStore::new();
            criterion::black_box(parsed.import_text(&text, RdfFormat::NQuads).unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_add,
    bench_match,
    bench_set_algebra,
    bench_materialize,
    bench_nquads
);
criterion_main!(benches);
