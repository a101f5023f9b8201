use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ringcore::{BackendId, Ring};

fn populated_ring(members: usize, replicas: usize) -> Ring {
    let mut ring = Ring::new(4096, replicas).unwrap();
    for n in 0..members {
        ring.add(BackendId::new(format!("backend-{n}")).unwrap());
    }
    ring
}

fn lookup_benchmark(c: &mut Criterion) {
    let ring = populated_ring(20, 100);
    c.bench_function("ring_lookup_20_members_k100", |b| {
        let mut fingerprint: u32 = 0;
        b.iter(|| {
            fingerprint = fingerprint.wrapping_add(17) % 4096;
            black_box(ring.lookup(black_box(fingerprint)))
        });
    });
}

fn add_remove_benchmark(c: &mut Criterion) {
    c.bench_function("ring_add_remove_k100", |b| {
        b.iter(|| {
            let mut ring = Ring::new(4096, 100).unwrap();
            let id = BackendId::new("bench-backend").unwrap();
            black_box(ring.add(id.clone()));
            black_box(ring.remove(&id));
        });
    });
}

criterion_group!(benches, lookup_benchmark, add_remove_benchmark);
criterion_main!(benches);
