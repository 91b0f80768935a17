use criterion::{criterion_group, criterion_main, Criterion};
use netradix::RadixTree;
use rand::prelude::*;
use std::net::Ipv4Addr;

fn random_net(rng: &mut ThreadRng) -> (Ipv4Addr, u8) {
    let addr: u32 = rng.gen::<u32>() & 0xffff_0000;
    let len = rng.gen_range(8..=24);
    (Ipv4Addr::from(addr), len)
}

fn do_random_inserts() {
    let mut tree = RadixTree::<u32>::new();
    let mut rng = thread_rng();

    for _ in 0..1_000 {
        let (addr, len) = random_net(&mut rng);
        let _ = tree.add_ipv4_netblock(addr, len, rng.gen::<u8>() as u32);
    }
}

pub fn random_inserts(c: &mut Criterion) {
    c.bench_function("randomized inserts", |b| b.iter(do_random_inserts));
}

pub fn best_match(c: &mut Criterion) {
    let mut tree = RadixTree::<u32>::new();
    let mut rng = thread_rng();
    for _ in 0..10_000 {
        let (addr, len) = random_net(&mut rng);
        let _ = tree.add_ipv4_netblock(addr, len, rng.gen::<u8>() as u32);
    }
    let queries: Vec<Ipv4Addr> = (0..1_000).map(|_| Ipv4Addr::from(rng.gen::<u32>())).collect();

    c.bench_function("best match", |b| {
        b.iter(|| {
            let mut hits = 0;
            for &q in &queries {
                if tree.find_best_ipv4(q).is_some() {
                    hits += 1;
                }
            }
            hits
        })
    });
}

criterion_group!(benches, random_inserts, best_match);
criterion_main!(benches);
