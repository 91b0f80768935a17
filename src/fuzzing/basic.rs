use std::collections::HashMap;
use std::net::Ipv4Addr;

use quickcheck::{Arbitrary, Gen};

use super::*;

/// The generator's address universe plus neighbours that are never stored.
fn probe_space() -> Vec<Ipv4Addr> {
    let mut out = Vec::new();
    for a in [10u8, 11, 12] {
        for b in [0u8, 1, 3] {
            for c in [0u8, 1, 192] {
                for d in [0u8, 7, 64, 200] {
                    out.push(Ipv4Addr::new(a, b, c, d));
                }
            }
        }
    }
    out
}

qc!(model_agreement, _model_agreement);
fn _model_agreement(ops: Vec<Op>) -> bool {
    let mut tree = RadixTree::new();
    let mut model = Model::default();

    for op in &ops {
        match *op {
            Op::Add(net, value) => {
                let inserted = tree.add_ipv4_netblock(net.ip(), net.len, value).unwrap();
                if inserted != model.add(net, value) {
                    return false;
                }
            }
            Op::Remove(net) => {
                if tree.remove_ipv4_netblock(net.ip(), net.len) != model.remove(net) {
                    return false;
                }
            }
        }
        check_invariants(&tree);
    }

    probe_space().into_iter().all(|ip| {
        let raw = u32::from(ip);
        tree.find_exact_ipv4(ip).copied() == model.find_exact(raw)
            && tree.find_best_ipv4(ip).copied() == model.find_best(raw)
    })
}

qc!(insert_remove_round_trip, _insert_remove_round_trip);
fn _insert_remove_round_trip((ops, net, value): (Vec<Op>, TestNet, u32)) -> bool {
    let mut tree = RadixTree::new();
    let mut model = Model::default();
    for op in ops {
        match op {
            Op::Add(net, value) => {
                tree.add_ipv4_netblock(net.ip(), net.len, value).unwrap();
                model.add(net, value);
            }
            Op::Remove(net) => {
                tree.remove_ipv4_netblock(net.ip(), net.len);
                model.remove(net);
            }
        }
    }
    let before = format!("{tree:?}");

    if !tree.add_ipv4_netblock(net.ip(), net.len, value).unwrap() {
        // a duplicate leaves the tree untouched
        return format!("{tree:?}") == before;
    }
    check_invariants(&tree);

    let canonical = Ipv4Addr::from(net.canonical());
    if tree.remove_ipv4_netblock(canonical, net.len) != Some(value) {
        return false;
    }
    check_invariants(&tree);

    format!("{tree:?}") == before
}

qc!(netblock_covers_its_members, _netblock_covers_its_members);
fn _netblock_covers_its_members((net, value): (TestNet, u32)) -> bool {
    let mut tree = RadixTree::new();
    tree.add_ipv4_netblock(net.ip(), net.len, value).unwrap();
    check_invariants(&tree);

    // both the canonical address and the raw (possibly host-bit-carrying)
    // insertion address are members of the stored netblock
    let canonical = Ipv4Addr::from(net.canonical());
    tree.find_best_ipv4(canonical) == Some(&value) && tree.find_best_ipv4(net.ip()) == Some(&value)
}

/// Short byte keys over a two-letter alphabet: dense in prefixes and
/// extensions of each other.
#[derive(Clone, Debug, PartialEq)]
struct TestKey(Vec<u8>);

impl Arbitrary for TestKey {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = *g.choose(&[1usize, 2, 2, 3, 3]).unwrap();
        TestKey((0..len).map(|_| *g.choose(b"ab").unwrap()).collect())
    }
}

fn key_universe() -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    for len in 1..=3usize {
        for i in 0usize..(1 << len) {
            out.push((0..len).map(|j| b"ab"[(i >> j) & 1]).collect());
        }
    }
    out
}

qc!(generic_model_agreement, _generic_model_agreement);
fn _generic_model_agreement(ops: Vec<(bool, TestKey, u32)>) -> bool {
    let mut tree = RadixTree::new();
    let mut model: HashMap<Vec<u8>, u32> = HashMap::new();

    for (add, TestKey(key), value) in ops {
        if add {
            let inserted = tree.add_generic(&key, value).unwrap();
            if inserted != !model.contains_key(&key) {
                return false;
            }
            model.entry(key).or_insert(value);
        } else if tree.remove_generic(&key) != model.remove(&key) {
            return false;
        }
        check_invariants(&tree);
    }

    key_universe()
        .into_iter()
        .all(|key| tree.find_exact_generic(&key).copied() == model.get(&key).copied())
}
