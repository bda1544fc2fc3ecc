//! Acquire/release latency, pooled versus allocating a fresh map per message.
//!
//! Run with: `cargo bench --bench acquire_latency`

use std::collections::HashMap;
use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use hdrhistogram::Histogram;
use rrpool::{OffsetMap, Registry, Tier};

const ITERATIONS: usize = 200_000;
const WARMUP: usize = 10_000;
const THREADS: usize = 4;

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("host{i}.bench.example.")).collect()
}

fn fill(map: &mut OffsetMap, names: &[String]) {
    for (i, name) in names.iter().enumerate() {
        map.insert(name.clone(), i as u16);
    }
}

fn report(label: &str, hist: &Histogram<u64>) {
    println!(
        "{label:<28} p50={:>6}ns p99={:>6}ns p99.9={:>7}ns max={:>8}ns",
        hist.value_at_quantile(0.50),
        hist.value_at_quantile(0.99),
        hist.value_at_quantile(0.999),
        hist.max()
    );
}

fn bench_pooled(registry: &Registry, tier: Tier, names: &[String]) -> Histogram<u64> {
    let mut hist = Histogram::<u64>::new(3).expect("histogram");
    for i in 0..WARMUP + ITERATIONS {
        let start = Instant::now();
        let mut map = registry.acquire_offset_map(tier);
        fill(&mut map, names);
        black_box(&map);
        registry.release_offset_map(tier, map);
        if i >= WARMUP {
            hist.record(start.elapsed().as_nanos() as u64).ok();
        }
    }
    hist
}

fn bench_fresh(names: &[String]) -> Histogram<u64> {
    let mut hist = Histogram::<u64>::new(3).expect("histogram");
    for i in 0..WARMUP + ITERATIONS {
        let start = Instant::now();
        let mut map: OffsetMap = HashMap::new();
        fill(&mut map, names);
        black_box(&map);
        drop(map);
        if i >= WARMUP {
            hist.record(start.elapsed().as_nanos() as u64).ok();
        }
    }
    hist
}

fn main() {
    let registry = Arc::new(Registry::new());

    for (tier, count) in [(Tier::Small, 8), (Tier::Medium, 120), (Tier::Large, 400)] {
        let names = names(count);
        report(&format!("{tier} pooled ({count} names)"), &bench_pooled(&registry, tier, &names));
        report(&format!("{tier} fresh ({count} names)"), &bench_fresh(&names));
    }

    let names = Arc::new(names(8));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = registry.clone();
            let names = names.clone();
            thread::spawn(move || bench_pooled(&registry, Tier::Small, &names))
        })
        .collect();

    let mut combined = Histogram::<u64>::new(3).expect("histogram");
    for handle in handles {
        combined.add(handle.join().expect("bench thread")).expect("merge");
    }
    report(&format!("small pooled x{THREADS} threads"), &combined);
}
