// A fixed (inputs, target, config, seed) tuple must produce a bit-identical
// result on every run, on any machine, at any rayon thread count.

use std::sync::atomic::AtomicBool;

use bitcents::models::{run_simulation, SimResult, Target};

use crate::helpers::{seeded_config, single_regime_inputs};

fn run_once(seed: u64) -> SimResult {
    let inputs = single_regime_inputs(60_000.0, 0.01, 0.2, -0.5);
    let mut config = seeded_config(8_000, seed);
    config.capture_distribution = true;
    run_simulation(
        &inputs,
        Target::Above { strike: 60_300.0 },
        &config,
        seed,
        &AtomicBool::new(false),
        |_| {},
    )
    .unwrap()
}

#[test]
fn repeated_runs_are_bit_identical() {
    let first = run_once(42);
    let second = run_once(42);
    assert_eq!(first, second);
}

#[test]
fn single_threaded_pool_matches_default_pool() {
    let default_pool = run_once(42);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .expect("pool");
    let single = pool.install(|| run_once(42));

    assert_eq!(default_pool, single);
}

#[test]
fn four_thread_pool_matches_too() {
    let default_pool = run_once(7);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("pool");
    let four = pool.install(|| run_once(7));

    assert_eq!(default_pool, four);
}

#[test]
fn progress_snapshots_are_reproducible() {
    let inputs = single_regime_inputs(60_000.0, 0.01, 0.2, -0.5);
    let config = seeded_config(8_000, 42);
    let collect = || {
        let mut snapshots = Vec::new();
        run_simulation(
            &inputs,
            Target::Above { strike: 60_300.0 },
            &config,
            42,
            &AtomicBool::new(false),
            |s| snapshots.push(s),
        )
        .unwrap();
        snapshots
    };
    assert_eq!(collect(), collect());
}
