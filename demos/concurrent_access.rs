//! Concurrent first access example for lazy-singleton.
//!
//! Demonstrates:
//! - 100 threads released at once, all calling `instance()` for the first time
//! - The constructor running exactly once while the other callers wait
//! - Every thread receiving the same instance
//!
//! Run with: `cargo run --example concurrent_access`

use lazy_singleton::define_singleton;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Something expensive enough to be worth building lazily.
pub struct Catalog {
    pub entries: Vec<String>,
}

static BUILDS: AtomicUsize = AtomicUsize::new(0);

fn build_catalog() -> Catalog {
    BUILDS.fetch_add(1, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(200));
    Catalog {
        entries: (0..10_000).map(|i| format!("item-{i}")).collect(),
    }
}

define_singleton!(catalog: Catalog = build_catalog());

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("=== lazy-singleton: Concurrent First Access ===\n");

    const THREADS: usize = 100;
    let barrier = Arc::new(Barrier::new(THREADS));
    let started = Instant::now();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                catalog::instance() as *const Catalog as usize
            })
        })
        .collect();

    let addresses: Vec<usize> = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    let distinct = {
        let mut a = addresses.clone();
        a.sort_unstable();
        a.dedup();
        a.len()
    };

    println!("Threads:              {THREADS}");
    println!("Constructor runs:     {}", BUILDS.load(Ordering::SeqCst));
    println!("Distinct instances:   {distinct}");
    println!("Catalog entries:      {}", catalog::instance().entries.len());
    println!("Elapsed:              {:?}", started.elapsed());

    println!("\n=== Example Complete ===");
}
