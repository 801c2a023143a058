//! Simple profiling macros using thread-local storage
//!
//! Counts time and calls for move commits, evaluations and search nodes without
//! touching any function signature. Enable with environment variable: TRAILBREAKER_PROFILE=1

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

const CATEGORIES: [&str; 3] = ["commit", "eval", "node"];

thread_local! {
    static TIME_NS: Cell<[u64; 3]> = Cell::new([0; 3]);
    static CALLS: Cell<[u64; 3]> = Cell::new([0; 3]);
    static CUTOFFS: Cell<u64> = Cell::new(0);
}

// Global aggregators
static GLOBAL_TIME_NS: [AtomicU64; 3] = [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)];
static GLOBAL_CALLS: [AtomicU64; 3] = [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)];
static GLOBAL_CUTOFFS: AtomicU64 = AtomicU64::new(0);

static ENABLED: OnceLock<bool> = OnceLock::new();

#[inline]
pub fn is_profiling_enabled() -> bool {
    *ENABLED.get_or_init(|| std::env::var("TRAILBREAKER_PROFILE").is_ok())
}

fn slot(category: &str) -> Option<usize> {
    CATEGORIES.iter().position(|&c| c == category)
}

pub struct ProfileGuard {
    start: Instant,
    slot: usize,
}

impl ProfileGuard {
    pub fn new(category: &'static str) -> Option<Self> {
        if !is_profiling_enabled() {
            return None;
        }
        slot(category).map(|slot| ProfileGuard {
            start: Instant::now(),
            slot,
        })
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        let elapsed_ns = self.start.elapsed().as_nanos() as u64;
        let slot = self.slot;

        TIME_NS.with(|t| {
            let mut v = t.get();
            v[slot] += elapsed_ns;
            t.set(v);
        });
        CALLS.with(|c| {
            let mut v = c.get();
            v[slot] += 1;
            c.set(v);
        });
    }
}

#[inline]
pub fn record_alpha_beta_cutoff() {
    if is_profiling_enabled() {
        CUTOFFS.with(|c| c.set(c.get() + 1));
    }
}

/// Folds this thread's counters into the global totals
pub fn merge_thread_local() {
    if !is_profiling_enabled() {
        return;
    }

    let times = TIME_NS.with(|t| t.replace([0; 3]));
    let calls = CALLS.with(|c| c.replace([0; 3]));
    for i in 0..CATEGORIES.len() {
        GLOBAL_TIME_NS[i].fetch_add(times[i], Ordering::Relaxed);
        GLOBAL_CALLS[i].fetch_add(calls[i], Ordering::Relaxed);
    }
    GLOBAL_CUTOFFS.fetch_add(CUTOFFS.with(|c| c.replace(0)), Ordering::Relaxed);
}

pub fn print_report(total_time_ms: u64) {
    if !is_profiling_enabled() {
        return;
    }

    let total_ns = total_time_ms * 1_000_000;

    eprintln!("\n═══════════════════════════════════════════════════════════");
    eprintln!("                 PERFORMANCE PROFILE");
    eprintln!("═══════════════════════════════════════════════════════════");
    eprintln!("Total Time: {}ms\n", total_time_ms);

    for (i, name) in CATEGORIES.iter().enumerate() {
        let time = GLOBAL_TIME_NS[i].load(Ordering::Relaxed);
        let calls = GLOBAL_CALLS[i].load(Ordering::Relaxed);
        let pct = if total_ns > 0 { 100.0 * time as f64 / total_ns as f64 } else { 0.0 };
        let avg_us = if calls > 0 { time as f64 / (calls * 1000) as f64 } else { 0.0 };

        eprintln!("{}:", name);
        eprintln!("  Time:     {:.2}ms ({:.1}%)", time as f64 / 1_000_000.0, pct);
        eprintln!("  Calls:    {}", calls);
        eprintln!("  Avg:      {:.2}µs/call\n", avg_us);
    }

    let nodes = GLOBAL_CALLS[2].load(Ordering::Relaxed);
    let cutoffs = GLOBAL_CUTOFFS.load(Ordering::Relaxed);
    let cutoff_rate = if nodes > 0 { 100.0 * cutoffs as f64 / nodes as f64 } else { 0.0 };
    eprintln!("Alpha-Beta cutoffs: {} ({:.1}% of nodes)", cutoffs, cutoff_rate);
    eprintln!("═══════════════════════════════════════════════════════════\n");
}

#[macro_export]
macro_rules! profile {
    ($category:expr, $code:block) => {{
        let _guard = $crate::simple_profiler::ProfileGuard::new($category);
        $code
    }};
}
