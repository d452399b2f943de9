//! C ABI adapter exposing the prefetcher selection engine to a host cache
//! simulator.
//!
//! Mirrors the teacher's Python-binding crate in spirit — a thin
//! marshalling layer at an FFI boundary with no algorithmic logic of its
//! own — but the host here is a C/C++ trace-driven cache simulator
//! (DPC2/ChampSim-style) rather than a Python interpreter, so the boundary
//! is `#[unsafe(no_mangle)] extern "C"` functions instead of PyO3 classes.
//! See `DESIGN.md` for what was kept and dropped from the teacher's
//! dependency stack.
//!
//! A host integrates this adapter by, once at startup, installing its four
//! callbacks (`l2pf_set_prefetch_line_fn`, `l2pf_set_mshr_occupancy_fn`,
//! `l2pf_set_current_cycle_fn`, `l2pf_set_knobs`) and then driving the three
//! exposed entry points (`l2pf_initialize`, `l2pf_operate`,
//! `l2pf_cache_fill`) exactly as it would the source's
//! `l2_prefetcher_initialize`/`l2_prefetcher_operate`/`l2_cache_fill`.

/// Host callback registry (the four "Consumed" entry points of spec.md §6).
mod callbacks;
/// Per-CPU engine table (spec.md §5's process-global state).
mod registry;

use std::process;

pub use callbacks::{CurrentCycleFn, MshrOccupancyFn, PrefetchLineFn};
use l2pf_core::{EngineConfig, FillLevel, HostContext, HostKnobs};

/// Adapts the registered C callbacks to [`HostContext`].
struct CHost;

impl HostContext for CHost {
    fn prefetch_line(&mut self, cpu_num: i32, base_addr: u64, pf_addr: u64, fill_level: FillLevel) {
        callbacks::prefetch_line(cpu_num, base_addr, pf_addr, callbacks::fill_level_to_c(fill_level));
    }

    fn mshr_occupancy(&self, cpu_num: i32) -> i32 {
        callbacks::mshr_occupancy(cpu_num)
    }

    fn current_cycle(&self, cpu_num: i32) -> u64 {
        callbacks::current_cycle(cpu_num)
    }

    fn knobs(&self) -> HostKnobs {
        callbacks::knobs()
    }
}

/// Installs a `tracing_subscriber` formatter the first time any entry point
/// is called, honoring `RUST_LOG` the way the teacher's `cli` crate does.
/// Safe to call repeatedly; only the first call has any effect.
fn init_logging() {
    let _ = tracing_subscriber::fmt::try_init();
}

/// Installs the host's `l2_prefetch_line` callback.
#[unsafe(no_mangle)]
pub extern "C" fn l2pf_set_prefetch_line_fn(f: PrefetchLineFn) {
    callbacks::set_prefetch_line_fn(f);
}

/// Installs the host's `get_l2_mshr_occupancy` callback.
#[unsafe(no_mangle)]
pub extern "C" fn l2pf_set_mshr_occupancy_fn(f: MshrOccupancyFn) {
    callbacks::set_mshr_occupancy_fn(f);
}

/// Installs the host's `get_cycle_count` callback.
#[unsafe(no_mangle)]
pub extern "C" fn l2pf_set_current_cycle_fn(f: CurrentCycleFn) {
    callbacks::set_current_cycle_fn(f);
}

/// Installs the read-only knob triple (`knob_scramble_loads`,
/// `knob_small_llc`, `knob_low_bandwidth`), encoded the C way: `0` is
/// false, any other value is true.
#[unsafe(no_mangle)]
pub extern "C" fn l2pf_set_knobs(scramble_loads: i32, small_llc: i32, low_bandwidth: i32) {
    callbacks::set_knobs(HostKnobs {
        scramble_loads: scramble_loads != 0,
        small_llc: small_llc != 0,
        low_bandwidth: low_bandwidth != 0,
    });
}

/// `l2pf_initialize` — the design's exposed `initialize(cpu_num)` (spec.md
/// §6). Builds that CPU's engine with the default [`EngineConfig`] and logs
/// the startup banner in place of the source's `printf`.
#[unsafe(no_mangle)]
pub extern "C" fn l2pf_initialize(cpu_num: i32) {
    init_logging();
    registry::initialize(cpu_num, EngineConfig::default(), &CHost);
}

/// `l2pf_operate` — the design's exposed `operate(cpu_num, addr, ip,
/// cache_hit)` (spec.md §6). `cache_hit` is the C convention: `0` is a
/// miss, any other value is a hit.
///
/// A fatal invariant violation (spec.md §7 — sandbox overflow or an
/// unrecognized active-heuristic id) is logged and the process exits with a
/// non-zero status, matching the source's behavior for a capacity bug. The
/// same happens if the host calls this before `l2pf_initialize` for that
/// `cpu_num`.
#[unsafe(no_mangle)]
pub extern "C" fn l2pf_operate(cpu_num: i32, addr: u64, ip: u64, cache_hit: i32) {
    let mut host = CHost;
    let outcome = registry::with_engine(cpu_num, |engine| {
        engine.operate(addr, ip, cache_hit != 0, &mut host)
    });
    match outcome {
        Some(Ok(())) => {}
        Some(Err(err)) => {
            tracing::error!(cpu_num, %err, "fatal prefetcher invariant violation");
            process::exit(1);
        }
        None => {
            tracing::error!(cpu_num, "l2pf_operate called before l2pf_initialize");
            process::exit(1);
        }
    }
}

/// `l2pf_cache_fill` — the design's exposed `cache_fill(...)` (spec.md §6).
/// Only `addr` feeds the engine's prefetch-utility bookkeeping
/// (`l2pf_core::stats`); `set`, `way`, `prefetch`, and `evicted_addr` are
/// accepted for ABI compatibility with the host's callback signature but
/// otherwise ignored, matching spec.md §1's classification of `cache_fill`
/// as an out-of-scope collaborator beyond utility accounting.
#[unsafe(no_mangle)]
pub extern "C" fn l2pf_cache_fill(
    cpu_num: i32,
    addr: u64,
    _set: i32,
    _way: i32,
    _prefetch: i32,
    _evicted_addr: u64,
) {
    let _ = registry::with_engine(cpu_num, |engine| engine.cache_fill(addr));
}
