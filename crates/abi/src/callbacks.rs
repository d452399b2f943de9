//! Host callback registry.
//!
//! A DPC2-style C/C++ host configures this adapter by installing raw
//! function pointers for prefetch issue, MSHR occupancy, and the cycle
//! counter, plus the read-only knob triple — the "Consumed (host-provided)"
//! entry points of the design (spec.md §6) — before calling
//! [`crate::l2pf_initialize`].

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use l2pf_core::{FillLevel, HostKnobs};

/// C calling convention for the host's `l2_prefetch_line`. `fill_level` is
/// the encoding from [`fill_level_to_c`].
pub type PrefetchLineFn = extern "C" fn(cpu_num: i32, base_addr: u64, pf_addr: u64, fill_level: i32);
/// C calling convention for the host's `get_l2_mshr_occupancy`.
pub type MshrOccupancyFn = extern "C" fn(cpu_num: i32) -> i32;
/// C calling convention for the host's `get_cycle_count`.
pub type CurrentCycleFn = extern "C" fn(cpu_num: i32) -> u64;

/// Numeric encoding of [`FillLevel`] at the C boundary: `0` for L2, `1` for
/// LLC. The DPC2 header that defines `FILL_L2`/`FILL_LLC` was not among the
/// files retrieved into `original_source/` (see `DESIGN.md`), so this
/// adapter defines and documents its own stable encoding rather than
/// guessing theirs.
#[must_use]
pub fn fill_level_to_c(level: FillLevel) -> i32 {
    match level {
        FillLevel::L2 => 0,
        FillLevel::Llc => 1,
    }
}

#[derive(Default)]
struct Callbacks {
    prefetch_line: Option<PrefetchLineFn>,
    mshr_occupancy: Option<MshrOccupancyFn>,
    current_cycle: Option<CurrentCycleFn>,
    knobs: HostKnobs,
}

fn callbacks() -> &'static Mutex<Callbacks> {
    static CALLBACKS: OnceLock<Mutex<Callbacks>> = OnceLock::new();
    CALLBACKS.get_or_init(|| Mutex::new(Callbacks::default()))
}

fn lock(m: &Mutex<Callbacks>) -> MutexGuard<'_, Callbacks> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Installs the host's prefetch-issue callback.
pub fn set_prefetch_line_fn(f: PrefetchLineFn) {
    lock(callbacks()).prefetch_line = Some(f);
}

/// Installs the host's MSHR-occupancy callback.
pub fn set_mshr_occupancy_fn(f: MshrOccupancyFn) {
    lock(callbacks()).mshr_occupancy = Some(f);
}

/// Installs the host's cycle-counter callback.
pub fn set_current_cycle_fn(f: CurrentCycleFn) {
    lock(callbacks()).current_cycle = Some(f);
}

/// Installs the read-only knob triple (§6).
pub fn set_knobs(knobs: HostKnobs) {
    lock(callbacks()).knobs = knobs;
}

/// Invokes the host's prefetch-issue callback, if installed. A host that
/// calls `l2pf_operate` without first installing this callback gets a
/// silent no-op rather than a panic, matching §7's "host callbacks are
/// assumed infallible" — a missing callback is a host integration bug, not
/// something the engine can recover from, but it should not crash the
/// simulator mid-trace.
pub fn prefetch_line(cpu_num: i32, base_addr: u64, pf_addr: u64, fill_level: i32) {
    if let Some(f) = lock(callbacks()).prefetch_line {
        f(cpu_num, base_addr, pf_addr, fill_level);
    }
}

/// Invokes the host's MSHR-occupancy callback, defaulting to `0` (never
/// saturated) if none is installed.
#[must_use]
pub fn mshr_occupancy(cpu_num: i32) -> i32 {
    lock(callbacks()).mshr_occupancy.map_or(0, |f| f(cpu_num))
}

/// Invokes the host's cycle-counter callback, defaulting to `0` if none is
/// installed.
#[must_use]
pub fn current_cycle(cpu_num: i32) -> u64 {
    lock(callbacks()).current_cycle.map_or(0, |f| f(cpu_num))
}

/// Returns the currently installed knob triple.
#[must_use]
pub fn knobs() -> HostKnobs {
    lock(callbacks()).knobs
}
