//! Host interface adapters.
//!
//! The engine never touches the real L2, the MSHRs, or the cycle counter
//! directly — it is driven synchronously by a host cache simulator and asks
//! that host to do those things on its behalf. This mirrors the way a CPU
//! simulator's `Prefetcher` trait sits at the seam between the cache model
//! and the prefetching algorithm: a small trait here plays the same role
//! between the selection engine and whatever drives it.

/// Destination cache level for an issued prefetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillLevel {
    /// Fill into the L2 (the cache this engine is attached to).
    L2,
    /// Fill into the last-level cache, bypassing the L2.
    Llc,
}

/// Read-only configuration knobs the host exposes to the prefetcher.
///
/// These mirror the `knob_scramble_loads`, `knob_small_llc`, and
/// `knob_low_bandwidth` globals a DPC2-style host simulator provides; the
/// engine only reads them to print the startup banner (§6) — none of the
/// heuristics currently branch on them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostKnobs {
    /// Whether the host scrambles load addresses (obfuscates real traces).
    pub scramble_loads: bool,
    /// Whether the host is modeling a small LLC.
    pub small_llc: bool,
    /// Whether the host is modeling a low-bandwidth memory system.
    pub low_bandwidth: bool,
}

/// Callbacks a host cache simulator provides to the prefetcher engine.
///
/// Implemented once per CPU by the simulator embedding this crate. All
/// methods are assumed infallible (§7): the engine does not attempt to
/// catch or recover from host-side errors.
pub trait HostContext {
    /// Issues a real prefetch for `pf_addr`, triggered by the access at
    /// `base_addr`, to be filled at `fill_level`.
    ///
    /// Called only by the currently active heuristic, and only when that
    /// heuristic is not running in evaluation mode.
    fn prefetch_line(&mut self, cpu_num: i32, base_addr: u64, pf_addr: u64, fill_level: FillLevel);

    /// Returns the current L2 MSHR (Miss-Status Holding Register) occupancy
    /// for `cpu_num`, used by several heuristics to pick between the L2 and
    /// the LLC as a prefetch's fill level.
    fn mshr_occupancy(&self, cpu_num: i32) -> i32;

    /// Returns the host's monotonic cycle counter for `cpu_num`, used to
    /// timestamp LRU tracker/detector/page entries.
    fn current_cycle(&self, cpu_num: i32) -> u64;

    /// Returns the read-only knob triple the host was configured with.
    fn knobs(&self) -> HostKnobs;
}
