//! Stand-in host simulator.
//!
//! The design's §1 "out of scope" collaborators — the real cache
//! simulator, its MSHR occupancy accessor, and its cycle counter — are not
//! part of this crate. This harness substitutes a minimal one: a monotonic
//! per-access cycle counter and a FIFO of in-flight prefetches whose length
//! stands in for MSHR occupancy, capped the way a real MSHR file is. It
//! exists only so the engine in `l2pf-core` can be exercised end-to-end
//! over a trace file; it does not model cache contents, hit/miss latency,
//! or replacement.

use std::collections::VecDeque;

use l2pf_core::{FillLevel, HostContext, HostKnobs};

/// A trace-replay stand-in for the host cache simulator.
#[derive(Debug)]
pub struct TraceHost {
    cycle: u64,
    /// Cycles a prefetch is assumed to stay outstanding before its MSHR
    /// entry retires.
    latency: u64,
    /// Retirement cycle of every currently in-flight prefetch, oldest
    /// first.
    inflight: VecDeque<u64>,
    knobs: HostKnobs,
    /// Total prefetches issued across the whole replay, for the summary
    /// printed at the end.
    pub total_issued: u64,
}

impl TraceHost {
    /// Creates a harness host with the given assumed prefetch latency (in
    /// accesses) and knob triple.
    #[must_use]
    pub fn new(latency: u64, knobs: HostKnobs) -> Self {
        Self {
            cycle: 0,
            latency,
            inflight: VecDeque::new(),
            knobs,
            total_issued: 0,
        }
    }

    /// Advances the cycle counter by one access and retires any prefetch
    /// whose assumed latency has elapsed.
    pub fn advance(&mut self) {
        self.cycle += 1;
        while matches!(self.inflight.front(), Some(&retire) if retire <= self.cycle) {
            let _ = self.inflight.pop_front();
        }
    }

    /// Current simulated cycle.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}

impl HostContext for TraceHost {
    fn prefetch_line(&mut self, _cpu_num: i32, _base_addr: u64, _pf_addr: u64, _fill_level: FillLevel) {
        self.total_issued += 1;
        self.inflight.push_back(self.cycle + self.latency);
    }

    fn mshr_occupancy(&self, _cpu_num: i32) -> i32 {
        i32::try_from(self.inflight.len()).unwrap_or(i32::MAX)
    }

    fn current_cycle(&self, _cpu_num: i32) -> u64 {
        self.cycle
    }

    fn knobs(&self) -> HostKnobs {
        self.knobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupancy_grows_with_issued_prefetches() {
        let mut host = TraceHost::new(4, HostKnobs::default());
        assert_eq!(host.mshr_occupancy(0), 0);
        host.prefetch_line(0, 0, 0x1000, FillLevel::L2);
        host.prefetch_line(0, 0, 0x1040, FillLevel::L2);
        assert_eq!(host.mshr_occupancy(0), 2);
    }

    #[test]
    fn occupancy_retires_after_the_assumed_latency() {
        let mut host = TraceHost::new(2, HostKnobs::default());
        host.prefetch_line(0, 0, 0x1000, FillLevel::L2); // retires at cycle 2
        host.advance(); // cycle 1: not yet retired
        assert_eq!(host.mshr_occupancy(0), 1);
        host.advance(); // cycle 2: retires
        assert_eq!(host.mshr_occupancy(0), 0);
    }
}
