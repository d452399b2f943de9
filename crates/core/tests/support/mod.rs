//! Shared test harness: an in-memory [`HostContext`] that records every
//! prefetch the engine issues instead of touching a real cache.

use l2pf_core::{FillLevel, HostContext, HostKnobs};

/// Records every prefetch issued, and lets a test drive the cycle counter
/// and MSHR occupancy the engine reads back.
#[derive(Default)]
pub struct RecordingHost {
    pub issued: Vec<(u64, u64, FillLevel)>,
    pub cycle: u64,
    pub occupancy: i32,
    pub knobs: HostKnobs,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn addrs(&self) -> Vec<u64> {
        self.issued.iter().map(|&(_, pf, _)| pf).collect()
    }
}

impl HostContext for RecordingHost {
    fn prefetch_line(&mut self, _cpu_num: i32, base_addr: u64, pf_addr: u64, fill_level: FillLevel) {
        self.issued.push((base_addr, pf_addr, fill_level));
    }

    fn mshr_occupancy(&self, _cpu_num: i32) -> i32 {
        self.occupancy
    }

    fn current_cycle(&self, _cpu_num: i32) -> u64 {
        self.cycle
    }

    fn knobs(&self) -> HostKnobs {
        self.knobs
    }
}
