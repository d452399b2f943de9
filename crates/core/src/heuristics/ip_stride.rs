//! IP-Stride Heuristic.
//!
//! Tracks, per instruction pointer, the last demand address and the stride
//! between it and the one before. Once the same stride repeats twice in a
//! row it prefetches `degree` lines ahead along that stride, stopping at
//! the page boundary.

use crate::common::addr::{CacheLineAddr, LINE_BYTES};
use crate::error::EngineError;
use crate::host::{FillLevel, HostContext};
use crate::sandbox::{InsertOutcome, Sandbox};

use super::HeuristicId;

/// One tracked instruction pointer's stride history.
#[derive(Clone, Copy, Debug)]
struct IpTracker {
    ip: u64,
    last_addr: u64,
    last_stride: i64,
    lru_cycle: u64,
}

impl IpTracker {
    const EMPTY: Self = Self {
        ip: 0,
        last_addr: 0,
        last_stride: 0,
        lru_cycle: 0,
    };
}

/// IP-stride heuristic: a fixed-size table of [`IpTracker`] entries,
/// looked up by linear scan and evicted by LRU.
#[derive(Clone, Debug)]
pub struct IpStrideHeuristic {
    trackers: Vec<IpTracker>,
    degree: usize,
    /// MSHR occupancy below which prefetches target the L2 rather than the
    /// LLC.
    mshr_threshold: i32,
}

impl IpStrideHeuristic {
    /// Creates a new IP-stride heuristic with `table_size` tracker slots.
    #[must_use]
    pub fn new(table_size: usize, degree: usize, mshr_threshold: i32) -> Self {
        Self {
            trackers: vec![IpTracker::EMPTY; table_size],
            degree,
            mshr_threshold,
        }
    }

    fn lookup(&mut self, ip: u64) -> (usize, bool) {
        if let Some(idx) = self.trackers.iter().position(|t| t.ip == ip && t.lru_cycle != 0) {
            return (idx, true);
        }
        let victim = self
            .trackers
            .iter()
            .enumerate()
            .min_by_key(|(_, t)| t.lru_cycle)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        (victim, false)
    }

    /// Observes one access for the given instruction pointer.
    pub fn observe(
        &mut self,
        cpu_num: i32,
        addr: u64,
        ip: u64,
        evaluation: bool,
        sandbox: &mut Sandbox,
        host: &mut dyn HostContext,
    ) -> Result<(), EngineError> {
        let line = CacheLineAddr::of(addr);
        let now = host.current_cycle(cpu_num);
        let (idx, found) = self.lookup(ip);

        if !found {
            self.trackers[idx] = IpTracker {
                ip,
                last_addr: line.val(),
                last_stride: 0,
                lru_cycle: now.max(1),
            };
            return Ok(());
        }

        let tracker = self.trackers[idx];
        let stride = line.val() as i64 - tracker.last_addr as i64;
        if stride == 0 {
            // No new information; the source returns here without touching
            // the tracker at all.
            return Ok(());
        }

        if stride == tracker.last_stride {
            let fill_level = if host.mshr_occupancy(cpu_num) < self.mshr_threshold {
                FillLevel::L2
            } else {
                FillLevel::Llc
            };
            for step in 1..=self.degree as i64 {
                let candidate = (line.val() as i64 + stride * step) as u64;
                if CacheLineAddr::of(candidate).page() != line.page() {
                    break;
                }
                if sandbox.insert(candidate) == InsertOutcome::Full {
                    return Err(EngineError::SandboxFull {
                        heuristic: HeuristicId::IpStride,
                        max_size: sandbox.max_size(),
                    });
                }
                if !evaluation {
                    host.prefetch_line(cpu_num, addr, candidate, fill_level);
                }
            }
        }

        self.trackers[idx] = IpTracker {
            ip,
            last_addr: line.val(),
            last_stride: stride,
            lru_cycle: now.max(1),
        };
        Ok(())
    }
}

const _: () = assert!(LINE_BYTES == 64);
