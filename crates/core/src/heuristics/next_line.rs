//! Next-Line Heuristic.
//!
//! The simplest of the four: always prefetches the cache line immediately
//! following the demand address. No state, no page-boundary check — the
//! source models it as a deliberately naive baseline the other three
//! heuristics are expected to beat.

use crate::error::EngineError;
use crate::host::{FillLevel, HostContext};
use crate::sandbox::{InsertOutcome, Sandbox};

use super::HeuristicId;

/// Next-Line heuristic. Degree is fixed at 1 per the design's tunables, but
/// kept as a field rather than a constant so an embedder can experiment
/// with it (the design's compile-time-tunables note applies to defaults,
/// not to hardcoding).
#[derive(Clone, Copy, Debug)]
pub struct NextLineHeuristic {
    degree: usize,
}

impl NextLineHeuristic {
    /// Creates a new Next-Line heuristic with the given prefetch degree.
    #[must_use]
    pub fn new(degree: usize) -> Self {
        Self { degree }
    }

    /// Observes one access: computes `pf = ((addr>>6)+1)<<6` and the
    /// `degree-1` lines after it, recording each into `sandbox` and, outside
    /// evaluation mode, issuing a real prefetch into the L2.
    pub fn observe(
        &mut self,
        cpu_num: i32,
        addr: u64,
        evaluation: bool,
        sandbox: &mut Sandbox,
        host: &mut dyn HostContext,
    ) -> Result<(), EngineError> {
        let mut pf_addr = ((addr >> 6) + 1) << 6;
        for _ in 0..self.degree {
            if sandbox.insert(pf_addr) == InsertOutcome::Full {
                return Err(EngineError::SandboxFull {
                    heuristic: HeuristicId::NextLine,
                    max_size: sandbox.max_size(),
                });
            }
            if !evaluation {
                host.prefetch_line(cpu_num, addr, pf_addr, FillLevel::L2);
            }
            pf_addr = ((pf_addr >> 6) + 1) << 6;
        }
        Ok(())
    }
}
