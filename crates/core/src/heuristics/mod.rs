//! The four prefetching heuristics and their tagged-dispatch wrapper.
//!
//! Per the design notes, four disparate heuristics are dispatched through a
//! single enum rather than a `dyn Trait` — a CPU simulator's cache module
//! reaches for dynamic dispatch because its prefetchers are truly
//! interchangeable plugins selected once at configuration time, but here the
//! selector must run *all four* every access and match on "which one is
//! active" regardless, so a tagged enum is the simpler fit.

use std::fmt;

use crate::error::EngineError;
use crate::host::HostContext;
use crate::sandbox::Sandbox;

mod ampm;
mod ip_stride;
mod next_line;
mod stream;

pub use ampm::AmpmHeuristic;
pub use ip_stride::IpStrideHeuristic;
pub use next_line::NextLineHeuristic;
pub use stream::StreamHeuristic;

/// Identifies one of the four heuristics. The discriminant doubles as the
/// sandbox/score array index used throughout the selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum HeuristicId {
    /// Next-line: always prefetches the following cache line.
    NextLine = 0,
    /// IP-stride: per-PC constant-stride detector.
    IpStride = 1,
    /// Stream: per-page directional streamer.
    Stream = 2,
    /// AMPM: per-page access/prefetch bitmap pattern matcher.
    Ampm = 3,
}

/// Total number of heuristics (and sandboxes); `N_SANDBOX` in §6.
pub const N_HEURISTICS: usize = 4;

impl HeuristicId {
    /// All four heuristic ids, in sandbox-index order.
    pub const ALL: [HeuristicId; N_HEURISTICS] = [
        HeuristicId::NextLine,
        HeuristicId::IpStride,
        HeuristicId::Stream,
        HeuristicId::Ampm,
    ];

    /// Converts a sandbox/score array index back into a `HeuristicId`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// This heuristic's index into the sandbox/score arrays.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for HeuristicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeuristicId::NextLine => "next-line",
            HeuristicId::IpStride => "ip-stride",
            HeuristicId::Stream => "stream",
            HeuristicId::Ampm => "ampm",
        };
        f.write_str(name)
    }
}

/// Per-heuristic state, dispatched by [`HeuristicId`].
#[derive(Debug)]
pub enum HeuristicState {
    /// Next-line heuristic state (stateless beyond its configured degree).
    NextLine(NextLineHeuristic),
    /// IP-stride heuristic state (the tracker table).
    IpStride(IpStrideHeuristic),
    /// Stream heuristic state (the detector table).
    Stream(StreamHeuristic),
    /// AMPM heuristic state (the page table).
    Ampm(AmpmHeuristic),
}

impl HeuristicState {
    /// This state's heuristic id.
    #[must_use]
    pub fn id(&self) -> HeuristicId {
        match self {
            HeuristicState::NextLine(_) => HeuristicId::NextLine,
            HeuristicState::IpStride(_) => HeuristicId::IpStride,
            HeuristicState::Stream(_) => HeuristicId::Stream,
            HeuristicState::Ampm(_) => HeuristicId::Ampm,
        }
    }

    /// Observes one L2 access, updating this heuristic's internal state and
    /// recording every candidate prefetch address into `sandbox`.
    ///
    /// When `evaluation` is `false` and a candidate is produced, also
    /// issues the real prefetch through `host`. When `evaluation` is `true`
    /// the heuristic still updates state and still records into `sandbox`,
    /// but never calls `host.prefetch_line`.
    ///
    /// Returns `Err` only if recording a candidate overflowed the sandbox
    /// (§7's fatal condition).
    pub fn observe(
        &mut self,
        cpu_num: i32,
        addr: u64,
        ip: u64,
        cache_hit: bool,
        evaluation: bool,
        sandbox: &mut Sandbox,
        host: &mut dyn HostContext,
    ) -> Result<(), EngineError> {
        match self {
            HeuristicState::NextLine(h) => {
                h.observe(cpu_num, addr, evaluation, sandbox, host)
            }
            HeuristicState::IpStride(h) => {
                h.observe(cpu_num, addr, ip, evaluation, sandbox, host)
            }
            HeuristicState::Stream(h) => {
                h.observe(cpu_num, addr, evaluation, sandbox, host)
            }
            HeuristicState::Ampm(h) => {
                let _ = cache_hit;
                h.observe(cpu_num, addr, evaluation, sandbox, host)
            }
        }
    }
}
