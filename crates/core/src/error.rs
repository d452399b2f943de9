//! Fatal invariant violations.
//!
//! Everything in §7 of the design that is a routine "no-op" condition
//! (tracker miss, zero stride, page-boundary break, saturated degree) is
//! handled inline by the heuristics and never surfaces as an `Err`. Only the
//! two conditions the design calls fatal — a sandbox capacity miscalculation
//! and an unrecognized active-heuristic id — produce an `EngineError`.

use thiserror::Error;

use crate::heuristics::HeuristicId;

/// Fatal invariant violation reported by the engine.
///
/// Both variants indicate a configuration or capacity bug rather than an
/// expected runtime condition: the host should log this and terminate
/// rather than attempt recovery.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// A sandbox reached its capacity while recording a prefetch candidate.
    ///
    /// The per-heuristic `max_size` is derived from `SANDBOX_SIZE_EACH` and
    /// the heuristic's prefetch degree specifically so this cannot happen
    /// within one evaluation period; seeing it means the capacity
    /// calculation (or a configured degree) is wrong.
    #[error("sandbox for {heuristic} heuristic is full (capacity {max_size})")]
    SandboxFull {
        /// Which heuristic's sandbox overflowed.
        heuristic: HeuristicId,
        /// The capacity that was exceeded.
        max_size: usize,
    },

    /// The active-heuristic index did not name one of the four heuristics.
    ///
    /// Can only happen if `Engine` state was corrupted or constructed
    /// outside of `Engine::new`.
    #[error("active heuristic index {0} is not a known heuristic")]
    UnknownActiveHeuristic(usize),
}
