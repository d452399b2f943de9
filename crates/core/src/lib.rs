//! Online prefetcher selection engine.
//!
//! This crate implements an L2 cache prefetcher that runs four independent
//! heuristics — next-line, IP-stride, stream, and AMPM — concurrently in
//! private sandboxes, scores each one against its own previous-period
//! snapshot, and periodically promotes the best-scoring heuristic to be the
//! only one that actually issues prefetches. It provides:
//! 1. **Heuristics:** the four prefetching algorithms ([`heuristics`]).
//! 2. **Selection:** the [`Engine`] that runs, scores, and promotes them.
//! 3. **Host interface:** the [`HostContext`] trait a cache simulator
//!    implements to drive the engine.
//! 4. **Configuration:** tunables and their defaults ([`config`]).
//! 5. **Statistics:** optional prefetch utility counters ([`stats`]).

/// Common address types shared across the engine (cache-line, page).
pub mod common;
/// Engine configuration (defaults and the `EngineConfig` structure).
pub mod config;
/// Fatal invariant violations the engine can report.
pub mod error;
/// The four prefetching heuristics and their tagged-dispatch wrapper.
pub mod heuristics;
/// Host interface adapters (`HostContext`, `FillLevel`, `HostKnobs`).
pub mod host;
/// Bounded prefetch-candidate recorder with randomized membership testing.
pub mod sandbox;
/// The online prefetcher selection engine.
pub mod selector;
/// Prefetch utility statistics, not used in selection decisions.
pub mod stats;

/// Engine configuration; use `EngineConfig::default()` or deserialize from
/// the host's own configuration format.
pub use crate::config::EngineConfig;
/// Fatal invariant violation reported by the engine.
pub use crate::error::EngineError;
/// Identifies one of the four heuristics.
pub use crate::heuristics::HeuristicId;
/// Destination cache level for an issued prefetch, and the read-only host
/// knob triple.
pub use crate::host::{FillLevel, HostContext, HostKnobs};
/// The online prefetcher selection engine; construct with `Engine::new`.
pub use crate::selector::Engine;
