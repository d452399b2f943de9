//! The online prefetcher selection engine.
//!
//! Runs all four heuristics concurrently in private sandboxes, scores each
//! one against a frozen snapshot of its sandbox from the previous period,
//! and every [`crate::config::EngineConfig::period`] accesses promotes the
//! highest-scoring heuristic to active for the next period. Only the active
//! heuristic ever issues a real prefetch; the rest run in evaluation mode,
//! recording what they *would* have prefetched.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::heuristics::{
    AmpmHeuristic, HeuristicId, HeuristicState, IpStrideHeuristic, N_HEURISTICS, NextLineHeuristic,
    StreamHeuristic,
};
use crate::host::{FillLevel, HostContext, HostKnobs};
use crate::sandbox::{Sandbox, Xorshift64, sandbox_capacity};
use crate::stats::PrefetchUtilityTracker;

/// Cap on how many in-flight prefetch addresses the engine tracks for
/// use-rate attribution. An approximate accounting concern, not part of the
/// selection algorithm, so a small bound is fine.
const PENDING_ATTRIBUTION_CAP: usize = 4096;

/// A thin [`HostContext`] wrapper that records every address the wrapped
/// heuristic actually prefetches, so the engine can attribute later cache
/// uses back to the heuristic that issued them.
struct RecordingHost<'a> {
    inner: &'a mut dyn HostContext,
    issued: Vec<u64>,
}

impl HostContext for RecordingHost<'_> {
    fn prefetch_line(&mut self, cpu_num: i32, base_addr: u64, pf_addr: u64, fill_level: FillLevel) {
        self.issued.push(pf_addr);
        self.inner.prefetch_line(cpu_num, base_addr, pf_addr, fill_level);
    }
    fn mshr_occupancy(&self, cpu_num: i32) -> i32 {
        self.inner.mshr_occupancy(cpu_num)
    }
    fn current_cycle(&self, cpu_num: i32) -> u64 {
        self.inner.current_cycle(cpu_num)
    }
    fn knobs(&self) -> HostKnobs {
        self.inner.knobs()
    }
}

/// The online prefetcher selection engine for one CPU core.
pub struct Engine {
    cpu_num: i32,
    config: EngineConfig,
    heuristics: [HeuristicState; N_HEURISTICS],
    /// Live, currently-being-recorded sandboxes.
    sandboxes: [Sandbox; N_HEURISTICS],
    /// Frozen snapshot from the previous period, used for scoring.
    sandboxes_old: [Sandbox; N_HEURISTICS],
    /// Running per-heuristic score, decayed (not reset) at each period
    /// boundary.
    scores: [i64; N_HEURISTICS],
    active: HeuristicId,
    accesses_in_period: u32,
    /// Highest score ever observed at a period scan, and the heuristic that
    /// produced it.
    ///
    /// Deliberately never reset between periods — see `DESIGN.md`. Because
    /// scores decay after the scan but `best_score` does not, a heuristic
    /// that posts one unusually high score early in the run can make
    /// `best_score` effectively unreachable afterward, keeping the engine
    /// locked onto whichever heuristic won that period.
    best_score: i64,
    best_index: usize,
    rng: Xorshift64,
    pending_attribution: HashMap<u64, HeuristicId>,
    stats: PrefetchUtilityTracker,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("cpu_num", &self.cpu_num)
            .field("active", &self.active)
            .field("accesses_in_period", &self.accesses_in_period)
            .field("scores", &self.scores)
            .field("best_score", &self.best_score)
            .field("best_index", &self.best_index)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Builds a new engine for `cpu_num`, printing the startup banner (§6)
    /// with the host's knob configuration.
    #[must_use]
    pub fn new(cpu_num: i32, config: EngineConfig, host: &dyn HostContext) -> Self {
        let knobs = host.knobs();
        info!(
            cpu_num,
            period = config.period,
            scramble_loads = knobs.scramble_loads,
            small_llc = knobs.small_llc,
            low_bandwidth = knobs.low_bandwidth,
            "initializing prefetcher selection engine"
        );

        let sandboxes = HeuristicId::ALL.map(|id| {
            Sandbox::new(
                sandbox_capacity(config.sandbox_size_each, config.degree_factor(id)),
                config.sandbox_false_positive,
            )
        });
        let sandboxes_old = sandboxes.clone();

        let heuristics = [
            HeuristicState::NextLine(NextLineHeuristic::new(config.next_line_degree)),
            HeuristicState::IpStride(IpStrideHeuristic::new(
                config.ip_stride_table_size,
                config.ip_stride_degree,
                config.ip_stride_mshr_threshold,
            )),
            HeuristicState::Stream(StreamHeuristic::new(
                config.stream_table_size,
                config.stream_degree,
                config.stream_mshr_threshold,
            )),
            HeuristicState::Ampm(AmpmHeuristic::new(
                config.ampm_table_size,
                config.ampm_degree,
                config.ampm_positive_mshr_threshold,
                config.ampm_negative_mshr_threshold,
            )),
        ];

        // §4.6 initialization: "Active heuristic starts at a uniformly
        // random id in 0..3."
        let mut rng = Xorshift64::new(config.seed);
        let active = HeuristicId::from_index(rng.next_below(N_HEURISTICS as u32) as usize)
            .unwrap_or(HeuristicId::NextLine);

        Self {
            cpu_num,
            config,
            heuristics,
            sandboxes,
            sandboxes_old,
            scores: [0; N_HEURISTICS],
            active,
            accesses_in_period: 0,
            best_score: 0,
            best_index: 0,
            rng,
            pending_attribution: HashMap::new(),
            stats: PrefetchUtilityTracker::new(),
        }
    }

    /// The heuristic currently issuing real prefetches.
    #[must_use]
    pub fn active_heuristic(&self) -> HeuristicId {
        self.active
    }

    /// Accumulated prefetch utility statistics for this engine.
    #[must_use]
    pub fn stats(&self) -> &PrefetchUtilityTracker {
        &self.stats
    }

    /// Processes one L2 access.
    ///
    /// Dispatches the active heuristic for real, scores every heuristic
    /// against the previous period's frozen sandbox snapshot, then
    /// dispatches the remaining three heuristics in evaluation mode. Every
    /// [`EngineConfig::period`] accesses, closes out the period: scans for
    /// the new best heuristic, rotates sandbox snapshots, and decays
    /// scores.
    pub fn operate(
        &mut self,
        addr: u64,
        ip: u64,
        cache_hit: bool,
        host: &mut dyn HostContext,
    ) -> Result<(), EngineError> {
        let active_id = self.active;
        {
            let mut recorder = RecordingHost {
                inner: host,
                issued: Vec::new(),
            };
            self.heuristics[active_id.index()].observe(
                self.cpu_num,
                addr,
                ip,
                cache_hit,
                false,
                &mut self.sandboxes[active_id.index()],
                &mut recorder,
            )?;
            for pf_addr in recorder.issued {
                self.stats.record_issued(active_id);
                if self.pending_attribution.len() >= PENDING_ATTRIBUTION_CAP {
                    if let Some(&oldest) = self.pending_attribution.keys().next() {
                        self.pending_attribution.remove(&oldest);
                    }
                }
                self.pending_attribution.insert(pf_addr, active_id);
            }
        }

        for id in HeuristicId::ALL {
            if self.sandboxes_old[id.index()].test(addr, &mut self.rng) {
                self.scores[id.index()] += 1;
            }
        }

        for id in HeuristicId::ALL {
            if id == active_id {
                continue;
            }
            self.heuristics[id.index()].observe(
                self.cpu_num,
                addr,
                ip,
                cache_hit,
                true,
                &mut self.sandboxes[id.index()],
                host,
            )?;
        }

        self.accesses_in_period += 1;
        if self.accesses_in_period >= self.config.period {
            self.close_period()?;
        }

        Ok(())
    }

    /// Reports that the line at `addr` was just filled into the cache.
    /// Attributes the fill to whichever heuristic's earlier prefetch
    /// produced it, if any, for accuracy reporting.
    pub fn cache_fill(&mut self, addr: u64) {
        if let Some(heuristic) = self.pending_attribution.remove(&addr) {
            self.stats.record_used(heuristic);
        }
    }

    fn close_period(&mut self) -> Result<(), EngineError> {
        let scores_at_scan = self.scores;

        for id in HeuristicId::ALL {
            if self.scores[id.index()] > self.best_score {
                self.best_score = self.scores[id.index()];
                self.best_index = id.index();
            }
        }

        for id in HeuristicId::ALL {
            self.sandboxes_old[id.index()].copy_from(&self.sandboxes[id.index()]);
        }

        for id in HeuristicId::ALL {
            self.sandboxes[id.index()].reset();
            self.scores[id.index()] /= 3;
        }

        let new_active = HeuristicId::from_index(self.best_index)
            .ok_or(EngineError::UnknownActiveHeuristic(self.best_index))?;
        if new_active != self.active {
            debug!(
                cpu_num = self.cpu_num,
                from = %self.active,
                to = %new_active,
                best_score = self.best_score,
                "promoting heuristic"
            );
        }
        self.stats.record_period(&scores_at_scan, new_active);
        self.active = new_active;
        self.accesses_in_period = 0;
        Ok(())
    }
}
