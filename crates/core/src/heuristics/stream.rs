//! Stream Heuristic.
//!
//! Tracks, per physical page, the direction demand accesses are walking
//! across that page's 64 lines. A detector's `pf_index` starts at the
//! offset of the access that allocated it and only ever moves through the
//! prefetch loop below — training a direction does not, by itself, move
//! it. Two same-direction training events raise `confidence` to 2, after
//! which every further access on that page walks `pf_index` forward
//! `degree` lines in the confirmed direction and prefetches each one.

use crate::common::addr::{PageAddr, PageOffset};
use crate::error::EngineError;
use crate::host::{FillLevel, HostContext};
use crate::sandbox::{InsertOutcome, Sandbox};

use super::HeuristicId;

/// Accesses further than this many lines from `pf_index` do not train the
/// detector's direction/confidence — they are assumed to belong to a
/// different stream through the same page.
const WINDOW: i32 = 16;

#[derive(Clone, Copy, Debug)]
struct StreamDetector {
    page: PageAddr,
    /// -1, 0 (untrained), or +1.
    direction: i32,
    confidence: i32,
    /// Index of the last line this detector either allocated on or
    /// prefetched; `-1..64` in principle, though in practice it only ever
    /// walks within the page once confirmed.
    pf_index: i32,
    occupied: bool,
}

impl StreamDetector {
    const EMPTY: Self = Self {
        page: PageAddr(0),
        direction: 0,
        confidence: 0,
        pf_index: -1,
        occupied: false,
    };
}

/// Stream heuristic: a fixed-size table of [`StreamDetector`] entries,
/// replaced FIFO via a rotating victim index (no LRU bookkeeping — a new
/// page simply evicts the oldest-allocated slot).
#[derive(Clone, Debug)]
pub struct StreamHeuristic {
    detectors: Vec<StreamDetector>,
    next_victim: usize,
    degree: usize,
    /// MSHR occupancy above which prefetches target the LLC rather than
    /// the L2 — the inverse sense of the IP-stride heuristic's threshold,
    /// kept as-is from the source (§9).
    mshr_threshold: i32,
}

impl StreamHeuristic {
    /// Creates a new stream heuristic with `table_size` detector slots.
    #[must_use]
    pub fn new(table_size: usize, degree: usize, mshr_threshold: i32) -> Self {
        Self {
            detectors: vec![StreamDetector::EMPTY; table_size],
            next_victim: 0,
            degree,
            mshr_threshold,
        }
    }

    fn find(&self, page: PageAddr) -> Option<usize> {
        self.detectors
            .iter()
            .position(|d| d.occupied && d.page == page)
    }

    fn allocate(&mut self, page: PageAddr, offset: PageOffset) -> usize {
        let idx = self.next_victim;
        self.detectors[idx] = StreamDetector {
            page,
            direction: 0,
            confidence: 0,
            pf_index: i32::from(offset.val()),
            occupied: true,
        };
        self.next_victim = (self.next_victim + 1) % self.detectors.len();
        idx
    }

    /// Observes one access.
    pub fn observe(
        &mut self,
        cpu_num: i32,
        addr: u64,
        evaluation: bool,
        sandbox: &mut Sandbox,
        host: &mut dyn HostContext,
    ) -> Result<(), EngineError> {
        let page = PageAddr::of(addr);
        let offset = i32::from(PageOffset::of(addr).val());

        let idx = match self.find(page) {
            Some(idx) => idx,
            None => {
                self.allocate(page, PageOffset::of(addr));
                return Ok(());
            }
        };

        let pf_index = self.detectors[idx].pf_index;
        if offset > pf_index {
            if offset - pf_index < WINDOW {
                if self.detectors[idx].direction == -1 {
                    self.detectors[idx].confidence = 0;
                } else {
                    self.detectors[idx].confidence += 1;
                }
                self.detectors[idx].direction = 1;
            }
        } else if offset < pf_index && pf_index - offset < WINDOW {
            if self.detectors[idx].direction == 1 {
                self.detectors[idx].confidence = 0;
            } else {
                self.detectors[idx].confidence += 1;
            }
            self.detectors[idx].direction = -1;
        }
        // offset == pf_index: no training, matches the source's silent no-op.

        if self.detectors[idx].confidence < 2 {
            return Ok(());
        }

        let fill_level = if host.mshr_occupancy(cpu_num) > self.mshr_threshold {
            FillLevel::Llc
        } else {
            FillLevel::L2
        };
        let direction = self.detectors[idx].direction;

        for _ in 0..self.degree {
            let next = self.detectors[idx].pf_index + direction;
            self.detectors[idx].pf_index = next;
            if !(0..64).contains(&next) {
                break;
            }
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            let candidate = page.line_addr(PageOffset(next as u8));
            if sandbox.insert(candidate) == InsertOutcome::Full {
                return Err(EngineError::SandboxFull {
                    heuristic: HeuristicId::Stream,
                    max_size: sandbox.max_size(),
                });
            }
            if !evaluation {
                host.prefetch_line(cpu_num, addr, candidate, fill_level);
            }
        }

        Ok(())
    }
}
