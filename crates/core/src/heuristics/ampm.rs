//! AMPM (Access Map Pattern Matching) Heuristic.
//!
//! Keeps a 64-bit access bitmap and a 64-bit already-prefetched bitmap per
//! tracked page. On every access it scans for ascending and descending
//! arithmetic progressions already visible in the access map and prefetches
//! the next line each progression predicts, capped at `degree` predictions
//! per direction per access.

use crate::common::addr::PageAddr;
use crate::error::EngineError;
use crate::host::{FillLevel, HostContext};
use crate::sandbox::{InsertOutcome, Sandbox};

use super::HeuristicId;

/// How far back a stride of `i` is allowed to reach (`page_offset - 2*i`
/// must stay in range) before the scan gives up for this direction.
const MAX_STRIDE: i32 = 16;

#[derive(Clone, Copy, Debug)]
struct AmpmPage {
    page: PageAddr,
    access_map: u64,
    pf_map: u64,
    lru_cycle: u64,
    occupied: bool,
}

impl AmpmPage {
    const EMPTY: Self = Self {
        page: PageAddr(0),
        access_map: 0,
        pf_map: 0,
        lru_cycle: 0,
        occupied: false,
    };
}

/// AMPM heuristic: a fixed-size, LRU-replaced table of per-page bitmaps.
#[derive(Clone, Debug)]
pub struct AmpmHeuristic {
    pages: Vec<AmpmPage>,
    degree: usize,
    /// MSHR occupancy below which the ascending (positive) scan's
    /// prefetches target the L2 rather than the LLC.
    positive_threshold: i32,
    /// MSHR occupancy below which the descending (negative) scan's
    /// prefetches target the L2 rather than the LLC. Looser than
    /// `positive_threshold`, kept as-is from the source (§9).
    negative_threshold: i32,
}

impl AmpmHeuristic {
    /// Creates a new AMPM heuristic with `table_size` page slots.
    #[must_use]
    pub fn new(table_size: usize, degree: usize, positive_threshold: i32, negative_threshold: i32) -> Self {
        Self {
            pages: vec![AmpmPage::EMPTY; table_size],
            degree,
            positive_threshold,
            negative_threshold,
        }
    }

    fn find_or_allocate(&mut self, page: PageAddr, now: u64) -> usize {
        if let Some(idx) = self.pages.iter().position(|p| p.occupied && p.page == page) {
            return idx;
        }
        let victim = self
            .pages
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| if p.occupied { p.lru_cycle } else { 0 })
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        self.pages[victim] = AmpmPage {
            page,
            access_map: 0,
            pf_map: 0,
            lru_cycle: now,
            occupied: true,
        };
        victim
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
        let offset = i32::from(crate::common::addr::PageOffset::of(addr).val());
        let now = host.current_cycle(cpu_num);
        let idx = self.find_or_allocate(page, now);

        self.pages[idx].access_map |= 1u64 << offset;
        self.pages[idx].lru_cycle = now;

        let positive_fill = if host.mshr_occupancy(cpu_num) < self.positive_threshold {
            FillLevel::L2
        } else {
            FillLevel::Llc
        };
        let mut positive_count = 0usize;
        for i in 1..=MAX_STRIDE {
            let check1 = offset - i;
            let check2 = offset - 2 * i;
            let candidate = offset + i;
            if check2 < 0 {
                break;
            }
            if candidate > 63 {
                break;
            }
            if positive_count >= self.degree {
                break;
            }
            let access_map = self.pages[idx].access_map;
            let pf_map = self.pages[idx].pf_map;
            if access_map & (1u64 << candidate) != 0 || pf_map & (1u64 << candidate) != 0 {
                continue;
            }
            if access_map & (1u64 << check1) == 0 || access_map & (1u64 << check2) == 0 {
                continue;
            }
            #[allow(clippy::cast_sign_loss)]
            let candidate_addr = page.line_addr(crate::common::addr::PageOffset(candidate as u8));
            if sandbox.insert(candidate_addr) == InsertOutcome::Full {
                return Err(EngineError::SandboxFull {
                    heuristic: HeuristicId::Ampm,
                    max_size: sandbox.max_size(),
                });
            }
            if !evaluation {
                host.prefetch_line(cpu_num, addr, candidate_addr, positive_fill);
            }
            self.pages[idx].pf_map |= 1u64 << candidate;
            positive_count += 1;
        }

        let negative_fill = if host.mshr_occupancy(cpu_num) < self.negative_threshold {
            FillLevel::L2
        } else {
            FillLevel::Llc
        };
        let mut negative_count = 0usize;
        for i in 1..=MAX_STRIDE {
            let check1 = offset + i;
            let check2 = offset + 2 * i;
            let candidate = offset - i;
            if check2 > 63 {
                break;
            }
            if candidate < 0 {
                break;
            }
            if negative_count >= self.degree {
                break;
            }
            let access_map = self.pages[idx].access_map;
            let pf_map = self.pages[idx].pf_map;
            if access_map & (1u64 << candidate) != 0 || pf_map & (1u64 << candidate) != 0 {
                continue;
            }
            if access_map & (1u64 << check1) == 0 || access_map & (1u64 << check2) == 0 {
                continue;
            }
            #[allow(clippy::cast_sign_loss)]
            let candidate_addr = page.line_addr(crate::common::addr::PageOffset(candidate as u8));
            if sandbox.insert(candidate_addr) == InsertOutcome::Full {
                return Err(EngineError::SandboxFull {
                    heuristic: HeuristicId::Ampm,
                    max_size: sandbox.max_size(),
                });
            }
            if !evaluation {
                host.prefetch_line(cpu_num, addr, candidate_addr, negative_fill);
            }
            self.pages[idx].pf_map |= 1u64 << candidate;
            negative_count += 1;
        }

        Ok(())
    }
}
