//! Sandbox: a bounded recorder of would-be prefetch addresses.
//!
//! Each heuristic gets a private `Sandbox` that records every address it
//! *would* prefetch, whether or not it is currently active. At the next
//! evaluation period the selector checks incoming demand addresses against
//! a frozen snapshot of that sandbox to score the heuristic — without ever
//! letting the heuristic touch the real cache.

use crate::common::addr::LINE_BYTES;

/// Minimal seedable PRNG for the sandbox false-positive test.
///
/// A process-global `rand::thread_rng()` would make sandbox hit/miss
/// outcomes depend on call order across every heuristic and every CPU,
/// breaking the determinism §5 requires for a fixed trace + seed. This is
/// the same xorshift64 construction a cache replacement policy uses to pick
/// a pseudo-random victim way: cheap, hot-path-friendly, and trivially
/// seedable, with no cryptographic requirement.
#[derive(Clone, Debug)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Creates a generator from the given seed. A seed of 0 is remapped to
    /// a fixed nonzero value since xorshift cannot escape the all-zero
    /// state.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    /// Draws the next 64-bit pseudo-random value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Draws a uniform value in `0..bound`. `bound` must be nonzero.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        (self.next_u64() % u64::from(bound)) as u32
    }
}

/// Outcome of inserting a candidate prefetch address into a sandbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The address was recorded; the sandbox has room left.
    Ok,
    /// Recording the address would fill the sandbox to capacity. The
    /// caller must treat this as the fatal condition described in §7 — the
    /// address itself is still appended, matching the source's "insert
    /// then report" ordering, but no further inserts should be attempted.
    Full,
}

/// A bounded, append-only recorder of candidate prefetch addresses for one
/// heuristic, with a randomized false-positive membership test.
#[derive(Clone, Debug)]
pub struct Sandbox {
    data: Vec<u64>,
    max_size: usize,
    /// False-positive rate in thousandths (0..1000). A `test` hit on a
    /// present address is reported as a *miss* with probability
    /// `false_positive / 1000`.
    false_positive: u16,
}

impl Sandbox {
    /// Creates an empty sandbox with the given capacity and false-positive
    /// rate (in thousandths).
    #[must_use]
    pub fn new(max_size: usize, false_positive: u16) -> Self {
        Self {
            data: Vec::with_capacity(max_size),
            max_size,
            false_positive,
        }
    }

    /// Current number of recorded addresses.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The capacity this sandbox was constructed with.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Appends `addr` to the sandbox.
    ///
    /// Returns [`InsertOutcome::Full`] if this insert brought `size` to
    /// `max_size`; the address is still recorded either way, matching the
    /// source behavior where the capacity check happens after the append.
    pub fn insert(&mut self, addr: u64) -> InsertOutcome {
        self.data.push(addr);
        if self.data.len() == self.max_size {
            InsertOutcome::Full
        } else {
            InsertOutcome::Ok
        }
    }

    /// Tests whether `addr` was recorded in this sandbox, with a randomized
    /// false-negative applied on a true hit.
    ///
    /// Only addresses actually present can ever test positive — this models
    /// the false-negative behavior of a Bloom-filter-style hardware
    /// sandbox, not a true false-positive (an absent address is never
    /// reported present), matching the source's actual behavior despite its
    /// "false positive" naming (see `DESIGN.md`).
    pub fn test(&self, addr: u64, rng: &mut Xorshift64) -> bool {
        if !self.data.contains(&addr) {
            return false;
        }
        rng.next_below(1000) > u32::from(self.false_positive)
    }

    /// Clears all recorded addresses, keeping capacity and false-positive
    /// rate.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Deep-copies `source`'s recorded addresses, size, capacity, and
    /// false-positive rate into `self`. Used to rotate a sandbox's contents
    /// into its frozen snapshot at a period boundary.
    pub fn copy_from(&mut self, source: &Sandbox) {
        self.max_size = source.max_size;
        self.false_positive = source.false_positive;
        self.data.clear();
        self.data.extend_from_slice(&source.data);
    }
}

/// Derives a sandbox's `max_size` from the shared per-heuristic budget and
/// that heuristic's prefetch degree, per §4.6's initialization rule:
/// `SANDBOX_SIZE_EACH * degree_factor + 1`.
#[must_use]
pub fn sandbox_capacity(sandbox_size_each: usize, degree_factor: usize) -> usize {
    sandbox_size_each * degree_factor + 1
}

/// Aligns `addr` down to its containing cache line. Re-exported here since
/// every sandbox candidate is a cache-line address.
#[must_use]
pub fn align_to_line(addr: u64) -> u64 {
    addr & !(LINE_BYTES - 1)
}
