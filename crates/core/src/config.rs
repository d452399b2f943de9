//! Configuration for the prefetcher selection engine.
//!
//! This module defines the tunables that parameterize a running [`crate::Engine`].
//! It provides:
//! 1. **Defaults:** baseline constants matching the design's recommended values.
//! 2. **Structure:** a single flat [`EngineConfig`], deserializable from the
//!    host's own configuration format.

use serde::Deserialize;

/// Default configuration constants for the engine.
///
/// These values define the baseline tuning when not explicitly overridden by
/// the embedding host.
pub mod defaults {
    /// Number of accesses per evaluation period.
    pub const PERIOD: u32 = 256;

    /// Base sandbox capacity each heuristic's capacity is derived from.
    pub const SANDBOX_SIZE_EACH: usize = 256;

    /// False-positive rate applied to every sandbox membership test, in
    /// thousandths (0..1000).
    pub const SANDBOX_FALSE_POSITIVE: u16 = 10;

    /// Next-line heuristic prefetch degree.
    pub const NEXT_LINE_DEGREE: usize = 1;
    /// Next-line heuristic sandbox capacity factor.
    pub const NEXT_LINE_DEGREE_FACTOR: usize = 1;

    /// IP-stride tracker table size.
    pub const IP_STRIDE_TABLE_SIZE: usize = 1024;
    /// IP-stride heuristic prefetch degree.
    pub const IP_STRIDE_DEGREE: usize = 2;
    /// IP-stride heuristic sandbox capacity factor.
    pub const IP_STRIDE_DEGREE_FACTOR: usize = 2;
    /// MSHR occupancy below which IP-stride targets the L2 instead of the LLC.
    pub const IP_STRIDE_MSHR_THRESHOLD: i32 = 8;

    /// Stream detector table size.
    pub const STREAM_TABLE_SIZE: usize = 64;
    /// Stream heuristic prefetch degree.
    pub const STREAM_DEGREE: usize = 2;
    /// Stream heuristic sandbox capacity factor.
    pub const STREAM_DEGREE_FACTOR: usize = 2;
    /// MSHR occupancy above which stream targets the L2 instead of the LLC.
    pub const STREAM_MSHR_THRESHOLD: i32 = 8;

    /// AMPM page table size.
    pub const AMPM_TABLE_SIZE: usize = 64;
    /// AMPM heuristic prefetch degree, applied independently to the
    /// ascending and descending scans.
    pub const AMPM_DEGREE: usize = 2;
    /// AMPM heuristic sandbox capacity factor.
    pub const AMPM_DEGREE_FACTOR: usize = 4;
    /// MSHR occupancy below which AMPM's ascending scan's prefetches
    /// target the L2 instead of the LLC.
    pub const AMPM_POSITIVE_MSHR_THRESHOLD: i32 = 8;
    /// MSHR occupancy below which AMPM's descending scan's prefetches
    /// target the L2 instead of the LLC.
    pub const AMPM_NEGATIVE_MSHR_THRESHOLD: i32 = 12;

    /// PRNG seed used when the host does not supply one. A fixed nonzero
    /// default keeps an un-configured engine deterministic across runs.
    pub const DEFAULT_SEED: u64 = 0x1234_5678_9ABC_DEF0;
}

/// Engine configuration. `#[serde(default = ...)]` on every field means a
/// host can deserialize a partial JSON/TOML document and get the design's
/// recommended defaults for everything it omits.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of accesses per evaluation period.
    pub period: u32,
    /// Base sandbox capacity each heuristic's capacity is derived from.
    pub sandbox_size_each: usize,
    /// False-positive rate applied to every sandbox membership test, in
    /// thousandths (0..1000).
    pub sandbox_false_positive: u16,

    /// Next-line heuristic prefetch degree.
    pub next_line_degree: usize,

    /// IP-stride tracker table size.
    pub ip_stride_table_size: usize,
    /// IP-stride heuristic prefetch degree.
    pub ip_stride_degree: usize,
    /// MSHR occupancy below which IP-stride targets the L2 instead of the LLC.
    pub ip_stride_mshr_threshold: i32,

    /// Stream detector table size.
    pub stream_table_size: usize,
    /// Stream heuristic prefetch degree.
    pub stream_degree: usize,
    /// MSHR occupancy above which stream targets the L2 instead of the LLC.
    pub stream_mshr_threshold: i32,

    /// AMPM page table size.
    pub ampm_table_size: usize,
    /// AMPM heuristic prefetch degree, applied independently to each scan
    /// direction.
    pub ampm_degree: usize,
    /// MSHR occupancy below which AMPM's ascending scan's prefetches
    /// target the L2 instead of the LLC.
    pub ampm_positive_mshr_threshold: i32,
    /// MSHR occupancy below which AMPM's descending scan's prefetches
    /// target the L2 instead of the LLC.
    pub ampm_negative_mshr_threshold: i32,

    /// Seed for the sandbox false-positive PRNG.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            period: defaults::PERIOD,
            sandbox_size_each: defaults::SANDBOX_SIZE_EACH,
            sandbox_false_positive: defaults::SANDBOX_FALSE_POSITIVE,
            next_line_degree: defaults::NEXT_LINE_DEGREE,
            ip_stride_table_size: defaults::IP_STRIDE_TABLE_SIZE,
            ip_stride_degree: defaults::IP_STRIDE_DEGREE,
            ip_stride_mshr_threshold: defaults::IP_STRIDE_MSHR_THRESHOLD,
            stream_table_size: defaults::STREAM_TABLE_SIZE,
            stream_degree: defaults::STREAM_DEGREE,
            stream_mshr_threshold: defaults::STREAM_MSHR_THRESHOLD,
            ampm_table_size: defaults::AMPM_TABLE_SIZE,
            ampm_degree: defaults::AMPM_DEGREE,
            ampm_positive_mshr_threshold: defaults::AMPM_POSITIVE_MSHR_THRESHOLD,
            ampm_negative_mshr_threshold: defaults::AMPM_NEGATIVE_MSHR_THRESHOLD,
            seed: defaults::DEFAULT_SEED,
        }
    }
}

impl EngineConfig {
    /// This heuristic's sandbox capacity factor, per §4.6's
    /// `SANDBOX_SIZE_EACH * degree_factor + 1` rule.
    #[must_use]
    pub fn degree_factor(&self, heuristic: crate::heuristics::HeuristicId) -> usize {
        use crate::heuristics::HeuristicId;
        match heuristic {
            HeuristicId::NextLine => defaults::NEXT_LINE_DEGREE_FACTOR,
            HeuristicId::IpStride => defaults::IP_STRIDE_DEGREE_FACTOR,
            HeuristicId::Stream => defaults::STREAM_DEGREE_FACTOR,
            HeuristicId::Ampm => defaults::AMPM_DEGREE_FACTOR,
        }
    }
}
