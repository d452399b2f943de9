//! Common address types shared across the prefetcher engine.
//!
//! This module provides the strong types used to avoid mixing up byte
//! addresses, cache-line addresses, and page addresses when indexing the
//! heuristic tables and sandboxes.

/// Cache-line and page address newtypes, plus the helpers that derive them
/// from a raw byte address.
pub mod addr;

pub use addr::{CacheLineAddr, PageAddr, PageOffset};
