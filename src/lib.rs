//! # helsing — Parallel Vampire Number Search Engine
//!
//! ## Architecture Overview
//!
//! A vampire number is a composite integer of even decimal length `2n`
//! expressible as a product of two `n`-digit *fangs* whose concatenated
//! digits are a permutation of the product's own. Finding them is a search
//! problem over candidate `(multiplier, multiplicand)` pairs; this crate's
//! job is to make that search both correct and fast.
//!
//! ### Digit-multiset fingerprints instead of repeated division
//!
//! Checking whether two fangs' digits permute into their product's digits
//! naively means sorting three digit sequences per candidate. Instead, each
//! fang-width integer maps to a **fingerprint**: a packed integer encoding
//! its nonzero-digit multiset such that fingerprint composition is plain
//! addition (see [`fingerprint`]). Splitting the multiplicand and the
//! product into thirds and precomputing every fang's fingerprint in a flat
//! table turns the per-candidate check into three table lookups, three
//! adds, and a comparison.
//!
//! ### Why a tree, not just a sorted list
//!
//! The kernel (see [`kernel`]) can emit the same product from more than one
//! fang pair. An AVL tree (see [`tree`]) deduplicates products within one
//! tile and counts how many fang pairs produced each, so a
//! `min_fang_pairs` threshold can filter weak candidates before they ever
//! reach the output stream.
//!
//! ### Why two mutexes, not a work-stealing pool
//!
//! Output order must be deterministic and thread-count-invariant (ascending
//! by value, byte-identical across thread counts). A work-stealing pool
//! (e.g. `rayon`) hands work to whichever thread is free first, which is
//! exactly what breaks that guarantee. Instead, tiles are *assigned* in
//! index order and *committed* in index order through two
//! `parking_lot::Mutex`-guarded cursors (see [`worker`]) — workers may race
//! ahead on assignment but never commit out of turn.
//!
//! ### `mimalloc` as the global allocator
//!
//! Every worker allocates an AVL tree and a result list per tile; mimalloc's
//! per-thread heaps keep those allocations contention-free regardless of
//! thread count.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod checkpoint;
pub mod checksum;
pub mod config;
pub mod driver;
pub mod error;
pub mod fingerprint;
pub mod kernel;
pub mod result_list;
pub mod tile;
pub mod tree;
pub mod worker;

pub use config::{EngineConfig, TilingPolicy, Verbosity};
pub use driver::RunSummary;
pub use error::{VampireError, VampireResult};

/// Run the search over `[min, max]` per `config`. The single public entry
/// point used by both the CLI binary and the load-test harness.
pub fn search(min: u64, max: u64, config: &EngineConfig) -> VampireResult<RunSummary> {
    if min > max {
        return Err(VampireError::InputRange { min, max });
    }
    driver::run(min, max, config)
}
