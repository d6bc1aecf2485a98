//! Runtime configuration surface.
//!
//! The source this engine is modeled on gates several of these knobs behind
//! build-time feature toggles (`VERBOSE_LEVEL`, `MIN_FANG_PAIRS`,
//! `AUTO_TILE_SIZE`). None of them affect the kernel's instruction
//! selection, so they become plain runtime fields here instead of cargo
//! features — only the fingerprint encoding width stays a compile-time
//! choice (`fingerprint::Wide` / `fingerprint::Narrow`), because that one
//! *does* change the hot loop.

use std::path::PathBuf;

/// Output verbosity mode — a closed variant set, matched only at the
/// driver/matrix level. The kernel never sees this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Verbosity {
    /// Count fang pairs; print nothing during the run.
    CountPairs,
    /// Print every emitted fang pair as it commits.
    DumpPairs,
    /// Count distinct vampire numbers; print nothing during the run.
    CountVampires,
    /// Print every distinct vampire number, in ascending order, as it commits.
    PrintVampires,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::CountVampires
    }
}

/// How an even-length subrange is cut into tiles for the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TilingPolicy {
    /// `tile_size = max(1, (lmax - lmin) / (4*threads + 2))`, capped at `MAX_TILE_SIZE`.
    Auto,
    /// A fixed tile size, still capped at `MAX_TILE_SIZE` and truncated at `lmax`.
    Fixed(u64),
    /// One tile spanning the entire subrange.
    Single,
}

/// Largest tile size permitted regardless of policy — bounds peak per-worker
/// memory (`O(|tile| * mean fang-pair density)`).
pub const MAX_TILE_SIZE: u64 = 10u64.pow(11) - 1;

/// The resolved bundle of everything the driver needs besides `[min, max]`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub threads: usize,
    pub verbosity: Verbosity,
    pub min_fang_pairs: u8,
    pub tiling: TilingPolicy,
    pub checksum: bool,
    pub checkpoint: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            verbosity: Verbosity::default(),
            min_fang_pairs: 1,
            tiling: TilingPolicy::Auto,
            checksum: false,
            checkpoint: None,
        }
    }
}
