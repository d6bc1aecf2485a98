//! Tiles and the matrix that decomposes one even-length subrange into them.

use parking_lot::Mutex;

use crate::config::{TilingPolicy, MAX_TILE_SIZE};
use crate::result_list::ResultList;

/// What a worker hands back for one tile, shaped by the configured
/// verbosity mode (see `config::Verbosity`).
///
/// `Vampires` carries the deduplicated, ascending `ResultList` used by
/// `CountVampires`/`PrintVampires`. `PairCount` is the cheap scalar used by
/// `CountPairs`. `Pairs` is the flat, pre-sorted buffer of `(product,
/// multiplier, multiplicand)` triples used by `DumpPairs` — pre-sorted so
/// that concatenating tiles in commit order still yields a
/// thread-count-invariant stream (see `worker.rs`).
pub enum TileOutput {
    Vampires(ResultList),
    PairCount(u64),
    Pairs(Vec<(u64, u64, u64)>),
}

/// A contiguous half-open product subrange, plus its pending/complete result.
///
/// `result` is `None` until the worker that processed this tile commits —
/// a distinct, unambiguous state from "finished with an empty result"
/// (`Some(TileOutput::Vampires(ResultList::default()))`), which a raw
/// sentinel value could not express as cleanly.
///
/// The `Mutex` here exists for interior mutability only: `tiles` is shared
/// by `&Matrix` across every worker thread, but every actual read/write of
/// `result` happens while the matrix's `commit_cursor` is already held, so
/// this inner lock is never contended.
pub struct Tile {
    pub lmin: u64,
    pub lmax: u64,
    result: Mutex<Option<TileOutput>>,
}

impl Tile {
    fn new(lmin: u64, lmax: u64) -> Self {
        Self {
            lmin,
            lmax,
            result: Mutex::new(None),
        }
    }

    /// Store this tile's completed result. Called exactly once.
    pub fn commit(&self, result: TileOutput) {
        *self.result.lock() = Some(result);
    }

    /// Take the result if present, leaving `None` behind.
    pub fn take_result(&self) -> Option<TileOutput> {
        self.result.lock().take()
    }

    pub fn is_ready(&self) -> bool {
        self.result.lock().is_some()
    }
}

/// Shared cursors plus the ordered tile array for one even-length subrange.
pub struct Matrix {
    pub tiles: Vec<Tile>,
    /// Guards tile assignment: the next tile index a worker may claim.
    pub next_assign: Mutex<usize>,
    /// Largest admissible fang for this subrange's product length.
    pub fmax: u64,
}

impl Matrix {
    /// Build the tile array covering `[lmin, lmax]` (inclusive), a subrange
    /// of a single even decimal length.
    pub fn new(lmin: u64, mut lmax: u64, fmax: u64, threads: usize, tiling: TilingPolicy) -> Self {
        // No L-digit product exceeds fmax^2 (fmax is the largest n-digit fang).
        if let Some(fmax_sq) = fmax.checked_mul(fmax) {
            if fmax_sq < lmax {
                lmax = fmax_sq;
            }
        }

        let span = lmax.saturating_sub(lmin).saturating_add(1);
        let tile_size = match tiling {
            TilingPolicy::Auto => {
                let denom = (4 * threads + 2) as u64;
                (span / denom).max(1).min(MAX_TILE_SIZE)
            }
            TilingPolicy::Fixed(n) => n.max(1).min(MAX_TILE_SIZE),
            TilingPolicy::Single => span,
        };

        let mut tiles = Vec::with_capacity(((span + tile_size - 1) / tile_size) as usize);
        let mut start = lmin;
        while start <= lmax {
            let end = start.saturating_add(tile_size - 1).min(lmax);
            tiles.push(Tile::new(start, end));
            if end == lmax {
                break;
            }
            start = end + 1;
        }

        Self {
            tiles,
            next_assign: Mutex::new(0),
            fmax,
        }
    }

    /// Claim the next unassigned tile, or `None` once all tiles are taken.
    pub fn claim_tile(&self) -> Option<(usize, &Tile)> {
        let mut next = self.next_assign.lock();
        if *next >= self.tiles.len() {
            return None;
        }
        let idx = *next;
        *next += 1;
        Some((idx, &self.tiles[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_cover_range_contiguously_without_gaps() {
        let matrix = Matrix::new(1000, 9999, 100, 4, TilingPolicy::Auto);
        assert_eq!(matrix.tiles.first().unwrap().lmin, 1000);
        assert_eq!(matrix.tiles.last().unwrap().lmax, 9999);
        for pair in matrix.tiles.windows(2) {
            assert_eq!(pair[0].lmax + 1, pair[1].lmin);
        }
    }

    #[test]
    fn single_tile_policy_produces_one_tile() {
        let matrix = Matrix::new(1000, 9999, 100, 4, TilingPolicy::Single);
        assert_eq!(matrix.tiles.len(), 1);
        assert_eq!(matrix.tiles[0].lmin, 1000);
        assert_eq!(matrix.tiles[0].lmax, 9999);
    }

    #[test]
    fn fmax_squared_clamps_lmax() {
        // fang length 2 => fmax = 100, fmax^2 = 10_000 < 99_999
        let matrix = Matrix::new(10_000, 99_999, 100, 2, TilingPolicy::Single);
        assert_eq!(matrix.tiles[0].lmax, 10_000);
    }

    #[test]
    fn claim_tile_assigns_each_tile_exactly_once() {
        let matrix = Matrix::new(1000, 9999, 10, 4, TilingPolicy::Auto);
        let n = matrix.tiles.len();
        let mut seen = Vec::new();
        while let Some((idx, _)) = matrix.claim_tile() {
            seen.push(idx);
        }
        assert_eq!(seen.len(), n);
        assert_eq!(seen, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn tile_result_sentinel_distinguishes_unfinished_from_empty() {
        let matrix = Matrix::new(1000, 9999, 10, 4, TilingPolicy::Single);
        let tile = &matrix.tiles[0];
        assert!(!tile.is_ready());
        tile.commit(TileOutput::Vampires(ResultList::new()));
        assert!(tile.is_ready());
        match tile.take_result().unwrap() {
            TileOutput::Vampires(list) => assert!(list.is_empty()),
            _ => panic!("expected Vampires variant"),
        }
        assert!(!tile.is_ready());
    }
}
