//! The worker pool protocol: threads claim tiles, run the kernel, and
//! commit results in strict tile order through two `parking_lot::Mutex`-
//! guarded cursors.
//!
//! `matrix.next_assign` (the "read cursor") is guarded directly by the
//! matrix itself (see `tile::Matrix::claim_tile`); the "commit cursor" is
//! `CommitState`, owned by a `Mutex` here and shared by reference across a
//! `std::thread::scope` — no `Arc` needed for either the matrix or the
//! commit state, since the scope guarantees they outlive every worker.

use std::io::{BufWriter, Write};

use parking_lot::Mutex;

use crate::checkpoint::CheckpointWriter;
use crate::checksum::Checksum;
use crate::config::{EngineConfig, Verbosity};
use crate::error::{VampireError, VampireResult};
use crate::fingerprint::{Encoding, FingerprintCache};
use crate::kernel::{self, CountSink, DumpSink, NoopSink};
use crate::result_list::ResultList;
use crate::tile::{Matrix, TileOutput};
use crate::tree::ProductTree;

fn io_err(source: std::io::Error) -> VampireError {
    VampireError::Io {
        context: "stdout",
        source,
    }
}

/// Everything guarded by the commit-cursor mutex: the next tile index
/// eligible to commit, the running counter, the optional checksum and
/// checkpoint, and the buffered stdout writer for streaming verbosity modes.
pub struct CommitState {
    next_commit: usize,
    pub count: u64,
    checksum: Option<Checksum>,
    checkpoint: Option<CheckpointWriter>,
    verbosity: Verbosity,
    out: BufWriter<std::io::Stdout>,
}

impl CommitState {
    pub fn new(verbosity: Verbosity, checksum: bool, checkpoint: Option<CheckpointWriter>, count: u64) -> Self {
        Self {
            next_commit: 0,
            count,
            checksum: checksum.then(Checksum::new),
            checkpoint,
            verbosity,
            out: BufWriter::new(std::io::stdout()),
        }
    }

    /// Drain every tile from `next_commit` onward that has already
    /// finished, in order, stopping at the first unfinished one.
    fn drain_ready(&mut self, matrix: &Matrix) -> VampireResult<()> {
        while self.next_commit < matrix.tiles.len() {
            let tile = &matrix.tiles[self.next_commit];
            if !tile.is_ready() {
                break;
            }
            match tile.take_result().expect("is_ready implies Some") {
                TileOutput::Vampires(list) => {
                    for value in list.into_sorted_vec() {
                        self.count += 1;
                        if let Some(cs) = self.checksum.as_mut() {
                            cs.fold(value);
                        }
                        if self.verbosity == Verbosity::PrintVampires {
                            writeln!(self.out, "{} {}", self.count, value).map_err(io_err)?;
                        }
                    }
                }
                TileOutput::PairCount(n) => {
                    self.count += n;
                }
                TileOutput::Pairs(pairs) => {
                    for (p, m, k) in pairs {
                        self.count += 1;
                        if let Some(cs) = self.checksum.as_mut() {
                            cs.fold(p);
                        }
                        if self.verbosity == Verbosity::DumpPairs {
                            writeln!(self.out, "{p} = {m} x {k}").map_err(io_err)?;
                        }
                    }
                }
            }

            if let Some(writer) = self.checkpoint.as_mut() {
                writer.record(tile.lmax, self.count)?;
            }
            self.next_commit += 1;
        }
        Ok(())
    }

    pub fn checksum(&self) -> Option<Checksum> {
        self.checksum
    }

    /// Flush stdout and hand back the running counter plus the checkpoint
    /// writer (if any), so the driver can carry it into the next subrange.
    pub fn finish(mut self) -> VampireResult<(u64, Option<CheckpointWriter>)> {
        self.out.flush().map_err(io_err)?;
        Ok((self.count, self.checkpoint.take()))
    }
}

/// Worker-local scratch, reset between tiles.
struct Scratch {
    tree: ProductTree,
    pending: ResultList,
}

impl Scratch {
    fn new() -> Self {
        Self {
            tree: ProductTree::new(),
            pending: ResultList::new(),
        }
    }
}

/// Run the kernel over one tile and shape its output per the configured
/// verbosity mode. The verbosity match happens once per tile, not per
/// candidate — the kernel itself never branches on it.
fn process_tile<E: Encoding>(
    lmin: u64,
    lmax: u64,
    fmax: u64,
    cache: &FingerprintCache<E>,
    config: &EngineConfig,
    scratch: &mut Scratch,
) -> TileOutput {
    scratch.tree = ProductTree::new();
    scratch.pending = ResultList::new();

    match config.verbosity {
        Verbosity::CountVampires | Verbosity::PrintVampires => {
            let mut sink = NoopSink;
            kernel::enumerate(
                lmin,
                lmax,
                fmax,
                cache,
                config.min_fang_pairs,
                &mut scratch.tree,
                &mut scratch.pending,
                &mut sink,
            );
            TileOutput::Vampires(std::mem::take(&mut scratch.pending))
        }
        Verbosity::CountPairs => {
            let mut sink = CountSink { count: 0 };
            kernel::enumerate(
                lmin,
                lmax,
                fmax,
                cache,
                config.min_fang_pairs,
                &mut scratch.tree,
                &mut scratch.pending,
                &mut sink,
            );
            TileOutput::PairCount(sink.count)
        }
        Verbosity::DumpPairs => {
            let mut sink = DumpSink::default();
            kernel::enumerate(
                lmin,
                lmax,
                fmax,
                cache,
                config.min_fang_pairs,
                &mut scratch.tree,
                &mut scratch.pending,
                &mut sink,
            );
            sink.pairs.sort_unstable();
            TileOutput::Pairs(sink.pairs)
        }
    }
}

/// Spawn `config.threads` workers sharing `matrix` and `cache`, running
/// until every tile is processed and committed. Returns the final commit
/// state for the caller to read the counter/checksum off of.
pub fn run<E: Encoding>(
    matrix: &Matrix,
    cache: &FingerprintCache<E>,
    config: &EngineConfig,
    commit_cursor: &Mutex<CommitState>,
) -> VampireResult<()> {
    let commit_error: Mutex<Option<VampireError>> = Mutex::new(None);

    std::thread::scope(|scope| {
        for _ in 0..config.threads.max(1) {
            scope.spawn(|| {
                let mut scratch = Scratch::new();
                loop {
                    let (_, tile) = match matrix.claim_tile() {
                        Some(t) => t,
                        None => return,
                    };

                    let output =
                        process_tile(tile.lmin, tile.lmax, matrix.fmax, cache, config, &mut scratch);
                    tile.commit(output);

                    let mut state = commit_cursor.lock();
                    if let Err(e) = state.drain_ready(matrix) {
                        *commit_error.lock() = Some(e);
                        return;
                    }
                }
            });
        }
    });

    if let Some(e) = commit_error.into_inner() {
        return Err(e);
    }
    Ok(())
}
