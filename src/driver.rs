//! Walks the even-length subranges covering `[min, max]`, sets up and
//! tears down a matrix for each, and applies checkpoint skip/resume logic.

use parking_lot::Mutex;

use crate::checkpoint::{Checkpoint, CheckpointWriter};
use crate::config::EngineConfig;
use crate::error::VampireResult;
use crate::fingerprint::{Encoding, FingerprintCache, Narrow, Wide};
use crate::tile::Matrix;
use crate::worker::{self, CommitState};

/// Decimal length of `n` (`0` has length `1`, matching the convention used
/// throughout for subrange boundaries).
fn decimal_length(n: u64) -> u32 {
    if n == 0 {
        1
    } else {
        (n.ilog10()) + 1
    }
}

fn pow10(exp: u32) -> u64 {
    10u64.pow(exp)
}

/// One `[lmin, lmax]` subrange of a single even decimal length, plus the
/// largest admissible `n`-digit fang for that length.
struct Subrange {
    lmin: u64,
    lmax: u64,
    fmax: u64,
}

/// Split `[min, max]` into contiguous subranges, each spanning a single
/// even decimal length, truncating the final one at `max`.
fn even_length_subranges(min: u64, max: u64) -> Vec<Subrange> {
    let mut out = Vec::new();
    let mut lmin = min;

    while lmin <= max {
        let mut len = decimal_length(lmin);
        if len % 2 != 0 {
            // Odd-length boundary: advance to the next even-length start.
            len += 1;
            lmin = pow10(len - 1);
            if lmin > max {
                break;
            }
        }

        let length_end = pow10(len).saturating_sub(1);
        let lmax = length_end.min(max);
        let fang_len = len / 2;
        let fmax = pow10(fang_len).saturating_sub(1);

        out.push(Subrange { lmin, lmax, fmax });

        if lmax == max {
            break;
        }
        lmin = lmax + 1;
    }

    out
}

/// Outcome of a complete driver run: the final count (vampire numbers or
/// fang pairs, depending on `config.verbosity`) and the result checksum, if
/// one was requested.
pub struct RunSummary {
    pub count: u64,
    pub checksum: Option<crate::checksum::Checksum>,
}

/// Run the full search over `[min, max]` per `config`, dispatching to the
/// wide or narrow fingerprint encoding based on the digit length of `max`.
pub fn run(min: u64, max: u64, config: &EngineConfig) -> VampireResult<RunSummary> {
    if decimal_length(max) <= Narrow::MAX_SAFE_DIGITS {
        run_with_encoding::<Narrow>(min, max, config)
    } else {
        run_with_encoding::<Wide>(min, max, config)
    }
}

fn run_with_encoding<E: Encoding>(
    min: u64,
    max: u64,
    config: &EngineConfig,
) -> VampireResult<RunSummary> {
    let subranges = even_length_subranges(min, max);

    let existing = match &config.checkpoint {
        Some(path) => Checkpoint::load(path)?,
        None => None,
    };
    let mut count = existing.as_ref().map_or(0, |c| c.count);

    let mut checkpoint_writer = match &config.checkpoint {
        Some(path) => Some(CheckpointWriter::create(
            path,
            min,
            max,
            existing.is_some(),
        )?),
        None => None,
    };

    let mut cache_len = 0u32;
    let mut cache: Option<std::sync::Arc<FingerprintCache<E>>> = None;

    let mut checksum_total = config.checksum.then(crate::checksum::Checksum::new);

    for subrange in subranges {
        if let Some(cp) = &existing {
            if subrange.lmax <= cp.lmax_committed {
                log::debug!(
                    "Skipping interval [{}, {}]: already committed up to {}",
                    subrange.lmin,
                    subrange.lmax,
                    cp.lmax_committed
                );
                continue;
            }
        }

        let length = decimal_length(subrange.lmax);
        let mut lmin = subrange.lmin;
        if let Some(cp) = &existing {
            // Resuming mid-subrange: the checkpoint's last fully committed
            // value becomes this subrange's new lower bound.
            if cp.lmax_committed + 1 > lmin {
                lmin = cp.lmax_committed + 1;
            }
        }

        log::info!("Checking interval: [{}, {}]", lmin, subrange.lmax);

        if cache.is_none() || length != cache_len {
            cache = Some(FingerprintCache::<E>::new(length));
            cache_len = length;
        }
        let cache_ref = cache.as_ref().expect("just initialized");

        let matrix = Matrix::new(lmin, subrange.lmax, subrange.fmax, config.threads, config.tiling);

        let commit_cursor = Mutex::new(CommitState::new(
            config.verbosity,
            config.checksum,
            checkpoint_writer.take(),
            count,
        ));

        worker::run(&matrix, cache_ref, config, &commit_cursor)?;

        let state = commit_cursor.into_inner();
        if let Some(cs) = state.checksum() {
            if let Some(total) = checksum_total.as_mut() {
                *total = cs;
            }
        }
        let (new_count, writer) = state.finish()?;
        count = new_count;
        checkpoint_writer = writer;
    }

    Ok(RunSummary {
        count,
        checksum: checksum_total,
    })
}
