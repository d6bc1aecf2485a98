//! Typed error taxonomy for the search engine.
//!
//! Nothing in the hot path (kernel, tree, worker loop) returns a `Result` —
//! by construction none of those operations can fail. Every fallible
//! operation lives at the edges: CLI parsing, checkpoint I/O, and the
//! cache-sizing arithmetic run once per matrix setup.

use thiserror::Error;

/// Errors surfaced by the engine, always fatal: nonzero exit, no recovery.
#[derive(Debug, Error)]
pub enum VampireError {
    #[error("failed to parse {arg} as an integer: {source}")]
    InputParse {
        arg: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("MIN ({min}) must not exceed MAX ({max})")]
    InputRange { min: u64, max: u64 },

    #[error("MAX ({max}) exceeds the safety limit of {limit} digits for the {encoding} encoding")]
    CapacityExceeded {
        max: u64,
        limit: u32,
        encoding: &'static str,
    },

    #[error("allocation failed while sizing the fingerprint cache ({requested} entries)")]
    Allocation { requested: usize },

    #[error("I/O error on {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub type VampireResult<T> = Result<T, VampireError>;
