//! The fang-enumeration kernel: the per-length inner loop that walks
//! candidate multiplier/multiplicand pairs for one product subrange.
//!
//! This is the hot path. Every quantity that can be maintained
//! incrementally is — no per-candidate division or modulo beyond the
//! handful of setup operations per outer (`m`) iteration.

use crate::fingerprint::{Encoding, FingerprintCache};
use crate::result_list::ResultList;
use crate::tree::ProductTree;

/// Receives every valid fang pair as the kernel finds it, in addition to
/// the product being folded into the tree. A closed, monomorphized variant
/// set rather than a trait object — the kernel never performs dynamic
/// dispatch.
pub trait PairSink {
    fn record(&mut self, m: u64, k: u64, p: u64);
}

/// Used by `CountVampires` / `PrintVampires`: the tree alone is enough.
pub struct NoopSink;
impl PairSink for NoopSink {
    #[inline(always)]
    fn record(&mut self, _m: u64, _k: u64, _p: u64) {}
}

/// Used by `CountPairs`: just tally how many valid pairs were found.
pub struct CountSink {
    pub count: u64,
}
impl PairSink for CountSink {
    #[inline(always)]
    fn record(&mut self, _m: u64, _k: u64, _p: u64) {
        self.count += 1;
    }
}

/// Used by `DumpPairs`: buffer every pair as `(product, multiplier,
/// multiplicand)` so the worker can sort them into a deterministic,
/// thread-count-invariant order before committing (see `worker.rs`).
#[derive(Default)]
pub struct DumpSink {
    pub pairs: Vec<(u64, u64, u64)>,
}
impl PairSink for DumpSink {
    #[inline(always)]
    fn record(&mut self, m: u64, k: u64, p: u64) {
        self.pairs.push((p, m, k));
    }
}

#[inline(always)]
fn div_ceil(a: u64, b: u64) -> u64 {
    let q = a / b;
    if a % b == 0 {
        q
    } else {
        q + 1
    }
}

/// Largest `x` with `x*x <= n`.
fn isqrt_floor(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = (n as f64).sqrt() as u64;
    while x > 0 && x.checked_mul(x).map_or(true, |v| v > n) {
        x -= 1;
    }
    while x.checked_add(1).and_then(|y| y.checked_mul(y)).map_or(false, |v| v <= n) {
        x += 1;
    }
    x
}

/// Smallest `x` with `x*x >= n`.
fn isqrt_ceil(n: u64) -> u64 {
    let f = isqrt_floor(n);
    if f.checked_mul(f) == Some(n) {
        f
    } else {
        f + 1
    }
}

/// The mod-9 pair-congruence filter: a valid vampire satisfies
/// `m + k ≡ m*k (mod 9)`. Computed on residues so it never risks
/// overflowing on fang-width integers near `u64::MAX`.
#[inline(always)]
fn con9(m: u64, k: u64) -> bool {
    let mr = m % 9;
    let kr = k % 9;
    (mr + kr) % 9 == (mr * kr) % 9
}

/// Run the kernel over product subrange `[p_min, p_max]` (inclusive),
/// folding every valid fang pair's product into `tree` and periodically
/// draining sealed products into `pending` (see `tree::ProductTree::cleanup`).
/// `fmax` is the largest admissible fang for this subrange's (even) product
/// length.
///
/// At the end of the call `tree` is guaranteed fully drained into
/// `pending` — callers never need to flush it themselves.
pub fn enumerate<E: Encoding, S: PairSink>(
    p_min: u64,
    p_max: u64,
    fmax: u64,
    cache: &FingerprintCache<E>,
    min_fang_pairs: u8,
    tree: &mut ProductTree,
    pending: &mut ResultList,
    sink: &mut S,
) {
    if p_min > p_max {
        return;
    }

    let ms = isqrt_ceil(p_min.max(1));
    let big_m = isqrt_floor(p_max);
    let p_a = cache.p_a;

    if fmax < ms {
        tree.cleanup(0, min_fang_pairs, pending);
        return;
    }

    let mut m = fmax;
    loop {
        if m < ms {
            break;
        }

        // k ranges up to m itself (square fangs permitted) unless m is
        // large enough that p_max/m already caps it below m.
        let k_max = if m >= big_m { p_max / m } else { m };

        if m % 9 != 1 && k_max > 0 {
            let mut k_min = div_ceil(p_min, m).max(1);
            while k_min <= k_max && !con9(m, k_min) {
                k_min += 1;
            }

            if k_min <= k_max {
                let mut k = k_min;
                let mut p = m * k;

                let mut k_lo = k % p_a;
                let mut k_hi = k / p_a;
                let mut p_lo = p % p_a;
                let p_rem = p / p_a;
                let mut p_hi1 = p_rem % p_a;
                let mut p_hi2 = p_rem / p_a;

                let step9m = 9 * m;
                let step9m_mod = step9m % p_a;
                let step9m_div = step9m / p_a;

                loop {
                    let f_m = cache.get(m);
                    let lhs = f_m + cache.get(k_hi) + cache.get(k_lo);
                    let rhs = cache.get(p_hi2) + cache.get(p_hi1) + cache.get(p_lo);

                    if lhs == rhs {
                        let m_trailing_zero = m % 10 == 0;
                        let k_trailing_zero = k % 10 == 0;
                        if !(m_trailing_zero && k_trailing_zero) {
                            tree.insert(p);
                            sink.record(m, k, p);
                        }
                    }

                    if k >= k_max {
                        break;
                    }
                    k += 9;
                    p += step9m;

                    k_lo += 9;
                    if k_lo >= p_a {
                        k_lo -= p_a;
                        k_hi += 1;
                    }

                    let mut carry = step9m_div;
                    p_lo += step9m_mod;
                    if p_lo >= p_a {
                        p_lo -= p_a;
                        carry += 1;
                    }
                    p_hi1 += carry;
                    if p_hi1 >= p_a {
                        p_hi1 -= p_a;
                        p_hi2 += 1;
                    }
                }
            }
        }

        // Sealing: once an outer iteration at a multiple-of-10 multiplier
        // finishes, no smaller multiplier can reuse its trailing-zero
        // column, so every tree node at or above this m's maximum
        // reachable product is provably final.
        if m < big_m && m % 10 == 0 {
            let threshold = m.saturating_mul(k_max);
            tree.cleanup(threshold, min_fang_pairs, pending);
        }

        if m == 0 {
            break;
        }
        m -= 1;
    }

    tree.cleanup(0, min_fang_pairs, pending);
}
