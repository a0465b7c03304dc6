//! Request profiles for benchmarking hoard arenas.
//!
//! - [`small_objects`]: many short-lived blocks, 8 to 256 bytes
//! - [`mixed_profile`]: sizes up to 64 KiB with varied alignment
//!
//! Profiles are deterministic for a given seed.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One allocation request: `(size, align)`.
pub type Request = (u32, u32);

/// `count` small requests with 8-byte alignment.
pub fn small_objects(count: usize, seed: u64) -> Vec<Request> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| (rng.random_range(8..=256), 8)).collect()
}

/// `count` requests mixing small and large blocks with alignments from 1
/// to 4096.
pub fn mixed_profile(count: usize, seed: u64) -> Vec<Request> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let size = if rng.random_bool(0.9) {
                rng.random_range(1..=512)
            } else {
                rng.random_range(4096..=65536)
            };
            (size, 1u32 << rng.random_range(0..=12u32))
        })
        .collect()
}
