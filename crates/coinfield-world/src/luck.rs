//! The deterministic hash collaborator.
//!
//! Everything the world regenerates from coordinates alone -- which cells
//! hold a cache and how many coins it starts with -- is a function of
//! [`Luck::luck`] applied to a string seed. Implementations must be pure
//! and stable across process restarts, otherwise regenerated caches stop
//! matching the mementos saved against them.
//!
//! Any `Fn(&str) -> f64` is a [`Luck`], which lets tests pin exact values
//! for specific seeds.

use sha2::{Digest, Sha256};

/// Maps a string seed to a number in `[0, 1)`, deterministically.
pub trait Luck {
    /// Return the luck value for `seed`. Must lie in `[0, 1)`.
    fn luck(&self, seed: &str) -> f64;
}

impl<F> Luck for F
where
    F: Fn(&str) -> f64,
{
    fn luck(&self, seed: &str) -> f64 {
        self(seed)
    }
}

/// 2^32, the width of the word taken from the digest.
const WORD_RANGE: f64 = 4_294_967_296.0;

/// Default [`Luck`] backed by SHA-256.
///
/// The first four bytes of `SHA-256(seed)` are read big-endian and scaled
/// into `[0, 1)`. Output is stable across platforms and releases.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Luck;

impl Luck for Sha256Luck {
    fn luck(&self, seed: &str) -> f64 {
        let digest = Sha256::digest(seed.as_bytes());
        let word = digest
            .as_slice()
            .first_chunk::<4>()
            .map_or(0, |bytes| u32::from_be_bytes(*bytes));
        f64::from(word) / WORD_RANGE
    }
}
