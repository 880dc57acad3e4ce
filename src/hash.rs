//! Digest derivation.
//!
//! Every table operation hashes its key exactly once into a 64-bit digest.
//! The digest is cached beside the record, its low bits (masked by
//! `capacity - 1`) pick the ideal slot, and its top seven bits form the
//! one-byte tag compared before any key equality check.

use core::hash::BuildHasher;
use core::hash::Hasher;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is given explicitly.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    }
}

/// The 64-bit murmur3 finalizer. Every input bit affects every output bit
/// with probability close to one half.
#[inline(always)]
pub const fn fmix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}

#[inline(always)]
pub(crate) fn ideal_index(digest: u64, mask: usize) -> usize {
    digest as usize & mask
}

#[inline(always)]
pub(crate) fn hashtag(digest: u64) -> u8 {
    (digest >> 57) as u8
}

/// FNV-1a over the written bytes, finalized with [`fmix64`].
///
/// Deterministic across runs and processes, which makes probe layouts
/// reproducible. Not resistant to adversarial keys.
#[derive(Debug, Clone, Copy)]
pub struct FnvMixHasher {
    state: u64,
}

impl FnvMixHasher {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    /// Creates a hasher in its initial state.
    pub const fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for FnvMixHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvMixHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }

    #[inline]
    fn write_u64(&mut self, value: u64) {
        // One multiply per word instead of eight; fmix64 in `finish` restores
        // the avalanche.
        self.state ^= value;
        self.state = self.state.wrapping_mul(Self::PRIME);
    }

    #[inline]
    fn write_usize(&mut self, value: usize) {
        self.write_u64(value as u64);
    }

    #[inline]
    fn finish(&self) -> u64 {
        fmix64(self.state)
    }
}

/// Builds [`FnvMixHasher`]s.
///
/// # Examples
///
/// ```rust
/// use core::hash::BuildHasher;
///
/// use robin_hash::hash::FnvMixBuilder;
///
/// let builder = FnvMixBuilder;
/// assert_eq!(builder.hash_one(42u64), builder.hash_one(42u64));
/// assert_ne!(builder.hash_one(42u64), builder.hash_one(43u64));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FnvMixBuilder;

impl BuildHasher for FnvMixBuilder {
    type Hasher = FnvMixHasher;

    fn build_hasher(&self) -> Self::Hasher {
        FnvMixHasher::new()
    }
}
