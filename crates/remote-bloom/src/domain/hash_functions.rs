//! Hash functions for Bloom filter bit indexing
//!
//! Uses MurmurHash3 (x86, 32-bit) seeded with the hash function index, so
//! the `k` positions for one key come from `k` independently seeded hashes.
//! The 32-bit output is read as signed and reduced with a Euclidean
//! remainder, which keeps offsets compatible with filters written by the
//! Python `mmh3.hash(key, seed) % m` convention.

use std::fmt::Display;
use std::io::Cursor;

/// Canonical form of a key
///
/// Every key is reduced to its `Display` string before hashing. Insert and
/// query both go through here, so `42_u64` and `"42"` address the same bits.
pub fn canonical_key<K: Display + ?Sized>(key: &K) -> String {
    key.to_string()
}

/// Hash bytes with MurmurHash3 x86_32 using the given seed
pub fn murmur_hash(element: &[u8], seed: u32) -> u32 {
    let mut cursor = Cursor::new(element);
    // Reading from an in-memory cursor cannot fail
    murmur3::murmur3_32(&mut cursor, seed).unwrap_or(0)
}

/// Bit offset in `[0, size_bits)` for one hash function of one key
///
/// Pure: the same `(key, seed, size_bits)` always yields the same offset,
/// in-process and across restarts.
pub fn bit_index(key: &str, seed: u32, size_bits: u64) -> u64 {
    let hash = murmur_hash(key.as_bytes(), seed) as i32 as i64;
    hash.rem_euclid(size_bits as i64) as u64
}

/// All `k` bit offsets for a key, in seed order `0..k`
pub fn bit_positions(key: &str, hash_functions: u32, size_bits: u64) -> impl Iterator<Item = u64> + '_ {
    (0..hash_functions).map(move |seed| bit_index(key, seed, size_bits))
}
