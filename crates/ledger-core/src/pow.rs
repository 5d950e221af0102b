//! Proof-of-work search over the block preimage.
//!
//! The digest input is the block's canonical JSON, which orders keys
//! alphabetically: `index`, `nonce`, `payload`, `previous_hash`, `timestamp`.
//! Only the nonce varies while mining, so the bytes on either side of it are
//! encoded once and the search hashes `head || nonce || tail`.

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};

/// How many nonces the cancellable search tries between checks of the stop flag.
const STOP_CHECK_INTERVAL: u64 = 1024;

/// The fixed parts of a block's canonical encoding.
#[derive(Clone, Debug)]
pub struct Preimage {
    head: Vec<u8>,
    tail: Vec<u8>,
}

impl Preimage {
    pub fn new(head: Vec<u8>, tail: Vec<u8>) -> Self {
        Self { head, tail }
    }

    /// The exact bytes hashed for `nonce`.
    pub fn bytes(&self, nonce: u64) -> Vec<u8> {
        let nonce = nonce.to_string();
        let mut out = Vec::with_capacity(self.head.len() + nonce.len() + self.tail.len());
        out.extend_from_slice(&self.head);
        out.extend_from_slice(nonce.as_bytes());
        out.extend_from_slice(&self.tail);
        out
    }

    /// Lowercase hex SHA-256 of the encoding for `nonce`.
    pub fn hash_hex(&self, nonce: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.head);
        hasher.update(nonce.to_string().as_bytes());
        hasher.update(&self.tail);
        hex::encode(hasher.finalize())
    }
}

/// Number of leading `'0'` characters in a hex digest.
pub fn leading_hex_zeros(hash: &str) -> usize {
    hash.bytes().take_while(|b| *b == b'0').count()
}

pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    leading_hex_zeros(hash) >= difficulty
}

/// Try nonces `start, start + 1, ...` until one meets `difficulty`. Unbounded.
pub fn search(preimage: &Preimage, start: u64, difficulty: usize) -> (u64, String) {
    let mut nonce = start;
    loop {
        let hash = preimage.hash_hex(nonce);
        if meets_difficulty(&hash, difficulty) {
            return (nonce, hash);
        }
        nonce = nonce.wrapping_add(1);
    }
}

/// Parallel version of [`search`]. `find_first` keeps the lowest winning nonce,
/// so the result is the one the sequential search would return.
pub fn search_parallel(preimage: &Preimage, start: u64, difficulty: usize) -> (u64, String) {
    let found = (start..u64::MAX)
        .into_par_iter()
        .find_first(|nonce| meets_difficulty(&preimage.hash_hex(*nonce), difficulty));

    match found {
        Some(nonce) => (nonce, preimage.hash_hex(nonce)),
        // Nothing above `start`; wrap around like the sequential search.
        None => search(preimage, u64::MAX, difficulty),
    }
}

/// Sequential search that gives up once `stop` is raised.
pub fn search_until(
    preimage: &Preimage,
    start: u64,
    difficulty: usize,
    stop: &AtomicBool,
) -> Option<(u64, String)> {
    let mut nonce = start;
    let mut tried = 0u64;
    loop {
        if tried.is_multiple_of(STOP_CHECK_INTERVAL) && stop.load(Ordering::Relaxed) {
            return None;
        }
        let hash = preimage.hash_hex(nonce);
        if meets_difficulty(&hash, difficulty) {
            return Some((nonce, hash));
        }
        nonce = nonce.wrapping_add(1);
        tried += 1;
    }
}
