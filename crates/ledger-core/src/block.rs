use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use tracing::info;

use crate::event::EventRecord;
use crate::pow::{self, Preimage};

/// One sealed (or about to be sealed) unit of the ledger.
///
/// Fields are public so the chain can be inspected freely. Changing any of
/// them after the block is appended breaks the hash linkage, which
/// [`crate::Ledger::is_valid`] reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub payload: Vec<EventRecord>,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
}

impl Block {
    /// Builds a block with nonce 0 and its provisional hash.
    pub fn new(
        index: u64,
        timestamp: u64,
        payload: Vec<EventRecord>,
        previous_hash: impl Into<String>,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            payload,
            previous_hash: previous_hash.into(),
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.digest();
        block
    }

    /// Sorted-key compact JSON of everything but `hash`, split around the nonce.
    pub fn preimage(&self) -> Preimage {
        let payload = serde_json::to_value(&self.payload)
            .and_then(|value| serde_json::to_string(&value))
            .expect("event records serialize to JSON");
        let previous_hash =
            serde_json::to_string(&self.previous_hash).expect("strings serialize to JSON");

        let head = format!(r#"{{"index":{},"nonce":"#, self.index).into_bytes();
        let tail = format!(
            r#","payload":{},"previous_hash":{},"timestamp":{}}}"#,
            payload, previous_hash, self.timestamp
        )
        .into_bytes();
        Preimage::new(head, tail)
    }

    /// SHA-256 of the canonical encoding, as lowercase hex.
    pub fn digest(&self) -> String {
        self.preimage().hash_hex(self.nonce)
    }

    /// True when the stored hash matches the block's content.
    pub fn hash_matches(&self) -> bool {
        self.hash == self.digest()
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Increments the nonce until the hash has `difficulty` leading hex zeros.
    pub fn seal(&mut self, difficulty: usize) -> &str {
        let (nonce, hash) = pow::search(&self.preimage(), self.nonce, difficulty);
        self.finish(nonce, hash)
    }

    /// Same outcome as [`Block::seal`], with the search spread over the rayon pool.
    pub fn seal_parallel(&mut self, difficulty: usize) -> &str {
        let (nonce, hash) = pow::search_parallel(&self.preimage(), self.nonce, difficulty);
        self.finish(nonce, hash)
    }

    /// Sequential seal that stops early when `stop` is raised. A cancelled block
    /// is left exactly as it was and `false` is returned.
    pub fn seal_until(&mut self, difficulty: usize, stop: &AtomicBool) -> bool {
        match pow::search_until(&self.preimage(), self.nonce, difficulty, stop) {
            Some((nonce, hash)) => {
                self.finish(nonce, hash);
                true
            }
            None => false,
        }
    }

    fn finish(&mut self, nonce: u64, hash: String) -> &str {
        self.nonce = nonce;
        self.hash = hash;
        info!(index = self.index, nonce, hash = %self.hash, "block mined");
        &self.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MiningReward, TrainRegistered};
    use crate::pow::leading_hex_zeros;

    fn sample_payload() -> Vec<EventRecord> {
        vec![
            TrainRegistered {
                train_id: "T1".to_string(),
                route: vec!["A".to_string(), "B".to_string(), "C".to_string()],
                total_seats: 2,
                fare_per_seat: 100.0,
                timestamp: 1_600_000_000_000,
            }
            .into(),
            MiningReward {
                amount: 100.0,
                to: "system".to_string(),
            }
            .into(),
        ]
    }

    fn genesis_like() -> Block {
        Block::new(
            0,
            1_600_000_000_000,
            vec![EventRecord::Genesis {
                message: "Genesis Block".to_string(),
            }],
            "0",
        )
    }

    #[test]
    fn preimage_is_sorted_key_json() {
        let block = Block::new(3, 1_600_000_000_000, sample_payload(), "abc");
        let expected = serde_json::to_vec(&serde_json::json!({
            "index": block.index,
            "timestamp": block.timestamp,
            "payload": serde_json::to_value(&block.payload).unwrap(),
            "previous_hash": block.previous_hash,
            "nonce": block.nonce,
        }))
        .unwrap();
        assert_eq!(block.preimage().bytes(block.nonce), expected);
    }

    #[test]
    fn block_hash_example() {
        let block = genesis_like();
        let expected = concat!(
            r#"{"index":0,"nonce":0,"payload":[{"message":"Genesis Block","type":"genesis"}],"#,
            r#""previous_hash":"0","timestamp":1600000000000}"#
        );
        assert_eq!(block.preimage().bytes(0), expected.as_bytes());
        assert_eq!(block.hash, GENESIS_LIKE_HASH);
    }

    const GENESIS_LIKE_HASH: &str = "06f5374e50cf1c654502776d9b5a6efc4f91c4970d9d5e39c1b1804675c88eca";

    #[test]
    fn new_block_hash_matches_digest() {
        let block = Block::new(1, 1_600_000_000_000, sample_payload(), "00ab");
        assert_eq!(block.nonce, 0);
        assert!(block.hash_matches());
        assert_eq!(block.hash.len(), 64);
    }

    #[test]
    fn block_hash_consistency() {
        let block = Block::new(1, 1_600_000_000_000, sample_payload(), "00ab");
        assert_eq!(block.digest(), block.digest());
    }

    #[test]
    fn block_hash_changes_with_nonce() {
        let mut block = Block::new(1, 1_600_000_000_000, sample_payload(), "00ab");
        let before = block.digest();
        block.nonce += 1;
        assert_ne!(before, block.digest());
        assert!(!block.hash_matches());
    }

    #[test]
    fn block_hash_changes_with_payload() {
        let mut block = Block::new(1, 1_600_000_000_000, sample_payload(), "00ab");
        block.payload.pop();
        assert!(!block.hash_matches());
    }

    #[test]
    fn seal_meets_every_small_difficulty() {
        for difficulty in 0..=4 {
            let mut block = Block::new(1, 1_600_000_000_000, sample_payload(), "00ab");
            let hash = block.seal(difficulty).to_string();
            assert!(leading_hex_zeros(&hash) >= difficulty, "difficulty {difficulty}");
            assert!(block.hash_matches());
        }
    }

    #[test]
    fn parallel_seal_meets_difficulty_five() {
        let mut block = Block::new(1, 1_600_000_000_000, sample_payload(), "00ab");
        block.seal_parallel(5);
        assert!(leading_hex_zeros(&block.hash) >= 5);
        assert!(block.hash_matches());
    }

    #[test]
    #[ignore = "brute-forces about 16 million hashes"]
    fn parallel_seal_meets_difficulty_six() {
        let mut block = Block::new(1, 1_600_000_000_000, sample_payload(), "00ab");
        block.seal_parallel(6);
        assert!(leading_hex_zeros(&block.hash) >= 6);
        assert!(block.hash_matches());
    }

    #[test]
    fn seal_zero_difficulty_keeps_provisional_hash() {
        let mut block = genesis_like();
        let provisional = block.hash.clone();
        block.seal(0);
        assert_eq!(block.nonce, 0);
        assert_eq!(block.hash, provisional);
    }

    #[test]
    fn parallel_and_sequential_seals_agree() {
        let mut a = Block::new(2, 1_600_000_000_000, sample_payload(), "00ab");
        let mut b = a.clone();
        a.seal(3);
        b.seal_parallel(3);
        assert_eq!(a, b);
    }

    #[test]
    fn cancelled_seal_leaves_block_untouched() {
        let mut block = Block::new(2, 1_600_000_000_000, sample_payload(), "00ab");
        let before = block.clone();
        let stop = AtomicBool::new(true);
        assert!(!block.seal_until(10, &stop));
        assert_eq!(block, before);
    }

    #[test]
    fn block_serialization_example() {
        let block = Block::new(1, 1_600_000_000_000, sample_payload(), "00ab");
        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
        assert!(back.hash_matches());
    }
}
