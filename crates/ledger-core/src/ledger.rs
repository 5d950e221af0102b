use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::block::Block;
use crate::clock::{Clock, SystemClock};
use crate::config::{validate_difficulty, ConfigError, LedgerConfig};
use crate::constants::{GENESIS_MESSAGE, GENESIS_PREVIOUS_HASH};
use crate::event::{EventRecord, MiningReward};

/// Ordered chain of sealed blocks plus the buffer of events waiting for the next seal.
///
/// The ledger never validates events; that is the contract's job. Corruption
/// is detected by [`Ledger::is_valid`], not prevented.
#[derive(Clone)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<EventRecord>,
    config: LedgerConfig,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Default configuration on the system clock.
    pub fn new() -> Self {
        Self::build(LedgerConfig::default(), Arc::new(SystemClock))
    }

    pub fn with_config(config: LedgerConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: LedgerConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: LedgerConfig, clock: Arc<dyn Clock>) -> Self {
        let genesis = genesis_block(clock.now_millis());
        Self {
            chain: vec![genesis],
            pending: Vec::new(),
            config,
            clock,
        }
    }

    /// Queues a record for the next seal.
    pub fn add_event(&mut self, record: impl Into<EventRecord>) {
        let record = record.into();
        debug!(kind = record.kind(), pending = self.pending.len() + 1, "event queued");
        self.pending.push(record);
    }

    /// Mines every pending event, plus a reward for `beneficiary`, into a new
    /// block and appends it. Returns the new block's hash.
    ///
    /// Blocks the calling thread for the whole proof-of-work search.
    pub fn seal_pending(&mut self, beneficiary: impl Into<String>) -> String {
        let mut block = self.next_block(beneficiary.into());
        if self.config.parallel_mining {
            block.seal_parallel(self.config.difficulty);
        } else {
            block.seal(self.config.difficulty);
        }
        self.append(block)
    }

    /// Like [`Ledger::seal_pending`], but gives up when `stop` is raised. A
    /// cancelled seal leaves the chain and the pending buffer as they were.
    pub fn seal_pending_until(
        &mut self,
        beneficiary: impl Into<String>,
        stop: &AtomicBool,
    ) -> Option<String> {
        let mut block = self.next_block(beneficiary.into());
        if block.seal_until(self.config.difficulty, stop) {
            return Some(self.append(block));
        }
        // Drop the reward and hand the events back.
        block.payload.pop();
        self.pending = block.payload;
        debug!(index = block.index, "seal cancelled");
        None
    }

    fn next_block(&mut self, beneficiary: String) -> Block {
        let reward = MiningReward {
            amount: self.config.mining_reward,
            to: beneficiary,
        };
        let mut payload = std::mem::take(&mut self.pending);
        payload.push(reward.into());
        Block::new(
            self.chain.len() as u64,
            self.clock.now_millis(),
            payload,
            self.latest_block().hash.clone(),
        )
    }

    fn append(&mut self, block: Block) -> String {
        let hash = block.hash.clone();
        self.chain.push(block);
        hash
    }

    /// True when every block's hash matches its content and links to its predecessor.
    pub fn is_valid(&self) -> bool {
        self.first_invalid_block().is_none()
    }

    /// Index of the first block that fails the integrity check.
    pub fn first_invalid_block(&self) -> Option<u64> {
        let genesis = &self.chain[0];
        if genesis.index != 0
            || genesis.previous_hash != GENESIS_PREVIOUS_HASH
            || !genesis.hash_matches()
        {
            warn!(index = 0, "genesis block failed integrity check");
            return Some(0);
        }

        for pair in self.chain.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if !current.hash_matches() {
                warn!(index = current.index, "block hash does not match its content");
                return Some(current.index);
            }
            if current.previous_hash != previous.hash {
                warn!(index = current.index, "block does not link to its predecessor");
                return Some(current.index);
            }
        }
        None
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[EventRecord] {
        &self.pending
    }

    pub fn latest_block(&self) -> &Block {
        // The chain always holds at least the genesis block.
        &self.chain[self.chain.len() - 1]
    }

    pub fn block_count(&self) -> usize {
        self.chain.len()
    }

    /// Every sealed record, in chain order, with the block that holds it.
    pub fn sealed_events(&self) -> impl Iterator<Item = (&Block, &EventRecord)> + '_ {
        self.chain
            .iter()
            .flat_map(|block| block.payload.iter().map(move |record| (block, record)))
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn difficulty(&self) -> usize {
        self.config.difficulty
    }

    /// Applies to future seals only.
    pub fn set_difficulty(&mut self, difficulty: usize) -> Result<(), ConfigError> {
        validate_difficulty(difficulty)?;
        self.config.difficulty = difficulty;
        Ok(())
    }

    pub fn mining_reward(&self) -> f64 {
        self.config.mining_reward
    }

    /// Current reading of the ledger's clock, in milliseconds.
    pub fn now(&self) -> u64 {
        self.clock.now_millis()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("blocks", &self.chain.len())
            .field("pending", &self.pending.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Unmined first block: index 0, previous hash `"0"`, a single placeholder record.
pub fn genesis_block(timestamp: u64) -> Block {
    Block::new(
        0,
        timestamp,
        vec![EventRecord::Genesis {
            message: GENESIS_MESSAGE.to_string(),
        }],
        GENESIS_PREVIOUS_HASH,
    )
}
