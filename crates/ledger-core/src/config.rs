use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_DIFFICULTY, DEFAULT_MINING_REWARD, HASH_HEX_SIZE};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("difficulty {0} exceeds the 64 hex digits of a block hash")]
    DifficultyTooHigh(usize),
    #[error("mining reward must be a finite, non-negative amount (got {0})")]
    InvalidReward(f64),
}

/// Tuning knobs for a [`crate::Ledger`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Required number of leading hex zeros in a sealed block hash.
    pub difficulty: usize,
    /// Amount credited to the beneficiary of every seal.
    pub mining_reward: f64,
    /// Search the nonce space on the rayon pool instead of the calling thread.
    pub parallel_mining: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            mining_reward: DEFAULT_MINING_REWARD,
            parallel_mining: false,
        }
    }
}

impl LedgerConfig {
    pub fn with_difficulty(mut self, difficulty: usize) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_mining_reward(mut self, mining_reward: f64) -> Self {
        self.mining_reward = mining_reward;
        self
    }

    pub fn with_parallel_mining(mut self, parallel_mining: bool) -> Self {
        self.parallel_mining = parallel_mining;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_difficulty(self.difficulty)?;
        if !self.mining_reward.is_finite() || self.mining_reward < 0.0 {
            return Err(ConfigError::InvalidReward(self.mining_reward));
        }
        Ok(())
    }
}

pub(crate) fn validate_difficulty(difficulty: usize) -> Result<(), ConfigError> {
    if difficulty > HASH_HEX_SIZE {
        return Err(ConfigError::DifficultyTooHigh(difficulty));
    }
    Ok(())
}
