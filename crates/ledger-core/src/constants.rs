pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const DEFAULT_DIFFICULTY: usize = 4;
pub const DEFAULT_MINING_REWARD: f64 = 100.0;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const GENESIS_MESSAGE: &str = "Genesis Block";
pub const MILLIS_PER_HOUR: u64 = 3_600_000;
