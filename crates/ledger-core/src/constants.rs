pub const DIFFICULTY_PREFIX: &str = "00000";
pub const GENESIS_PREVIOUS_HASH: &str = "00000";
pub const NONCE_CHAR_MIN: u8 = 33;
pub const NONCE_CHAR_MAX: u8 = 126;
pub const MAX_NONCE_LEN: usize = 20;
pub const DEFAULT_ISSUER: &str = "bitcoin";
pub const RECORD_LINES: usize = 7;
