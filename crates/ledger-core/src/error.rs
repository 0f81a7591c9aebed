use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("malformed record at line {line}: {message}")]
    Record { line: usize, message: String },
    #[error(transparent)]
    Mining(#[from] MiningError),
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error("config error: {0}")]
    Config(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiningError {
    #[error("mining budget exhausted after {attempts} attempts")]
    Exhausted { attempts: u64 },
    #[error("mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },
}

/// Why a new transaction was refused before mining.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("{sender} has a balance of {balance} and cannot send {amount}")]
    InsufficientFunds {
        sender: String,
        balance: i128,
        amount: i64,
    },
    #[error("the first block must be issued by {issuer}, not {sender}")]
    NotIssuer { sender: String, issuer: String },
}

/// The first check that failed while validating a chain.
///
/// `index` is always the position of the offending block in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("block {index}: hash {actual} does not match recorded hash {expected}")]
    HashMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("block {index}: stored hash {stored} is not the digest of its contents ({computed})")]
    DigestMismatch {
        index: usize,
        stored: String,
        computed: String,
    },
    #[error("block {index}: hash {hash} does not meet the difficulty prefix")]
    InsufficientWork { index: usize, hash: String },
    #[error("block {index}: genesis index is {found}, expected 0")]
    GenesisIndex { index: usize, found: u64 },
    #[error("block {index}: genesis previous hash is {found}, expected the genesis marker")]
    GenesisPreviousHash { index: usize, found: String },
    #[error("block {index}: previous hash {found} does not link to {expected}")]
    BrokenLink {
        index: usize,
        expected: String,
        found: String,
    },
    #[error("block {index}: index {found} does not follow {previous}")]
    IndexGap {
        index: usize,
        previous: u64,
        found: u64,
    },
    #[error("block {index}: {participant} has a negative balance of {balance}")]
    NegativeBalance {
        index: usize,
        participant: String,
        balance: i128,
    },
}

impl ValidationError {
    pub fn block_index(&self) -> usize {
        match self {
            ValidationError::HashMismatch { index, .. }
            | ValidationError::DigestMismatch { index, .. }
            | ValidationError::InsufficientWork { index, .. }
            | ValidationError::GenesisIndex { index, .. }
            | ValidationError::GenesisPreviousHash { index, .. }
            | ValidationError::BrokenLink { index, .. }
            | ValidationError::IndexGap { index, .. }
            | ValidationError::NegativeBalance { index, .. } => *index,
        }
    }
}
