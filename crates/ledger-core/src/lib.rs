//! Core of a single-transaction-per-block proof-of-work ledger: the block
//! format and its hash contract, nonce mining, and chain validation with a
//! balance ledger.

pub mod block;
pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod hash;
pub mod mine;
pub mod record;
pub mod transaction;

pub use block::{canonical_string, Block, Timestamp};
pub use chain::{Chain, Verdict};
pub use config::{LedgerConfig, MiningConfig};
pub use error::{AdmissionError, LedgerError, MiningError, Result, ValidationError};
pub use hash::{HashAlgorithm, HashFunction, Sha1Hasher, Sha256Hasher};
pub use mine::{Miner, MiningLimits};
pub use record::{parse_records, render_records, BlockRecord};
pub use transaction::Transaction;
