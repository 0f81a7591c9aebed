use crate::constants::DIFFICULTY_PREFIX;
use crate::error::{LedgerError, Result};
use crate::hash::HashFunction;
use crate::transaction::Transaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Timestamp(i64);

impl TryFrom<i64> for Timestamp {
    type Error = LedgerError;

    fn try_from(millis: i64) -> Result<Self> {
        Timestamp::from_millis(millis)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl Timestamp {
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        Self(millis)
    }

    pub fn from_millis(millis: i64) -> Result<Self> {
        if DateTime::<Utc>::from_timestamp_millis(millis).is_none() {
            return Err(LedgerError::InvalidArgument(format!(
                "timestamp {millis} is out of range"
            )));
        }
        Ok(Self(millis))
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

/// JDBC-style rendering, `yyyy-mm-dd hh:mm:ss.f`, in UTC. The fraction keeps
/// at least one digit and drops trailing zeros. This string is hashed, so
/// it must not change.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(dt) = DateTime::<Utc>::from_timestamp_millis(self.0) else {
            return write!(f, "{}", self.0);
        };
        let nanos = self.0.rem_euclid(1000) * 1_000_000;
        let fraction = if nanos == 0 {
            "0".to_string()
        } else {
            format!("{nanos:09}").trim_end_matches('0').to_string()
        };
        write!(f, "{}.{}", dt.format("%Y-%m-%d %H:%M:%S"), fraction)
    }
}

/// The exact string that is hashed for a block. The index is not part of it.
pub fn canonical_string(
    timestamp: Timestamp,
    transaction: &Transaction,
    nonce: &str,
    previous_hash: &str,
) -> String {
    format!("{timestamp}:{transaction}.{nonce}{previous_hash}")
}

pub fn meets_difficulty(hash: &str) -> bool {
    hash.starts_with(DIFFICULTY_PREFIX)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Block {
    pub(crate) index: u64,
    pub(crate) timestamp: Timestamp,
    pub(crate) transaction: Transaction,
    pub(crate) nonce: String,
    pub(crate) previous_hash: String,
    pub(crate) hash: String,
}

impl Block {
    /// Build a block around a nonce that was already chosen, e.g. one read
    /// back from a stored chain. The hash is recomputed, never trusted.
    pub fn seal<H: HashFunction>(
        index: u64,
        timestamp: Timestamp,
        transaction: Transaction,
        nonce: impl Into<String>,
        previous_hash: impl Into<String>,
        hasher: &H,
    ) -> Result<Self> {
        let nonce = nonce.into();
        let previous_hash = previous_hash.into();
        if nonce.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "nonce must not be empty".to_string(),
            ));
        }
        if previous_hash.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "previous hash must not be empty".to_string(),
            ));
        }
        let hash = hasher.digest(&canonical_string(
            timestamp,
            &transaction,
            &nonce,
            &previous_hash,
        ));
        Ok(Self {
            index,
            timestamp,
            transaction,
            nonce,
            previous_hash,
            hash,
        })
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn canonical_string(&self) -> String {
        canonical_string(
            self.timestamp,
            &self.transaction,
            &self.nonce,
            &self.previous_hash,
        )
    }

    pub fn meets_difficulty(&self) -> bool {
        meets_difficulty(&self.hash)
    }

    /// The recomputed digest, if it differs from the stored hash.
    pub fn digest_mismatch<H: HashFunction>(&self, hasher: &H) -> Option<String> {
        let computed = hasher.digest(&self.canonical_string());
        (computed != self.hash).then_some(computed)
    }
}
