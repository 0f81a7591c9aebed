//! Line-oriented block records.
//!
//! Each block is stored as seven consecutive lines: index, timestamp in
//! epoch milliseconds, sender, receiver, amount, nonce and hash. The
//! previous hash is not stored; it is rebuilt from the preceding block when
//! a chain is loaded.

use crate::block::{Block, Timestamp};
use crate::chain::Chain;
use crate::constants::{GENESIS_PREVIOUS_HASH, RECORD_LINES};
use crate::error::{LedgerError, Result};
use crate::hash::HashFunction;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub index: u64,
    pub timestamp_ms: i64,
    pub sender: String,
    pub receiver: String,
    pub amount: i64,
    pub nonce: String,
    pub hash: String,
}

impl BlockRecord {
    pub fn from_block(block: &Block) -> Self {
        Self {
            index: block.index(),
            timestamp_ms: block.timestamp().as_millis(),
            sender: block.transaction().sender().to_string(),
            receiver: block.transaction().receiver().to_string(),
            amount: block.transaction().amount(),
            nonce: block.nonce().to_string(),
            hash: block.hash().to_string(),
        }
    }

    fn lines(&self) -> [String; RECORD_LINES] {
        [
            self.index.to_string(),
            self.timestamp_ms.to_string(),
            self.sender.clone(),
            self.receiver.clone(),
            self.amount.to_string(),
            self.nonce.clone(),
            self.hash.clone(),
        ]
    }
}

fn parse_field<T: FromStr>(raw: &str, line: usize, name: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| LedgerError::Record {
        line,
        message: format!("expected {name}, found {raw:?}"),
    })
}

pub fn parse_records(text: &str) -> Result<Vec<BlockRecord>> {
    let lines: Vec<&str> = text.lines().collect();
    let complete = lines.len() / RECORD_LINES * RECORD_LINES;
    if complete < lines.len() {
        warn!(
            "ignoring {} trailing line(s) that do not form a full record",
            lines.len() - complete
        );
    }

    let mut records = Vec::with_capacity(complete / RECORD_LINES);
    for (n, chunk) in lines[..complete].chunks(RECORD_LINES).enumerate() {
        let first = n * RECORD_LINES + 1;
        records.push(BlockRecord {
            index: parse_field(chunk[0], first, "a block index")?,
            timestamp_ms: parse_field(chunk[1], first + 1, "a timestamp in milliseconds")?,
            sender: chunk[2].to_string(),
            receiver: chunk[3].to_string(),
            amount: parse_field(chunk[4], first + 4, "an amount")?,
            nonce: chunk[5].to_string(),
            hash: chunk[6].trim().to_string(),
        });
    }
    debug!(records = records.len(), "parsed block records");
    Ok(records)
}

pub fn render_records(records: &[BlockRecord]) -> String {
    let mut out = String::new();
    for record in records {
        for line in record.lines() {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

impl<H: HashFunction> Chain<H> {
    /// Rebuild a chain from stored records.
    ///
    /// Every block is re-sealed with its stored nonce. Index 0 links to the
    /// genesis marker, every other block to the block rebuilt before it. The
    /// stored hash is kept as the expected hash for validation.
    pub fn from_records(records: &[BlockRecord], hasher: H) -> Result<Self> {
        let mut chain = Chain::new(hasher);
        for (n, record) in records.iter().enumerate() {
            let line = n * RECORD_LINES + 1;
            let at_line = |err: LedgerError| LedgerError::Record {
                line,
                message: err.to_string(),
            };

            let previous_hash = if record.index == 0 {
                GENESIS_PREVIOUS_HASH.to_string()
            } else {
                chain.tip_hash().to_string()
            };
            let transaction =
                Transaction::new(record.sender.clone(), record.receiver.clone(), record.amount)
                    .map_err(at_line)?;
            let timestamp = Timestamp::from_millis(record.timestamp_ms).map_err(at_line)?;
            let block = Block::seal(
                record.index,
                timestamp,
                transaction,
                record.nonce.clone(),
                previous_hash,
                chain.hasher(),
            )
            .map_err(at_line)?;
            chain.push_record(block, record.hash.clone());
        }
        Ok(chain)
    }

    pub fn to_records(&self) -> Vec<BlockRecord> {
        self.blocks().iter().map(BlockRecord::from_block).collect()
    }
}
