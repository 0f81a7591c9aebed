use crate::block::{Block, Timestamp};
use crate::constants::{DEFAULT_ISSUER, GENESIS_PREVIOUS_HASH};
use crate::error::{AdmissionError, LedgerError, Result, ValidationError};
use crate::hash::{HashFunction, Sha1Hasher};
use crate::mine::Miner;
use crate::transaction::Transaction;
use rand::Rng;
use tracing::{debug, info, warn};

/// Outcome of validating a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(ValidationError),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn failure(&self) -> Option<&ValidationError> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(err) => Some(err),
        }
    }
}

impl From<std::result::Result<(), ValidationError>> for Verdict {
    fn from(res: std::result::Result<(), ValidationError>) -> Self {
        match res {
            Ok(()) => Verdict::Valid,
            Err(err) => Verdict::Invalid(err),
        }
    }
}

/// Append-only sequence of blocks plus the hashes they were recorded with.
///
/// `expected_hashes[i]` is the hash stored alongside block `i` in its
/// source record. Blocks appended after mining record their own hash.
#[derive(Clone, Debug)]
pub struct Chain<H: HashFunction = Sha1Hasher> {
    blocks: Vec<Block>,
    expected_hashes: Vec<String>,
    hasher: H,
    issuer: String,
}

impl Default for Chain<Sha1Hasher> {
    fn default() -> Self {
        Self::new(Sha1Hasher)
    }
}

impl<H: HashFunction> Chain<H> {
    pub fn new(hasher: H) -> Self {
        Self {
            blocks: Vec::new(),
            expected_hashes: Vec::new(),
            hasher,
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }

    /// Replace the money-supply account that is exempt from the solvency check.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn append(&mut self, block: Block) {
        self.expected_hashes.push(block.hash.clone());
        self.blocks.push(block);
    }

    /// Append a block read from storage along with the hash it was stored with.
    pub fn push_record(&mut self, block: Block, expected_hash: impl Into<String>) {
        self.expected_hashes.push(expected_hash.into());
        self.blocks.push(block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, position: usize) -> Option<&Block> {
        self.blocks.get(position)
    }

    pub fn expected_hash(&self, position: usize) -> Option<&str> {
        self.expected_hashes.get(position).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Hash the next block must link to: the last block's hash, or the
    /// genesis marker on an empty chain.
    pub fn tip_hash(&self) -> &str {
        self.blocks
            .last()
            .map(|b| b.hash.as_str())
            .unwrap_or(GENESIS_PREVIOUS_HASH)
    }

    /// Index the next block must carry, or `None` once the last block holds
    /// the largest representable index.
    pub fn next_index(&self) -> Option<u64> {
        match self.blocks.last() {
            Some(b) => b.index.checked_add(1),
            None => Some(0),
        }
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.blocks.iter().map(|b| &b.transaction)
    }

    /// Every sender and receiver label, deduplicated, in order of first appearance.
    pub fn participants(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for tx in self.transactions() {
            for label in [tx.sender(), tx.receiver()] {
                if !seen.contains(&label) {
                    seen.push(label);
                }
            }
        }
        seen
    }

    pub fn balance_of(&self, participant: &str) -> i128 {
        self.transactions()
            .map(|tx| tx.delta_for(participant))
            .sum()
    }

    pub fn balances(&self) -> Vec<(String, i128)> {
        self.participants()
            .into_iter()
            .map(|p| (p.to_string(), self.balance_of(p)))
            .collect()
    }

    /// Check hashes, linkage, indices and solvency, stopping at the first
    /// failure. Block-level checks run block by block in chain order; the
    /// solvency check runs last.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let res = self.validate_blocks().and_then(|_| self.validate_balances());
        match &res {
            Ok(()) => debug!(blocks = self.blocks.len(), "chain is valid"),
            Err(err) => warn!("chain is invalid: {err}"),
        }
        res
    }

    pub fn verdict(&self) -> Verdict {
        self.validate().into()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn validate_blocks(&self) -> std::result::Result<(), ValidationError> {
        for (i, (block, expected)) in self.blocks.iter().zip(&self.expected_hashes).enumerate() {
            if block.hash != *expected {
                return Err(ValidationError::HashMismatch {
                    index: i,
                    expected: expected.clone(),
                    actual: block.hash.clone(),
                });
            }
            if let Some(computed) = block.digest_mismatch(&self.hasher) {
                return Err(ValidationError::DigestMismatch {
                    index: i,
                    stored: block.hash.clone(),
                    computed,
                });
            }
            if !block.meets_difficulty() {
                return Err(ValidationError::InsufficientWork {
                    index: i,
                    hash: block.hash.clone(),
                });
            }

            if i == 0 {
                if block.index != 0 {
                    return Err(ValidationError::GenesisIndex {
                        index: i,
                        found: block.index,
                    });
                }
                if block.previous_hash != GENESIS_PREVIOUS_HASH {
                    return Err(ValidationError::GenesisPreviousHash {
                        index: i,
                        found: block.previous_hash.clone(),
                    });
                }
                continue;
            }

            let prev = &self.blocks[i - 1];
            if block.previous_hash != prev.hash {
                return Err(ValidationError::BrokenLink {
                    index: i,
                    expected: prev.hash.clone(),
                    found: block.previous_hash.clone(),
                });
            }
            if prev.index.checked_add(1) != Some(block.index) {
                return Err(ValidationError::IndexGap {
                    index: i,
                    previous: prev.index,
                    found: block.index,
                });
            }
        }
        Ok(())
    }

    fn validate_balances(&self) -> std::result::Result<(), ValidationError> {
        for participant in self.participants() {
            if participant == self.issuer {
                continue;
            }
            let balance = self.balance_of(participant);
            if balance < 0 {
                return Err(ValidationError::NegativeBalance {
                    index: self.first_overdraft(participant),
                    participant: participant.to_string(),
                    balance,
                });
            }
        }
        Ok(())
    }

    /// Position of the block where `participant`'s running balance first
    /// dropped below zero.
    fn first_overdraft(&self, participant: &str) -> usize {
        let mut running = 0i128;
        for (i, tx) in self.transactions().enumerate() {
            running += tx.delta_for(participant);
            if running < 0 {
                return i;
            }
        }
        self.blocks.len().saturating_sub(1)
    }

    /// Confirm the sender can cover `tx` before it is mined.
    pub fn check_admission(&self, tx: &Transaction) -> std::result::Result<(), AdmissionError> {
        let balance = self.balance_of(tx.sender());
        if balance >= i128::from(tx.amount()) {
            Ok(())
        } else {
            Err(AdmissionError::InsufficientFunds {
                sender: tx.sender().to_string(),
                balance,
                amount: tx.amount(),
            })
        }
    }

    /// Admit, mine and append a new transaction.
    ///
    /// On an empty chain the transaction becomes the genesis block and must
    /// be sent by the issuer; otherwise the sender must hold enough funds.
    pub fn submit<R: Rng>(
        &mut self,
        transaction: Transaction,
        timestamp: Timestamp,
        miner: &mut Miner<R>,
    ) -> Result<&Block> {
        if self.is_empty() {
            if transaction.sender() != self.issuer {
                return Err(AdmissionError::NotIssuer {
                    sender: transaction.sender().to_string(),
                    issuer: self.issuer.clone(),
                }
                .into());
            }
        } else {
            self.check_admission(&transaction)?;
        }

        let index = self.next_index().ok_or_else(|| {
            LedgerError::InvalidArgument(
                "the chain has reached the largest block index".to_string(),
            )
        })?;
        let previous_hash = self.tip_hash().to_string();
        let block = miner.mine_block(index, timestamp, transaction, previous_hash, &self.hasher)?;
        info!("Appending block {} ({})", block.index, block.hash);
        let position = self.blocks.len();
        self.append(block);
        Ok(&self.blocks[position])
    }
}
