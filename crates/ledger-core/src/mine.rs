use crate::block::{canonical_string, meets_difficulty, Block, Timestamp};
use crate::constants::{MAX_NONCE_LEN, NONCE_CHAR_MAX, NONCE_CHAR_MIN};
use crate::error::{LedgerError, MiningError, Result};
use crate::hash::HashFunction;
use crate::transaction::Transaction;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Optional bounds on a nonce search. The default is unbounded.
#[derive(Clone, Debug, Default)]
pub struct MiningLimits {
    pub max_attempts: Option<u64>,
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Proof-of-work search driven by an injected random source.
pub struct Miner<R = StdRng> {
    rng: R,
    limits: MiningLimits,
    attempts: u64,
}

impl Miner<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Miner<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            limits: MiningLimits::default(),
            attempts: 0,
        }
    }

    pub fn with_limits(mut self, limits: MiningLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.limits.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.limits.cancel = Some(cancel);
        self
    }

    /// Hash attempts made by the most recent `mine_block` call.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn random_nonce(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| self.rng.gen_range(NONCE_CHAR_MIN..=NONCE_CHAR_MAX) as char)
            .collect()
    }

    /// Search for a nonce whose block hash starts with the difficulty prefix.
    ///
    /// Each round tries one random nonce of every length from 1 to 20, short
    /// ones first, and rounds repeat until a hash is accepted. The first
    /// accepted nonce wins.
    pub fn mine_block<H: HashFunction>(
        &mut self,
        index: u64,
        timestamp: Timestamp,
        transaction: Transaction,
        previous_hash: impl Into<String>,
        hasher: &H,
    ) -> Result<Block> {
        let previous_hash = previous_hash.into();
        if previous_hash.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "previous hash must not be empty".to_string(),
            ));
        }
        self.attempts = 0;
        let mut rounds = 0u64;
        loop {
            for len in 1..=MAX_NONCE_LEN {
                self.check_limits()?;
                let nonce = self.random_nonce(len);
                self.attempts += 1;
                let hash = hasher.digest(&canonical_string(
                    timestamp,
                    &transaction,
                    &nonce,
                    &previous_hash,
                ));
                if meets_difficulty(&hash) {
                    info!(
                        "Mined block {} with nonce {:?} after {} attempts: {}",
                        index, nonce, self.attempts, hash
                    );
                    return Ok(Block {
                        index,
                        timestamp,
                        transaction,
                        nonce,
                        previous_hash,
                        hash,
                    });
                }
            }
            rounds += 1;
            trace!(index, rounds, "nonce sweep finished without a match");
            if rounds % 10_000 == 0 {
                debug!(index, attempts = self.attempts, "still mining");
            }
        }
    }

    fn check_limits(&self) -> std::result::Result<(), MiningError> {
        if let Some(max) = self.limits.max_attempts {
            if self.attempts >= max {
                warn!(attempts = self.attempts, "mining budget exhausted");
                return Err(MiningError::Exhausted {
                    attempts: self.attempts,
                });
            }
        }
        if let Some(cancel) = &self.limits.cancel {
            if cancel.load(Ordering::Relaxed) {
                warn!(attempts = self.attempts, "mining cancelled");
                return Err(MiningError::Cancelled {
                    attempts: self.attempts,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Sha1Hasher;
    use crate::test_support::{ts, EasyHasher, NeverHasher};

    fn tx() -> Transaction {
        Transaction::new("bitcoin", "alice", 100).unwrap()
    }

    /// Accepts only inputs of one exact length, i.e. one nonce length.
    struct LengthHasher(usize);

    impl HashFunction for LengthHasher {
        fn digest(&self, input: &str) -> String {
            if input.len() == self.0 {
                "00000accepted".to_string()
            } else {
                "ffffffrejected".to_string()
            }
        }
    }

    #[test]
    fn random_nonce_bounds() {
        let mut miner = Miner::seeded(1);
        for len in 1..=MAX_NONCE_LEN {
            let nonce = miner.random_nonce(len);
            assert_eq!(nonce.len(), len);
            assert!(nonce
                .bytes()
                .all(|b| (NONCE_CHAR_MIN..=NONCE_CHAR_MAX).contains(&b)));
        }
    }

    #[test]
    fn mined_block_satisfies_invariants() {
        let mut miner = Miner::seeded(7);
        for i in 0..50 {
            let block = miner
                .mine_block(i, ts(i as i64), tx(), "00000", &EasyHasher)
                .unwrap();
            assert!(block.hash().starts_with("00000"));
            assert_eq!(block.hash(), EasyHasher.digest(&block.canonical_string()));
            assert!((1..=MAX_NONCE_LEN).contains(&block.nonce().len()));
            assert!(block
                .nonce()
                .bytes()
                .all(|b| (NONCE_CHAR_MIN..=NONCE_CHAR_MAX).contains(&b)));
            assert_eq!(block.index(), i);
            assert_eq!(block.previous_hash(), "00000");
        }
    }

    #[test]
    fn short_nonces_are_tried_first() {
        let base = canonical_string(ts(0), &tx(), "", "00000").len();
        let mut miner = Miner::seeded(3);
        let block = miner
            .mine_block(0, ts(0), tx(), "00000", &LengthHasher(base + 3))
            .unwrap();
        assert_eq!(block.nonce().len(), 3);
        assert_eq!(miner.attempts(), 3);
    }

    #[test]
    fn sweep_restarts_from_length_one() {
        let base = canonical_string(ts(0), &tx(), "", "00000").len();
        let err = Miner::seeded(3)
            .with_max_attempts(45)
            .mine_block(0, ts(0), tx(), "00000", &LengthHasher(base + 25))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Mining(MiningError::Exhausted { attempts: 45 })
        ));
    }

    #[test]
    fn seeded_mining_is_reproducible() {
        let a = Miner::seeded(42)
            .mine_block(0, ts(5), tx(), "00000", &EasyHasher)
            .unwrap();
        let b = Miner::seeded(42)
            .mine_block(0, ts(5), tx(), "00000", &EasyHasher)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn budget_is_enforced() {
        let mut miner = Miner::seeded(0).with_max_attempts(5);
        let err = miner
            .mine_block(0, ts(0), tx(), "00000", &NeverHasher)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Mining(MiningError::Exhausted { attempts: 5 })
        ));
        assert_eq!(miner.attempts(), 5);
    }

    #[test]
    fn cancellation_stops_search() {
        let cancel = Arc::new(AtomicBool::new(true));
        let mut miner = Miner::seeded(0).with_cancel(cancel);
        let err = miner
            .mine_block(0, ts(0), tx(), "00000", &NeverHasher)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Mining(MiningError::Cancelled { attempts: 0 })
        ));
    }

    #[test]
    fn rejects_empty_previous_hash() {
        let err = Miner::seeded(0)
            .mine_block(0, ts(0), tx(), "", &EasyHasher)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }

    #[test]
    #[ignore = "full SHA-1 difficulty takes about a million hashes"]
    fn mines_with_sha1_at_full_difficulty() {
        let block = Miner::seeded(2024)
            .mine_block(0, ts(1_600_000_000_000), tx(), "00000", &Sha1Hasher)
            .unwrap();
        assert!(block.meets_difficulty());
        assert_eq!(block.digest_mismatch(&Sha1Hasher), None);
    }
}
