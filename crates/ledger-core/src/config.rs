use crate::chain::Chain;
use crate::constants::DEFAULT_ISSUER;
use crate::error::{LedgerError, Result};
use crate::hash::HashAlgorithm;
use crate::mine::Miner;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Ledger settings, usually read from a TOML file. Every field is optional
/// and the defaults reproduce the behaviour existing chains were written with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub issuer: String,
    pub hash: HashAlgorithm,
    pub mining: MiningConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Upper bound on hash attempts per block. Unbounded when absent.
    pub max_attempts: Option<u64>,
    /// Fixed RNG seed for reproducible nonces.
    pub seed: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            hash: HashAlgorithm::default(),
            mining: MiningConfig::default(),
        }
    }
}

impl LedgerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.issuer.is_empty() {
            return Err(LedgerError::Config("issuer must not be empty".to_string()));
        }
        if self.mining.max_attempts == Some(0) {
            return Err(LedgerError::Config(
                "mining.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn miner(&self) -> Miner<StdRng> {
        let miner = match self.mining.seed {
            Some(seed) => Miner::seeded(seed),
            None => Miner::from_entropy(),
        };
        match self.mining.max_attempts {
            Some(max) => miner.with_max_attempts(max),
            None => miner,
        }
    }

    pub fn empty_chain(&self) -> Chain<HashAlgorithm> {
        Chain::new(self.hash).with_issuer(self.issuer.clone())
    }
}
