pub mod text_store;

use anyhow::Result;
use ledger_core::BlockRecord;

/// Persistence for block records. Chains are rebuilt from records by
/// `ledger_core::Chain::from_records`, so stores never see hashers.
pub trait Storage {
    fn load(&self) -> Result<Vec<BlockRecord>>;
    fn save(&self, records: &[BlockRecord]) -> Result<()>;
    fn exists(&self) -> bool;
}
