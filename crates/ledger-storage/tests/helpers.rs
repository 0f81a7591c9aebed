use ledger_core::{Chain, HashFunction, Miner, Sha1Hasher, Timestamp, Transaction};
use ledger_storage::text_store::TextStore;
use tempfile::{tempdir, TempDir};

/// SHA-1 with one in eight digests promoted past the difficulty prefix.
#[derive(Clone, Copy, Debug, Default)]
pub struct TestHasher;

impl HashFunction for TestHasher {
    fn digest(&self, input: &str) -> String {
        let digest = Sha1Hasher.digest(input);
        if digest.as_bytes()[0] < b'2' {
            format!("00000{digest}")
        } else {
            digest
        }
    }
}

pub fn create_temp_store(file: &str) -> (TempDir, TextStore) {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let store = TextStore::open(temp_dir.path().join(file));
    (temp_dir, store)
}

pub fn mined_chain(transfers: &[(&str, &str, i64)]) -> Chain<TestHasher> {
    let mut chain = Chain::new(TestHasher);
    let mut miner = Miner::seeded(31);
    for (i, (from, to, amount)) in transfers.iter().enumerate() {
        let tx = Transaction::new(*from, *to, *amount).expect("valid transaction");
        let ts = Timestamp::from_millis(1_650_000_000_000 + i as i64 * 1_000).expect("timestamp");
        chain.submit(tx, ts, &mut miner).expect("mined");
    }
    chain
}
