use ledger_core::{
    canonical_string, parse_records, Chain, HashAlgorithm, HashFunction, Sha1Hasher, Timestamp,
    Transaction, ValidationError,
};

const BANK: &str = include_str!("fixtures/bank.txt");

#[test]
fn stored_sha1_chain_validates() {
    let records = parse_records(BANK).unwrap();
    assert_eq!(records.len(), 3);
    let chain = Chain::from_records(&records, Sha1Hasher).unwrap();
    assert_eq!(chain.validate(), Ok(()));
    assert_eq!(chain.balance_of("alice"), 60);
    assert_eq!(chain.balance_of("bob"), 25);
    assert_eq!(chain.balance_of("carol"), 15);
    assert_eq!(chain.balance_of("bitcoin"), -100);
}

#[test]
fn canonical_string_matches_stored_hash() {
    let ts = Timestamp::from_millis(1_541_001_600_123).unwrap();
    let tx = Transaction::new("bitcoin", "alice", 100).unwrap();
    let input = canonical_string(ts, &tx, "p[{f1zZ=R;Xm", "00000");
    assert_eq!(input, "2018-10-31 16:00:00.123:bitcoin:alice=100.p[{f1zZ=R;Xm00000");
    assert_eq!(
        Sha1Hasher.digest(&input),
        "000009bbbe8ba80213e913cc4fd6f54b95687d9e"
    );
}

#[test]
fn other_digest_does_not_validate_sha1_chain() {
    let records = parse_records(BANK).unwrap();
    let chain = Chain::from_records(&records, HashAlgorithm::Sha256).unwrap();
    assert!(matches!(
        chain.validate(),
        Err(ValidationError::HashMismatch { index: 0, .. })
    ));
}

#[test]
fn issuer_label_matters_for_stored_chain() {
    let records = parse_records(BANK).unwrap();
    let chain = Chain::from_records(&records, Sha1Hasher)
        .unwrap()
        .with_issuer("treasury");
    assert!(matches!(
        chain.validate(),
        Err(ValidationError::NegativeBalance { index: 0, ref participant, .. }) if participant == "bitcoin"
    ));
}
