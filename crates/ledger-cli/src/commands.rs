use anyhow::{bail, Context, Result};
use ledger_core::{Chain, HashAlgorithm, LedgerConfig, Timestamp, Transaction, Verdict};
use ledger_storage::text_store::TextStore;
use ledger_storage::Storage;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

pub(crate) fn load(config: &LedgerConfig, file: &Path) -> Result<Chain<HashAlgorithm>> {
    let chain = TextStore::open(file)
        .load_chain(config.hash)?
        .with_issuer(config.issuer.clone());
    Ok(chain)
}

pub(crate) fn report(verdict: &Verdict) {
    match verdict {
        Verdict::Valid => println!("chain is valid"),
        Verdict::Invalid(reason) => println!("chain is not valid: {reason}"),
    }
}

pub fn validate(config: &LedgerConfig, file: &Path) -> Result<ExitCode> {
    let chain = load(config, file)?;
    let verdict = chain.verdict();
    report(&verdict);
    Ok(if verdict.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub fn balance(config: &LedgerConfig, file: &Path, participant: Option<&str>) -> Result<ExitCode> {
    let chain = load(config, file)?;
    match participant {
        Some(p) => println!("{p}: {}", chain.balance_of(p)),
        None => {
            for (p, balance) in chain.balances() {
                println!("{p}: {balance}");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn show(config: &LedgerConfig, file: &Path, json: bool) -> Result<ExitCode> {
    let chain = load(config, file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(chain.blocks())?);
        return Ok(ExitCode::SUCCESS);
    }
    println!(
        "{:>5}  {:<23}  {:<30}  {:<20}  {}",
        "index", "timestamp", "transaction", "nonce", "hash"
    );
    for block in chain.blocks() {
        println!(
            "{:>5}  {:<23}  {:<30}  {:<20}  {}",
            block.index(),
            block.timestamp().to_string(),
            block.transaction().to_string(),
            block.nonce(),
            block.hash()
        );
    }
    println!("{} blocks", chain.len());
    Ok(ExitCode::SUCCESS)
}

pub fn init(config: &LedgerConfig, file: &Path, to: &str, amount: i64, force: bool) -> Result<ExitCode> {
    let store = TextStore::open(file);
    if store.exists() && !force {
        bail!("{} already exists; pass --force to replace it", file.display());
    }
    let mut chain = config.empty_chain();
    let tx = Transaction::new(config.issuer.clone(), to, amount)?;
    let mut miner = config.miner();
    let block = chain.submit(tx, Timestamp::now(), &mut miner)?;
    println!("mined genesis block {} after {} attempts", block.hash(), miner.attempts());
    store.save_chain(&chain)?;
    Ok(ExitCode::SUCCESS)
}

pub fn send(
    config: &LedgerConfig,
    file: &Path,
    from: &str,
    to: &str,
    amount: i64,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let mut chain = load(config, file)?;
    let verdict = chain.verdict();
    if let Verdict::Invalid(reason) = verdict {
        println!("refusing to extend an invalid chain: {reason}");
        return Ok(ExitCode::FAILURE);
    }

    let tx = Transaction::new(from, to, amount)?;
    let mut miner = config.miner();
    let block = match chain.submit(tx, Timestamp::now(), &mut miner) {
        Ok(block) => block,
        Err(ledger_core::LedgerError::Admission(reason)) => {
            println!("transaction rejected: {reason}");
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err).context("mining the transaction"),
    };
    println!(
        "mined block {} with nonce {} after {} attempts: {}",
        block.index(),
        block.nonce(),
        miner.attempts(),
        block.hash()
    );

    let target = output.unwrap_or(file);
    TextStore::open(target).save(&chain.to_records())?;
    info!("chain written to {}", target.display());
    Ok(ExitCode::SUCCESS)
}
