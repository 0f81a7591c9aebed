use crate::commands::{load, report};
use anyhow::Result;
use dialoguer::{Confirm, Input};
use ledger_core::{LedgerError, Timestamp, Transaction};
use ledger_storage::text_store::{derived_output_path, TextStore};
use std::path::Path;
use std::process::ExitCode;

const OUTPUT_SUFFIX: &str = "_updated";

/// Prompt loop: validate the chain, accept new transactions while it is
/// valid, then write the result beside the input.
pub fn run(config: &ledger_core::LedgerConfig, file: &Path, output: Option<&Path>) -> Result<ExitCode> {
    let mut chain = load(config, file)?;
    let verdict = chain.verdict();
    report(&verdict);

    let mut miner = config.miner();
    while verdict.is_valid()
        && Confirm::new()
            .with_prompt("Add a transaction to the chain?")
            .default(false)
            .interact()?
    {
        let sender: String = Input::new().with_prompt("Sender").interact_text()?;
        let receiver: String = Input::new().with_prompt("Receiver").interact_text()?;
        let amount: i64 = Input::new().with_prompt("Amount").interact_text()?;

        let tx = match Transaction::new(sender, receiver, amount) {
            Ok(tx) => tx,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match chain.submit(tx, Timestamp::now(), &mut miner) {
            Ok(block) => println!(
                "added block {} after {} attempts: {}",
                block.index(),
                miner.attempts(),
                block.hash()
            ),
            Err(LedgerError::Admission(reason)) => println!("transaction rejected: {reason}"),
            Err(err) => return Err(err.into()),
        }
    }

    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| derived_output_path(file, OUTPUT_SUFFIX));
    TextStore::open(&target).save_chain(&chain)?;
    println!("{} written", target.display());
    Ok(ExitCode::SUCCESS)
}
