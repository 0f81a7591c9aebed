mod commands;
mod interactive;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ledger_core::{HashAlgorithm, LedgerConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger")]
#[command(about = "Mine, validate and query a proof-of-work text ledger")]
struct Cli {
    /// TOML config file; flags below override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Account exempt from the solvency check (default: bitcoin)
    #[arg(long, global = true)]
    issuer: Option<String>,

    /// Digest used for block hashes: sha1 or sha256 (default: sha1)
    #[arg(long, global = true)]
    hash: Option<HashAlgorithm>,

    /// Seed the nonce generator for reproducible mining
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Give up after this many hash attempts per block
    #[arg(long, global = true)]
    max_attempts: Option<u64>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check hashes, links, indices and balances of a chain file
    Validate {
        #[arg(long)]
        file: PathBuf,
    },
    /// Print the balance of one participant, or of everyone
    Balance {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        participant: Option<String>,
    },
    /// List the blocks of a chain file
    Show {
        #[arg(long)]
        file: PathBuf,
        /// Print blocks as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start a new chain with an issuance from the issuer
    Init {
        #[arg(long)]
        file: PathBuf,
        /// Receiver of the initial issuance
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: i64,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Mine a transaction into a chain file
    Send {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: i64,
        /// Write the extended chain here instead of over the input
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate a chain, then prompt for transactions to add
    Interactive {
        #[arg(long)]
        file: PathBuf,
        /// Defaults to <stem>_updated.txt beside the input
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    fn ledger_config(&self) -> Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => LedgerConfig::load(path)?,
            None => LedgerConfig::default(),
        };
        if let Some(issuer) = &self.issuer {
            config.issuer = issuer.clone();
        }
        if let Some(hash) = self.hash {
            config.hash = hash;
        }
        if self.seed.is_some() {
            config.mining.seed = self.seed;
        }
        if self.max_attempts.is_some() {
            config.mining.max_attempts = self.max_attempts;
        }
        Ok(config)
    }
}

fn main() -> Result<ExitCode> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.ledger_config()?;
    match cli.cmd {
        Command::Validate { file } => commands::validate(&config, &file),
        Command::Balance { file, participant } => {
            commands::balance(&config, &file, participant.as_deref())
        }
        Command::Show { file, json } => commands::show(&config, &file, json),
        Command::Init {
            file,
            to,
            amount,
            force,
        } => commands::init(&config, &file, &to, amount, force),
        Command::Send {
            file,
            from,
            to,
            amount,
            output,
        } => commands::send(&config, &file, &from, &to, amount, output.as_deref()),
        Command::Interactive { file, output } => {
            interactive::run(&config, &file, output.as_deref())
        }
    }
}
