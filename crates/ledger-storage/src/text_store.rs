use crate::Storage;
use anyhow::{bail, Context, Result};
use ledger_core::{parse_records, render_records, BlockRecord, Chain, HashFunction};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// A chain kept as a plain text file, seven lines per block.
#[derive(Clone, Debug)]
pub struct TextStore {
  path: PathBuf,
}

impl TextStore {
  pub fn open<P: AsRef<Path>>(path: P) -> Self {
    Self {
      path: path.as_ref().to_path_buf(),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn load_chain<H: HashFunction>(&self, hasher: H) -> Result<Chain<H>> {
    let records = self.load()?;
    let chain = Chain::from_records(&records, hasher)
      .with_context(|| format!("rebuilding chain from {}", self.path.display()))?;
    info!("loaded {} blocks from {}", chain.len(), self.path.display());
    Ok(chain)
  }

  pub fn save_chain<H: HashFunction>(&self, chain: &Chain<H>) -> Result<()> {
    self.save(&chain.to_records())
  }

  fn temp_path(&self) -> PathBuf {
    let mut name = self
      .path
      .file_name()
      .map(|n| n.to_os_string())
      .unwrap_or_default();
    name.push(".tmp");
    self.path.with_file_name(name)
  }
}

impl Storage for TextStore {
  fn load(&self) -> Result<Vec<BlockRecord>> {
    let text = fs::read_to_string(&self.path)
      .with_context(|| format!("reading {}", self.path.display()))?;
    let records =
      parse_records(&text).with_context(|| format!("parsing {}", self.path.display()))?;
    Ok(records)
  }

  fn save(&self, records: &[BlockRecord]) -> Result<()> {
    if self.path.file_name().is_none() {
      bail!("{} is not a file path", self.path.display());
    }
    // write beside the target, then rename over it
    let tmp = self.temp_path();
    fs::write(&tmp, render_records(records))
      .with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, &self.path)
      .with_context(|| format!("replacing {}", self.path.display()))?;
    info!("wrote {} blocks to {}", records.len(), self.path.display());
    Ok(())
  }

  fn exists(&self) -> bool {
    self.path.is_file()
  }
}

/// `<dir>/<stem><suffix>.txt` for an input file `<dir>/<stem>.<ext>`.
pub fn derived_output_path<P: AsRef<Path>>(input: P, suffix: &str) -> PathBuf {
  let input = input.as_ref();
  let stem = input
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_else(|| "chain".to_string());
  input.with_file_name(format!("{stem}{suffix}.txt"))
}
