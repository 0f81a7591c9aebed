//! Digest functions used for proof-of-work and hash verification.
//!
//! Every digest is rendered as lower-case hex. The prefix check in mining
//! reads the first five characters, so any implementation must produce at
//! least that many.

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

pub trait HashFunction {
    fn digest(&self, input: &str) -> String;
}

impl<H: HashFunction + ?Sized> HashFunction for &H {
    fn digest(&self, input: &str) -> String {
        (**self).digest(input)
    }
}

impl<H: HashFunction + ?Sized> HashFunction for Box<H> {
    fn digest(&self, input: &str) -> String {
        (**self).digest(input)
    }
}

/// SHA-1, the digest every persisted chain so far was written with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha1Hasher;

impl HashFunction for Sha1Hasher {
    fn digest(&self, input: &str) -> String {
        hex::encode(Sha1::digest(input.as_bytes()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256Hasher;

impl HashFunction for Sha256Hasher {
    fn digest(&self, input: &str) -> String {
        hex::encode(Sha256::digest(input.as_bytes()))
    }
}

/// Runtime-selectable digest. Switching away from `Sha1` changes every
/// hash, so chains written with one algorithm will not validate under the
/// other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl HashFunction for HashAlgorithm {
    fn digest(&self, input: &str) -> String {
        match self {
            HashAlgorithm::Sha1 => Sha1Hasher.digest(input),
            HashAlgorithm::Sha256 => Sha256Hasher.digest(input),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha1 => f.write_str("sha1"),
            HashAlgorithm::Sha256 => f.write_str("sha256"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(HashAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            other => Err(format!("unknown hash algorithm `{other}`")),
        }
    }
}
