use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single transfer of `amount` from `sender` to `receiver`.
///
/// Labels are free text; nothing here authenticates them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTransaction")]
pub struct Transaction {
    sender: String,
    receiver: String,
    amount: i64,
}

#[derive(Deserialize)]
struct RawTransaction {
    sender: String,
    receiver: String,
    amount: i64,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = LedgerError;

    fn try_from(raw: RawTransaction) -> Result<Self> {
        Transaction::new(raw.sender, raw.receiver, raw.amount)
    }
}

impl Transaction {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: i64) -> Result<Self> {
        let sender = sender.into();
        let receiver = receiver.into();
        if amount <= 0 {
            return Err(LedgerError::InvalidArgument(format!(
                "amount must be positive, got {amount}"
            )));
        }
        if sender.is_empty() || receiver.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "sender and receiver must not be empty".to_string(),
            ));
        }
        // each label occupies exactly one line of a stored record
        if [&sender, &receiver]
            .iter()
            .any(|label| label.contains(['\n', '\r']))
        {
            return Err(LedgerError::InvalidArgument(
                "sender and receiver must not contain line breaks".to_string(),
            ));
        }
        Ok(Self {
            sender,
            receiver,
            amount,
        })
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn involves(&self, participant: &str) -> bool {
        self.sender == participant || self.receiver == participant
    }

    /// Net effect of this transaction on `participant`'s balance. Widened so
    /// that folding any number of `i64` amounts cannot overflow.
    pub fn delta_for(&self, participant: &str) -> i128 {
        let mut delta = 0;
        if self.sender == participant {
            delta -= i128::from(self.amount);
        }
        if self.receiver == participant {
            delta += i128::from(self.amount);
        }
        delta
    }
}

/// Canonical form hashed inside a block: `sender:receiver=amount`.
impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}={}", self.sender, self.receiver, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form() {
        let tx = Transaction::new("bitcoin", "alice", 100).unwrap();
        assert_eq!(tx.to_string(), "bitcoin:alice=100");
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(matches!(
            Transaction::new("alice", "bob", 0),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!(matches!(
            Transaction::new("alice", "bob", -5),
            Err(LedgerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_empty_labels() {
        assert!(Transaction::new("", "bob", 1).is_err());
        assert!(Transaction::new("alice", "", 1).is_err());
    }

    #[test]
    fn rejects_line_breaks_in_labels() {
        assert!(matches!(
            Transaction::new("alice", "ali\nce", 1),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!(Transaction::new("al\rice", "bob", 1).is_err());
        assert!(Transaction::new("alice smith", "bob", 1).is_ok());
    }

    #[test]
    fn extreme_amounts_do_not_overflow_deltas() {
        let tx = Transaction::new("bitcoin", "alice", i64::MAX).unwrap();
        assert_eq!(tx.delta_for("alice"), i128::from(i64::MAX));
        assert_eq!(tx.delta_for("bitcoin"), -i128::from(i64::MAX));
    }

    #[test]
    fn self_transfer_nets_to_zero() {
        let tx = Transaction::new("alice", "alice", 7).unwrap();
        assert_eq!(tx.delta_for("alice"), 0);
        assert_eq!(tx.delta_for("bob"), 0);
        assert!(tx.involves("alice"));
    }

    #[test]
    fn deltas_follow_direction() {
        let tx = Transaction::new("alice", "bob", 40).unwrap();
        assert_eq!(tx.delta_for("alice"), -40);
        assert_eq!(tx.delta_for("bob"), 40);
    }

    #[test]
    fn serialization_example() {
        let tx = Transaction::new("alice", "bob", 10).unwrap();
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(json, r#"{"sender":"alice","receiver":"bob","amount":10}"#);
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, back);
    }

    #[test]
    fn deserialization_enforces_invariants() {
        let res: std::result::Result<Transaction, _> =
            serde_json::from_str(r#"{"sender":"alice","receiver":"bob","amount":0}"#);
        assert!(res.is_err());
    }
}
