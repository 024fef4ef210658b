//! Where committed transactions go.
//!
//! - [`TransactionStore`]: keyed store addressed by transaction identity
//!   ([`MemoryStore`] for tests and dry runs, [`SledStore`] on disk)
//! - [`CsvExport`]: flat file export, appending or overwriting

pub mod export;
pub mod sled_store;

use std::collections::HashSet;

use crate::error::PipelineResult;
use crate::record::Transaction;

pub use export::CsvExport;
pub use sled_store::SledStore;

/// Outcome of committing a batch of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub added: usize,
    pub skipped: usize,
}

/// A store of transactions keyed by [`Transaction::identity`].
pub trait TransactionStore {
    fn exists(&self, identity: &str) -> PipelineResult<bool>;

    /// Store `transaction` under its identity, replacing any previous entry.
    fn append(&mut self, transaction: &Transaction) -> PipelineResult<()>;

    fn list(&self) -> PipelineResult<Vec<Transaction>>;

    fn count(&self) -> PipelineResult<usize>;

    /// Store `transaction` unless its identity is already present. Returns whether it was added.
    ///
    /// Stores shared between processes must override this so the check and the insert are one
    /// atomic step.
    fn insert_if_absent(&mut self, transaction: &Transaction) -> PipelineResult<bool> {
        if self.exists(&transaction.identity())? {
            return Ok(false);
        }
        self.append(transaction)?;
        Ok(true)
    }
}

/// In-process store. Lists in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    transactions: Vec<Transaction>,
    identities: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionStore for MemoryStore {
    fn exists(&self, identity: &str) -> PipelineResult<bool> {
        Ok(self.identities.contains(identity))
    }

    fn append(&mut self, transaction: &Transaction) -> PipelineResult<()> {
        let identity = transaction.identity();
        if self.identities.insert(identity.clone()) {
            self.transactions.push(transaction.clone());
        } else if let Some(slot) = self.transactions.iter_mut().find(|t| t.identity() == identity) {
            *slot = transaction.clone();
        }
        Ok(())
    }

    fn list(&self) -> PipelineResult<Vec<Transaction>> {
        Ok(self.transactions.clone())
    }

    fn count(&self) -> PipelineResult<usize> {
        Ok(self.transactions.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{MemoryStore, TransactionStore};
    use crate::record::Transaction;

    fn rent() -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        Transaction::new(date, "Rent", "Chase", "debit", -900.0)
    }

    #[test]
    fn insert_if_absent_is_idempotent() {
        let mut store = MemoryStore::new();
        assert!(store.insert_if_absent(&rent()).unwrap());
        assert!(!store.insert_if_absent(&rent()).unwrap());
        assert_eq!(store.count().unwrap(), 1);
        assert!(store.exists(&rent().identity()).unwrap());
    }

    #[test]
    fn append_does_not_duplicate_identities() {
        let mut store = MemoryStore::new();
        store.append(&rent()).unwrap();
        store.append(&rent()).unwrap();
        assert_eq!(store.list().unwrap(), vec![rent()]);
    }
}
