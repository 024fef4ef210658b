//! On-disk store backed by `sled`.
//!
//! Two trees: `transactions` maps identity to a JSON-encoded [`Transaction`], and `profiles` maps
//! a profile name to its raw JSON document.

use std::path::Path;

use sled::{Db, Tree};
use tracing::{debug, info};

use crate::config::{Configuration, ProfileSource};
use crate::error::{PipelineError, PipelineResult};
use crate::record::Transaction;

use super::TransactionStore;

const TRANSACTIONS_TREE: &str = "transactions";
const PROFILES_TREE: &str = "profiles";

/// Handle to an open store. Construct once per run and pass it where it is needed.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: Db,
    transactions: Tree,
    profiles: Tree,
}

impl SledStore {
    /// Open (or create) a store at `path`.
    pub fn open(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening store");
        Self::from_db(sled::open(path)?)
    }

    /// A store that lives only as long as this handle.
    pub fn temporary() -> PipelineResult<Self> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> PipelineResult<Self> {
        let transactions = db.open_tree(TRANSACTIONS_TREE)?;
        let profiles = db.open_tree(PROFILES_TREE)?;
        Ok(Self {
            db,
            transactions,
            profiles,
        })
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> PipelineResult<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Save a profile document under `name`.
    ///
    /// The document must parse as a [`Configuration`] whose transforms all materialize. Fails
    /// with [`PipelineError::ProfileExists`] if the name is taken.
    pub fn add_profile(&self, name: &str, document: &str) -> PipelineResult<()> {
        Configuration::from_json_str(document)?.transforms()?;
        let swapped = self.profiles.compare_and_swap(
            name.as_bytes(),
            None as Option<&[u8]>,
            Some(document.as_bytes()),
        )?;
        if swapped.is_err() {
            return Err(PipelineError::ProfileExists {
                name: name.to_string(),
            });
        }
        debug!(name, "saved profile");
        Ok(())
    }

    /// Saved profile names, sorted.
    pub fn list_profiles(&self) -> PipelineResult<Vec<String>> {
        self.profiles
            .iter()
            .keys()
            .map(|key| Ok(String::from_utf8_lossy(&key?).into_owned()))
            .collect()
    }

    pub fn delete_profile(&self, name: &str) -> PipelineResult<()> {
        match self.profiles.remove(name.as_bytes())? {
            Some(_) => {
                debug!(name, "deleted profile");
                Ok(())
            }
            None => Err(PipelineError::ProfileNotFound {
                name: name.to_string(),
            }),
        }
    }
}

impl ProfileSource for SledStore {
    fn read_profile(&self, name: &str) -> PipelineResult<Option<String>> {
        Ok(self
            .profiles
            .get(name.as_bytes())?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}

impl TransactionStore for SledStore {
    fn exists(&self, identity: &str) -> PipelineResult<bool> {
        Ok(self.transactions.contains_key(identity.as_bytes())?)
    }

    fn append(&mut self, transaction: &Transaction) -> PipelineResult<()> {
        let bytes = serde_json::to_vec(transaction)?;
        self.transactions.insert(transaction.identity().as_bytes(), bytes)?;
        Ok(())
    }

    /// Transactions ordered by identity.
    fn list(&self) -> PipelineResult<Vec<Transaction>> {
        self.transactions
            .iter()
            .values()
            .map(|bytes| Ok(serde_json::from_slice(&bytes?)?))
            .collect()
    }

    fn count(&self) -> PipelineResult<usize> {
        Ok(self.transactions.len())
    }

    fn insert_if_absent(&mut self, transaction: &Transaction) -> PipelineResult<bool> {
        let bytes = serde_json::to_vec(transaction)?;
        let swapped = self.transactions.compare_and_swap(
            transaction.identity().as_bytes(),
            None as Option<&[u8]>,
            Some(bytes),
        )?;
        Ok(swapped.is_ok())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::SledStore;
    use crate::config::{Configuration, ProfileSource};
    use crate::error::PipelineError;
    use crate::persistence::TransactionStore;
    use crate::record::{Transaction, TransactionList};

    fn groceries(amount: f64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(0, 0, 0).unwrap();
        Transaction::new(date, "Groceries", "Visa", "debit", amount)
    }

    #[test]
    fn transactions_are_keyed_by_identity() {
        let mut store = SledStore::temporary().unwrap();
        let batch = TransactionList::from(vec![groceries(-52.1), groceries(-52.1), groceries(-8.0)]);

        let summary = batch.commit(&mut store).unwrap();
        assert_eq!((summary.added, summary.skipped), (2, 1));
        assert_eq!(store.count().unwrap(), 2);
        assert!(store.exists(&groceries(-8.0).identity()).unwrap());

        let mut listed = store.list().unwrap();
        listed.sort_by(|a, b| a.amount.total_cmp(&b.amount));
        assert_eq!(listed, vec![groceries(-52.1), groceries(-8.0)]);
    }

    #[test]
    fn recommit_adds_nothing() {
        let mut store = SledStore::temporary().unwrap();
        let batch = TransactionList::from(vec![groceries(-1.0)]);
        batch.commit(&mut store).unwrap();
        let again = batch.commit(&mut store).unwrap();
        assert_eq!((again.added, again.skipped), (0, 1));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn profiles_round_trip() {
        let store = SledStore::temporary().unwrap();
        store.add_profile("visa", r#"{"name": "Visa"}"#).unwrap();
        store.add_profile("amex", "{}").unwrap();

        assert_eq!(store.list_profiles().unwrap(), vec!["amex", "visa"]);
        assert_eq!(Configuration::load("visa", &store).unwrap().name, "Visa");

        store.delete_profile("visa").unwrap();
        assert_eq!(store.read_profile("visa").unwrap(), None);
        assert!(matches!(
            store.delete_profile("visa").unwrap_err(),
            PipelineError::ProfileNotFound { .. }
        ));
    }

    #[test]
    fn duplicate_or_invalid_profiles_are_rejected() {
        let store = SledStore::temporary().unwrap();
        store.add_profile("visa", "{}").unwrap();
        assert!(matches!(
            store.add_profile("visa", "{}").unwrap_err(),
            PipelineError::ProfileExists { .. }
        ));
        assert!(matches!(
            store
                .add_profile("bad", r#"{"transforms": [{"type": "nope"}]}"#)
                .unwrap_err(),
            PipelineError::UnsupportedKind { .. }
        ));
        assert_eq!(store.list_profiles().unwrap(), vec!["visa"]);
    }
}
