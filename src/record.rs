//! Transaction records materialized from a transformed dataset.
//!
//! A [`Transaction`] has a fixed field set. Its identity is the SHA-256 of its content, so the
//! same transaction imported twice (from overlapping statements, say) is stored once.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::persistence::{CommitSummary, TransactionStore};
use crate::types::{ColumnRef, DATE_DISPLAY_FORMAT, DataSet, Value};

/// Columns a dataset must carry to be materialized, in identity order.
pub const RECORD_COLUMNS: [&str; 5] = ["date", "description", "institution", "type", "amount"];

const IDENTITY_SEPARATOR: char = '\u{1f}';

/// One financial transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDateTime,
    pub description: String,
    pub institution: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(
        date: NaiveDateTime,
        description: impl Into<String>,
        institution: impl Into<String>,
        kind: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            institution: institution.into(),
            kind: kind.into(),
            amount,
        }
    }

    /// Lowercase hex SHA-256 over `date`, `description`, `institution`, `type` and `amount`,
    /// in that order, separated by U+001F. Dates hash as `%Y-%m-%d %H:%M:%S`; amounts use the
    /// shortest round-trip float representation.
    pub fn identity(&self) -> String {
        let sep = IDENTITY_SEPARATOR;
        let content = format!(
            "{}{sep}{}{sep}{}{sep}{}{sep}{:?}",
            self.date.format(DATE_DISPLAY_FORMAT),
            self.description,
            self.institution,
            self.kind,
            self.amount,
        );
        hex::encode(Sha256::digest(content.as_bytes()))
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction(id={}, date={}, description={}, institution={}, type={}, amount={})",
            self.identity(),
            self.date.format(DATE_DISPLAY_FORMAT),
            self.description,
            self.institution,
            self.kind,
            self.amount
        )
    }
}

/// An ordered batch of transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionList {
    transactions: Vec<Transaction>,
}

impl TransactionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert every row of `dataset` into a [`Transaction`].
    ///
    /// The dataset must have `date`, `description`, `institution`, `type` and `amount` columns.
    /// Text fields render any value as text, with null as the empty string. `date` must be a date
    /// value or `%Y-%m-%d[ %H:%M:%S]` text; `amount` must be numeric or numeric text.
    pub fn from_dataset(dataset: &DataSet) -> PipelineResult<Self> {
        let mut idx = [0usize; RECORD_COLUMNS.len()];
        for (slot, name) in idx.iter_mut().zip(RECORD_COLUMNS) {
            *slot = dataset.schema.resolve(&ColumnRef::from(name))?;
        }
        let [date, description, institution, kind, amount] = idx;

        let transactions = dataset
            .rows
            .iter()
            .map(|row| {
                Ok(Transaction {
                    date: date_field(&row[date])?,
                    description: text_field(&row[description]),
                    institution: text_field(&row[institution]),
                    kind: text_field(&row[kind]),
                    amount: amount_field(&row[amount])?,
                })
            })
            .collect::<PipelineResult<Vec<_>>>()?;
        Ok(Self { transactions })
    }

    pub fn push(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn extend(&mut self, other: TransactionList) {
        self.transactions.extend(other.transactions);
    }

    /// Drop every transaction with this identity.
    pub fn remove(&mut self, identity: &str) {
        self.transactions.retain(|t| t.identity() != identity);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Insert each transaction whose identity is not yet stored, in order.
    ///
    /// Already-present identities are skipped and counted, never reported as errors.
    pub fn commit<S: TransactionStore + ?Sized>(&self, store: &mut S) -> PipelineResult<CommitSummary> {
        let mut summary = CommitSummary::default();
        for transaction in &self.transactions {
            if store.insert_if_absent(transaction)? {
                summary.added += 1;
            } else {
                debug!(id = %transaction.identity(), "skipping duplicate transaction");
                summary.skipped += 1;
            }
        }
        debug!(added = summary.added, skipped = summary.skipped, "committed transactions");
        Ok(summary)
    }
}

impl From<Vec<Transaction>> for TransactionList {
    fn from(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }
}

impl<'a> IntoIterator for &'a TransactionList {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

impl fmt::Display for TransactionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.transactions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{t}")?;
        }
        Ok(())
    }
}

fn text_field(value: &Value) -> String {
    value.to_string()
}

fn date_field(value: &Value) -> PipelineResult<NaiveDateTime> {
    let coercion = |message: &str| PipelineError::Coercion {
        column: "date".to_string(),
        raw: value.to_string(),
        expected: "date".to_string(),
        message: message.to_string(),
    };
    match value {
        Value::Date(d) => Ok(*d),
        Value::Utf8(s) => {
            let s = s.trim();
            NaiveDateTime::parse_from_str(s, DATE_DISPLAY_FORMAT)
                .or_else(|_| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
                })
                .map_err(|e| coercion(&e.to_string()))
        }
        Value::Null => Err(coercion("date is null")),
        other => Err(coercion(&format!("unsupported {} value", other.data_type()))),
    }
}

fn amount_field(value: &Value) -> PipelineResult<f64> {
    let coercion = |message: String| PipelineError::Coercion {
        column: "amount".to_string(),
        raw: value.to_string(),
        expected: "float".to_string(),
        message,
    };
    match value {
        Value::Int64(v) => Ok(*v as f64),
        Value::Float64(v) => Ok(*v),
        Value::Utf8(s) => s.trim().parse::<f64>().map_err(|e| coercion(e.to_string())),
        Value::Null => Err(coercion("amount is null".to_string())),
        other => Err(coercion(format!("unsupported {} value", other.data_type()))),
    }
}
