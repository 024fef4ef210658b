//! `dt` turns heterogeneous bank and card CSV exports into one deduplicated ledger of
//! transactions.
//!
//! Each export format is described by a declarative profile ([`config::Configuration`]): an
//! ordered list of transforms that rename, drop, reorder, create and conditionally update columns,
//! parse dates, trim text and take absolute values. A run reads the input into an in-memory
//! [`types::DataSet`], folds the transforms over it ([`execution::Transformer`]), materializes the
//! rows as [`record::Transaction`]s and commits them to a store keyed by content hash, so
//! re-importing an overlapping statement adds nothing twice.
//!
//! ## Modules
//!
//! - [`types`]: values, column references, schema + dataset
//! - [`processing`]: filters, assignments, transforms and their description parsers
//! - [`execution`]: ordered stage execution with observer hooks
//! - [`config`]: profile documents
//! - [`ingestion`]: CSV reading and input discovery
//! - [`record`]: transactions and identity hashing
//! - [`persistence`]: transaction stores and CSV export
//! - [`logging`]: subscriber setup for binaries
//! - [`error`]: the shared error type
//!
//! ## Example
//!
//! ```rust
//! use dt::config::Configuration;
//! use dt::execution::Transformer;
//! use dt::ingestion::read_csv_from_reader;
//! use dt::persistence::MemoryStore;
//! use dt::record::TransactionList;
//!
//! # fn main() -> Result<(), dt::PipelineError> {
//! let profile = Configuration::from_json_str(r#"{
//!     "name": "checking",
//!     "transforms": [
//!         {"type": "rename_columns", "columns": {"Posted": "date", "Memo": "description", "Amount": "amount"}},
//!         {"type": "read_date", "columns": ["date"], "date_format": "%m/%d/%Y"},
//!         {"type": "create_column", "name": "institution", "default_value": "Chase"},
//!         {"type": "create_column", "name": "type", "default_value": "credit"},
//!         {"type": "conditional_update",
//!          "filters": [{"type": "less_than", "column": "amount", "threshold": 0}],
//!          "assignments": [{"type": "string", "column": "type", "value": "debit"}]},
//!         {"type": "absolute_value", "columns": ["amount"]}
//!     ]
//! }"#)?;
//!
//! let csv = "Posted,Memo,Amount\n01/05/2024,Coffee,-4.50\n01/06/2024,Paycheck,2000\n";
//! let dataset = read_csv_from_reader(csv.as_bytes(), profile.headers)?;
//! let dataset = Transformer::from_configuration(&profile)?.transform(dataset)?;
//! let records = TransactionList::from_dataset(&dataset)?;
//!
//! let mut store = MemoryStore::new();
//! assert_eq!(records.commit(&mut store)?.added, 2);
//! assert_eq!(records.commit(&mut store)?.skipped, 2);
//! assert_eq!(records.as_slice()[0].kind, "debit");
//! assert_eq!(records.as_slice()[0].amount, 4.5);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod logging;
pub mod persistence;
pub mod processing;
pub mod record;
pub mod types;

pub use error::{PipelineError, PipelineResult};
