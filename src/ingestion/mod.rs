//! Tabular input.
//!
//! The pipeline itself consumes [`crate::types::DataSet`] values; this module is the boundary
//! that produces them from files:
//!
//! - [`discover_csv_paths`] expands file and directory arguments into CSV files
//! - [`read_csv_from_path`] reads one file, honoring the profile's header flag

pub mod csv;
pub mod discovery;

pub use self::csv::{read_csv_from_path, read_csv_from_reader};
pub use discovery::discover_csv_paths;
