//! Pipeline stages over an in-memory [`crate::types::DataSet`].
//!
//! The processing layer is built from three closed families:
//!
//! - [`Filter`]: per-row predicates producing a [`Mask`], combined with [`conjunction`]
//! - [`Assignment`]: column writes, optionally restricted by a mask
//! - [`Transform`]: whole-dataset stages consumed by [`crate::execution::Transformer`]
//!
//! Each family has a matching `*_from_description` parser that turns a tagged JSON description
//! into a fully validated value, so a configuration either materializes completely or fails
//! before any row is read.
//!
//! ## Example: flag and trim debit rows
//!
//! ```rust
//! use dt::processing::{Assignment, Filter, Transform};
//! use dt::types::{ColumnRef, DataSet, Value};
//!
//! # fn main() -> Result<(), dt::PipelineError> {
//! let ds = DataSet::from_columns(vec![
//!     ("memo", vec![Value::from(" coffee "), Value::from(" refund ")]),
//!     ("amount", vec![Value::Float64(-4.5), Value::Float64(12.0)]),
//!     ("type", vec![Value::Null, Value::Null]),
//! ]);
//!
//! let flag_debits = Transform::ConditionalUpdate {
//!     filters: vec![Filter::LessThan { column: ColumnRef::from("amount"), threshold: 0.0 }],
//!     assignments: vec![Assignment::string(ColumnRef::from("type"), &Value::from("debit"))],
//! };
//! let trim = Transform::TrimStrings { columns: vec![ColumnRef::from("memo")] };
//!
//! let out = trim.transform(flag_debits.transform(ds)?)?;
//! assert_eq!(out.rows[0], vec![Value::from("coffee"), Value::Float64(-4.5), Value::from("debit")]);
//! assert_eq!(out.rows[1][2], Value::Null);
//! # Ok(())
//! # }
//! ```

pub mod assignment;
pub mod factory;
pub mod filter;
pub mod transform;

pub use assignment::{Assignment, AssignmentKind};
pub use factory::{assignment_from_description, filter_from_description, transform_from_description};
pub use filter::{Filter, FilterKind, Mask, conjunction};
pub use transform::{Transform, TransformKind};
