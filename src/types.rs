//! Core data model types.
//!
//! A [`DataSet`] is an ordered list of rows sharing one [`Schema`] (an ordered list of column
//! labels). Columns are addressed with a [`ColumnRef`], either by label or by position.
//!
//! Column-set changes (add/drop/rename/reorder) consume the dataset and return a new one, so
//! every row changes width together.

use std::fmt;

use chrono::NaiveDateTime;

use crate::error::{PipelineError, PipelineResult};

/// Format used when a [`Value::Date`] is rendered as text.
pub const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Logical data type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// UTF-8 string.
    Utf8,
    /// Calendar date and time (no timezone).
    Date,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Int64 => "integer",
            Self::Float64 => "float",
            Self::Utf8 => "string",
            Self::Date => "date",
        };
        f.write_str(name)
    }
}

/// A single scalar value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
    /// Parsed date.
    Date(NaiveDateTime),
}

impl Value {
    /// Logical type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::Utf8(_) => DataType::Utf8,
            Self::Date(_) => DataType::Date,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of integer and float values; `None` for everything else.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }
}

/// Renders the value as text. `Null` renders as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Utf8(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format(DATE_DISPLAY_FORMAT)),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Utf8(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Utf8(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

/// Addresses a column by label or by 0-based position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnRef {
    Name(String),
    Index(usize),
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "'{name}'"),
            Self::Index(idx) => write!(f, "#{idx}"),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<usize> for ColumnRef {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

/// Ordered column labels describing the shape of every row in a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of column labels.
    pub columns: Vec<String>,
}

impl Schema {
    /// Create a new schema from column labels.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Schema for headerless input: columns are labelled `"0"`, `"1"`, ...
    pub fn positional(width: usize) -> Self {
        Self::new((0..width).map(|i| i.to_string()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate column labels in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Returns the index of a column by label, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Resolve a [`ColumnRef`] to a column position.
    ///
    /// Fails with [`PipelineError::ColumnResolution`] when the label is absent or the position is
    /// out of range.
    pub fn resolve(&self, column: &ColumnRef) -> PipelineResult<usize> {
        let found = match column {
            ColumnRef::Name(name) => self.index_of(name),
            ColumnRef::Index(idx) => (*idx < self.columns.len()).then_some(*idx),
        };
        found.ok_or_else(|| self.missing(column))
    }

    /// Label of the column a [`ColumnRef`] resolves to.
    pub fn label(&self, column: &ColumnRef) -> PipelineResult<&str> {
        let idx = self.resolve(column)?;
        Ok(self.columns[idx].as_str())
    }

    fn missing(&self, column: &ColumnRef) -> PipelineError {
        PipelineError::ColumnResolution {
            column: column.to_string(),
            columns: self.columns.clone(),
        }
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Build a dataset from named columns of equal length.
    ///
    /// # Panics
    ///
    /// Panics if the columns do not all have the same length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<Value>)>) -> Self {
        let height = columns.first().map(|(_, values)| values.len()).unwrap_or(0);
        let mut names = Vec::with_capacity(columns.len());
        let mut rows: Vec<Vec<Value>> = (0..height).map(|_| Vec::with_capacity(columns.len())).collect();
        for (name, values) in columns {
            assert!(
                values.len() == height,
                "column length {} does not match dataset height {}",
                values.len(),
                height
            );
            names.push(name.into());
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
        }
        Self::new(Schema::new(names), rows)
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    /// Values of the column at `idx`, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Values of the referenced column, top to bottom.
    pub fn column(&self, column: &ColumnRef) -> PipelineResult<Vec<&Value>> {
        let idx = self.schema.resolve(column)?;
        Ok(self.column_values(idx).collect())
    }

    /// Replace every value of the column at `idx` with `mapper(value)`.
    ///
    /// Stops at the first error; the caller owns the dataset and is expected to discard it.
    pub fn try_map_column<F>(&mut self, idx: usize, mut mapper: F) -> PipelineResult<()>
    where
        F: FnMut(&Value) -> PipelineResult<Value>,
    {
        for row in &mut self.rows {
            row[idx] = mapper(&row[idx])?;
        }
        Ok(())
    }

    /// Set `name` to `fill` on every row; overwrites an existing column with that label,
    /// otherwise appends a new one.
    pub fn with_column(mut self, name: impl Into<String>, fill: Value) -> Self {
        let name = name.into();
        match self.schema.index_of(&name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = fill.clone();
                }
            }
            None => {
                self.schema.columns.push(name);
                for row in &mut self.rows {
                    row.push(fill.clone());
                }
            }
        }
        self
    }

    /// Remove the columns at the given positions.
    pub fn without_columns(self, positions: &[usize]) -> Self {
        let keep: Vec<usize> = (0..self.column_count())
            .filter(|idx| !positions.contains(idx))
            .collect();
        let labels = keep.iter().map(|&idx| self.schema.columns[idx].clone()).collect::<Vec<_>>();
        let sources = keep.into_iter().map(Some).collect::<Vec<_>>();
        self.project(labels, &sources)
    }

    /// Re-project into `labels`, taking each column from the matching position in `sources`.
    /// A `None` source produces a column of nulls.
    pub fn project(self, labels: Vec<String>, sources: &[Option<usize>]) -> Self {
        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|src| src.map(|idx| row[idx].clone()).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self {
            schema: Schema::new(labels),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnRef, DataSet, Schema, Value};
    use crate::error::PipelineError;

    fn sample_dataset() -> DataSet {
        DataSet::from_columns(vec![
            ("id", vec![Value::Int64(1), Value::Int64(2)]),
            ("name", vec![Value::from("a"), Value::from("b")]),
        ])
    }

    #[test]
    fn resolve_by_name_and_position_agree() {
        let ds = sample_dataset();
        assert_eq!(ds.schema.resolve(&ColumnRef::from("name")).unwrap(), 1);
        assert_eq!(ds.schema.resolve(&ColumnRef::Index(1)).unwrap(), 1);
        assert_eq!(ds.schema.label(&ColumnRef::Index(0)).unwrap(), "id");
    }

    #[test]
    fn resolve_missing_column_is_an_error() {
        let ds = sample_dataset();
        let err = ds.schema.resolve(&ColumnRef::from("missing")).unwrap_err();
        assert!(matches!(err, PipelineError::ColumnResolution { .. }));
        assert!(ds.schema.resolve(&ColumnRef::Index(2)).is_err());
    }

    #[test]
    fn positional_schema_labels_are_indices() {
        let schema = Schema::positional(3);
        assert_eq!(schema.columns, vec!["0", "1", "2"]);
        assert_eq!(schema.resolve(&ColumnRef::from("2")).unwrap(), 2);
    }

    #[test]
    fn with_column_overwrites_or_appends() {
        let ds = sample_dataset().with_column("name", Value::from("z"));
        assert_eq!(ds.column_count(), 2);
        assert_eq!(ds.rows[1][1], Value::from("z"));

        let ds = ds.with_column("flag", Value::Int64(0));
        assert_eq!(ds.schema.columns, vec!["id", "name", "flag"]);
        assert!(ds.rows.iter().all(|row| row.len() == 3));
    }

    #[test]
    fn without_columns_keeps_remaining_order() {
        let ds = sample_dataset().with_column("extra", Value::Null).without_columns(&[1]);
        assert_eq!(ds.schema.columns, vec!["id", "extra"]);
        assert_eq!(ds.rows[0], vec![Value::Int64(1), Value::Null]);
    }

    #[test]
    fn display_renders_null_as_empty() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Float64(2.5).to_string(), "2.5");
    }
}
