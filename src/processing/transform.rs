//! Pipeline stages.
//!
//! Every [`Transform`] consumes a [`DataSet`] and returns the transformed dataset, or an error.
//! On error the input is gone with it; callers discard the whole run.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{ColumnRef, DataSet, Value};

use super::assignment::Assignment;
use super::filter::{Filter, conjunction};

/// Closed vocabulary of transform kinds, keyed by their description tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    RenameColumns,
    DropColumns,
    ReorderColumns,
    CreateColumn,
    ConditionalUpdate,
    ReadDate,
    TrimStrings,
    AbsoluteValue,
}

impl TransformKind {
    /// Parse a transform kind from its description tag. `date` is accepted as an alias of
    /// `read_date`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "rename_columns" => Some(Self::RenameColumns),
            "drop_columns" => Some(Self::DropColumns),
            "reorder_columns" => Some(Self::ReorderColumns),
            "create_column" => Some(Self::CreateColumn),
            "conditional_update" => Some(Self::ConditionalUpdate),
            "read_date" | "date" => Some(Self::ReadDate),
            "trim_strings" => Some(Self::TrimStrings),
            "absolute_value" => Some(Self::AbsoluteValue),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::RenameColumns => "RenameColumns",
            Self::DropColumns => "DropColumns",
            Self::ReorderColumns => "ReorderColumns",
            Self::CreateColumn => "CreateColumn",
            Self::ConditionalUpdate => "ConditionalUpdate",
            Self::ReadDate => "ReadDate",
            Self::TrimStrings => "TrimStrings",
            Self::AbsoluteValue => "AbsoluteValue",
        }
    }
}

/// A single dataset mutation.
#[derive(Debug, Clone)]
pub enum Transform {
    /// Relabel columns. Every source column must exist.
    RenameColumns { columns: Vec<(ColumnRef, String)> },
    /// Remove columns. Every listed column must exist.
    DropColumns { columns: Vec<ColumnRef> },
    /// Re-project to exactly the listed columns, in order.
    ///
    /// A listed label that is absent becomes a column of nulls; a listed position that is out of
    /// range is an error, since there is no label to give the new column.
    ReorderColumns { columns: Vec<ColumnRef> },
    /// Set a column to `default` on every row, creating it when absent.
    CreateColumn { column: ColumnRef, default: Value },
    /// Apply `assignments` in order to the rows selected by all `filters`.
    ConditionalUpdate {
        filters: Vec<Filter>,
        assignments: Vec<Assignment>,
    },
    /// Parse each value of `columns` as a date using a strftime-style `date_format`.
    ReadDate {
        columns: Vec<ColumnRef>,
        date_format: String,
    },
    /// Strip leading/trailing whitespace from text values.
    TrimStrings { columns: Vec<ColumnRef> },
    /// Replace numeric values by their absolute value.
    AbsoluteValue { columns: Vec<ColumnRef> },
}

impl Transform {
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::RenameColumns { .. } => TransformKind::RenameColumns,
            Self::DropColumns { .. } => TransformKind::DropColumns,
            Self::ReorderColumns { .. } => TransformKind::ReorderColumns,
            Self::CreateColumn { .. } => TransformKind::CreateColumn,
            Self::ConditionalUpdate { .. } => TransformKind::ConditionalUpdate,
            Self::ReadDate { .. } => TransformKind::ReadDate,
            Self::TrimStrings { .. } => TransformKind::TrimStrings,
            Self::AbsoluteValue { .. } => TransformKind::AbsoluteValue,
        }
    }

    /// Apply this stage to `dataset`.
    pub fn transform(&self, dataset: DataSet) -> PipelineResult<DataSet> {
        match self {
            Self::RenameColumns { columns } => rename_columns(dataset, columns),
            Self::DropColumns { columns } => {
                let positions = columns
                    .iter()
                    .map(|c| dataset.schema.resolve(c))
                    .collect::<PipelineResult<Vec<_>>>()?;
                Ok(dataset.without_columns(&positions))
            }
            Self::ReorderColumns { columns } => reorder_columns(dataset, columns),
            Self::CreateColumn { column, default } => {
                let label = match column {
                    ColumnRef::Name(name) => name.clone(),
                    ColumnRef::Index(idx) => dataset
                        .schema
                        .columns
                        .get(*idx)
                        .cloned()
                        .unwrap_or_else(|| idx.to_string()),
                };
                Ok(dataset.with_column(label, default.clone()))
            }
            Self::ConditionalUpdate {
                filters,
                assignments,
            } => {
                let mut dataset = dataset;
                let mask = conjunction(filters, &dataset)?;
                for assignment in assignments {
                    assignment.assign(&mut dataset, Some(&mask))?;
                }
                Ok(dataset)
            }
            Self::ReadDate {
                columns,
                date_format,
            } => map_columns(dataset, columns, |column, value| match value {
                Value::Null | Value::Date(_) => Ok(value.clone()),
                other => parse_date(&other.to_string(), date_format)
                    .map(Value::Date)
                    .map_err(|message| PipelineError::DateParse {
                        column: column.to_string(),
                        raw: other.to_string(),
                        format: date_format.clone(),
                        message,
                    }),
            }),
            Self::TrimStrings { columns } => map_columns(dataset, columns, |_, value| {
                Ok(match value {
                    Value::Utf8(s) => Value::Utf8(s.trim().to_string()),
                    other => other.clone(),
                })
            }),
            Self::AbsoluteValue { columns } => map_columns(dataset, columns, absolute_value),
        }
    }
}

fn rename_columns(dataset: DataSet, columns: &[(ColumnRef, String)]) -> PipelineResult<DataSet> {
    let positions = columns
        .iter()
        .map(|(from, _)| dataset.schema.resolve(from))
        .collect::<PipelineResult<Vec<_>>>()?;

    let mut dataset = dataset;
    for (idx, (_, to)) in positions.into_iter().zip(columns) {
        dataset.schema.columns[idx] = to.clone();
    }
    Ok(dataset)
}

fn reorder_columns(dataset: DataSet, columns: &[ColumnRef]) -> PipelineResult<DataSet> {
    let mut labels = Vec::with_capacity(columns.len());
    let mut sources = Vec::with_capacity(columns.len());
    for column in columns {
        match column {
            ColumnRef::Name(name) => {
                labels.push(name.clone());
                sources.push(dataset.schema.index_of(name));
            }
            ColumnRef::Index(_) => {
                let idx = dataset.schema.resolve(column)?;
                labels.push(dataset.schema.columns[idx].clone());
                sources.push(Some(idx));
            }
        }
    }
    Ok(dataset.project(labels, &sources))
}

/// Rewrite every value of each listed column. All columns are resolved before any value changes.
fn map_columns<F>(dataset: DataSet, columns: &[ColumnRef], mut mapper: F) -> PipelineResult<DataSet>
where
    F: FnMut(&str, &Value) -> PipelineResult<Value>,
{
    let positions = columns
        .iter()
        .map(|c| dataset.schema.resolve(c))
        .collect::<PipelineResult<Vec<_>>>()?;

    let mut dataset = dataset;
    for idx in positions {
        let label = dataset.schema.columns[idx].clone();
        dataset.try_map_column(idx, |value| mapper(&label, value))?;
    }
    Ok(dataset)
}

fn absolute_value(column: &str, value: &Value) -> PipelineResult<Value> {
    let coercion = |message: String| PipelineError::Coercion {
        column: column.to_string(),
        raw: value.to_string(),
        expected: "number".to_string(),
        message,
    };
    match value {
        Value::Null => Ok(Value::Null),
        Value::Int64(v) => v
            .checked_abs()
            .map(Value::Int64)
            .ok_or_else(|| coercion("absolute value overflows i64".to_string())),
        Value::Float64(v) => Ok(Value::Float64(v.abs())),
        other => Err(coercion(format!(
            "AbsoluteValue requires numeric values, found {}",
            other.data_type()
        ))),
    }
}

/// Parse `raw` with `format`. Formats without a time component yield midnight.
fn parse_date(raw: &str, format: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, format).or_else(|_| {
        NaiveDate::parse_from_str(raw, format)
            .map(|d| d.and_time(NaiveTime::MIN))
            .map_err(|e| e.to_string())
    })
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind().name();
        match self {
            Self::RenameColumns { columns } => {
                let pairs = columns
                    .iter()
                    .map(|(from, to)| format!("{from}: '{to}'"))
                    .collect::<Vec<_>>();
                write!(f, "{name}(columns={{{}}})", pairs.join(", "))
            }
            Self::DropColumns { columns }
            | Self::ReorderColumns { columns }
            | Self::TrimStrings { columns }
            | Self::AbsoluteValue { columns } => {
                write!(f, "{name}(columns=[{}])", join(columns))
            }
            Self::CreateColumn { column, default } => {
                write!(f, "{name}(column={column}, default_value={default:?})")
            }
            Self::ConditionalUpdate {
                filters,
                assignments,
            } => write!(
                f,
                "{name}(filters=[{}], assignments=[{}])",
                join(filters),
                join(assignments)
            ),
            Self::ReadDate {
                columns,
                date_format,
            } => write!(
                f,
                "{name}(columns=[{}], date_format={date_format})",
                join(columns)
            ),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
