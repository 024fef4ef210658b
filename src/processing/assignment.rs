//! Column writes, optionally restricted to the rows selected by a [`Mask`].

use std::fmt;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{ColumnRef, DataSet, Value};

use super::filter::Mask;

/// Closed vocabulary of assignment kinds, keyed by their description tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    String,
    Integer,
    Float,
    Column,
}

impl AssignmentKind {
    /// Parse an assignment kind from its description tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "column" => Some(Self::Column),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::String => "StringAssignment",
            Self::Integer => "IntegerAssignment",
            Self::Float => "FloatAssignment",
            Self::Column => "ColumnAssignment",
        }
    }
}

/// A write into one target column.
///
/// Literal assignments hold a value already coerced to their declared type; a
/// [`Assignment::Column`] copies each selected row's value from `source`.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    String { column: ColumnRef, value: String },
    Integer { column: ColumnRef, value: i64 },
    Float { column: ColumnRef, value: f64 },
    Column { column: ColumnRef, source: ColumnRef },
}

impl Assignment {
    /// Text assignment; any literal renders to text.
    pub fn string(column: ColumnRef, literal: &Value) -> Self {
        Self::String {
            column,
            value: literal.to_string(),
        }
    }

    /// Integer assignment. Floats truncate toward zero; text must parse as an integer.
    pub fn integer(column: ColumnRef, literal: &Value) -> PipelineResult<Self> {
        let value = match literal {
            Value::Int64(v) => *v,
            Value::Float64(v) if (i64::MIN as f64..=i64::MAX as f64).contains(&v.trunc()) => {
                v.trunc() as i64
            }
            Value::Utf8(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| literal_error(&column, literal, "integer", e.to_string()))?,
            other => {
                return Err(literal_error(
                    &column,
                    other,
                    "integer",
                    format!("unsupported {} literal", other.data_type()),
                ));
            }
        };
        Ok(Self::Integer { column, value })
    }

    /// Float assignment. Integers widen; text must parse as a number.
    pub fn float(column: ColumnRef, literal: &Value) -> PipelineResult<Self> {
        let value = match literal {
            Value::Int64(v) => *v as f64,
            Value::Float64(v) => *v,
            Value::Utf8(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| literal_error(&column, literal, "float", e.to_string()))?,
            other => {
                return Err(literal_error(
                    &column,
                    other,
                    "float",
                    format!("unsupported {} literal", other.data_type()),
                ));
            }
        };
        Ok(Self::Float { column, value })
    }

    /// Copy `source` into `column` row by row.
    pub fn column(column: ColumnRef, source: ColumnRef) -> Self {
        Self::Column { column, source }
    }

    pub fn kind(&self) -> AssignmentKind {
        match self {
            Self::String { .. } => AssignmentKind::String,
            Self::Integer { .. } => AssignmentKind::Integer,
            Self::Float { .. } => AssignmentKind::Float,
            Self::Column { .. } => AssignmentKind::Column,
        }
    }

    pub fn target(&self) -> &ColumnRef {
        match self {
            Self::String { column, .. }
            | Self::Integer { column, .. }
            | Self::Float { column, .. }
            | Self::Column { column, .. } => column,
        }
    }

    /// Write into the target column on every row, or only where `mask` is true.
    ///
    /// The target (and, for column copies, the source) must already exist.
    pub fn assign(&self, dataset: &mut DataSet, mask: Option<&Mask>) -> PipelineResult<()> {
        let target = dataset.schema.resolve(self.target())?;
        let fill = match self {
            Self::String { value, .. } => Fill::Literal(Value::Utf8(value.clone())),
            Self::Integer { value, .. } => Fill::Literal(Value::Int64(*value)),
            Self::Float { value, .. } => Fill::Literal(Value::Float64(*value)),
            Self::Column { source, .. } => Fill::CopyFrom(dataset.schema.resolve(source)?),
        };

        for (i, row) in dataset.rows.iter_mut().enumerate() {
            let selected = mask.is_none_or(|m| m.get(i).copied().unwrap_or(false));
            if !selected {
                continue;
            }
            row[target] = match &fill {
                Fill::Literal(value) => value.clone(),
                Fill::CopyFrom(src) => row[*src].clone(),
            };
        }
        Ok(())
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind().name();
        match self {
            Self::String { column, value } => write!(f, "{name}(column={column}, value={value:?})"),
            Self::Integer { column, value } => write!(f, "{name}(column={column}, value={value})"),
            Self::Float { column, value } => write!(f, "{name}(column={column}, value={value})"),
            Self::Column { column, source } => write!(f, "{name}(column={column}, source={source})"),
        }
    }
}

enum Fill {
    Literal(Value),
    CopyFrom(usize),
}

fn literal_error(column: &ColumnRef, literal: &Value, expected: &str, message: String) -> PipelineError {
    PipelineError::Coercion {
        column: column.to_string(),
        raw: literal.to_string(),
        expected: expected.to_string(),
        message,
    }
}
