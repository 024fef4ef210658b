//! Builds typed [`Transform`], [`Filter`], and [`Assignment`] values from tagged JSON
//! descriptions.
//!
//! Every description is an object with a `type` tag plus kind-specific fields:
//!
//! ```json
//! {"type": "conditional_update",
//!  "filters": [{"type": "less_than", "column": "amount", "threshold": 0}],
//!  "assignments": [{"type": "string", "column": "type", "value": "debit"}]}
//! ```
//!
//! Parsing is total: a description either produces a fully validated value or fails with
//! [`PipelineError::ConfigValidation`] (naming the kind and field) or
//! [`PipelineError::UnsupportedKind`].

use chrono::format::{Item, StrftimeItems};
use serde_json::{Map, Value as Json};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{ColumnRef, Value};

use super::assignment::{Assignment, AssignmentKind};
use super::filter::{Filter, FilterKind};
use super::transform::{Transform, TransformKind};

/// Parse one transform description.
pub fn transform_from_description(description: &Json) -> PipelineResult<Transform> {
    let object = as_object(description, "transform")?;
    let tag = type_tag(object, "transform")?;
    let kind = TransformKind::from_tag(tag).ok_or_else(|| PipelineError::UnsupportedKind {
        family: "transform",
        kind: tag.to_string(),
    })?;
    let name = kind.name();

    let transform = match kind {
        TransformKind::RenameColumns => Transform::RenameColumns {
            columns: rename_map(object, name)?,
        },
        TransformKind::DropColumns => Transform::DropColumns {
            columns: column_list(object, name, "columns")?,
        },
        TransformKind::ReorderColumns => Transform::ReorderColumns {
            columns: column_list(object, name, "columns")?,
        },
        TransformKind::TrimStrings => Transform::TrimStrings {
            columns: column_list(object, name, "columns")?,
        },
        TransformKind::AbsoluteValue => Transform::AbsoluteValue {
            columns: column_list(object, name, "columns")?,
        },
        TransformKind::CreateColumn => Transform::CreateColumn {
            column: column_ref(required(object, name, "name")?, name, "name")?,
            default: literal(required(object, name, "default_value")?, name, "default_value")?,
        },
        TransformKind::ConditionalUpdate => Transform::ConditionalUpdate {
            filters: optional_list(object, name, "filters")?
                .iter()
                .map(filter_from_description)
                .collect::<PipelineResult<Vec<_>>>()?,
            assignments: optional_list(object, name, "assignments")?
                .iter()
                .map(assignment_from_description)
                .collect::<PipelineResult<Vec<_>>>()?,
        },
        TransformKind::ReadDate => Transform::ReadDate {
            columns: column_list(object, name, "columns")?,
            date_format: date_format(object, name)?,
        },
    };
    Ok(transform)
}

/// Parse one filter description.
pub fn filter_from_description(description: &Json) -> PipelineResult<Filter> {
    let object = as_object(description, "filter")?;
    let tag = type_tag(object, "filter")?;
    let kind = FilterKind::from_tag(tag).ok_or_else(|| PipelineError::UnsupportedKind {
        family: "filter",
        kind: tag.to_string(),
    })?;
    let name = kind.name();
    let column = column_ref(required(object, name, "column")?, name, "column")?;

    let threshold = || -> PipelineResult<f64> {
        required(object, name, "threshold")?
            .as_f64()
            .ok_or_else(|| PipelineError::validation(name, "threshold", "must be a number"))
    };

    let filter = match kind {
        FilterKind::NotNull => Filter::NotNull { column },
        FilterKind::Regex => {
            let pattern = required(object, name, "pattern")?
                .as_str()
                .ok_or_else(|| PipelineError::validation(name, "pattern", "must be a string"))?;
            Filter::regex(column, pattern)?
        }
        FilterKind::GreaterThan => Filter::GreaterThan {
            column,
            threshold: threshold()?,
        },
        FilterKind::GreaterThanEqualTo => Filter::GreaterThanEqualTo {
            column,
            threshold: threshold()?,
        },
        FilterKind::EqualTo => Filter::EqualTo {
            column,
            threshold: threshold()?,
        },
        FilterKind::LessThan => Filter::LessThan {
            column,
            threshold: threshold()?,
        },
        FilterKind::LessThanEqualTo => Filter::LessThanEqualTo {
            column,
            threshold: threshold()?,
        },
    };
    Ok(filter)
}

/// Parse one assignment description. For `column` assignments, `value` names the source column.
pub fn assignment_from_description(description: &Json) -> PipelineResult<Assignment> {
    let object = as_object(description, "assignment")?;
    let tag = type_tag(object, "assignment")?;
    let kind = AssignmentKind::from_tag(tag).ok_or_else(|| PipelineError::UnsupportedKind {
        family: "assignment",
        kind: tag.to_string(),
    })?;
    let name = kind.name();
    let column = column_ref(required(object, name, "column")?, name, "column")?;
    let value = required(object, name, "value")?;

    match kind {
        AssignmentKind::String => Ok(Assignment::string(column, &literal(value, name, "value")?)),
        AssignmentKind::Integer => Assignment::integer(column, &literal(value, name, "value")?),
        AssignmentKind::Float => Assignment::float(column, &literal(value, name, "value")?),
        AssignmentKind::Column => Ok(Assignment::column(column, column_ref(value, name, "value")?)),
    }
}

fn as_object<'a>(description: &'a Json, family: &str) -> PipelineResult<&'a Map<String, Json>> {
    description
        .as_object()
        .ok_or_else(|| PipelineError::validation(family, "(description)", "must be an object"))
}

fn type_tag<'a>(object: &'a Map<String, Json>, family: &str) -> PipelineResult<&'a str> {
    required(object, family, "type")?
        .as_str()
        .ok_or_else(|| PipelineError::validation(family, "type", "must be a string"))
}

fn required<'a>(object: &'a Map<String, Json>, kind: &str, field: &str) -> PipelineResult<&'a Json> {
    match object.get(field) {
        None | Some(Json::Null) => Err(PipelineError::validation(kind, field, "is required")),
        Some(value) => Ok(value),
    }
}

fn optional_list<'a>(
    object: &'a Map<String, Json>,
    kind: &str,
    field: &str,
) -> PipelineResult<&'a [Json]> {
    match object.get(field) {
        None | Some(Json::Null) => Ok(&[]),
        Some(Json::Array(items)) => Ok(items),
        Some(_) => Err(PipelineError::validation(kind, field, "must be a list")),
    }
}

fn column_ref(value: &Json, kind: &str, field: &str) -> PipelineResult<ColumnRef> {
    match value {
        Json::String(name) => Ok(ColumnRef::Name(name.clone())),
        Json::Number(n) => n
            .as_u64()
            .and_then(|idx| usize::try_from(idx).ok())
            .map(ColumnRef::Index)
            .ok_or_else(|| {
                PipelineError::validation(kind, field, format!("{n} is not a non-negative integer"))
            }),
        other => Err(PipelineError::validation(
            kind,
            field,
            format!("{other} is not a column name or position"),
        )),
    }
}

fn column_list(object: &Map<String, Json>, kind: &str, field: &str) -> PipelineResult<Vec<ColumnRef>> {
    let Json::Array(items) = required(object, kind, field)? else {
        return Err(PipelineError::validation(kind, field, "must be a list"));
    };
    items.iter().map(|item| column_ref(item, kind, field)).collect()
}

/// `columns` is either `{"old": "new", ...}` or a positional list `["a", "b", ...]`
/// meaning `{0: "a", 1: "b", ...}`.
fn rename_map(object: &Map<String, Json>, kind: &str) -> PipelineResult<Vec<(ColumnRef, String)>> {
    let new_label = |value: &Json| match value {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) if n.is_u64() => Ok(n.to_string()),
        other => Err(PipelineError::validation(
            kind,
            "columns",
            format!("{other} is not a valid column name"),
        )),
    };

    match required(object, kind, "columns")? {
        Json::Object(map) => map
            .iter()
            .map(|(from, to)| Ok((ColumnRef::Name(from.clone()), new_label(to)?)))
            .collect(),
        Json::Array(items) => items
            .iter()
            .enumerate()
            .map(|(idx, to)| Ok((ColumnRef::Index(idx), new_label(to)?)))
            .collect(),
        _ => Err(PipelineError::validation(kind, "columns", "must be a map or a list")),
    }
}

fn literal(value: &Json, kind: &str, field: &str) -> PipelineResult<Value> {
    match value {
        Json::String(s) => Ok(Value::Utf8(s.clone())),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int64)
            .or_else(|| n.as_f64().map(Value::Float64))
            .ok_or_else(|| PipelineError::validation(kind, field, format!("{n} is out of range"))),
        other => Err(PipelineError::validation(
            kind,
            field,
            format!("{other} must be a string, integer, or float"),
        )),
    }
}

fn date_format(object: &Map<String, Json>, kind: &str) -> PipelineResult<String> {
    let format = required(object, kind, "date_format")?
        .as_str()
        .ok_or_else(|| PipelineError::validation(kind, "date_format", "must be a string"))?;
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(PipelineError::validation(
            kind,
            "date_format",
            format!("'{format}' is not a valid date format"),
        ));
    }
    Ok(format.to_string())
}
