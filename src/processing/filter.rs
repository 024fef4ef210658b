//! Row predicates over a [`crate::types::DataSet`].
//!
//! A [`Filter`] evaluates one condition per row and returns a [`Mask`] with the same length and
//! order as the dataset. Several filters combine with [`conjunction`] (logical AND).

use std::fmt;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{ColumnRef, DataSet, Value};

/// One boolean per row, in dataset order.
pub type Mask = Vec<bool>;

/// Closed vocabulary of filter kinds, keyed by their description tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    NotNull,
    Regex,
    GreaterThan,
    GreaterThanEqualTo,
    EqualTo,
    LessThan,
    LessThanEqualTo,
}

impl FilterKind {
    /// Parse a filter kind from its description tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "not_null" => Some(Self::NotNull),
            "regex" => Some(Self::Regex),
            "greater_than" => Some(Self::GreaterThan),
            "greater_than_equal_to" => Some(Self::GreaterThanEqualTo),
            "equal_to" => Some(Self::EqualTo),
            "less_than" => Some(Self::LessThan),
            "less_than_equal_to" => Some(Self::LessThanEqualTo),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NotNull => "NotNull",
            Self::Regex => "Regex",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanEqualTo => "GreaterThanEqualTo",
            Self::EqualTo => "EqualTo",
            Self::LessThan => "LessThan",
            Self::LessThanEqualTo => "LessThanEqualTo",
        }
    }
}

/// A single row predicate.
#[derive(Debug, Clone)]
pub enum Filter {
    /// True iff the row's value is not null.
    NotNull { column: ColumnRef },
    /// True iff the row's value, rendered as text, matches `pattern` in full.
    Regex {
        column: ColumnRef,
        pattern: String,
        regex: regex::Regex,
    },
    GreaterThan { column: ColumnRef, threshold: f64 },
    GreaterThanEqualTo { column: ColumnRef, threshold: f64 },
    EqualTo { column: ColumnRef, threshold: f64 },
    LessThan { column: ColumnRef, threshold: f64 },
    LessThanEqualTo { column: ColumnRef, threshold: f64 },
}

impl Filter {
    /// Build a [`Filter::Regex`], compiling `pattern` anchored at both ends.
    pub fn regex(column: ColumnRef, pattern: impl Into<String>) -> PipelineResult<Self> {
        let pattern = pattern.into();
        let regex = regex::Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            PipelineError::validation(FilterKind::Regex.name(), "pattern", e.to_string())
        })?;
        Ok(Self::Regex {
            column,
            pattern,
            regex,
        })
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Self::NotNull { .. } => FilterKind::NotNull,
            Self::Regex { .. } => FilterKind::Regex,
            Self::GreaterThan { .. } => FilterKind::GreaterThan,
            Self::GreaterThanEqualTo { .. } => FilterKind::GreaterThanEqualTo,
            Self::EqualTo { .. } => FilterKind::EqualTo,
            Self::LessThan { .. } => FilterKind::LessThan,
            Self::LessThanEqualTo { .. } => FilterKind::LessThanEqualTo,
        }
    }

    pub fn column(&self) -> &ColumnRef {
        match self {
            Self::NotNull { column }
            | Self::Regex { column, .. }
            | Self::GreaterThan { column, .. }
            | Self::GreaterThanEqualTo { column, .. }
            | Self::EqualTo { column, .. }
            | Self::LessThan { column, .. }
            | Self::LessThanEqualTo { column, .. } => column,
        }
    }

    /// Evaluate the predicate for every row of `dataset`.
    ///
    /// Nulls never satisfy a comparison or a pattern. Ordering comparisons against a non-numeric
    /// value fail with [`PipelineError::Coercion`].
    pub fn apply(&self, dataset: &DataSet) -> PipelineResult<Mask> {
        let idx = dataset.schema.resolve(self.column())?;
        let values = dataset.column_values(idx);

        match self {
            Self::NotNull { .. } => Ok(values.map(|v| !v.is_null()).collect()),
            Self::Regex { regex, .. } => Ok(values
                .map(|v| !v.is_null() && regex.is_match(&v.to_string()))
                .collect()),
            Self::GreaterThan { threshold, .. } => {
                self.compare(dataset, idx, |v| v > *threshold)
            }
            Self::GreaterThanEqualTo { threshold, .. } => {
                self.compare(dataset, idx, |v| v >= *threshold)
            }
            Self::EqualTo { threshold, .. } => self.compare(dataset, idx, |v| v == *threshold),
            Self::LessThan { threshold, .. } => self.compare(dataset, idx, |v| v < *threshold),
            Self::LessThanEqualTo { threshold, .. } => {
                self.compare(dataset, idx, |v| v <= *threshold)
            }
        }
    }

    fn compare<F>(&self, dataset: &DataSet, idx: usize, op: F) -> PipelineResult<Mask>
    where
        F: Fn(f64) -> bool,
    {
        dataset
            .column_values(idx)
            .map(|value| match value {
                Value::Null => Ok(false),
                other => other.as_f64().map(&op).ok_or_else(|| PipelineError::Coercion {
                    column: dataset.schema.columns[idx].clone(),
                    raw: other.to_string(),
                    expected: "number".to_string(),
                    message: format!(
                        "{} cannot compare a {} value",
                        self.kind().name(),
                        other.data_type()
                    ),
                }),
            })
            .collect()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind().name();
        match self {
            Self::NotNull { column } => write!(f, "{name}(column={column})"),
            Self::Regex {
                column, pattern, ..
            } => write!(f, "{name}(column={column}, pattern={pattern})"),
            Self::GreaterThan { column, threshold }
            | Self::GreaterThanEqualTo { column, threshold }
            | Self::EqualTo { column, threshold }
            | Self::LessThan { column, threshold }
            | Self::LessThanEqualTo { column, threshold } => {
                write!(f, "{name}(column={column}, threshold={threshold})")
            }
        }
    }
}

/// Logical AND of every filter's mask. With no filters every row is selected.
pub fn conjunction(filters: &[Filter], dataset: &DataSet) -> PipelineResult<Mask> {
    let mut mask = vec![true; dataset.row_count()];
    for filter in filters {
        for (selected, keep) in mask.iter_mut().zip(filter.apply(dataset)?) {
            *selected &= keep;
        }
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::{Filter, FilterKind, conjunction};
    use crate::error::PipelineError;
    use crate::types::{ColumnRef, DataSet, Value};

    fn numbers() -> DataSet {
        DataSet::from_columns(vec![(
            "values",
            [10, 20, 30, 40, 50].into_iter().map(Value::Int64).collect(),
        )])
    }

    fn col(name: &str) -> ColumnRef {
        ColumnRef::from(name)
    }

    #[test]
    fn comparison_filters_over_numeric_column() {
        let ds = numbers();
        let cases = [
            (
                Filter::GreaterThan {
                    column: col("values"),
                    threshold: 25.0,
                },
                [false, false, true, true, true],
            ),
            (
                Filter::GreaterThanEqualTo {
                    column: col("values"),
                    threshold: 30.0,
                },
                [false, false, true, true, true],
            ),
            (
                Filter::EqualTo {
                    column: col("values"),
                    threshold: 30.0,
                },
                [false, false, true, false, false],
            ),
            (
                Filter::LessThan {
                    column: col("values"),
                    threshold: 30.0,
                },
                [true, true, false, false, false],
            ),
            (
                Filter::LessThanEqualTo {
                    column: col("values"),
                    threshold: 30.0,
                },
                [true, true, true, false, false],
            ),
        ];
        for (filter, expected) in cases {
            assert_eq!(filter.apply(&ds).unwrap(), expected.to_vec(), "{filter}");
        }
    }

    #[test]
    fn regex_filter_matches_whole_value() {
        let ds = DataSet::from_columns(vec![(
            "codes",
            ["ABC123", "DEF456", "hello", "JKL012"]
                .into_iter()
                .map(Value::from)
                .collect(),
        )]);
        let filter = Filter::regex(col("codes"), r"^[A-Z]{3}\d{3}$").unwrap();
        assert_eq!(filter.apply(&ds).unwrap(), vec![true, true, false, true]);

        let partial = Filter::regex(col("codes"), "[A-Z]{3}").unwrap();
        assert_eq!(partial.apply(&ds).unwrap(), vec![false, false, false, false]);
    }

    #[test]
    fn regex_filter_rejects_invalid_pattern() {
        let err = Filter::regex(col("codes"), "(unclosed").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ConfigValidation { ref kind, ref field, .. } if kind == "Regex" && field == "pattern"
        ));
    }

    #[test]
    fn not_null_filter() {
        let ds = DataSet::from_columns(vec![(
            "n",
            vec![Value::Int64(1), Value::Null, Value::Int64(3)],
        )]);
        let filter = Filter::NotNull { column: col("n") };
        assert_eq!(filter.apply(&ds).unwrap(), vec![true, false, true]);
    }

    #[test]
    fn comparisons_skip_nulls_and_reject_text() {
        let ds = DataSet::from_columns(vec![(
            "n",
            vec![Value::Float64(5.5), Value::Null, Value::from("x")],
        )]);
        let filter = Filter::GreaterThan {
            column: col("n"),
            threshold: 1.0,
        };
        let err = filter.apply(&ds).unwrap_err();
        assert!(matches!(err, PipelineError::Coercion { .. }));

        let ds = DataSet::from_columns(vec![("n", vec![Value::Float64(5.5), Value::Null])]);
        assert_eq!(filter.apply(&ds).unwrap(), vec![true, false]);
    }

    #[test]
    fn filter_on_missing_column_fails() {
        let filter = Filter::NotNull {
            column: ColumnRef::Index(4),
        };
        let err = filter.apply(&numbers()).unwrap_err();
        assert!(matches!(err, PipelineError::ColumnResolution { .. }));
    }

    #[test]
    fn conjunction_is_logical_and() {
        let ds = numbers();
        let filters = vec![
            Filter::GreaterThan {
                column: col("values"),
                threshold: 15.0,
            },
            Filter::LessThan {
                column: col("values"),
                threshold: 45.0,
            },
        ];
        assert_eq!(
            conjunction(&filters, &ds).unwrap(),
            vec![false, true, true, true, false]
        );
    }

    #[test]
    fn empty_conjunction_selects_every_row() {
        assert_eq!(conjunction(&[], &numbers()).unwrap(), vec![true; 5]);
    }

    #[test]
    fn kind_tags_round_trip_through_names() {
        assert_eq!(FilterKind::from_tag("greater_than_equal_to"), Some(FilterKind::GreaterThanEqualTo));
        assert_eq!(FilterKind::from_tag("between"), None);
        assert_eq!(FilterKind::NotNull.name(), "NotNull");
    }
}
