//! Column projection and row predicates over JSON query results.
//!
//! Query tools accept the same three optional arguments:
//!
//! - `include`: keep only these top-level keys of each row.
//! - `exclude`: drop these top-level keys (ignored when `include` is set).
//! - `filter`: a list of [`RowFilter`]s that must all hold for a row to be
//!   kept. Fields are dotted paths into nested objects.
//!
//! Arrays are filtered row by row. A single object is projected the same way
//! and replaced by `null` when a row filter rejects it.
use serde::Deserialize;
use serde_json::{Map, Value};

/// Comparison applied by a [`RowFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Numerically greater.
    Gt,
    /// Numerically less.
    Lt,
    /// Numerically greater or equal.
    Gte,
    /// Numerically less or equal.
    Lte,
    /// String contains.
    Contains,
    /// String prefix.
    StartsWith,
    /// String suffix.
    EndsWith,
}

/// A single row predicate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RowFilter {
    /// Dotted path of the field to test, e.g. `logical.scale`.
    pub field: String,
    /// Comparison.
    pub operator: Operator,
    /// Right-hand side.
    #[serde(default)]
    pub value: Value,
}

impl RowFilter {
    /// Whether `row` satisfies this predicate.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        let Some(actual) = nested_value(row, &self.field) else {
            return self.operator == Operator::Ne;
        };
        match self.operator {
            Operator::Eq => values_equal(actual, &self.value),
            Operator::Ne => !values_equal(actual, &self.value),
            Operator::Gt => compare_numbers(actual, &self.value, |a, b| a > b),
            Operator::Lt => compare_numbers(actual, &self.value, |a, b| a < b),
            Operator::Gte => compare_numbers(actual, &self.value, |a, b| a >= b),
            Operator::Lte => compare_numbers(actual, &self.value, |a, b| a <= b),
            Operator::Contains => compare_strings(actual, &self.value, |a, b| a.contains(b)),
            Operator::StartsWith => compare_strings(actual, &self.value, |a, b| a.starts_with(b)),
            Operator::EndsWith => compare_strings(actual, &self.value, |a, b| a.ends_with(b)),
        }
    }
}

/// Projection and filtering options shared by query tools.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Keys to keep.
    pub include: Vec<String>,
    /// Keys to drop.
    pub exclude: Vec<String>,
    /// Row predicates, all of which must hold.
    pub filter: Vec<RowFilter>,
}

impl QueryOptions {
    /// Whether applying these options would leave any value unchanged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty() && self.filter.is_empty()
    }
}

/// Follow a dotted `path` through nested objects.
fn nested_value<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(row, |value, key| value.as_object()?.get(key))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
        _ => a == b,
    }
}

fn compare_numbers(a: &Value, b: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if cmp(x, y))
}

fn compare_strings(a: &Value, b: &Value, cmp: impl Fn(&str, &str) -> bool) -> bool {
    matches!((a.as_str(), b.as_str()), (Some(x), Some(y)) if cmp(x, y))
}

/// Project the keys of a single object according to `options`.
///
/// `include` wins over `exclude`; non-object values pass through.
#[must_use]
pub fn filter_columns(value: Value, options: &QueryOptions) -> Value {
    let Value::Object(map) = value else {
        return value;
    };
    if !options.include.is_empty() {
        let picked: Map<String, Value> = map
            .into_iter()
            .filter(|(k, _)| options.include.contains(k))
            .collect();
        return Value::Object(picked);
    }
    if !options.exclude.is_empty() {
        let kept: Map<String, Value> = map
            .into_iter()
            .filter(|(k, _)| !options.exclude.contains(k))
            .collect();
        return Value::Object(kept);
    }
    Value::Object(map)
}

/// Keep the rows for which every filter matches.
#[must_use]
pub fn filter_rows(rows: Vec<Value>, filters: &[RowFilter]) -> Vec<Value> {
    if filters.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| filters.iter().all(|f| f.matches(row)))
        .collect()
}

/// Apply row filters, then column projection.
#[must_use]
pub fn query(value: Value, options: &QueryOptions) -> Value {
    if options.is_empty() {
        return value;
    }
    match value {
        Value::Array(rows) => Value::Array(
            filter_rows(rows, &options.filter)
                .into_iter()
                .map(|row| filter_columns(row, options))
                .collect(),
        ),
        Value::Object(_) => {
            if options.filter.iter().all(|f| f.matches(&value)) {
                filter_columns(value, options)
            } else {
                Value::Null
            }
        }
        other => other,
    }
}
