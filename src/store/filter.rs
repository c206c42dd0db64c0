//! Filter and sort primitives for document queries
//!
//! Filters are evaluated in-process against JSON documents. Field paths are
//! dot-separated and traverse both objects and array positions, so
//! `indices.0.start` reaches the primary index bounds of a chunk document.

use serde_json::Value;
use std::cmp::Ordering;

/// A predicate over a JSON document
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,
    /// Field equals value; strings optionally compared case-insensitively
    Eq {
        field: String,
        value: Value,
        case_insensitive: bool,
    },
    /// Field differs from value
    Ne { field: String, value: Value },
    /// Numeric field strictly below bound
    Lt { field: String, value: f64 },
    /// Numeric field at or below bound
    Lte { field: String, value: f64 },
    /// Numeric field strictly above bound
    Gt { field: String, value: f64 },
    /// Numeric field at or above bound
    Gte { field: String, value: f64 },
    /// All sub-filters match
    And(Vec<Filter>),
    /// At least one sub-filter matches
    Or(Vec<Filter>),
}

impl Filter {
    /// Case-sensitive equality on a field
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
            case_insensitive: false,
        }
    }

    /// Case-insensitive equality on a string field
    pub fn eq_ci(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: Value::String(value.into()),
            case_insensitive: true,
        }
    }

    pub fn lte(field: impl Into<String>, value: f64) -> Self {
        Filter::Lte {
            field: field.into(),
            value,
        }
    }

    pub fn gte(field: impl Into<String>, value: f64) -> Self {
        Filter::Gte {
            field: field.into(),
            value,
        }
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    /// Evaluate this filter against a document
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq {
                field,
                value,
                case_insensitive,
            } => match field_value(doc, field) {
                Some(actual) => {
                    if *case_insensitive {
                        match (actual.as_str(), value.as_str()) {
                            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                            _ => values_equal(actual, value),
                        }
                    } else {
                        values_equal(actual, value)
                    }
                }
                None => value.is_null(),
            },
            Filter::Ne { field, value } => match field_value(doc, field) {
                Some(actual) => !values_equal(actual, value),
                None => !value.is_null(),
            },
            Filter::Lt { field, value } => numeric(doc, field).map(|v| v < *value).unwrap_or(false),
            Filter::Lte { field, value } => {
                numeric(doc, field).map(|v| v <= *value).unwrap_or(false)
            }
            Filter::Gt { field, value } => numeric(doc, field).map(|v| v > *value).unwrap_or(false),
            Filter::Gte { field, value } => {
                numeric(doc, field).map(|v| v >= *value).unwrap_or(false)
            }
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }
}

/// Sort order over a (possibly nested) document field
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: String,
    pub ascending: bool,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }

    /// Compare two documents by the sort field
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let va = field_value(a, &self.field);
        let vb = field_value(b, &self.field);
        let ord = compare_values(va, vb);
        if self.ascending {
            ord
        } else {
            ord.reverse()
        }
    }
}

/// Resolve a dot-separated path inside a document
///
/// Numeric path components index into arrays.
pub fn field_value<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for part in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn numeric(doc: &Value, path: &str) -> Option<f64> {
    field_value(doc, path).and_then(Value::as_f64)
}

/// Equality that treats `12` and `12.0` as the same number
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            } else if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
                x.cmp(y)
            } else {
                Ordering::Equal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_nested() {
        let doc = json!({"indices": [{"start": 100.0, "end": 300.0}], "uri": "w1"});

        assert_eq!(
            field_value(&doc, "indices.0.start"),
            Some(&json!(100.0))
        );
        assert_eq!(field_value(&doc, "uri"), Some(&json!("w1")));
        assert_eq!(field_value(&doc, "indices.1.start"), None);
        assert_eq!(field_value(&doc, "missing"), None);
    }

    #[test]
    fn test_eq_case_insensitive() {
        let doc = json!({"uri": "eml://witsml14/well(W1)/log(L1)"});

        assert!(Filter::eq_ci("uri", "EML://witsml14/WELL(W1)/log(L1)").matches(&doc));
        assert!(!Filter::eq("uri", "EML://witsml14/WELL(W1)/log(L1)").matches(&doc));
    }

    #[test]
    fn test_numeric_bounds() {
        let doc = json!({"indices": [{"start": 1000.0, "end": 1900.0}]});

        assert!(Filter::gte("indices.0.end", 1500.0).matches(&doc));
        assert!(Filter::lte("indices.0.start", 1000.0).matches(&doc));
        assert!(!Filter::gte("indices.0.end", 2000.0).matches(&doc));
    }

    #[test]
    fn test_and_or() {
        let doc = json!({"a": 1.0, "b": 2.0});

        let filter = Filter::and(vec![Filter::gte("a", 1.0), Filter::lte("b", 2.0)]);
        assert!(filter.matches(&doc));

        let filter = Filter::or(vec![Filter::gte("a", 5.0), Filter::lte("b", 2.0)]);
        assert!(filter.matches(&doc));

        let filter = Filter::and(vec![Filter::gte("a", 5.0), Filter::lte("b", 2.0)]);
        assert!(!filter.matches(&doc));
    }

    #[test]
    fn test_sort_by_nested_field() {
        let mut docs = vec![
            json!({"indices": [{"start": 2000.0}]}),
            json!({"indices": [{"start": 0.0}]}),
            json!({"indices": [{"start": 1000.0}]}),
        ];

        let sort = Sort::asc("indices.0.start");
        docs.sort_by(|a, b| sort.compare(a, b));
        let starts: Vec<f64> = docs
            .iter()
            .map(|d| field_value(d, "indices.0.start").unwrap().as_f64().unwrap())
            .collect();
        assert_eq!(starts, vec![0.0, 1000.0, 2000.0]);

        let sort = Sort::desc("indices.0.start");
        docs.sort_by(|a, b| sort.compare(a, b));
        let starts: Vec<f64> = docs
            .iter()
            .map(|d| field_value(d, "indices.0.start").unwrap().as_f64().unwrap())
            .collect();
        assert_eq!(starts, vec![2000.0, 1000.0, 0.0]);
    }
}
