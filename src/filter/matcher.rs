//! Evaluates where-clause documents against JSON documents held in memory.
//!
//! Semantics mirror the SQL produced by [`FilterWhere`](super::filter_where::FilterWhere):
//! equality compares JSON values, a missing field equals `null`, and `$iregex`
//! tests the field's text form case-insensitively.

use std::cmp::Ordering;

use regex::RegexBuilder;
use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{validate_identifier, FilterOp, FilterOrderInfo, SortDirection};

pub fn matches(where_data: &Value, doc: &Value) -> Result<bool, FilterError> {
    match where_data {
        Value::Null => Ok(true),
        Value::Object(obj) => match_object(obj, doc),
        _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
    }
}

fn match_object(obj: &Map<String, Value>, doc: &Value) -> Result<bool, FilterError> {
    for (key, value) in obj {
        let ok = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in logical_items(key, value)? {
                    if !matches(clause, doc)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for clause in logical_items(key, value)? {
                    if matches(clause, doc)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            op if op.starts_with('$') => return Err(FilterError::UnsupportedOperator(op.to_string())),
            field => match_field(field, value, doc)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn logical_items<'a>(op: &str, value: &'a Value) -> Result<&'a Vec<Value>, FilterError> {
    value
        .as_array()
        .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))
}

fn match_field(field: &str, condition: &Value, doc: &Value) -> Result<bool, FilterError> {
    if !validate_identifier(field) {
        return Err(FilterError::InvalidColumn(field.to_string()));
    }
    let actual = doc.get(field).unwrap_or(&Value::Null);

    let Value::Object(ops) = condition else {
        return Ok(actual == condition);
    };
    if ops.is_empty() {
        return Err(FilterError::InvalidOperatorData(format!("empty condition for '{}'", field)));
    }

    for (op_key, data) in ops {
        let ok = match FilterOp::parse(op_key)? {
            FilterOp::Eq => actual == data,
            FilterOp::In => data
                .as_array()
                .ok_or_else(|| FilterError::InvalidOperatorData("$in requires array".to_string()))?
                .iter()
                .any(|v| v == actual),
            FilterOp::IRegex => {
                let pattern = data
                    .as_str()
                    .ok_or_else(|| FilterError::InvalidOperatorData("$iregex requires string".to_string()))?;
                let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
                match text_value(actual) {
                    Some(text) => re.is_match(&text),
                    None => false,
                }
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Text form of a field, matching PostgreSQL's `->>` operator.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Orders two documents the way `ORDER BY doc->>'f' COLLATE "C"` would.
///
/// Missing values sort last ascending and first descending, like PostgreSQL NULLs.
pub fn compare(a: &Value, b: &Value, order: &[FilterOrderInfo]) -> Ordering {
    for info in order {
        let left = a.get(&info.column).and_then(text_value);
        let right = b.get(&info.column).and_then(text_value);
        let ordering = match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(l), Some(r)) => l.as_bytes().cmp(r.as_bytes()),
        };
        let ordering = match info.sort {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn case_doc() -> Value {
        json!({
            "id": "c1",
            "tenant_id": "t1",
            "plaintiff": "John Smith",
            "court": "Tbilisi City Court",
            "amount": "5,000.00",
            "notes": null
        })
    }

    #[test]
    fn implicit_equality_and_missing_fields() {
        let doc = case_doc();
        assert!(matches(&json!({ "tenant_id": "t1" }), &doc).unwrap());
        assert!(!matches(&json!({ "tenant_id": "t2" }), &doc).unwrap());
        assert!(matches(&json!({ "notes": null }), &doc).unwrap());
        assert!(matches(&json!({ "judge": null }), &doc).unwrap());
        assert!(!matches(&json!({ "judge": "x" }), &doc).unwrap());
    }

    #[test]
    fn iregex_is_case_insensitive() {
        let doc = case_doc();
        assert!(matches(&json!({ "plaintiff": { "$iregex": "SMITH" } }), &doc).unwrap());
        assert!(!matches(&json!({ "court": { "$iregex": "smith" } }), &doc).unwrap());
        assert!(!matches(&json!({ "notes": { "$iregex": "" } }), &doc).unwrap());
    }

    #[test]
    fn logical_groups() {
        let doc = case_doc();
        let filter = json!({
            "$and": [
                { "tenant_id": "t1" },
                { "$or": [ { "court": { "$iregex": "smith" } }, { "plaintiff": { "$iregex": "smith" } } ] }
            ]
        });
        assert!(matches(&filter, &doc).unwrap());
        assert!(!matches(&json!({ "$or": [] }), &doc).unwrap());
        assert!(matches(&json!({ "$and": [] }), &doc).unwrap());
        assert!(matches(&json!({ "id": { "$in": ["c0", "c1"] } }), &doc).unwrap());
        assert!(!matches(&json!({ "id": { "$in": [] } }), &doc).unwrap());
    }

    #[test]
    fn rejects_what_the_sql_compiler_rejects() {
        let doc = case_doc();
        assert!(matches(&json!({ "a": { "$gt": 1 } }), &doc).is_err());
        assert!(matches(&json!({ "$not": [] }), &doc).is_err());
        assert!(matches(&json!({ "a": { "$iregex": "(" } }), &doc).is_err());
    }

    #[test]
    fn compare_uses_byte_order_with_nulls_last() {
        let order = vec![FilterOrderInfo { column: "name".into(), sort: SortDirection::Asc }];
        let a = json!({ "name": "Zed" });
        let b = json!({ "name": "abe" });
        let none = json!({});
        assert_eq!(compare(&a, &b, &order), Ordering::Less);
        assert_eq!(compare(&a, &none, &order), Ordering::Less);

        let desc = vec![FilterOrderInfo { column: "name".into(), sort: SortDirection::Desc }];
        assert_eq!(compare(&a, &b, &desc), Ordering::Greater);
        assert_eq!(compare(&a, &none, &desc), Ordering::Greater);
    }
}
