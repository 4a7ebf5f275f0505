use serde_json::{json, Map, Value};

use super::error::FilterError;
use super::types::{validate_identifier, FilterOp, SqlParam};

/// Compiles a where-clause document into a SQL predicate over the `doc` JSONB column.
///
/// Parameters are numbered globally so nested `$and`/`$or` groups share one
/// placeholder sequence starting after `starting_param_index`.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(where_data: &Value, starting_param_index: usize) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let sql = filter_where.build(where_data)?;
        Ok((sql, filter_where.param_values))
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn build(&mut self, where_data: &Value) -> Result<String, FilterError> {
        match where_data {
            Value::Null => Ok("1=1".to_string()),
            Value::Object(obj) => self.build_object(obj),
            _ => Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        }
    }

    fn build_object(&mut self, obj: &Map<String, Value>) -> Result<String, FilterError> {
        let mut sql_conditions = Vec::with_capacity(obj.len());
        for (key, value) in obj {
            let sql = if key.starts_with('$') {
                self.build_logical_operator(key, value)?
            } else {
                self.build_field_condition(key, value)?
            };
            sql_conditions.push(sql);
        }

        Ok(match sql_conditions.len() {
            0 => "1=1".to_string(),
            1 => sql_conditions.remove(0),
            _ => sql_conditions.join(" AND "),
        })
    }

    fn build_logical_operator(&mut self, op: &str, value: &Value) -> Result<String, FilterError> {
        let joiner = match op {
            "$and" => " AND ",
            "$or" => " OR ",
            _ => return Err(FilterError::UnsupportedOperator(op.to_string())),
        };
        let arr = value
            .as_array()
            .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
        if arr.is_empty() {
            // Empty $or matches nothing, empty $and matches everything
            return Ok(if op == "$or" { "1=0" } else { "1=1" }.to_string());
        }

        let mut sql_parts = Vec::with_capacity(arr.len());
        for v in arr {
            FilterWhere::validate(v)?;
            let sql = self.build(v)?;
            // A lone nested group already brings its own parentheses
            sql_parts.push(if is_logical_group(v) { sql } else { format!("({})", sql) });
        }
        Ok(format!("({})", sql_parts.join(joiner)))
    }

    fn build_field_condition(&mut self, field: &str, value: &Value) -> Result<String, FilterError> {
        if !validate_identifier(field) {
            return Err(FilterError::InvalidColumn(field.to_string()));
        }

        match value {
            Value::Object(obj) => {
                let mut parts = Vec::with_capacity(obj.len());
                for (op_key, op_val) in obj {
                    let operator = FilterOp::parse(op_key)?;
                    parts.push(self.build_sql_condition(field, operator, op_val)?);
                }
                if parts.is_empty() {
                    return Err(FilterError::InvalidOperatorData(format!("empty condition for '{}'", field)));
                }
                Ok(parts.join(" AND "))
            }
            // Implicit equality: { field: value }
            _ => self.build_sql_condition(field, FilterOp::Eq, value),
        }
    }

    fn build_sql_condition(&mut self, field: &str, operator: FilterOp, data: &Value) -> Result<String, FilterError> {
        match operator {
            FilterOp::Eq => Ok(self.equality(field, data)),
            FilterOp::In => {
                let values = data
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData("$in requires array".to_string()))?;
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                let parts: Vec<String> = values.iter().map(|v| self.equality(field, v)).collect();
                Ok(format!("({})", parts.join(" OR ")))
            }
            FilterOp::IRegex => {
                let pattern = data
                    .as_str()
                    .ok_or_else(|| FilterError::InvalidOperatorData("$iregex requires string".to_string()))?;
                // Reject patterns the in-memory matcher would reject as well
                regex::Regex::new(pattern)?;
                let placeholder = self.param(SqlParam::Text(pattern.to_string()));
                Ok(format!("{} ~* {}", text_column(field), placeholder))
            }
        }
    }

    fn equality(&mut self, field: &str, data: &Value) -> String {
        if data.is_null() {
            return format!("COALESCE(\"doc\"->'{}', 'null'::jsonb) = 'null'::jsonb", field);
        }
        // Containment keeps JSON typing and can use a GIN index on "doc"
        let placeholder = self.param(SqlParam::Json(json!({ field: data })));
        format!("\"doc\" @> {}::jsonb", placeholder)
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

fn is_logical_group(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.len() == 1 && obj.keys().all(|k| k == "$and" || k == "$or"))
}

pub(crate) fn text_column(field: &str) -> String {
    format!("(\"doc\"->>'{}')", field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_matches_everything() {
        let (sql, params) = FilterWhere::generate(&json!({}), 0).unwrap();
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn nested_groups_share_one_parameter_sequence() {
        let where_data = json!({
            "$and": [
                { "tenant_id": "t1" },
                { "$or": [
                    { "plaintiff": { "$iregex": "smith" } },
                    { "court": { "$iregex": "smith" } }
                ] }
            ]
        });
        let (sql, params) = FilterWhere::generate(&where_data, 0).unwrap();
        assert_eq!(
            sql,
            "((\"doc\" @> $1::jsonb) AND (((\"doc\"->>'plaintiff') ~* $2) OR ((\"doc\"->>'court') ~* $3)))"
        );
        assert_eq!(params.len(), 3);
        assert_eq!(params[0], SqlParam::Json(json!({ "tenant_id": "t1" })));
        assert_eq!(params[2], SqlParam::Text("smith".to_string()));
    }

    #[test]
    fn starting_index_offsets_placeholders() {
        let (sql, _) = FilterWhere::generate(&json!({ "id": "x" }), 2).unwrap();
        assert_eq!(sql, "\"doc\" @> $3::jsonb");
    }

    #[test]
    fn in_operator_expands_to_containment_alternatives() {
        let (sql, params) = FilterWhere::generate(&json!({ "id": { "$in": ["a", "b"] } }), 0).unwrap();
        assert_eq!(sql, "(\"doc\" @> $1::jsonb OR \"doc\" @> $2::jsonb)");
        assert_eq!(params.len(), 2);

        let (sql, params) = FilterWhere::generate(&json!({ "id": { "$in": [] } }), 0).unwrap();
        assert_eq!(sql, "1=0");
        assert!(params.is_empty());
    }

    #[test]
    fn rejects_unknown_operators_and_bad_columns() {
        assert!(matches!(
            FilterWhere::generate(&json!({ "a": { "$gt": 1 } }), 0),
            Err(FilterError::UnsupportedOperator(_))
        ));
        assert!(matches!(
            FilterWhere::generate(&json!({ "a'; DROP": 1 }), 0),
            Err(FilterError::InvalidColumn(_))
        ));
        assert!(FilterWhere::validate(&json!("raw sql")).is_err());
    }
}
