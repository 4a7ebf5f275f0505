use serde_json::Value;

use super::error::FilterError;
use super::filter_where::text_column;
use super::types::{validate_identifier, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        match order {
            Value::String(s) => Self::parse_order_string(s),
            Value::Array(arr) => {
                // Expect array of strings like ["created_at desc", "name asc"]
                let mut out = Vec::new();
                for v in arr {
                    if let Value::String(s) = v {
                        out.extend(Self::parse_order_string(s)?);
                    }
                }
                Ok(out)
            }
            Value::Null => Ok(vec![]),
            _ => Err(FilterError::InvalidColumn("ORDER must be a string or array of strings".to_string())),
        }
    }

    fn parse_order_string(s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        // split on commas, then each token into column and direction
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                if !validate_identifier(col) {
                    return Err(FilterError::InvalidColumn(col.to_string()));
                }
                let sort = it.next().and_then(SortDirection::parse).unwrap_or_default();
                out.push(FilterOrderInfo { column: col.to_string(), sort });
            }
        }
        Ok(out)
    }

    /// Always ends with the insertion sequence so equal keys keep a stable order.
    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        let mut parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} COLLATE \"C\" {}", text_column(&i.column), i.sort.to_sql()))
            .collect();
        parts.push("\"seq\" ASC".to_string());
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_column_and_direction_pairs() {
        let infos = FilterOrder::validate_and_parse(&json!("created_at desc, name")).unwrap();
        assert_eq!(
            infos,
            vec![
                FilterOrderInfo { column: "created_at".into(), sort: SortDirection::Desc },
                FilterOrderInfo { column: "name".into(), sort: SortDirection::Asc },
            ]
        );
    }

    #[test]
    fn generated_clause_ends_with_sequence() {
        let infos = FilterOrder::validate_and_parse(&json!(["name asc"])).unwrap();
        assert_eq!(
            FilterOrder::generate(&infos),
            "ORDER BY (\"doc\"->>'name') COLLATE \"C\" ASC, \"seq\" ASC"
        );
        assert_eq!(FilterOrder::generate(&[]), "ORDER BY \"seq\" ASC");
    }

    #[test]
    fn rejects_injection_in_column_names() {
        assert!(FilterOrder::validate_and_parse(&json!("name; DROP TABLE cases")).is_err());
    }
}
