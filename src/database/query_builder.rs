use serde_json::{Map, Value};
use sqlx::{self, postgres::{PgArguments, PgRow}, PgPool, Postgres, Row};

use crate::database::manager::DatabaseError;
use crate::database::store::Collection;
use crate::filter::types::{validate_identifier, SqlParam, SqlResult};
use crate::filter::{Filter, FilterData, FilterError};

/// Builds and runs statements against one collection table.
pub struct QueryBuilder {
    collection: Collection,
    filter: Filter,
}

impl QueryBuilder {
    pub fn new(collection: Collection) -> Result<Self, DatabaseError> {
        Ok(Self {
            collection,
            filter: Filter::new(collection.table_name())?,
        })
    }

    pub fn filter(mut self, filter_data: FilterData) -> Result<Self, DatabaseError> {
        self.filter.assign(filter_data)?;
        Ok(self)
    }

    pub fn where_clause(mut self, where_clause: Value) -> Result<Self, DatabaseError> {
        self.filter.where_clause(where_clause)?;
        Ok(self)
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<Value>, DatabaseError> {
        let sql_result = self.filter.to_sql()?;
        let rows = bind_params(sqlx::query(&sql_result.query), &sql_result.params)
            .fetch_all(pool)
            .await?;
        rows.iter().map(doc_column).collect()
    }

    pub async fn count(self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let sql_result = self.filter.to_count_sql()?;
        let row = bind_params(sqlx::query(&sql_result.query), &sql_result.params)
            .fetch_one(pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    pub async fn insert(self, pool: &PgPool, id: uuid::Uuid, doc: Value) -> Result<Value, DatabaseError> {
        let query = format!(
            "INSERT INTO \"{}\" (\"id\", \"doc\") VALUES ($1, $2) RETURNING \"doc\"",
            self.collection.table_name()
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(doc)
            .fetch_one(pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        doc_column(&row)
    }

    pub async fn update_one(self, pool: &PgPool, changes: Map<String, Value>) -> Result<Option<Value>, DatabaseError> {
        let sql_result = self.first_match_statement("UPDATE", "SET \"doc\" = \"doc\" || $1::jsonb", 1)?;
        let q = sqlx::query(&sql_result.query).bind(Value::Object(changes));
        let row = bind_params(q, &sql_result.params)
            .fetch_optional(pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        row.as_ref().map(doc_column).transpose()
    }

    pub async fn increment(
        self,
        pool: &PgPool,
        field: &str,
        by: i64,
        set: Map<String, Value>,
    ) -> Result<Option<Value>, DatabaseError> {
        if !validate_identifier(field) {
            return Err(FilterError::InvalidColumn(field.to_string()).into());
        }
        // Evaluated against the locked row, so concurrent increments never lose updates
        let assignment = format!(
            "SET \"doc\" = jsonb_set(\"doc\" || $2::jsonb, '{{{field}}}', to_jsonb(COALESCE((\"doc\"->>'{field}')::bigint, 0) + $1))",
            field = field
        );
        let sql_result = self.first_match_statement("UPDATE", &assignment, 2)?;
        let q = sqlx::query(&sql_result.query).bind(by).bind(Value::Object(set));
        let row = bind_params(q, &sql_result.params).fetch_optional(pool).await?;
        row.as_ref().map(doc_column).transpose()
    }

    pub async fn delete_one(self, pool: &PgPool) -> Result<Option<Value>, DatabaseError> {
        let sql_result = self.first_match_statement("DELETE", "", 0)?;
        let row = bind_params(sqlx::query(&sql_result.query), &sql_result.params)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(doc_column).transpose()
    }

    pub async fn delete_many(self, pool: &PgPool) -> Result<u64, DatabaseError> {
        let where_result = self.filter.to_where_sql(0)?;
        let query = format!(
            "DELETE FROM \"{}\" WHERE {}",
            self.collection.table_name(),
            where_result.query
        );
        let result = bind_params(sqlx::query(&query), &where_result.params)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// `UPDATE t SET .. WHERE id = (first match)` or `DELETE FROM t WHERE id = (first match)`.
    ///
    /// Where-clause placeholders start after the `reserved` leading parameters.
    fn first_match_statement(&self, verb: &str, assignment: &str, reserved: usize) -> Result<SqlResult, DatabaseError> {
        let table = self.collection.table_name();
        let where_result = self.filter.to_where_sql(reserved)?;
        let target = format!(
            "SELECT \"id\" FROM \"{}\" WHERE {} ORDER BY \"seq\" ASC LIMIT 1",
            table, where_result.query
        );
        let query = match verb {
            "DELETE" => format!("DELETE FROM \"{}\" WHERE \"id\" = ({}) RETURNING \"doc\"", table, target),
            _ => format!("UPDATE \"{}\" {} WHERE \"id\" = ({}) RETURNING \"doc\"", table, assignment, target),
        };
        Ok(SqlResult { query, params: where_result.params })
    }
}

fn doc_column(row: &PgRow) -> Result<Value, DatabaseError> {
    Ok(row.try_get::<Value, _>("doc")?)
}

fn bind_params<'q>(
    mut q: sqlx::query::Query<'q, Postgres, PgArguments>,
    params: &[SqlParam],
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    for p in params {
        q = match p {
            SqlParam::Text(s) => q.bind(s.clone()),
            SqlParam::Json(v) => q.bind(v.clone()),
        };
    }
    q
}
