use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::QueryBuilder;
use crate::database::store::{document_id, Collection, DocumentStore};
use crate::filter::FilterData;

/// PostgreSQL-backed store: one `(id, seq, doc JSONB)` table per collection.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find(&self, collection: Collection, filter: FilterData) -> Result<Vec<Value>, DatabaseError> {
        QueryBuilder::new(collection)?
            .filter(filter)?
            .select_all(&self.pool)
            .await
    }

    async fn count(&self, collection: Collection, where_clause: Value) -> Result<i64, DatabaseError> {
        QueryBuilder::new(collection)?
            .where_clause(where_clause)?
            .count(&self.pool)
            .await
    }

    async fn insert(&self, collection: Collection, doc: Value) -> Result<Value, DatabaseError> {
        let id = Uuid::parse_str(document_id(&doc)?)
            .map_err(|e| DatabaseError::QueryError(format!("document id is not a UUID: {}", e)))?;
        QueryBuilder::new(collection)?.insert(&self.pool, id, doc).await
    }

    async fn update_one(
        &self,
        collection: Collection,
        where_clause: Value,
        changes: Map<String, Value>,
    ) -> Result<Option<Value>, DatabaseError> {
        QueryBuilder::new(collection)?
            .where_clause(where_clause)?
            .update_one(&self.pool, changes)
            .await
    }

    async fn delete_one(&self, collection: Collection, where_clause: Value) -> Result<Option<Value>, DatabaseError> {
        QueryBuilder::new(collection)?
            .where_clause(where_clause)?
            .delete_one(&self.pool)
            .await
    }

    async fn delete_many(&self, collection: Collection, where_clause: Value) -> Result<u64, DatabaseError> {
        QueryBuilder::new(collection)?
            .where_clause(where_clause)?
            .delete_many(&self.pool)
            .await
    }

    async fn increment(
        &self,
        collection: Collection,
        where_clause: Value,
        field: &str,
        by: i64,
        set: Map<String, Value>,
    ) -> Result<Option<Value>, DatabaseError> {
        QueryBuilder::new(collection)?
            .where_clause(where_clause)?
            .increment(&self.pool, field, by, set)
            .await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
