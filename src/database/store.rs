use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::database::manager::DatabaseError;
use crate::filter::FilterData;

/// Named groups of documents. Each maps to one table in PostgreSQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Companies,
    Users,
    Customers,
    Cases,
    ShareableLinks,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Companies,
        Collection::Users,
        Collection::Customers,
        Collection::Cases,
        Collection::ShareableLinks,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Companies => "companies",
            Collection::Users => "users",
            Collection::Customers => "customers",
            Collection::Cases => "cases",
            Collection::ShareableLinks => "shareable_links",
        }
    }

    /// Field sets that must be unique across the collection.
    /// Kept in sync with the unique indexes in `migrations/`.
    pub fn unique_keys(&self) -> &'static [&'static [&'static str]] {
        match self {
            Collection::Companies => &[&["email"]],
            Collection::Users => &[&["tenant_id", "email"]],
            Collection::ShareableLinks => &[&["token"]],
            Collection::Customers | Collection::Cases => &[],
        }
    }
}

/// Persistence for JSON documents. Every document carries a string `id`.
///
/// Single-document operations are atomic; nothing spans documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Matching documents in `order` (insertion order for ties), then offset/limit.
    async fn find(&self, collection: Collection, filter: FilterData) -> Result<Vec<Value>, DatabaseError>;

    async fn count(&self, collection: Collection, where_clause: Value) -> Result<i64, DatabaseError>;

    async fn insert(&self, collection: Collection, doc: Value) -> Result<Value, DatabaseError>;

    /// Shallow-merges `changes` into the first matching document and returns it.
    async fn update_one(
        &self,
        collection: Collection,
        where_clause: Value,
        changes: Map<String, Value>,
    ) -> Result<Option<Value>, DatabaseError>;

    async fn delete_one(&self, collection: Collection, where_clause: Value) -> Result<Option<Value>, DatabaseError>;

    async fn delete_many(&self, collection: Collection, where_clause: Value) -> Result<u64, DatabaseError>;

    /// Adds `by` to an integer field and merges `set`, in one atomic step.
    async fn increment(
        &self,
        collection: Collection,
        where_clause: Value,
        field: &str,
        by: i64,
        set: Map<String, Value>,
    ) -> Result<Option<Value>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

pub(crate) fn document_id(doc: &Value) -> Result<&str, DatabaseError> {
    doc.get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| DatabaseError::QueryError("document is missing a string id".to_string()))
}
