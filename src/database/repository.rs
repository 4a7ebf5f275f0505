use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{Collection, DocumentStore};
use crate::filter::FilterData;

/// A document type stored in one collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;
}

/// Typed access to one collection, with no tenant scoping.
///
/// Tenant-owned data should normally go through [`Scoped`](super::tenant_guard::Scoped).
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        let docs = self.store.find(T::COLLECTION, filter_data).await?;
        docs.into_iter().map(decode).collect()
    }

    pub async fn select_one(&self, mut filter_data: FilterData) -> Result<Option<T>, DatabaseError> {
        filter_data.limit = Some(1);
        filter_data.offset = None;
        Ok(self.select_any(filter_data).await?.into_iter().next())
    }

    pub async fn select_404(&self, filter_data: FilterData) -> Result<T, DatabaseError> {
        self.select_one(filter_data)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Record not found".to_string()))
    }

    pub async fn count(&self, where_clause: Value) -> Result<i64, DatabaseError> {
        self.store.count(T::COLLECTION, where_clause).await
    }

    pub async fn select_ids(&self, ids: Vec<Uuid>) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        self.select_any(FilterData::matching(json!({ "id": { "$in": ids } }))).await
    }

    pub async fn insert(&self, record: &T) -> Result<T, DatabaseError> {
        self.insert_doc(serde_json::to_value(record)?).await
    }

    pub(crate) async fn insert_doc(&self, doc: Value) -> Result<T, DatabaseError> {
        decode(self.store.insert(T::COLLECTION, doc).await?)
    }

    pub async fn update_one(&self, where_clause: Value, changes: Map<String, Value>) -> Result<Option<T>, DatabaseError> {
        self.store
            .update_one(T::COLLECTION, where_clause, changes)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn delete_one(&self, where_clause: Value) -> Result<Option<T>, DatabaseError> {
        self.store
            .delete_one(T::COLLECTION, where_clause)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn delete_any(&self, where_clause: Value) -> Result<u64, DatabaseError> {
        self.store.delete_many(T::COLLECTION, where_clause).await
    }

    pub async fn increment(
        &self,
        where_clause: Value,
        field: &str,
        by: i64,
        set: Map<String, Value>,
    ) -> Result<Option<T>, DatabaseError> {
        self.store
            .increment(T::COLLECTION, where_clause, field, by, set)
            .await?
            .map(decode)
            .transpose()
    }
}

fn decode<T: DeserializeOwned>(doc: Value) -> Result<T, DatabaseError> {
    Ok(serde_json::from_value(doc)?)
}

/// Serializes a struct of changes into the map form `update_one` expects,
/// dropping fields the struct skipped.
pub fn changes_of<C: Serialize>(changes: &C) -> Result<Map<String, Value>, DatabaseError> {
    match serde_json::to_value(changes)? {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!("changes must serialize to an object, got {}", other))),
    }
}
