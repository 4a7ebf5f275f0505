use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::store::{document_id, Collection, DocumentStore};
use crate::filter::filter_order::FilterOrder;
use crate::filter::types::validate_identifier;
use crate::filter::{matcher, FilterData, FilterError};

/// In-process store evaluating filters with [`matcher`]. Documents are kept in
/// insertion order, which doubles as the tie-break sequence.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(docs: &[Value], where_clause: &Value) -> Result<Option<usize>, DatabaseError> {
        for (idx, doc) in docs.iter().enumerate() {
            if matcher::matches(where_clause, doc)? {
                return Ok(Some(idx));
            }
        }
        Ok(None)
    }

    /// Rejects `candidate` if it collides with another document on a unique key.
    fn check_unique(
        collection: Collection,
        docs: &[Value],
        candidate: &Value,
        skip: Option<usize>,
    ) -> Result<(), DatabaseError> {
        for key in collection.unique_keys() {
            let collides = docs.iter().enumerate().any(|(idx, existing)| {
                Some(idx) != skip
                    && key.iter().all(|field| {
                        let value = candidate.get(*field).unwrap_or(&Value::Null);
                        !value.is_null() && existing.get(*field) == Some(value)
                    })
            });
            if collides {
                return Err(DatabaseError::Conflict(format!(
                    "{}_{}_key",
                    collection.table_name(),
                    key.join("_")
                )));
            }
        }
        Ok(())
    }

    fn merged(doc: &Value, changes: &Map<String, Value>) -> Value {
        let mut merged = doc.clone();
        if let Value::Object(ref mut obj) = merged {
            for (k, v) in changes {
                obj.insert(k.clone(), v.clone());
            }
        }
        merged
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: Collection, filter: FilterData) -> Result<Vec<Value>, DatabaseError> {
        let order = match filter.order {
            Some(ref order) => FilterOrder::validate_and_parse(order)?,
            None => vec![],
        };
        let where_clause = filter.where_clause.unwrap_or(Value::Null);

        let guard = self.collections.read().await;
        let mut found = Vec::new();
        for doc in guard.get(&collection).map(Vec::as_slice).unwrap_or_default() {
            if matcher::matches(&where_clause, doc)? {
                found.push(doc.clone());
            }
        }
        drop(guard);

        // Stable sort keeps insertion order for equal keys
        found.sort_by(|a, b| matcher::compare(a, b, &order));

        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(found.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, collection: Collection, where_clause: Value) -> Result<i64, DatabaseError> {
        let guard = self.collections.read().await;
        let mut count = 0;
        for doc in guard.get(&collection).map(Vec::as_slice).unwrap_or_default() {
            if matcher::matches(&where_clause, doc)? {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn insert(&self, collection: Collection, doc: Value) -> Result<Value, DatabaseError> {
        let id = document_id(&doc)?.to_string();
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();
        if docs.iter().any(|d| d.get("id").and_then(Value::as_str) == Some(id.as_str())) {
            return Err(DatabaseError::Conflict(format!("{}_pkey", collection.table_name())));
        }
        Self::check_unique(collection, docs, &doc, None)?;
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn update_one(
        &self,
        collection: Collection,
        where_clause: Value,
        changes: Map<String, Value>,
    ) -> Result<Option<Value>, DatabaseError> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();
        let Some(idx) = Self::position(docs, &where_clause)? else {
            return Ok(None);
        };
        let updated = Self::merged(&docs[idx], &changes);
        Self::check_unique(collection, docs, &updated, Some(idx))?;
        docs[idx] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_one(&self, collection: Collection, where_clause: Value) -> Result<Option<Value>, DatabaseError> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();
        match Self::position(docs, &where_clause)? {
            Some(idx) => Ok(Some(docs.remove(idx))),
            None => Ok(None),
        }
    }

    async fn delete_many(&self, collection: Collection, where_clause: Value) -> Result<u64, DatabaseError> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();
        let mut kept = Vec::with_capacity(docs.len());
        let mut removed = 0;
        for doc in docs.drain(..) {
            if matcher::matches(&where_clause, &doc)? {
                removed += 1;
            } else {
                kept.push(doc);
            }
        }
        *docs = kept;
        Ok(removed)
    }

    async fn increment(
        &self,
        collection: Collection,
        where_clause: Value,
        field: &str,
        by: i64,
        set: Map<String, Value>,
    ) -> Result<Option<Value>, DatabaseError> {
        if !validate_identifier(field) {
            return Err(FilterError::InvalidColumn(field.to_string()).into());
        }
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();
        let Some(idx) = Self::position(docs, &where_clause)? else {
            return Ok(None);
        };
        let current = docs[idx].get(field).and_then(Value::as_i64).unwrap_or(0);
        let mut updated = Self::merged(&docs[idx], &set);
        if let Value::Object(ref mut obj) = updated {
            obj.insert(field.to_string(), Value::from(current + by));
        }
        docs[idx] = updated.clone();
        Ok(Some(updated))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
