//! Tenant isolation for company-owned collections.
//!
//! Every read, update and delete issued through [`Scoped`] is conjoined with
//! `tenant_id = <caller's company>`, and every insert is stamped with it. A
//! record owned by another tenant is indistinguishable from a missing one.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::repository::{Entity, Repository};
use crate::database::store::DocumentStore;
use crate::filter::FilterData;

/// Fields no caller may change through an update.
const PROTECTED_FIELDS: [&str; 3] = ["id", "tenant_id", "created_at"];

/// Conjoins the tenant condition with `where_clause`.
pub fn scope(tenant_id: Uuid, where_clause: Value) -> Value {
    let tenant = json!({ "tenant_id": tenant_id });
    match where_clause {
        Value::Null => tenant,
        Value::Object(ref obj) if obj.is_empty() => tenant,
        other => json!({ "$and": [tenant, other] }),
    }
}

/// A repository bound to one tenant.
pub struct Scoped<T> {
    repo: Repository<T>,
    tenant_id: Uuid,
}

impl<T: Entity> Scoped<T> {
    pub fn new(store: Arc<dyn DocumentStore>, tenant_id: Uuid) -> Self {
        Self {
            repo: Repository::new(store),
            tenant_id,
        }
    }

    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    fn scoped(&self, where_clause: Value) -> Value {
        scope(self.tenant_id, where_clause)
    }

    fn scoped_filter(&self, mut filter_data: FilterData) -> FilterData {
        let where_clause = filter_data.where_clause.take().unwrap_or(Value::Null);
        filter_data.where_clause = Some(self.scoped(where_clause));
        filter_data
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        self.repo.select_any(self.scoped_filter(filter_data)).await
    }

    pub async fn select_one(&self, filter_data: FilterData) -> Result<Option<T>, DatabaseError> {
        self.repo.select_one(self.scoped_filter(filter_data)).await
    }

    pub async fn select_404(&self, filter_data: FilterData) -> Result<T, DatabaseError> {
        self.repo.select_404(self.scoped_filter(filter_data)).await
    }

    pub async fn select_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        self.select_one(FilterData::matching(json!({ "id": id }))).await
    }

    pub async fn count(&self, where_clause: Value) -> Result<i64, DatabaseError> {
        self.repo.count(self.scoped(where_clause)).await
    }

    pub async fn select_ids(&self, ids: Vec<Uuid>) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        self.select_any(FilterData::matching(json!({ "id": { "$in": ids } }))).await
    }

    /// Inserts `record` owned by this tenant, whatever `tenant_id` it carried.
    pub async fn insert(&self, record: &T) -> Result<T, DatabaseError> {
        let mut doc = serde_json::to_value(record)?;
        match doc {
            Value::Object(ref mut obj) => {
                obj.insert("tenant_id".to_string(), json!(self.tenant_id));
            }
            _ => return Err(DatabaseError::QueryError("record must serialize to an object".to_string())),
        }
        self.repo.insert_doc(doc).await
    }

    pub async fn update_one(&self, where_clause: Value, mut changes: Map<String, Value>) -> Result<Option<T>, DatabaseError> {
        for field in PROTECTED_FIELDS {
            changes.remove(field);
        }
        self.repo.update_one(self.scoped(where_clause), changes).await
    }

    pub async fn update_id(&self, id: Uuid, changes: Map<String, Value>) -> Result<Option<T>, DatabaseError> {
        self.update_one(json!({ "id": id }), changes).await
    }

    pub async fn delete_one(&self, where_clause: Value) -> Result<Option<T>, DatabaseError> {
        self.repo.delete_one(self.scoped(where_clause)).await
    }

    pub async fn delete_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        self.delete_one(json!({ "id": id })).await
    }

    pub async fn delete_any(&self, where_clause: Value) -> Result<u64, DatabaseError> {
        self.repo.delete_any(self.scoped(where_clause)).await
    }

    pub async fn increment(
        &self,
        where_clause: Value,
        field: &str,
        by: i64,
        set: Map<String, Value>,
    ) -> Result<Option<T>, DatabaseError> {
        self.repo.increment(self.scoped(where_clause), field, by, set).await
    }
}
