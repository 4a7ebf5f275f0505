use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::database::models::{timestamp, Case, Customer, CustomerSummary};
use crate::database::{changes_of, DocumentStore, Scoped};
use crate::filter::FilterData;
use crate::search::{customer_autocomplete, customer_search};
use crate::validation::customer::CustomerFields;
use crate::validation::query::PageRequest;

const CUSTOMER_NOT_FOUND: &str = "Customer not found";

/// One page of customers plus the total match count.
#[derive(Debug)]
pub struct CustomerPage {
    pub data: Vec<Customer>,
    pub total: u64,
}

/// The company's customer registry.
pub struct CustomerService {
    customers: Scoped<Customer>,
    cases: Scoped<Case>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn DocumentStore>, tenant_id: Uuid) -> Self {
        Self {
            customers: Scoped::new(store.clone(), tenant_id),
            cases: Scoped::new(store, tenant_id),
        }
    }

    /// Customers matching `search`, ordered by name.
    pub async fn list(&self, search: &str, page: PageRequest) -> ServiceResult<CustomerPage> {
        let where_clause = customer_search(search);
        let total = self.customers.count(where_clause.clone()).await?;
        let filter = FilterData::matching(where_clause)
            .order_by("name asc")
            .page(page.limit as i64, page.offset() as i64);
        let data = self.customers.select_any(filter).await?;
        Ok(CustomerPage {
            data,
            total: total.max(0) as u64,
        })
    }

    /// Quick lookup by name, email or phone. Short queries return nothing.
    pub async fn autocomplete(&self, query: &str, min_chars: usize, limit: u32) -> ServiceResult<Vec<CustomerSummary>> {
        let Some(where_clause) = customer_autocomplete(query, min_chars) else {
            return Ok(vec![]);
        };
        let filter = FilterData::matching(where_clause).order_by("name asc").page(limit as i64, 0);
        let customers = self.customers.select_any(filter).await?;
        Ok(customers.iter().map(CustomerSummary::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Customer> {
        self.customers
            .select_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(CUSTOMER_NOT_FOUND))
    }

    pub async fn create(&self, fields: CustomerFields, actor: Uuid, now: DateTime<Utc>) -> ServiceResult<Customer> {
        let customer = Customer {
            id: Uuid::new_v4(),
            tenant_id: self.customers.tenant_id(),
            name: fields.name.unwrap_or_default(),
            email: fields.email.flatten(),
            phone: fields.phone.flatten(),
            address: fields.address.flatten(),
            national_id: fields.national_id.flatten(),
            notes: fields.notes.flatten(),
            created_by: Some(actor),
            modified_by: Some(actor),
            created_at: now,
            updated_at: now,
        };
        Ok(self.customers.insert(&customer).await?)
    }

    pub async fn update(&self, id: Uuid, fields: CustomerFields, actor: Uuid, now: DateTime<Utc>) -> ServiceResult<Customer> {
        let mut changes = changes_of(&fields)?;
        changes.insert("modified_by".to_string(), json!(actor));
        changes.insert("updated_at".to_string(), json!(timestamp::format(&now)));
        self.customers
            .update_id(id, changes)
            .await?
            .ok_or_else(|| ServiceError::not_found(CUSTOMER_NOT_FOUND))
    }

    /// Deletes a customer no case refers to.
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        let references = self
            .cases
            .count(json!({ "$or": [
                { "plaintiff_customer_id": id },
                { "defendant_customer_id": id },
                { "client_customer_id": id },
            ] }))
            .await?;
        if references > 0 {
            return Err(ServiceError::CustomerInUse { references });
        }

        self.customers
            .delete_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(CUSTOMER_NOT_FOUND))?;
        info!("Deleted customer {}", id);
        Ok(())
    }
}
