use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::database::models::{timestamp, Case, CaseView, Customer, CustomerSummary, ShareableLink};
use crate::database::{changes_of, DocumentStore, Scoped};
use crate::filter::FilterData;
use crate::search::case_search;
use crate::sort::sort_rows;
use crate::validation::case::CaseFields;
use crate::validation::query::CaseQuery;
use crate::validation::FieldErrors;

const CASE_NOT_FOUND: &str = "Case not found";

/// One page of populated cases plus the total match count.
#[derive(Debug)]
pub struct CasePage {
    pub data: Vec<CaseView>,
    pub total: u64,
}

/// Case records of one company.
pub struct CaseService {
    cases: Scoped<Case>,
    customers: Scoped<Customer>,
    links: Scoped<ShareableLink>,
}

impl CaseService {
    pub fn new(store: Arc<dyn DocumentStore>, tenant_id: Uuid) -> Self {
        Self {
            cases: Scoped::new(store.clone(), tenant_id),
            customers: Scoped::new(store.clone(), tenant_id),
            links: Scoped::new(store, tenant_id),
        }
    }

    /// Searches, sorts and pages the company's cases.
    ///
    /// Sorting happens in memory so amounts and dates compare by value rather
    /// than as stored text.
    pub async fn list(&self, query: &CaseQuery) -> ServiceResult<CasePage> {
        let matching = self.matching(&query.search, query.field.as_deref()).await?;
        let total = matching.len() as u64;

        let page: Vec<Case> = sort_rows(matching, &query.sort, query.order)
            .into_iter()
            .skip(query.page.offset())
            .take(query.page.limit as usize)
            .collect();
        debug!("Case list: {} of {} on page {}", page.len(), total, query.page.page);

        Ok(CasePage {
            data: self.populate(page).await?,
            total,
        })
    }

    /// Every case matching the search, oldest first.
    pub async fn matching(&self, search: &str, field: Option<&str>) -> ServiceResult<Vec<Case>> {
        let filter = FilterData::matching(case_search(search, field)).order_by("created_at asc");
        Ok(self.cases.select_any(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<CaseView> {
        let case = self.find(id).await?;
        let mut views = self.populate(vec![case]).await?;
        views.pop().ok_or_else(|| ServiceError::not_found(CASE_NOT_FOUND))
    }

    pub async fn find(&self, id: Uuid) -> ServiceResult<Case> {
        self.cases
            .select_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(CASE_NOT_FOUND))
    }

    pub async fn create(&self, fields: CaseFields, actor: Uuid, now: DateTime<Utc>) -> ServiceResult<CaseView> {
        self.check_customer_refs(&fields).await?;

        let case = Case {
            id: Uuid::new_v4(),
            tenant_id: self.cases.tenant_id(),
            plaintiff: fields.plaintiff,
            plaintiff_id: fields.plaintiff_id.flatten(),
            defendant: fields.defendant,
            defendant_id: fields.defendant_id.flatten(),
            plaintiff_customer_id: fields.plaintiff_customer_id.flatten(),
            defendant_customer_id: fields.defendant_customer_id.flatten(),
            client_customer_id: fields.client_customer_id.flatten(),
            client_role: fields.client_role.flatten(),
            court: fields.court.flatten(),
            judge: fields.judge.flatten(),
            case_number: fields.case_number.flatten(),
            amount: fields.amount.flatten(),
            initiation_date: fields.initiation_date.flatten(),
            hearing_date: fields.hearing_date.flatten(),
            hearing_dates: fields.hearing_dates.unwrap_or_default(),
            notes: fields.notes.flatten(),
            created_by: Some(actor),
            modified_by: Some(actor),
            created_at: now,
            updated_at: now,
        };
        let case = self.cases.insert(&case).await?;
        info!("Created case {}", case.id);
        self.get(case.id).await
    }

    /// Merges `fields` into the stored case.
    pub async fn update(&self, id: Uuid, fields: CaseFields, actor: Uuid, now: DateTime<Utc>) -> ServiceResult<CaseView> {
        self.check_customer_refs(&fields).await?;

        let mut changes = changes_of(&fields)?;
        changes.insert("modified_by".to_string(), json!(actor));
        changes.insert("updated_at".to_string(), json!(timestamp::format(&now)));
        let case = self
            .cases
            .update_id(id, changes)
            .await?
            .ok_or_else(|| ServiceError::not_found(CASE_NOT_FOUND))?;

        let mut views = self.populate(vec![case]).await?;
        views.pop().ok_or_else(|| ServiceError::not_found(CASE_NOT_FOUND))
    }

    /// Deletes the case and every link that shares it.
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.cases
            .delete_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(CASE_NOT_FOUND))?;
        let links = self.links.delete_any(json!({ "case_id": id })).await?;
        info!("Deleted case {} and {} shareable link(s)", id, links);
        Ok(())
    }

    /// Fills in the referenced customers with one lookup for the whole batch.
    /// References to customers that no longer exist come back as `None`.
    pub async fn populate(&self, cases: Vec<Case>) -> ServiceResult<Vec<CaseView>> {
        let mut ids: Vec<Uuid> = cases.iter().flat_map(Case::customer_ids).collect();
        ids.sort_unstable();
        ids.dedup();

        let customers: HashMap<Uuid, CustomerSummary> = self
            .customers
            .select_ids(ids)
            .await?
            .iter()
            .map(|c| (c.id, CustomerSummary::from(c)))
            .collect();
        let lookup = |id: Option<Uuid>| id.and_then(|id| customers.get(&id).cloned());

        Ok(cases
            .into_iter()
            .map(|case| CaseView {
                plaintiff_customer: lookup(case.plaintiff_customer_id),
                defendant_customer: lookup(case.defendant_customer_id),
                client_customer: lookup(case.client_customer_id),
                case,
            })
            .collect())
    }

    /// Every customer a case points at must belong to the same company.
    async fn check_customer_refs(&self, fields: &CaseFields) -> ServiceResult<()> {
        let refs = fields.customer_refs();
        if refs.is_empty() {
            return Ok(());
        }

        let found = self
            .customers
            .select_ids(refs.iter().map(|(_, id)| *id).collect())
            .await?;
        let mut errors = FieldErrors::new();
        for (field, id) in refs {
            if !found.iter().any(|c| c.id == id) {
                errors.insert(field.to_string(), "Customer not found".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(errors))
        }
    }
}
