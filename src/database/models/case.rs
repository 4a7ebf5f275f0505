use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::customer::Customer;
use super::timestamp;
use crate::database::repository::Entity;
use crate::database::store::Collection;

/// Which party the tenant represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    Plaintiff,
    Defendant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HearingStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    Postponed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HearingDate {
    pub date: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub status: HearingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub plaintiff: String,
    pub plaintiff_id: Option<String>,
    pub defendant: String,
    pub defendant_id: Option<String>,
    pub plaintiff_customer_id: Option<Uuid>,
    pub defendant_customer_id: Option<Uuid>,
    pub client_customer_id: Option<Uuid>,
    pub client_role: Option<ClientRole>,
    pub court: Option<String>,
    pub judge: Option<String>,
    pub case_number: Option<String>,
    pub amount: Option<String>,
    pub initiation_date: Option<String>,
    pub hearing_date: Option<String>,
    #[serde(default)]
    pub hearing_dates: Vec<HearingDate>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub modified_by: Option<Uuid>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Case {
    const COLLECTION: Collection = Collection::Cases;
}

impl Case {
    pub fn customer_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        [self.plaintiff_customer_id, self.defendant_customer_id, self.client_customer_id]
            .into_iter()
            .flatten()
    }
}

/// The subset of a customer embedded in case responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&Customer> for CustomerSummary {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
        }
    }
}

/// A case with its referenced customers filled in.
#[derive(Debug, Clone, Serialize)]
pub struct CaseView {
    #[serde(flatten)]
    pub case: Case,
    pub plaintiff_customer: Option<CustomerSummary>,
    pub defendant_customer: Option<CustomerSummary>,
    pub client_customer: Option<CustomerSummary>,
}
