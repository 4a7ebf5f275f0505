use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;
use crate::database::repository::Entity;
use crate::database::store::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    #[default]
    Active,
    Suspended,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySettings {
    pub max_users: u32,
    pub max_cases: u32,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self { max_users: 10, max_cases: 1000 }
    }
}

/// A tenant. Owns users, customers, cases and shareable links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub settings: CompanySettings,
    pub status: CompanyStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Company {
    const COLLECTION: Collection = Collection::Companies;
}

impl Company {
    pub fn is_active(&self) -> bool {
        self.status == CompanyStatus::Active
    }

    /// The `{id, name, email}` form returned alongside a session.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({ "id": self.id, "name": self.name, "email": self.email })
    }
}
