use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;
use crate::database::repository::Entity;
use crate::database::store::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(alias = "CompanyAdmin")]
    Admin,
    Staff,
    ReadOnly,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Staff => "Staff",
            UserRole::ReadOnly => "ReadOnly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Admin" | "CompanyAdmin" => Some(UserRole::Admin),
            "Staff" => Some(UserRole::Staff),
            "ReadOnly" => Some(UserRole::ReadOnly),
            _ => None,
        }
    }

    pub fn can_write(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Staff)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    const COLLECTION: Collection = Collection::Users;
}

/// A user as returned by the API: everything but the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn is_active_admin(&self) -> bool {
        self.is_active() && self.role == UserRole::Admin
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            tenant_id: self.tenant_id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        user.public()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_admin_role_name_is_accepted() {
        let role: UserRole = serde_json::from_str("\"CompanyAdmin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"Admin\"");
        assert_eq!(UserRole::parse("ReadOnly"), Some(UserRole::ReadOnly));
        assert_eq!(UserRole::parse("root"), None);
    }

    #[test]
    fn public_form_has_no_password_hash() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            email: "a@b.ge".into(),
            password_hash: "$2b$04$secret".into(),
            first_name: "Nino".into(),
            last_name: "Beridze".into(),
            role: UserRole::Staff,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(user.public()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "Staff");
        assert!(!user.is_active_admin());
    }
}
