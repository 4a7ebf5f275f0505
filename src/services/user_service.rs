use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::auth;
use crate::database::models::{timestamp, User, UserRole, UserStatus};
use crate::database::{changes_of, DatabaseError, DocumentStore, Scoped};
use crate::filter::FilterData;
use crate::validation::user::{NewUser, UserChanges};

const USER_NOT_FOUND: &str = "User not found";
const DUPLICATE_USER: &str = "User with this email already exists in your company";

/// User administration within one company.
pub struct UserService {
    users: Scoped<User>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>, tenant_id: Uuid, bcrypt_cost: u32) -> Self {
        Self {
            users: Scoped::new(store, tenant_id),
            bcrypt_cost,
        }
    }

    /// All users of the company, newest first.
    pub async fn list(&self) -> ServiceResult<Vec<User>> {
        let filter = FilterData::matching(json!({})).order_by("created_at desc");
        Ok(self.users.select_any(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<User> {
        self.users
            .select_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(USER_NOT_FOUND))
    }

    pub async fn create(&self, input: NewUser, now: DateTime<Utc>) -> ServiceResult<User> {
        if self.users.count(json!({ "email": input.email })).await? > 0 {
            return Err(ServiceError::Conflict(DUPLICATE_USER.to_string()));
        }

        let password_hash = auth::hash_password(input.password, self.bcrypt_cost).await?;
        let user = User {
            id: Uuid::new_v4(),
            tenant_id: self.users.tenant_id(),
            email: input.email,
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let user = self.users.insert(&user).await.map_err(|e| match e {
            DatabaseError::Conflict(_) => ServiceError::Conflict(DUPLICATE_USER.to_string()),
            other => other.into(),
        })?;
        info!("Created user {} with role {}", user.id, user.role.as_str());
        Ok(user)
    }

    /// Applies `changes`. The company must keep at least one active admin.
    pub async fn update(&self, id: Uuid, changes: UserChanges, now: DateTime<Utc>) -> ServiceResult<User> {
        let current = self.get(id).await?;

        if current.is_active_admin() {
            let demoted = changes.role.is_some_and(|r| r != UserRole::Admin);
            let deactivated = changes.status == Some(UserStatus::Inactive);
            if (demoted || deactivated) && self.active_admins().await? <= 1 {
                let message = if demoted {
                    "Cannot demote the only active admin"
                } else {
                    "Cannot deactivate the only active admin"
                };
                return Err(ServiceError::BadRequest(message.to_string()));
            }
        }

        let mut fields = changes_of(&changes)?;
        fields.insert("updated_at".to_string(), json!(timestamp::format(&now)));
        self.users
            .update_id(id, fields)
            .await?
            .ok_or_else(|| ServiceError::not_found(USER_NOT_FOUND))
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        let current = self.get(id).await?;
        if current.is_active_admin() && self.active_admins().await? <= 1 {
            return Err(ServiceError::BadRequest("Cannot delete the only active admin".to_string()));
        }

        self.users
            .delete_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(USER_NOT_FOUND))?;
        info!("Deleted user {}", id);
        Ok(())
    }

    async fn active_admins(&self) -> ServiceResult<i64> {
        let where_clause = json!({ "role": UserRole::Admin.as_str(), "status": "active" });
        Ok(self.users.count(where_clause).await?)
    }
}
