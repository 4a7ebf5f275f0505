use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::auth::{self, Claims};
use crate::config::SecurityConfig;
use crate::database::models::{Company, CompanySettings, CompanyStatus, User, UserRole, UserStatus};
use crate::database::{DatabaseError, DocumentStore, Repository};
use crate::filter::FilterData;
use crate::validation::auth::{Credentials, Registration};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registration, login and session checks. Works across tenants.
pub struct AuthService {
    companies: Repository<Company>,
    users: Repository<User>,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn DocumentStore>, security: SecurityConfig) -> Self {
        Self {
            companies: Repository::new(store.clone()),
            users: Repository::new(store),
            security,
        }
    }

    /// Creates a company and its first administrator.
    pub async fn register(&self, input: Registration, now: DateTime<Utc>) -> ServiceResult<(User, Company)> {
        let company_email = json!({ "email": input.company_email });
        if self.companies.select_one(FilterData::matching(company_email)).await?.is_some() {
            return Err(ServiceError::Conflict("Company email already registered".to_string()));
        }
        if self.users.count(json!({ "email": input.email })).await? > 0 {
            return Err(ServiceError::Conflict("User email already registered".to_string()));
        }

        let company = Company {
            id: Uuid::new_v4(),
            name: input.company_name,
            email: input.company_email,
            phone: input.company_phone,
            address: input.company_address,
            settings: CompanySettings::default(),
            status: CompanyStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let company = self.companies.insert(&company).await.map_err(|e| match e {
            DatabaseError::Conflict(_) => ServiceError::Conflict("Company email already registered".to_string()),
            other => other.into(),
        })?;

        let password_hash = auth::hash_password(input.password, self.security.bcrypt_cost).await?;
        let user = User {
            id: Uuid::new_v4(),
            tenant_id: company.id,
            email: input.email,
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            role: UserRole::Admin,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        };

        match self.users.insert(&user).await {
            Ok(user) => {
                info!("Registered company {} ({})", company.name, company.id);
                Ok((user, company))
            }
            Err(e) => {
                // No cross-document transactions: undo the company by hand
                if let Err(cleanup) = self.companies.delete_one(json!({ "id": company.id })).await {
                    warn!("Failed to remove company {} after user insert failed: {}", company.id, cleanup);
                }
                Err(match e {
                    DatabaseError::Conflict(_) => ServiceError::Conflict("User email already registered".to_string()),
                    other => other.into(),
                })
            }
        }
    }

    /// Checks credentials. The first account with this email whose password
    /// matches wins.
    pub async fn login(&self, credentials: Credentials) -> ServiceResult<(User, Company)> {
        let candidates = self
            .users
            .select_any(FilterData::matching(json!({ "email": credentials.email })).order_by("created_at asc"))
            .await?;

        let mut matched = None;
        for user in candidates {
            if auth::verify_password(credentials.password.clone(), user.password_hash.clone()).await {
                matched = Some(user);
                break;
            }
        }
        let user = matched.ok_or_else(|| ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !user.is_active() {
            return Err(ServiceError::forbidden("Account is inactive"));
        }
        let company = self.active_company(user.tenant_id).await?;
        Ok((user, company))
    }

    /// Signed session token for `user`.
    pub fn issue_token(&self, user: &User, now: DateTime<Utc>) -> ServiceResult<String> {
        let claims = Claims::new(user, self.security.jwt_expiry_hours, now);
        Ok(auth::generate_jwt(&claims, &self.security.jwt_secret)?)
    }

    /// Active user named by verified `claims`. Absent or inactive users are 401.
    pub async fn session_user(&self, claims: &Claims) -> ServiceResult<User> {
        let user = self
            .users
            .select_one(FilterData::matching(json!({ "id": claims.sub, "tenant_id": claims.tenant })))
            .await?;
        match user {
            Some(user) if user.is_active() => Ok(user),
            _ => Err(ServiceError::Unauthorized("Invalid or inactive user".to_string())),
        }
    }

    /// The user's company, if it is active. Anything else is 403.
    pub async fn active_company(&self, company_id: Uuid) -> ServiceResult<Company> {
        let company = self.companies.select_one(FilterData::matching(json!({ "id": company_id }))).await?;
        match company {
            Some(company) if company.is_active() => Ok(company),
            _ => Err(ServiceError::forbidden("Company is not active")),
        }
    }
}
