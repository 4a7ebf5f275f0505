use serde::{Deserialize, Serialize};

use super::auth::{MIN_PASSWORD_LEN, PASSWORD_TOO_SHORT};
use super::{Checker, FieldErrors, Validate};
use crate::database::models::{UserRole, UserStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl Validate for CreateUserRequest {
    type Output = NewUser;

    fn validate(self) -> Result<NewUser, FieldErrors> {
        let mut c = Checker::new();
        let email = c.required("email", self.email.as_deref(), "Email is required").to_lowercase();
        if !email.is_empty() {
            c.email("email", Some(&email));
        }
        let password = self.password.unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LEN {
            c.error("password", PASSWORD_TOO_SHORT);
        }
        let first_name = c.required("firstName", self.first_name.as_deref(), "First name is required");
        let last_name = c.required("lastName", self.last_name.as_deref(), "Last name is required");
        let role = match c.optional(self.role.as_deref()) {
            None => UserRole::Staff,
            Some(r) => parse_role(&mut c, &r),
        };

        c.finish(NewUser {
            email,
            password,
            first_name,
            last_name,
            role,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

/// Fields an admin may change on a user. Absent fields stay as they are.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

impl Validate for UpdateUserRequest {
    type Output = UserChanges;

    fn validate(self) -> Result<UserChanges, FieldErrors> {
        let mut c = Checker::new();
        let first_name = c.optional(self.first_name.as_deref());
        let last_name = c.optional(self.last_name.as_deref());
        let role = c.optional(self.role.as_deref()).map(|r| parse_role(&mut c, &r));
        let status = match c.optional(self.status.as_deref()).as_deref() {
            None => None,
            Some("active") => Some(UserStatus::Active),
            Some("inactive") => Some(UserStatus::Inactive),
            Some(_) => {
                c.error("status", "Status must be 'active' or 'inactive'");
                None
            }
        };

        c.finish(UserChanges {
            first_name,
            last_name,
            role,
            status,
        })
    }
}

fn parse_role(c: &mut Checker, role: &str) -> UserRole {
    UserRole::parse(role).unwrap_or_else(|| {
        c.error("role", "Invalid role");
        UserRole::ReadOnly
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_users_default_to_staff() {
        let req: CreateUserRequest = serde_json::from_value(json!({
            "email": "Staff@Firm.ge", "password": "secret1", "firstName": "Levan", "lastName": "Gelashvili"
        }))
        .unwrap();
        let user = req.validate().unwrap();
        assert_eq!(user.role, UserRole::Staff);
        assert_eq!(user.email, "staff@firm.ge");
    }

    #[test]
    fn unknown_role_is_a_field_error() {
        let req: CreateUserRequest = serde_json::from_value(json!({
            "email": "a@b.ge", "password": "secret1", "firstName": "A", "lastName": "B", "role": "Owner"
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap_err()["role"], "Invalid role");
    }

    #[test]
    fn update_keeps_absent_fields_out_of_the_changes() {
        let req: UpdateUserRequest = serde_json::from_value(json!({ "role": "CompanyAdmin", "firstName": "" })).unwrap();
        let changes = req.validate().unwrap();
        assert_eq!(changes.role, Some(UserRole::Admin));
        let doc = serde_json::to_value(&changes).unwrap();
        assert_eq!(doc, json!({ "role": "Admin" }));
    }

    #[test]
    fn bad_status_is_rejected() {
        let req: UpdateUserRequest = serde_json::from_value(json!({ "status": "banned" })).unwrap();
        assert!(req.validate().unwrap_err().contains_key("status"));
    }
}
