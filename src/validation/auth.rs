use serde::Deserialize;

use super::{Checker, FieldErrors, Validate};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub company_name: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A company and its first administrator.
#[derive(Debug, Clone)]
pub struct Registration {
    pub company_name: String,
    pub company_email: String,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    type Output = Registration;

    fn validate(self) -> Result<Registration, FieldErrors> {
        let mut c = Checker::new();

        let company_name = c.required("companyName", self.company_name.as_deref(), "Company name is required");
        let company_email = c
            .required("companyEmail", self.company_email.as_deref(), "Company email is required")
            .to_lowercase();
        if !company_email.is_empty() {
            c.email("companyEmail", Some(&company_email));
        }
        let first_name = c.required("firstName", self.first_name.as_deref(), "First name is required");
        let last_name = c.required("lastName", self.last_name.as_deref(), "Last name is required");
        let email = c.required("email", self.email.as_deref(), "Email is required").to_lowercase();
        if !email.is_empty() {
            c.email("email", Some(&email));
        }
        let password = self.password.unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LEN {
            c.error("password", PASSWORD_TOO_SHORT);
        }

        let company_phone = c.optional(self.company_phone.as_deref());
        let company_address = c.optional(self.company_address.as_deref());

        c.finish(Registration {
            company_name,
            company_email,
            company_phone,
            company_address,
            first_name,
            last_name,
            email,
            password,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    type Output = Credentials;

    fn validate(self) -> Result<Credentials, FieldErrors> {
        let mut c = Checker::new();
        let email = c.required("email", self.email.as_deref(), "Email is required").to_lowercase();
        let password = self.password.unwrap_or_default();
        if password.trim().is_empty() {
            c.error("password", "Password is required");
        }
        c.finish(Credentials { email, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn register(body: serde_json::Value) -> Result<Registration, FieldErrors> {
        serde_json::from_value::<RegisterRequest>(body).unwrap().validate()
    }

    #[test]
    fn registration_lowercases_emails() {
        let r = register(json!({
            "companyName": " Beridze & Partners ",
            "companyEmail": "Office@Firm.GE",
            "firstName": "Nino",
            "lastName": "Beridze",
            "email": "Nino@Firm.GE",
            "password": "secret1"
        }))
        .unwrap();
        assert_eq!(r.company_name, "Beridze & Partners");
        assert_eq!(r.company_email, "office@firm.ge");
        assert_eq!(r.email, "nino@firm.ge");
        assert_eq!(r.company_phone, None);
    }

    #[test]
    fn registration_reports_every_bad_field() {
        let errors = register(json!({ "companyEmail": "nope", "password": "123" })).unwrap_err();
        assert_eq!(errors["companyName"], "Company name is required");
        assert_eq!(errors["companyEmail"], "Invalid email format");
        assert_eq!(errors["firstName"], "First name is required");
        assert_eq!(errors["password"], PASSWORD_TOO_SHORT);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = serde_json::from_value::<RegisterRequest>(json!({ "companyName": "x", "isAdmin": true }));
        assert!(parsed.is_err());
    }

    #[test]
    fn login_needs_both_fields() {
        let req: LoginRequest = serde_json::from_value(json!({ "email": "A@B.GE" })).unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["password"], "Password is required");
    }
}
