use serde::Deserialize;
use uuid::Uuid;

use super::{Checker, FieldErrors, Validate};

/// Roughly a century.
pub const MAX_EXPIRY_DAYS: i64 = 36_500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateLinkRequest {
    pub case_id: Option<String>,
    pub expires_in_days: Option<i64>,
    pub recipient_email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewLink {
    pub case_id: Uuid,
    /// `None` or zero: the link never expires.
    pub expires_in_days: Option<i64>,
    /// Lower-cased; stored for reference only.
    pub recipient_email: Option<String>,
    /// Kept verbatim. An empty password means none.
    pub password: Option<String>,
}

impl Validate for CreateLinkRequest {
    type Output = NewLink;

    fn validate(self) -> Result<NewLink, FieldErrors> {
        let mut c = Checker::new();

        let case_id = c.required("caseId", self.case_id.as_deref(), "caseId is required");
        let case_id = if case_id.is_empty() {
            Uuid::nil()
        } else {
            Uuid::try_parse(&case_id).unwrap_or_else(|_| {
                c.error("caseId", "Invalid ID format");
                Uuid::nil()
            })
        };

        match self.expires_in_days {
            Some(d) if d < 0 => c.error("expiresInDays", "expiresInDays cannot be negative"),
            Some(d) if d > MAX_EXPIRY_DAYS => c.error(
                "expiresInDays",
                format!("expiresInDays cannot exceed {}", MAX_EXPIRY_DAYS),
            ),
            _ => {}
        }

        let recipient_email = c.optional(self.recipient_email.as_deref()).map(|e| e.to_lowercase());
        let password = self.password.filter(|p| !p.is_empty());

        c.finish(NewLink {
            case_id,
            expires_in_days: self.expires_in_days,
            recipient_email,
            password,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(body: serde_json::Value) -> Result<NewLink, FieldErrors> {
        serde_json::from_value::<CreateLinkRequest>(body).unwrap().validate()
    }

    #[test]
    fn case_id_is_required_and_must_parse() {
        assert_eq!(check(json!({})).unwrap_err()["caseId"], "caseId is required");
        assert_eq!(check(json!({ "caseId": "abc" })).unwrap_err()["caseId"], "Invalid ID format");
    }

    #[test]
    fn password_is_verbatim_and_email_lowercased() {
        let id = Uuid::new_v4();
        let link = check(json!({
            "caseId": id.to_string(),
            "password": " Pa55 ",
            "recipientEmail": "Client@Mail.GE",
            "expiresInDays": 0
        }))
        .unwrap();
        assert_eq!(link.case_id, id);
        assert_eq!(link.password.as_deref(), Some(" Pa55 "));
        assert_eq!(link.recipient_email.as_deref(), Some("client@mail.ge"));
        assert_eq!(link.expires_in_days, Some(0));
    }

    #[test]
    fn negative_expiry_is_rejected() {
        let id = Uuid::new_v4().to_string();
        assert!(check(json!({ "caseId": id, "expiresInDays": -1 })).unwrap_err().contains_key("expiresInDays"));
    }

    #[test]
    fn expiry_is_capped_at_a_century() {
        let id = Uuid::new_v4().to_string();
        assert!(check(json!({ "caseId": id, "expiresInDays": MAX_EXPIRY_DAYS })).is_ok());
        let errors = check(json!({ "caseId": id, "expiresInDays": MAX_EXPIRY_DAYS + 1 })).unwrap_err();
        assert_eq!(errors["expiresInDays"], "expiresInDays cannot exceed 36500");
        assert!(check(json!({ "caseId": id, "expiresInDays": i64::MAX })).is_err());
    }
}
