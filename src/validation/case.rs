use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{present, Checker, FieldErrors, Validate};
use crate::database::models::{ClientRole, HearingDate, HearingStatus};
use crate::sort::parse_date;

const INVALID_DATE: &str = "Invalid date format";

/// Case body for create and update. Field names match the stored document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseRequest {
    pub plaintiff: Option<String>,
    pub defendant: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub plaintiff_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub defendant_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub plaintiff_customer_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub defendant_customer_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub client_customer_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub client_role: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub court: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub judge: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub case_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub amount: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub initiation_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub hearing_date: Option<Option<String>>,
    pub hearing_dates: Option<Vec<HearingDateRequest>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HearingDateRequest {
    pub date: Option<String>,
    pub notes: Option<String>,
    pub status: Option<HearingStatus>,
}

/// Checked case fields. The party names are always present; for the rest
/// `None` leaves the stored value alone and `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CaseFields {
    pub plaintiff: String,
    pub defendant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plaintiff_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defendant_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plaintiff_customer_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defendant_customer_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_customer_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_role: Option<Option<ClientRole>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_number: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiation_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hearing_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hearing_dates: Option<Vec<HearingDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl CaseFields {
    /// Customer references this body sets, for the same-tenant check.
    pub fn customer_refs(&self) -> Vec<(&'static str, Uuid)> {
        [
            ("plaintiff_customer_id", self.plaintiff_customer_id),
            ("defendant_customer_id", self.defendant_customer_id),
            ("client_customer_id", self.client_customer_id),
        ]
        .into_iter()
        .filter_map(|(field, id)| id.flatten().map(|id| (field, id)))
        .collect()
    }
}

impl Validate for CaseRequest {
    type Output = CaseFields;

    fn validate(self) -> Result<CaseFields, FieldErrors> {
        let mut c = Checker::new();

        let plaintiff = c.required("plaintiff", self.plaintiff.as_deref(), "Plaintiff is required");
        let defendant = c.required("defendant", self.defendant.as_deref(), "Defendant is required");

        let plaintiff_customer_id = customer_ref(&mut c, "plaintiff_customer_id", self.plaintiff_customer_id);
        let defendant_customer_id = customer_ref(&mut c, "defendant_customer_id", self.defendant_customer_id);
        let client_customer_id = customer_ref(&mut c, "client_customer_id", self.client_customer_id);

        let client_role = c.clearable(self.client_role).map(|role| {
            role.and_then(|r| match r.as_str() {
                "plaintiff" => Some(ClientRole::Plaintiff),
                "defendant" => Some(ClientRole::Defendant),
                _ => {
                    c.error("client_role", "Client role must be 'plaintiff' or 'defendant'");
                    None
                }
            })
        });

        let initiation_date = c.clearable(self.initiation_date);
        let hearing_date = c.clearable(self.hearing_date);
        for (field, value) in [("initiation_date", &initiation_date), ("hearing_date", &hearing_date)] {
            if let Some(Some(date)) = value {
                if parse_date(date).is_none() {
                    c.error(field, INVALID_DATE);
                }
            }
        }

        let hearing_dates = self.hearing_dates.map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, entry)| {
                    let date = c.required(&format!("hearing_dates[{}].date", i), entry.date.as_deref(), "Date is required");
                    if !date.is_empty() && parse_date(&date).is_none() {
                        c.error(&format!("hearing_dates[{}].date", i), INVALID_DATE);
                    }
                    HearingDate {
                        date,
                        notes: c.optional(entry.notes.as_deref()),
                        status: entry.status.unwrap_or_default(),
                    }
                })
                .collect()
        });

        let plaintiff_id = c.clearable(self.plaintiff_id);
        let defendant_id = c.clearable(self.defendant_id);
        let court = c.clearable(self.court);
        let judge = c.clearable(self.judge);
        let case_number = c.clearable(self.case_number);
        let amount = c.clearable(self.amount);
        let notes = c.clearable(self.notes);

        c.finish(CaseFields {
            plaintiff,
            defendant,
            plaintiff_id,
            defendant_id,
            plaintiff_customer_id,
            defendant_customer_id,
            client_customer_id,
            client_role,
            court,
            judge,
            case_number,
            amount,
            initiation_date,
            hearing_date,
            hearing_dates,
            notes,
        })
    }
}

fn customer_ref(c: &mut Checker, field: &str, value: Option<Option<String>>) -> Option<Option<Uuid>> {
    c.clearable(value).map(|id| {
        id.and_then(|id| match Uuid::try_parse(&id) {
            Ok(id) => Some(id),
            Err(_) => {
                c.error(field, "Invalid customer reference");
                None
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(body: serde_json::Value) -> Result<CaseFields, FieldErrors> {
        serde_json::from_value::<CaseRequest>(body).unwrap().validate()
    }

    #[test]
    fn parties_are_required() {
        let errors = check(json!({ "court": "Tbilisi City Court" })).unwrap_err();
        assert_eq!(errors["plaintiff"], "Plaintiff is required");
        assert_eq!(errors["defendant"], "Defendant is required");
    }

    #[test]
    fn dates_use_the_three_accepted_formats() {
        assert!(check(json!({ "plaintiff": "A", "defendant": "B", "hearing_date": "01.05.2023" })).is_ok());
        let errors = check(json!({ "plaintiff": "A", "defendant": "B", "initiation_date": "2023-02-30" })).unwrap_err();
        assert_eq!(errors["initiation_date"], INVALID_DATE);
    }

    #[test]
    fn client_role_and_references_are_checked() {
        let errors = check(json!({
            "plaintiff": "A", "defendant": "B",
            "client_role": "witness",
            "client_customer_id": "42",
        }))
        .unwrap_err();
        assert!(errors.contains_key("client_role"));
        assert_eq!(errors["client_customer_id"], "Invalid customer reference");
    }

    #[test]
    fn changes_only_carry_sent_fields() {
        let id = Uuid::new_v4();
        let fields = check(json!({
            "plaintiff": "ე\u{301}",
            "defendant": "B",
            "notes": "",
            "plaintiff_customer_id": id.to_string(),
        }))
        .unwrap();
        assert_eq!(fields.customer_refs(), vec![("plaintiff_customer_id", id)]);

        let doc = serde_json::to_value(&fields).unwrap();
        let keys: Vec<&str> = doc.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4);
        assert_eq!(doc["notes"], serde_json::Value::Null);
    }

    #[test]
    fn hearing_dates_are_validated_per_entry() {
        let errors = check(json!({
            "plaintiff": "A", "defendant": "B",
            "hearing_dates": [{ "date": "2024-01-10" }, { "date": "tomorrow" }]
        }))
        .unwrap_err();
        assert_eq!(errors["hearing_dates[1].date"], INVALID_DATE);
    }
}
