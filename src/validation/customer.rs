use serde::{Deserialize, Serialize};

use super::{present, Checker, FieldErrors, Validate};

const NAME_LENGTH: &str = "Name must be between 2 and 100 characters";

/// Customer body shared by create and update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomerRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub national_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct CreateCustomer(pub CustomerRequest);

#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct UpdateCustomer(pub CustomerRequest);

/// Checked customer fields. `None` leaves a field untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl Validate for CreateCustomer {
    type Output = CustomerFields;

    fn validate(self) -> Result<CustomerFields, FieldErrors> {
        let mut c = Checker::new();
        let name = c.required("name", self.0.name.as_deref(), "Name is required");
        check(c, Some(name), self.0)
    }
}

impl Validate for UpdateCustomer {
    type Output = CustomerFields;

    fn validate(self) -> Result<CustomerFields, FieldErrors> {
        let mut c = Checker::new();
        let name = self.0.name.as_deref().map(|n| c.required("name", Some(n), "Name cannot be empty"));
        check(c, name, self.0)
    }
}

fn check(mut c: Checker, name: Option<String>, req: CustomerRequest) -> Result<CustomerFields, FieldErrors> {
    if let Some(n) = name.as_deref().filter(|n| !n.is_empty()) {
        c.length("name", n, 2, 100, NAME_LENGTH);
    }

    let email = c.clearable(req.email).map(|e| e.map(|e| e.to_lowercase()));
    let phone = c.clearable(req.phone);
    let address = c.clearable(req.address);
    let national_id = c.clearable(req.national_id);
    let notes = c.clearable(req.notes);

    c.email("email", email.as_ref().and_then(|e| e.as_deref()));
    c.max_chars("phone", flat(&phone), 20, "Phone must be less than 20 characters");
    c.max_chars("address", flat(&address), 500, "Address must be less than 500 characters");
    c.max_chars("nationalId", flat(&national_id), 50, "National ID must be less than 50 characters");
    c.max_chars("notes", flat(&notes), 2000, "Notes must be less than 2000 characters");

    c.finish(CustomerFields {
        name,
        email,
        phone,
        address,
        national_id,
        notes,
    })
}

fn flat(value: &Option<Option<String>>) -> Option<&str> {
    value.as_ref().and_then(|v| v.as_deref())
}
