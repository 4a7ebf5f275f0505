use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Storage field holding the record identifier.
pub const ID_FIELD: &str = "id";

/// Case fields searched when no single field is chosen.
pub const CASE_SEARCH_FIELDS: [&str; 10] = [
    "plaintiff",
    "plaintiff_id",
    "defendant",
    "defendant_id",
    "amount",
    "court",
    "case_number",
    "initiation_date",
    "hearing_date",
    "notes",
];

/// Column labels shown in the web client, mapped to case storage fields.
/// Storage field names map to themselves so API clients may use either.
pub static CASE_FIELD_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::from([
        ("#", ID_FIELD),
        ("მოსარჩელე", "plaintiff"),
        ("საიდენთიფიკაციო ნომერი (მოს.)", "plaintiff_id"),
        ("მოპასუხე", "defendant"),
        ("საიდენთიფიკაციო ნომერი (მოპ.)", "defendant_id"),
        ("მოთხოვნის ოდენობა", "amount"),
        ("განმხილველი ორგანო", "court"),
        ("საქმის ნომერი", "case_number"),
        ("კომენტარი", "notes"),
        // Both spellings appear in exported sheets
        ("წარმოებში მიღების თარიღი", "initiation_date"),
        ("წარმოებაში მიღების თარიღი", "initiation_date"),
        ("სხდომის თარიღი", "hearing_date"),
    ]);
    map.insert(ID_FIELD, ID_FIELD);
    for field in CASE_SEARCH_FIELDS {
        map.insert(field, field);
    }
    map
});

/// Customer fields searched by the list endpoint.
pub const CUSTOMER_SEARCH_FIELDS: [&str; 4] = ["name", "email", "phone", "national_id"];

/// Customer fields searched by autocomplete.
pub const CUSTOMER_AUTOCOMPLETE_FIELDS: [&str; 3] = ["name", "email", "phone"];

/// Header row of the case export, in column order.
pub const CASE_EXPORT_HEADERS: [&str; 9] = [
    "#",
    "მოსარჩელე",
    "საიდენთიფიკაციო ნომერი (მოს.)",
    "მოპასუხე",
    "საიდენთიფიკაციო ნომერი (მოპ.)",
    "მოთხოვნის ოდენობა",
    "განმხილველი ორგანო",
    "საქმის ნომერი",
    "კომენტარი",
];
