//! Request bodies and query strings, checked before any business logic runs.
//!
//! Each body type deserializes with `deny_unknown_fields` and then goes
//! through [`Validate`], which yields either the cleaned input or a map of
//! per-field messages.

pub mod auth;
pub mod case;
pub mod customer;
pub mod extract;
pub mod link;
pub mod query;
pub mod user;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use unicode_normalization::UnicodeNormalization;

pub use extract::ValidJson;

/// Field name (as the client sent it) to message.
pub type FieldErrors = HashMap<String, String>;

pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, FieldErrors>;
}

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Trims and applies Unicode canonical composition (NFC).
pub fn normalize(value: &str) -> String {
    value.trim().nfc().collect()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Collects field errors while a body is checked.
#[derive(Debug, Default)]
pub struct Checker {
    errors: FieldErrors,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Normalized value; records `message` when it is missing or blank.
    pub fn required(&mut self, field: &str, value: Option<&str>, message: &str) -> String {
        let value = value.map(normalize).unwrap_or_default();
        if value.is_empty() {
            self.error(field, message);
        }
        value
    }

    /// Normalized value, with blanks treated as absent.
    pub fn optional(&self, value: Option<&str>) -> Option<String> {
        value.map(normalize).filter(|v| !v.is_empty())
    }

    /// Like [`optional`](Self::optional) but keeps "absent" apart from "cleared".
    pub fn clearable(&self, value: Option<Option<String>>) -> Option<Option<String>> {
        value.map(|inner| self.optional(inner.as_deref()))
    }

    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize, message: &str) {
        let n = value.chars().count();
        if n < min || n > max {
            self.error(field, message);
        }
    }

    pub fn max_chars(&mut self, field: &str, value: Option<&str>, max: usize, message: &str) {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.error(field, message);
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        if value.is_some_and(|v| !is_valid_email(v)) {
            self.error(field, "Invalid email format");
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn finish<T>(self, output: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(output)
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_composes_and_trims() {
        assert_eq!(normalize("  e\u{301}  "), "\u{e9}");
        assert_eq!(normalize("ნინო"), "ნინო");
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("nino@firm.ge"));
        assert!(!is_valid_email("nino@firm"));
        assert!(!is_valid_email("ni no@firm.ge"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn checker_keeps_first_message_per_field() {
        let mut c = Checker::new();
        let name = c.required("name", Some("   "), "Name is required");
        c.length("name", &name, 2, 100, "Name must be between 2 and 100 characters");
        let errors = c.finish(()).unwrap_err();
        assert_eq!(errors["name"], "Name is required");
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let mut c = Checker::new();
        // 20 Georgian letters are 60 bytes
        let phone = "ა".repeat(20);
        c.max_chars("phone", Some(&phone), 20, "too long");
        assert!(!c.has_errors());
    }
}
