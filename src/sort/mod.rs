//! Column sorting for case tables.
//!
//! Each column compares by its own rules (identification numbers, amounts,
//! dates, text). Equal rows fall back to their input position, and descending
//! order is the exact reverse of ascending, ties included.

pub mod parse;

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::NaiveDate;
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

use crate::database::models::Case;
use crate::database::models::timestamp;
use crate::filter::SortDirection;

pub use parse::{parse_amount, parse_date};

/// How a column's values compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    /// Row position; sorting by it keeps the input order.
    RowNumber,
    IdentificationNumber,
    Amount,
    Date,
    Text,
}

impl SortColumn {
    pub fn for_key(key: &str) -> Self {
        match key {
            "rownum" | "#" => SortColumn::RowNumber,
            "plaintiff_id" | "defendant_id" | "national_id" => SortColumn::IdentificationNumber,
            "amount" => SortColumn::Amount,
            "initiation_date" | "hearing_date" => SortColumn::Date,
            _ => SortColumn::Text,
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            SortColumn::RowNumber => Ordering::Equal,
            SortColumn::IdentificationNumber => compare_identification(a, b),
            SortColumn::Amount => parse_amount(a).total_cmp(&parse_amount(b)),
            SortColumn::Date => date_or_epoch(a).cmp(&date_or_epoch(b)),
            SortColumn::Text => compare_text(a, b),
        }
    }
}

/// A row that exposes column values as text.
pub trait SortRow {
    fn sort_value(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl SortRow for Value {
    fn sort_value(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

impl SortRow for Case {
    fn sort_value(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "id" => Some(Cow::Owned(self.id.to_string())),
            "plaintiff" => Some(Cow::Borrowed(self.plaintiff.as_str())),
            "defendant" => Some(Cow::Borrowed(self.defendant.as_str())),
            "plaintiff_id" => borrowed(&self.plaintiff_id),
            "defendant_id" => borrowed(&self.defendant_id),
            "court" => borrowed(&self.court),
            "judge" => borrowed(&self.judge),
            "case_number" => borrowed(&self.case_number),
            "amount" => borrowed(&self.amount),
            "initiation_date" => borrowed(&self.initiation_date),
            "hearing_date" => borrowed(&self.hearing_date),
            "notes" => borrowed(&self.notes),
            "created_at" => Some(Cow::Owned(timestamp::format(&self.created_at))),
            "updated_at" => Some(Cow::Owned(timestamp::format(&self.updated_at))),
            _ => None,
        }
    }
}

fn borrowed(value: &Option<String>) -> Option<Cow<'_, str>> {
    value.as_deref().map(Cow::Borrowed)
}

/// Sorts `rows` by `key`, returning a new order. Stable and deterministic.
pub fn sort_rows<T: SortRow>(rows: Vec<T>, key: &str, direction: SortDirection) -> Vec<T> {
    let column = SortColumn::for_key(key);
    if column == SortColumn::RowNumber {
        return rows;
    }

    let mut indexed: Vec<(usize, T)> = rows.into_iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| {
        let va = a.sort_value(key).unwrap_or_default();
        let vb = b.sort_value(key).unwrap_or_default();
        column.compare(&va, &vb).then(ia.cmp(ib))
    });
    if direction == SortDirection::Desc {
        indexed.reverse();
    }
    indexed.into_iter().map(|(_, row)| row).collect()
}

fn compare_identification(a: &str, b: &str) -> Ordering {
    let sa: String = a.chars().filter(|c| !c.is_whitespace()).collect();
    let sb: String = b.chars().filter(|c| !c.is_whitespace()).collect();
    if is_digits(&sa) && is_digits(&sb) {
        return compare_digit_strings(&sa, &sb);
    }
    compare_collated(a, b)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Numeric order of two digit strings of any length.
fn compare_digit_strings(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn date_or_epoch(text: &str) -> NaiveDate {
    parse_date(text).unwrap_or_default()
}

fn compare_text(a: &str, b: &str) -> Ordering {
    let la: String = a.nfc().collect::<String>().to_lowercase();
    let lb: String = b.nfc().collect::<String>().to_lowercase();
    compare_collated(&la, &lb)
}

/// Code point order of the NFC forms.
fn compare_collated(a: &str, b: &str) -> Ordering {
    a.nfc().cmp(b.nfc())
}
