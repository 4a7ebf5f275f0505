use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid regex"));
static DOTTED_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})\.(\d{2})\.(\d{4})$").expect("valid regex"));
static SLASHED_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").expect("valid regex"));

/// Parses a free-text currency amount such as `"5 000 ₾"`, `"5,000.00"` or `"5,5"`.
///
/// A comma with no period is a decimal separator; otherwise commas are
/// thousands separators. Anything unparseable is `0.0`.
pub fn parse_amount(text: &str) -> f64 {
    let kept: String = text
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let normalized = if kept.contains(',') && !kept.contains('.') {
        kept.replace(',', ".")
    } else {
        kept.replace(',', "")
    };

    leading_float(&normalized).unwrap_or(0.0)
}

/// Longest leading `-?digits[.digits]` number, ignoring whatever follows.
fn leading_float(s: &str) -> Option<f64> {
    let mut int_part = String::new();
    let mut frac_part = String::new();
    let mut negative = false;
    let mut seen_dot = false;

    for (i, c) in s.chars().enumerate() {
        match c {
            '-' if i == 0 => negative = true,
            '.' if !seen_dot => seen_dot = true,
            d if d.is_ascii_digit() => {
                if seen_dot {
                    frac_part.push(d);
                } else {
                    int_part.push(d);
                }
            }
            _ => break,
        }
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let literal = format!(
        "{}{}.{}",
        if negative { "-" } else { "" },
        if int_part.is_empty() { "0" } else { &int_part },
        if frac_part.is_empty() { "0" } else { &frac_part },
    );
    literal.parse().ok()
}

/// Parses `YYYY-MM-DD`, `DD.MM.YYYY` or `DD/MM/YYYY`, tried in that order.
///
/// Returns `None` for other shapes and for impossible dates like `2023-02-30`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let (year, month, day) = if let Some(c) = ISO_DATE.captures(text) {
        (c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)
    } else if let Some(c) = DOTTED_DATE.captures(text).or_else(|| SLASHED_DATE.captures(text)) {
        (c[3].parse().ok()?, c[2].parse().ok()?, c[1].parse().ok()?)
    } else {
        return None;
    };
    NaiveDate::from_ymd_opt(year, month, day)
}
