//! Query strings for list, search and export endpoints.
//!
//! Every parameter arrives as text so that a bad number becomes a field
//! error rather than a rejected request.

use serde::{Deserialize, Serialize};

use super::{Checker, FieldErrors};
use crate::config::PaginationConfig;
use crate::filter::SortDirection;

/// Sort keys a case list accepts; the camel-case timestamps are aliases.
pub const CASE_SORT_KEYS: [&str; 15] = [
    "rownum",
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
    "created_at",
    "updated_at",
    "createdAt",
    "updatedAt",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit.max(1) as u64)
    }

    /// Clamps instead of rejecting: junk falls back to the defaults.
    pub fn lenient(page: Option<&str>, limit: Option<&str>, config: &PaginationConfig) -> Self {
        let page = page.and_then(|p| p.trim().parse::<i64>().ok()).unwrap_or(1).max(1);
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l != 0)
            .unwrap_or(config.default_limit as i64)
            .clamp(1, config.max_limit as i64);
        Self {
            page: page.min(u32::MAX as i64) as u32,
            limit: limit as u32,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CaseListQuery {
    pub search: Option<String>,
    pub field: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CaseQuery {
    pub search: String,
    pub field: Option<String>,
    /// Stored field name (or `rownum`).
    pub sort: String,
    pub order: SortDirection,
    pub page: PageRequest,
}

impl CaseListQuery {
    pub fn check(self, config: &PaginationConfig) -> Result<CaseQuery, FieldErrors> {
        let mut c = Checker::new();

        let page = match self.page.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            None => 1,
            Some(p) => match p.parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    c.error("page", "Page must be a positive number");
                    1
                }
            },
        };

        let limit = match self.limit.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            None => config.default_limit,
            Some(l) => match l.parse::<u32>() {
                Ok(n) if (1..=config.max_limit).contains(&n) => n,
                _ => {
                    c.error("limit", format!("Limit must be between 1 and {}", config.max_limit));
                    config.default_limit
                }
            },
        };

        let sort = match self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => "created_at".to_string(),
            Some(s) if CASE_SORT_KEYS.contains(&s) => match s {
                "createdAt" => "created_at".to_string(),
                "updatedAt" => "updated_at".to_string(),
                other => other.to_string(),
            },
            Some(_) => {
                c.error("sort", format!("Sort field must be one of: {}", CASE_SORT_KEYS.join(", ")));
                "created_at".to_string()
            }
        };

        let order = match self.order.as_deref().map(str::trim).filter(|o| !o.is_empty()) {
            None => SortDirection::Asc,
            Some(o) => SortDirection::parse(o).unwrap_or_else(|| {
                c.error("order", "Order must be 'asc' or 'desc'");
                SortDirection::Asc
            }),
        };

        c.finish(CaseQuery {
            search: self.search.unwrap_or_default(),
            field: self.field.filter(|f| !f.trim().is_empty()),
            sort,
            order,
            page: PageRequest { page, limit },
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub search: Option<String>,
    pub field: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AutocompleteQuery {
    pub q: Option<String>,
}
