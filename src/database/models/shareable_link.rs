//! Shareable read-only links to a single case.
//!
//! A link is `active` until it is explicitly revoked or its expiry passes.
//! Expiry is detected lazily: [`ShareableLink::state`] reports whether the
//! `expired` status still has to be written, and the caller persists it.

use chrono::{DateTime, Duration, TimeDelta, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;
use crate::database::repository::Entity;
use crate::database::store::Collection;

/// Random bytes in a token; hex encoding doubles the length.
pub const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Active,
    Revoked,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareableLink {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub case_id: Uuid,
    pub token: String,
    pub recipient_email: Option<String>,
    /// Compared verbatim on verify.
    pub password: Option<String>,
    #[serde(with = "timestamp::option")]
    pub expires_at: Option<DateTime<Utc>>,
    pub access_count: i64,
    #[serde(with = "timestamp::option")]
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub status: LinkStatus,
    pub created_by: Uuid,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for ShareableLink {
    const COLLECTION: Collection = Collection::ShareableLinks;
}

/// Where a link stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Active,
    Revoked,
    /// `persist` is set when the stored status is still `active`.
    Expired { persist: bool },
}

/// Why a verify attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDenial {
    /// Revoked or expired. `persist_expiry` asks the caller to store `expired`.
    NoLongerValid { persist_expiry: bool },
    PasswordRequired,
}

impl ShareableLink {
    pub fn generate_token() -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill(&mut bytes);
        hex::encode(bytes)
    }

    /// `None` or zero days means the link never expires. Offsets past the
    /// end of the calendar saturate at the latest representable instant.
    pub fn expires_at_from_days(now: DateTime<Utc>, days: Option<i64>) -> Option<DateTime<Utc>> {
        match days {
            Some(d) if d > 0 => Some(
                TimeDelta::try_days(d)
                    .and_then(|delta| now.checked_add_signed(delta))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
            _ => None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    pub fn state(&self, now: DateTime<Utc>) -> LinkState {
        match self.status {
            LinkStatus::Revoked => LinkState::Revoked,
            LinkStatus::Expired => LinkState::Expired { persist: false },
            LinkStatus::Active if self.is_expired(now) => LinkState::Expired { persist: true },
            LinkStatus::Active => LinkState::Active,
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == LinkState::Active
    }

    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Decides a verify attempt. Validity is checked before the password.
    pub fn authorize(&self, now: DateTime<Utc>, password: Option<&str>) -> Result<(), LinkDenial> {
        match self.state(now) {
            LinkState::Active => {}
            LinkState::Revoked => return Err(LinkDenial::NoLongerValid { persist_expiry: false }),
            LinkState::Expired { persist } => return Err(LinkDenial::NoLongerValid { persist_expiry: persist }),
        }
        if self.has_password() && self.password.as_deref() != password {
            return Err(LinkDenial::PasswordRequired);
        }
        Ok(())
    }

    pub fn share_url(&self, frontend_url: &str) -> String {
        format!("{}/shared/{}", frontend_url.trim_end_matches('/'), self.token)
    }

    /// The staff-facing form: the password is replaced by `has_password`.
    pub fn view(&self, frontend_url: &str) -> LinkView {
        LinkView {
            id: self.id,
            case_id: self.case_id,
            token: self.token.clone(),
            url: self.share_url(frontend_url),
            recipient_email: self.recipient_email.clone(),
            has_password: self.has_password(),
            expires_at: self.expires_at,
            access_count: self.access_count,
            last_accessed_at: self.last_accessed_at,
            status: self.status,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkView {
    pub id: Uuid,
    pub case_id: Uuid,
    pub token: String,
    pub url: String,
    pub recipient_email: Option<String>,
    pub has_password: bool,
    #[serde(with = "timestamp::option")]
    pub expires_at: Option<DateTime<Utc>>,
    pub access_count: i64,
    #[serde(with = "timestamp::option")]
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub status: LinkStatus,
    pub created_by: Uuid,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}
