use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::database::models::{timestamp, Case, LinkDenial, LinkStatus, LinkView, ShareableLink};
use crate::database::{DocumentStore, Repository, Scoped};
use crate::filter::FilterData;
use crate::validation::link::NewLink;

const LINK_NOT_FOUND: &str = "Link not found";
const CASE_NOT_FOUND: &str = "Case not found";

/// What a recipient sees after a successful verify.
#[derive(Debug, Serialize)]
pub struct VerifiedLink {
    pub case: Case,
    pub link: SharedLinkInfo,
}

#[derive(Debug, Serialize)]
pub struct SharedLinkInfo {
    pub id: Uuid,
    #[serde(with = "timestamp::option")]
    pub expires_at: Option<DateTime<Utc>>,
    pub recipient_email: Option<String>,
    pub access_count: i64,
}

/// Shareable links: managed by staff inside a company, opened by anyone
/// holding the token.
pub struct LinkService {
    store: Arc<dyn DocumentStore>,
    frontend_url: String,
}

impl LinkService {
    pub fn new(store: Arc<dyn DocumentStore>, frontend_url: impl Into<String>) -> Self {
        Self {
            store,
            frontend_url: frontend_url.into(),
        }
    }

    fn links(&self, tenant_id: Uuid) -> Scoped<ShareableLink> {
        Scoped::new(self.store.clone(), tenant_id)
    }

    fn cases(&self, tenant_id: Uuid) -> Scoped<Case> {
        Scoped::new(self.store.clone(), tenant_id)
    }

    async fn require_case(&self, tenant_id: Uuid, case_id: Uuid) -> ServiceResult<Case> {
        self.cases(tenant_id)
            .select_id(case_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(CASE_NOT_FOUND))
    }

    /// Issues a new link to a case of the caller's company.
    pub async fn create(&self, tenant_id: Uuid, actor: Uuid, input: NewLink, now: DateTime<Utc>) -> ServiceResult<LinkView> {
        self.require_case(tenant_id, input.case_id).await?;

        let link = ShareableLink {
            id: Uuid::new_v4(),
            tenant_id,
            case_id: input.case_id,
            token: ShareableLink::generate_token(),
            recipient_email: input.recipient_email,
            password: input.password,
            expires_at: ShareableLink::expires_at_from_days(now, input.expires_in_days),
            access_count: 0,
            last_accessed_at: None,
            status: LinkStatus::Active,
            created_by: actor,
            created_at: now,
            updated_at: now,
        };
        let link = self.links(tenant_id).insert(&link).await?;
        info!("Created shareable link {} for case {}", link.id, link.case_id);
        Ok(link.view(&self.frontend_url))
    }

    /// Links to one case, newest first.
    pub async fn list_for_case(&self, tenant_id: Uuid, case_id: Uuid) -> ServiceResult<Vec<LinkView>> {
        self.require_case(tenant_id, case_id).await?;
        let filter = FilterData::matching(json!({ "case_id": case_id })).order_by("created_at desc");
        let links = self.links(tenant_id).select_any(filter).await?;
        Ok(links.iter().map(|l| l.view(&self.frontend_url)).collect())
    }

    /// Marks a link revoked. Revoking twice is harmless.
    pub async fn revoke(&self, tenant_id: Uuid, id: Uuid, now: DateTime<Utc>) -> ServiceResult<LinkView> {
        let mut changes = Map::new();
        changes.insert("status".to_string(), json!(LinkStatus::Revoked));
        changes.insert("updated_at".to_string(), json!(timestamp::format(&now)));
        let link = self
            .links(tenant_id)
            .update_id(id, changes)
            .await?
            .ok_or_else(|| ServiceError::not_found(LINK_NOT_FOUND))?;
        info!("Revoked shareable link {}", id);
        Ok(link.view(&self.frontend_url))
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> ServiceResult<()> {
        self.links(tenant_id)
            .delete_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(LINK_NOT_FOUND))?;
        Ok(())
    }

    /// Opens a link by token. No session is involved: the token alone names
    /// the company, and the case is read within that company only.
    pub async fn verify(&self, token: &str, password: Option<&str>, now: DateTime<Utc>) -> ServiceResult<VerifiedLink> {
        let links: Repository<ShareableLink> = Repository::new(self.store.clone());
        let link = links
            .select_one(FilterData::matching(json!({ "token": token })))
            .await?
            .ok_or_else(|| ServiceError::not_found(LINK_NOT_FOUND))?;

        match link.authorize(now, password) {
            Ok(()) => {}
            Err(LinkDenial::NoLongerValid { persist_expiry }) => {
                if persist_expiry {
                    self.mark_expired(&link, now).await;
                }
                return Err(ServiceError::forbidden("Link is no longer valid"));
            }
            Err(LinkDenial::PasswordRequired) => {
                debug!("Shareable link {} refused: password required", link.id);
                return Err(ServiceError::PasswordRequired);
            }
        }

        let case = self.require_case(link.tenant_id, link.case_id).await?;

        let mut set = Map::new();
        set.insert("last_accessed_at".to_string(), json!(timestamp::format(&now)));
        let link = self
            .links(link.tenant_id)
            .increment(json!({ "id": link.id }), "access_count", 1, set)
            .await?
            .ok_or_else(|| ServiceError::not_found(LINK_NOT_FOUND))?;

        Ok(VerifiedLink {
            case,
            link: SharedLinkInfo {
                id: link.id,
                expires_at: link.expires_at,
                recipient_email: link.recipient_email,
                access_count: link.access_count,
            },
        })
    }

    /// Best effort: the refusal stands even if the write fails.
    async fn mark_expired(&self, link: &ShareableLink, now: DateTime<Utc>) {
        let mut changes = Map::new();
        changes.insert("status".to_string(), json!(LinkStatus::Expired));
        changes.insert("updated_at".to_string(), json!(timestamp::format(&now)));
        let where_clause = json!({ "id": link.id, "status": "active" });
        if let Err(e) = self.links(link.tenant_id).update_one(where_clause, changes).await {
            warn!("Failed to mark shareable link {} expired: {}", link.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::services::CaseService;
    use crate::validation::case::CaseFields;
    use chrono::Duration;

    struct Fixture {
        svc: LinkService,
        tenant: Uuid,
        actor: Uuid,
        case_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let tenant = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let case = CaseService::new(store.clone(), tenant)
            .create(
                CaseFields {
                    plaintiff: "Nino Beridze".into(),
                    defendant: "Giorgi Kapanadze".into(),
                    ..Default::default()
                },
                actor,
                Utc::now(),
            )
            .await
            .unwrap();
        Fixture {
            svc: LinkService::new(store, "http://localhost:3000"),
            tenant,
            actor,
            case_id: case.case.id,
        }
    }

    fn new_link(case_id: Uuid, days: Option<i64>, password: Option<&str>) -> NewLink {
        NewLink {
            case_id,
            expires_in_days: days,
            recipient_email: Some("client@mail.ge".into()),
            password: password.map(String::from),
        }
    }

    #[tokio::test]
    async fn verify_counts_accesses() {
        let f = fixture().await;
        let now = Utc::now();
        let link = f.svc.create(f.tenant, f.actor, new_link(f.case_id, None, None), now).await.unwrap();
        assert!(link.url.ends_with(&link.token));

        let first = f.svc.verify(&link.token, None, now).await.unwrap();
        assert_eq!(first.case.id, f.case_id);
        assert_eq!(first.link.access_count, 1);
        let second = f.svc.verify(&link.token, None, now).await.unwrap();
        assert_eq!(second.link.access_count, 2);
    }

    #[tokio::test]
    async fn password_gate_and_unknown_token() {
        let f = fixture().await;
        let now = Utc::now();
        let link = f.svc.create(f.tenant, f.actor, new_link(f.case_id, None, Some("pw-1")), now).await.unwrap();
        assert!(link.has_password);

        assert!(matches!(f.svc.verify(&link.token, None, now).await, Err(ServiceError::PasswordRequired)));
        assert!(matches!(f.svc.verify(&link.token, Some("PW-1"), now).await, Err(ServiceError::PasswordRequired)));
        assert!(f.svc.verify(&link.token, Some("pw-1"), now).await.is_ok());

        let err = f.svc.verify("deadbeef", None, now).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(m) if m == LINK_NOT_FOUND));
    }

    #[tokio::test]
    async fn expired_links_are_persisted_as_expired() {
        let f = fixture().await;
        let now = Utc::now();
        let link = f.svc.create(f.tenant, f.actor, new_link(f.case_id, Some(1), None), now).await.unwrap();

        let later = now + Duration::days(2);
        let err = f.svc.verify(&link.token, None, later).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(m) if m == "Link is no longer valid"));

        let listed = f.svc.list_for_case(f.tenant, f.case_id).await.unwrap();
        assert_eq!(listed[0].status, LinkStatus::Expired);
    }

    #[tokio::test]
    async fn revoke_is_idempotent_and_tenant_bound() {
        let f = fixture().await;
        let now = Utc::now();
        let link = f.svc.create(f.tenant, f.actor, new_link(f.case_id, None, None), now).await.unwrap();

        assert!(matches!(f.svc.revoke(Uuid::new_v4(), link.id, now).await, Err(ServiceError::NotFound(_))));
        assert_eq!(f.svc.revoke(f.tenant, link.id, now).await.unwrap().status, LinkStatus::Revoked);
        assert_eq!(f.svc.revoke(f.tenant, link.id, now).await.unwrap().status, LinkStatus::Revoked);
        assert!(matches!(f.svc.verify(&link.token, None, now).await, Err(ServiceError::Forbidden(_))));

        f.svc.delete(f.tenant, link.id).await.unwrap();
        assert!(matches!(f.svc.delete(f.tenant, link.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn links_only_to_own_cases() {
        let f = fixture().await;
        let stranger = Uuid::new_v4();
        let err = f
            .svc
            .create(stranger, f.actor, new_link(f.case_id, None, None), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(m) if m == CASE_NOT_FOUND));
        assert!(matches!(f.svc.list_for_case(stranger, f.case_id).await, Err(ServiceError::NotFound(_))));
    }
}
