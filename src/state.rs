//! Shared application state handed to every handler and middleware.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::services::{AuthService, CaseService, CustomerService, LinkService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.store.clone(), self.config.security.clone())
    }

    pub fn cases(&self, tenant_id: Uuid) -> CaseService {
        CaseService::new(self.store.clone(), tenant_id)
    }

    pub fn customers(&self, tenant_id: Uuid) -> CustomerService {
        CustomerService::new(self.store.clone(), tenant_id)
    }

    pub fn users(&self, tenant_id: Uuid) -> UserService {
        UserService::new(self.store.clone(), tenant_id, self.config.security.bcrypt_cost)
    }

    pub fn links(&self) -> LinkService {
        LinkService::new(self.store.clone(), self.config.server.frontend_url.clone())
    }
}
