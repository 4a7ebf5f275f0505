use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub pagination: PaginationConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub app_name: String,
    pub app_version: String,
    pub host: String,
    pub port: u16,
    /// Deployment-wide switch that rejects every write endpoint with 403.
    pub demo_mode: bool,
    /// Base URL of the web client, used to build shareable link URLs.
    pub frontend_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cookie_name: String,
    pub secure_cookies: bool,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub autocomplete_min_chars: usize,
    pub autocomplete_limit: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").or_else(|_| env::var("NODE_ENV")).as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    pub fn is_development(&self) -> bool {
        matches!(self.environment, Environment::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("DEMO_MODE") {
            self.server.demo_mode = matches!(v.as_str(), "1" | "true");
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            self.server.frontend_url = v.trim_end_matches('/').to_string();
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
            self.database.backend = StorageBackend::Postgres;
        }
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            match v.as_str() {
                "memory" => self.database.backend = StorageBackend::Memory,
                "postgres" => self.database.backend = StorageBackend::Postgres,
                other => tracing::warn!("Unknown DATABASE_BACKEND '{}', keeping {:?}", other, self.database.backend),
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("CORS_ORIGIN") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Pagination overrides
        if let Ok(v) = env::var("PAGINATION_DEFAULT_LIMIT") {
            self.pagination.default_limit = v.parse().unwrap_or(self.pagination.default_limit);
        }
        if let Ok(v) = env::var("PAGINATION_MAX_LIMIT") {
            self.pagination.max_limit = v.parse().unwrap_or(self.pagination.max_limit);
        }

        self
    }

    fn base(environment: Environment) -> Self {
        Self {
            environment,
            server: ServerConfig {
                app_name: "Case Manager API".to_string(),
                app_version: env!("CARGO_PKG_VERSION").to_string(),
                host: "0.0.0.0".to_string(),
                port: 4000,
                demo_mode: false,
                frontend_url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cookie_name: "authToken".to_string(),
                secure_cookies: false,
                bcrypt_cost: 10,
                cors_origins: vec!["*".to_string()],
            },
            pagination: PaginationConfig {
                default_limit: 50,
                max_limit: 500,
            },
            search: SearchConfig {
                autocomplete_min_chars: 2,
                autocomplete_limit: 10,
            },
        }
    }

    pub fn development() -> Self {
        let mut config = Self::base(Environment::Development);
        config.security.jwt_secret = "development-secret-change-me".to_string();
        config
    }

    pub fn staging() -> Self {
        let mut config = Self::base(Environment::Staging);
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.secure_cookies = true;
        config
    }

    pub fn production() -> Self {
        let mut config = Self::base(Environment::Production);
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.database.run_migrations = false;
        config.security.secure_cookies = true;
        config
    }

    /// Configuration used by tests: in-memory storage and the cheapest bcrypt cost.
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.database.backend = StorageBackend::Memory;
        config.security.bcrypt_cost = 4;
        config.security.jwt_secret = "test-secret".to_string();
        config
    }
}
