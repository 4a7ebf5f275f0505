#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{header, Response, StatusCode};
use serde_json::{json, Value};

use case_manager_api::database::MemoryStore;
use case_manager_api::{create_app, AppConfig, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

/// A signed-in user: the session cookie plus the ids from the login body.
#[derive(Debug, Clone)]
pub struct Session {
    pub cookie: String,
    pub user_id: String,
    pub tenant_id: String,
}

/// Starts the application on a free port with its own in-memory store.
/// Every test gets a fresh server, so tests never see each other's data.
pub async fn spawn_server() -> Result<TestServer> {
    spawn_with_config(AppConfig::for_tests()).await
}

pub async fn spawn_with_config(config: AppConfig) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let app = create_app(AppState::new(config, Arc::new(MemoryStore::new())));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    })
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, session: &Session) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .header(header::COOKIE, &session.cookie)
            .send()
            .await?)
    }

    pub async fn post(&self, path: &str, session: &Session, body: Value) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .header(header::COOKIE, &session.cookie)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn put(&self, path: &str, session: &Session, body: Value) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .header(header::COOKIE, &session.cookie)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn delete(&self, path: &str, session: &Session) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .header(header::COOKIE, &session.cookie)
            .send()
            .await?)
    }

    /// Registers a company whose admin is `admin@<slug>.test` / `password123`.
    pub async fn register(&self, slug: &str) -> Result<Session> {
        let res = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "companyName": format!("{} Law", slug),
                "companyEmail": format!("office@{}.test", slug),
                "firstName": "Nino",
                "lastName": "Beridze",
                "email": format!("admin@{}.test", slug),
                "password": "password123"
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        session_from(res).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let res = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        session_from(res).await
    }

    /// Creates a user in the admin's company and signs in as them.
    pub async fn add_user(&self, admin: &Session, email: &str, role: &str) -> Result<Session> {
        let res = self
            .post(
                "/api/users",
                admin,
                json!({
                    "email": email,
                    "password": "password123",
                    "firstName": "Giorgi",
                    "lastName": "Kapanadze",
                    "role": role
                }),
            )
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create user failed: {}", res.status());
        self.login(email, "password123").await
    }

    /// Creates a case and returns its id.
    pub async fn create_case(&self, session: &Session, body: Value) -> Result<String> {
        let res = self.post("/api/cases", session, body).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create case failed: {}", res.status());
        let body: Value = res.json().await?;
        id_of(&body["data"])
    }
}

/// Pulls the `authToken` pair out of `Set-Cookie` so it can be replayed.
pub fn session_cookie(res: &Response) -> Option<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with("authToken=") && pair.len() > "authToken=".len())
        .map(str::to_string)
}

async fn session_from(res: Response) -> Result<Session> {
    let cookie = session_cookie(&res).context("response carried no session cookie")?;
    let body: Value = res.json().await?;
    Ok(Session {
        cookie,
        user_id: id_of(&body["data"]["user"])?,
        tenant_id: id_of(&body["data"]["company"])?,
    })
}

pub fn id_of(value: &Value) -> Result<String> {
    value["id"]
        .as_str()
        .map(str::to_string)
        .with_context(|| format!("no id in {}", value))
}
