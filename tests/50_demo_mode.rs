mod common;

use anyhow::Result;
use case_manager_api::AppConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn demo_config() -> AppConfig {
    let mut config = AppConfig::for_tests();
    config.server.demo_mode = true;
    config
}

#[tokio::test]
async fn demo_mode_refuses_writes_but_not_sign_in() -> Result<()> {
    let server = common::spawn_with_config(demo_config()).await?;

    let res = server.client.get(server.url("/health")).send().await?;
    let body: Value = res.json().await?;
    assert_eq!(body["demo"], true);

    let res = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({
            "companyName": "Demo",
            "companyEmail": "office@demo.test",
            "firstName": "A",
            "lastName": "B",
            "email": "admin@demo.test",
            "password": "password123"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Demo mode: write disabled");

    // Refused before authentication is even looked at
    let res = server
        .client
        .post(server.url("/api/cases"))
        .json(&json!({ "plaintiff": "A", "defendant": "B" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": "nobody@demo.test", "password": "password123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.client.get(server.url("/api/cases")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
