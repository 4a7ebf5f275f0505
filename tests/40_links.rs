mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn verify(server: &common::TestServer, token: &str, password: Option<&str>) -> Result<reqwest::Response> {
    let mut req = server
        .client
        .get(server.url(&format!("/api/shareable-links/{}/verify", token)));
    if let Some(password) = password {
        req = req.query(&[("password", password)]);
    }
    Ok(req.send().await?)
}

#[tokio::test]
async fn link_opens_case_without_a_session() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.register("share").await?;
    let case_id = server
        .create_case(&admin, json!({ "plaintiff": "Shared", "defendant": "Case", "notes": "visible" }))
        .await?;

    let res = server
        .post(
            "/api/shareable-links",
            &admin,
            json!({ "caseId": case_id, "expiresInDays": 7, "recipientEmail": "Client@Mail.ge" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let link: Value = res.json().await?;
    let token = link["data"]["token"].as_str().unwrap_or_default().to_string();
    assert_eq!(token.len(), 64);
    assert!(link["data"]["url"].as_str().unwrap_or_default().ends_with(&format!("/shared/{}", token)));
    assert_eq!(link["data"]["has_password"], false);
    assert_eq!(link["data"]["recipient_email"], "client@mail.ge");
    assert!(link["data"]["expires_at"].is_string());

    for expected in 1..=2 {
        let res = verify(&server, &token, None).await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await?;
        assert_eq!(body["case"]["plaintiff"], "Shared");
        assert_eq!(body["link"]["access_count"], expected);
    }

    let res = server.get(&format!("/api/shareable-links/case/{}", case_id), &admin).await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"][0]["access_count"], 2);
    assert!(body["data"][0]["last_accessed_at"].is_string());
    Ok(())
}

#[tokio::test]
async fn password_gate() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.register("locked").await?;
    let case_id = server.create_case(&admin, json!({ "plaintiff": "A", "defendant": "B" })).await?;

    let res = server
        .post("/api/shareable-links", &admin, json!({ "caseId": case_id, "password": "s3cret" }))
        .await?;
    let link: Value = res.json().await?;
    assert_eq!(link["data"]["has_password"], true);
    assert!(link["data"]["expires_at"].is_null());
    let token = link["data"]["token"].as_str().unwrap_or_default().to_string();

    for attempt in [None, Some("wrong")] {
        let res = verify(&server, &token, attempt).await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = res.json().await?;
        assert_eq!(body["requiresPassword"], true);
    }

    let res = verify(&server, &token, Some("s3cret")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    // Failed attempts are not counted
    assert_eq!(body["link"]["access_count"], 1);
    Ok(())
}

#[tokio::test]
async fn revoked_and_unknown_links_are_refused() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.register("revoke").await?;
    let case_id = server.create_case(&admin, json!({ "plaintiff": "A", "defendant": "B" })).await?;

    let res = server.post("/api/shareable-links", &admin, json!({ "caseId": case_id })).await?;
    let link: Value = res.json().await?;
    let id = common::id_of(&link["data"])?;
    let token = link["data"]["token"].as_str().unwrap_or_default().to_string();

    for _ in 0..2 {
        let res = server.put(&format!("/api/shareable-links/{}/revoke", id), &admin, json!({})).await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await?;
        assert_eq!(body["data"]["status"], "revoked");
    }

    let res = verify(&server, &token, None).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Link is no longer valid");

    let res = verify(&server, &"0".repeat(64), None).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.delete(&format!("/api/shareable-links/{}", id), &admin).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let res = server.delete(&format!("/api/shareable-links/{}", id), &admin).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn links_follow_their_case_and_company() -> Result<()> {
    let server = common::spawn_server().await?;
    let owner = server.register("owner").await?;
    let other = server.register("other").await?;
    let case_id = server.create_case(&owner, json!({ "plaintiff": "A", "defendant": "B" })).await?;

    // Another company cannot share or list this case
    let res = server.post("/api/shareable-links", &other, json!({ "caseId": case_id })).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = server.get(&format!("/api/shareable-links/case/{}", case_id), &other).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.post("/api/shareable-links", &owner, json!({ "caseId": case_id })).await?;
    let link: Value = res.json().await?;
    let token = link["data"]["token"].as_str().unwrap_or_default().to_string();

    let res = server
        .put(&format!("/api/shareable-links/{}/revoke", common::id_of(&link["data"])?), &other, json!({}))
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Deleting the case removes its links
    server.delete(&format!("/api/cases/{}", case_id), &owner).await?;
    let res = verify(&server, &token, None).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn link_input_is_checked() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.register("linkval").await?;
    let reader = server.add_user(&admin, "reader@linkval.test", "ReadOnly").await?;
    let case_id = server.create_case(&admin, json!({ "plaintiff": "A", "defendant": "B" })).await?;

    let res = server
        .post("/api/shareable-links", &admin, json!({ "caseId": case_id, "expiresInDays": -1 }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Day counts past any sensible horizon are a field error, not a server error
    for days in [1_000_000_000_i64, i64::MAX] {
        let res = server
            .post("/api/shareable-links", &admin, json!({ "caseId": case_id, "expiresInDays": days }))
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await?;
        assert_eq!(body["field_errors"]["expiresInDays"], "expiresInDays cannot exceed 36500");
    }

    let res = server.post("/api/shareable-links", &admin, json!({})).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["field_errors"]["caseId"], "caseId is required");

    let res = server.post("/api/shareable-links", &reader, json!({ "caseId": case_id })).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}
