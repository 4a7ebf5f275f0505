mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

fn plaintiffs(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|r| r["plaintiff"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn create_get_update_delete_case() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.register("crud").await?;

    let res = server
        .post("/api/customers", &admin, json!({ "name": "Tamar Gelashvili", "phone": "+995 555 12 34 56" }))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let customer_id = common::id_of(&res.json::<Value>().await?["data"])?;

    let case_id = server
        .create_case(
            &admin,
            json!({
                "plaintiff": "Tamar Gelashvili",
                "defendant": "Bank of Georgia",
                "amount": "12 500 GEL",
                "court": "Tbilisi City Court",
                "plaintiff_customer_id": customer_id,
                "client_role": "plaintiff",
                "initiation_date": "15.03.2024"
            }),
        )
        .await?;

    let res = server.get(&format!("/api/cases/{}", case_id), &admin).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["plaintiff"], "Tamar Gelashvili");
    assert_eq!(body["data"]["plaintiff_customer"]["name"], "Tamar Gelashvili");
    assert!(body["data"]["defendant_customer"].is_null());
    assert_eq!(body["data"]["created_by"], admin.user_id.as_str());

    // Absent fields keep their value, explicit null clears
    let res = server
        .put(
            &format!("/api/cases/{}", case_id),
            &admin,
            json!({ "plaintiff": "Tamar Gelashvili", "defendant": "TBC Bank", "court": null }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["defendant"], "TBC Bank");
    assert_eq!(body["data"]["amount"], "12 500 GEL");
    assert!(body["data"]["court"].is_null());

    let res = server.delete(&format!("/api/cases/{}", case_id), &admin).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.get(&format!("/api/cases/{}", case_id), &admin).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn case_validation_and_bad_ids() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.register("valid").await?;

    let res = server.post("/api/cases", &admin, json!({ "court": "Batumi" })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["field_errors"]["plaintiff"], "Plaintiff is required");
    assert_eq!(body["field_errors"]["defendant"], "Defendant is required");

    let res = server.get("/api/cases/not-a-uuid", &admin).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Invalid ID format");

    // Customer from nowhere
    let res = server
        .post(
            "/api/cases",
            &admin,
            json!({
                "plaintiff": "A",
                "defendant": "B",
                "defendant_customer_id": "6f1c1d2e-8a8b-4c1e-9d55-2b8f0f0a1b2c"
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["field_errors"]["defendant_customer_id"], "Customer not found");
    Ok(())
}

#[tokio::test]
async fn list_searches_sorts_and_pages() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.register("list").await?;

    for (plaintiff, amount, court) in [
        ("Zurab", "1 000", "Kutaisi Court"),
        ("ანა", "250.50", "Tbilisi City Court"),
        ("Irakli", "50 000 GEL", "Tbilisi City Court"),
        ("Ketevan (K.)", "7,5", "Batumi Court"),
    ] {
        server
            .create_case(&admin, json!({ "plaintiff": plaintiff, "defendant": "Someone", "amount": amount, "court": court }))
            .await?;
    }

    let res = server.get("/api/cases?sort=amount&order=desc", &admin).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["total"], 4);
    assert_eq!(plaintiffs(&body), ["Irakli", "Zurab", "ანა", "Ketevan (K.)"]);

    // Row number is position, not an attribute: direction changes nothing
    let res = server.get("/api/cases?sort=rownum&order=desc&limit=3", &admin).await?;
    let body: Value = res.json().await?;
    assert_eq!(plaintiffs(&body), ["Zurab", "ანა", "Irakli"]);
    assert_eq!(body["count"], 3);
    assert_eq!(body["total_pages"], 2);

    let res = server.get("/api/cases?sort=rownum&limit=3&page=2", &admin).await?;
    let body: Value = res.json().await?;
    assert_eq!(plaintiffs(&body), ["Ketevan (K.)"]);
    assert_eq!(body["page"], 2);

    // Single-column search by its display label, then across every column
    let res = server
        .client
        .get(server.url("/api/cases"))
        .query(&[("search", "tbilisi"), ("field", "განმხილველი ორგანო"), ("sort", "plaintiff")])
        .header(header::COOKIE, &admin.cookie)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(plaintiffs(&body), ["Irakli", "ანა"]);

    // Regex metacharacters are matched literally
    let res = server
        .client
        .get(server.url("/api/cases"))
        .query(&[("search", "(K.)")])
        .header(header::COOKIE, &admin.cookie)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(plaintiffs(&body), ["Ketevan (K.)"]);

    let res = server.get("/api/cases?sort=shoe_size", &admin).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = server.get("/api/cases?limit=0", &admin).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn companies_never_see_each_other() -> Result<()> {
    let server = common::spawn_server().await?;
    let first = server.register("first").await?;
    let second = server.register("second").await?;

    let case_id = server
        .create_case(&first, json!({ "plaintiff": "Private", "defendant": "Matter" }))
        .await?;

    let res = server.get("/api/cases", &second).await?;
    let body: Value = res.json().await?;
    assert_eq!(body["total"], 0);

    for res in [
        server.get(&format!("/api/cases/{}", case_id), &second).await?,
        server
            .put(&format!("/api/cases/{}", case_id), &second, json!({ "plaintiff": "X", "defendant": "Y" }))
            .await?,
        server.delete(&format!("/api/cases/{}", case_id), &second).await?,
    ] {
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    let res = server.get(&format!("/api/cases/{}", case_id), &first).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn read_only_users_cannot_write_cases() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.register("ro").await?;
    let reader = server.add_user(&admin, "reader@ro.test", "ReadOnly").await?;

    let res = server.get("/api/cases", &reader).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .post("/api/cases", &reader, json!({ "plaintiff": "A", "defendant": "B" }))
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Insufficient permissions");
    Ok(())
}

#[tokio::test]
async fn export_returns_a_workbook() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.register("export").await?;
    server
        .create_case(&admin, json!({ "plaintiff": "Export Me", "defendant": "Someone" }))
        .await?;

    let res = server.get("/api/cases/export", &admin).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let content_type = res.headers()[header::CONTENT_TYPE].to_str()?.to_string();
    assert_eq!(content_type, "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet");
    let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str()?.to_string();
    assert!(disposition.starts_with("attachment; filename=\"cases_"));
    assert!(disposition.ends_with(".xlsx\""));

    // xlsx files are zip archives
    let bytes = res.bytes().await?;
    assert_eq!(&bytes[..2], b"PK");
    Ok(())
}
