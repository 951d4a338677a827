//! Integration tests for services, programs, team and portfolio.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use academy_integration_tests::{TestContext, unique_suffix};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_service_toggle_hides_from_public() {
    let admin = TestContext::admin().await;
    let anon = TestContext::anonymous();
    let title = format!("Service {}", unique_suffix());

    let resp = admin
        .post("/services")
        .json(&json!({"title": title, "features": ["One", "Two"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let service: Value = resp.json().await.unwrap();
    let id = service["id"].as_i64().unwrap();
    let slug = service["slug"].as_str().unwrap().to_owned();

    let resp = anon.get(&format!("/services/{slug}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = admin
        .patch(&format!("/services/{id}/toggle"))
        .send()
        .await
        .unwrap();
    let toggled: Value = resp.json().await.unwrap();
    assert_eq!(toggled["is_active"], false);

    let resp = anon.get(&format!("/services/{slug}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = admin.get(&format!("/services/{id}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = admin.delete(&format!("/services/{id}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_program_negative_price_rejected() {
    let admin = TestContext::admin().await;
    let resp = admin
        .post("/programs")
        .json(&json!({"title": format!("Program {}", unique_suffix()), "price": "-1.00"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_team_reorder() {
    let admin = TestContext::admin().await;
    let mut ids = Vec::new();
    for name in ["Reorder A", "Reorder B"] {
        let member: Value = admin
            .post("/team")
            .json(&json!({"name": name, "position": "Tester"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(member["id"].as_i64().unwrap());
    }

    let resp = admin
        .patch("/team/reorder")
        .json(&json!([
            {"id": ids[0], "display_order": 2},
            {"id": ids[1], "display_order": 1},
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["updated"], 2);

    for id in ids {
        let _ = admin.delete(&format!("/team/{id}")).send().await;
    }
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_portfolio_category_filter() {
    let anon = TestContext::anonymous();
    let entries: Value = anon
        .get("/portfolio?category=nlp")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    for entry in entries.as_array().unwrap() {
        assert_eq!(entry["category"], "nlp");
    }
}
