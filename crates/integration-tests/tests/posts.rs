//! Integration tests for posts.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`academy-cli migrate`)
//! - The server running (`cargo run -p academy-server`)
//! - Admin credentials in `ACADEMY_TEST_EMAIL` / `ACADEMY_TEST_PASSWORD`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use academy_integration_tests::{TestContext, unique_suffix};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn create_draft(ctx: &TestContext, title: &str) -> Value {
    let resp = ctx
        .post("/posts")
        .json(&json!({"title": title, "content": "Hello **world**. ".repeat(5)}))
        .send()
        .await
        .expect("create request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("post is not JSON")
}

async fn delete_post(ctx: &TestContext, id: i64) {
    let _ = ctx.delete(&format!("/posts/{id}")).send().await;
}

// ============================================================================
// Public reads
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_public_list_shape() {
    let ctx = TestContext::anonymous();
    let resp = ctx
        .get("/posts?per_page=500")
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let page: Value = resp.json().await.expect("not JSON");
    assert_eq!(page["page"], 1);
    assert_eq!(page["per_page"], 100, "per_page is capped");
    for item in page["items"].as_array().expect("items array") {
        assert_eq!(item["status"], "published");
        assert!(item["excerpt"].is_string());
    }
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_unknown_slug_is_404() {
    let ctx = TestContext::anonymous();
    let resp = ctx
        .get(&format!("/posts/missing-{}", unique_suffix()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("not JSON");
    assert!(body["error"].is_string());
}

// ============================================================================
// Admin lifecycle
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_draft_hidden_until_published() {
    let admin = TestContext::admin().await;
    let anon = TestContext::anonymous();
    let title = format!("Draft {}", unique_suffix());

    let post = create_draft(&admin, &title).await;
    let id = post["id"].as_i64().expect("id");
    let slug = post["slug"].as_str().expect("slug").to_owned();
    assert_eq!(post["status"], "draft");
    assert!(post["published_at"].is_null());

    let resp = anon.get(&format!("/posts/{slug}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Empty body toggles.
    let resp = admin
        .patch(&format!("/posts/{id}/status"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let published: Value = resp.json().await.unwrap();
    assert_eq!(published["status"], "published");
    assert!(published["published_at"].is_string());

    let resp = anon.get(&format!("/posts/{slug}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let shown: Value = resp.json().await.unwrap();
    assert!(shown["content_html"].as_str().unwrap().contains("<strong>world</strong>"));
    assert!(shown["reading_time_minutes"].as_u64().unwrap() >= 1);

    delete_post(&admin, id).await;
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_duplicate_slug_conflicts() {
    let admin = TestContext::admin().await;
    let title = format!("Same Title {}", unique_suffix());

    let first = create_draft(&admin, &title).await;
    let resp = admin
        .post("/posts")
        .json(&json!({"title": title}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    delete_post(&admin, first["id"].as_i64().unwrap()).await;
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_blank_title_rejected() {
    let admin = TestContext::admin().await;
    let resp = admin
        .post("/posts")
        .json(&json!({"title": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_writes_require_token() {
    let anon = TestContext::anonymous();
    let resp = anon
        .post("/posts")
        .json(&json!({"title": "Nope"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_status_toggle_keeps_content_and_publish_date() {
    let admin = TestContext::admin().await;
    let post = create_draft(&admin, &format!("Toggle {}", unique_suffix())).await;
    let id = post["id"].as_i64().unwrap();

    let published: Value = admin
        .patch(&format!("/posts/{id}/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let first_published_at = published["published_at"].as_str().unwrap().to_owned();
    for field in ["title", "slug", "content", "excerpt", "type"] {
        assert_eq!(published[field], post[field], "{field} changed on publish");
    }

    let resp = admin
        .patch(&format!("/posts/{id}/status"))
        .json(&json!({"status": "draft"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let unpublished: Value = resp.json().await.unwrap();
    assert_eq!(unpublished["status"], "draft");
    assert_eq!(unpublished["published_at"], first_published_at);
    assert_eq!(unpublished["title"], post["title"]);

    // Republishing keeps the original date.
    let republished: Value = admin
        .patch(&format!("/posts/{id}/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(republished["published_at"], first_published_at);

    delete_post(&admin, id).await;
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_content_update_leaves_status_alone() {
    let admin = TestContext::admin().await;
    let post = create_draft(&admin, &format!("Keep Status {}", unique_suffix())).await;
    let id = post["id"].as_i64().unwrap();

    admin
        .patch(&format!("/posts/{id}/status"))
        .send()
        .await
        .unwrap();

    let resp = admin
        .put(&format!("/posts/{id}"))
        .json(&json!({"content": "Rewritten body"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["status"], "published");
    assert_eq!(updated["content"], "Rewritten body");
    assert_eq!(updated["slug"], post["slug"]);

    delete_post(&admin, id).await;
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_update_onto_taken_slug_conflicts() {
    let admin = TestContext::admin().await;
    let first = create_draft(&admin, &format!("Slug Owner {}", unique_suffix())).await;
    let second = create_draft(&admin, &format!("Slug Taker {}", unique_suffix())).await;
    let second_id = second["id"].as_i64().unwrap();

    let resp = admin
        .put(&format!("/posts/{second_id}"))
        .json(&json!({"slug": first["slug"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    delete_post(&admin, first["id"].as_i64().unwrap()).await;
    delete_post(&admin, second_id).await;
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_only_anonymous_reads_count_views() {
    let admin = TestContext::admin().await;
    let anon = TestContext::anonymous();
    let post = create_draft(&admin, &format!("Counted {}", unique_suffix())).await;
    let id = post["id"].as_i64().unwrap();
    let slug = post["slug"].as_str().unwrap().to_owned();
    admin
        .patch(&format!("/posts/{id}/status"))
        .send()
        .await
        .unwrap();

    let views = |body: &Value| body["views"].as_i64().unwrap();

    let staff_read: Value = admin
        .get(&format!("/posts/{slug}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let before = views(&staff_read);

    let anon_read: Value = anon
        .get(&format!("/posts/{slug}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(views(&anon_read), before + 1);

    let staff_again: Value = admin
        .get(&format!("/posts/{slug}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(views(&staff_again), before + 1, "staff reads are not counted");

    delete_post(&admin, id).await;
}
