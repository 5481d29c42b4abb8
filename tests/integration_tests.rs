//! Integration tests for the content service
//!
//! These tests drive the full router against the in-memory store, covering
//! page resolution, admin authentication and the translation fan-out flow.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use mlm_cms::api::{create_router, AppState};
use mlm_cms::config::Config;
use mlm_cms::store::{ContentStore, MemoryContentStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const TOKEN: &str = "test-session-token";

// ==================== Test Helpers ====================

fn create_test_app() -> Router {
    let config = Config {
        admin_session_token: Some(TOKEN.to_string()),
        ..Config::default()
    };
    let store: Arc<dyn ContentStore> = Arc::new(MemoryContentStore::new());
    create_router(AppState::new(config, store).expect("valid config"))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>, auth: bool) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if auth {
        builder = builder.header(header::COOKIE, format!("admin_session={}", TOKEN));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn create_service(app: &Router) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/services",
        Some(json!({
            "locale": "en",
            "icon": "layers",
            "image": "/img/binary.png",
            "showOnHome": true,
            "title": "Binary Plan",
            "description": "Two-leg compensation plan",
            "benefits": ["Spillover", "Pairing bonus"]
        })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["id"].as_str().unwrap().to_string();
    let group_id = body["groupId"].as_str().unwrap().to_string();
    (id, group_id)
}

async fn create_spanish(app: &Router, group_id: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/services",
        Some(json!({
            "locale": "es",
            "groupId": group_id,
            "icon": "should-be-ignored",
            "showOnHome": false,
            "title": "Plan Binario",
            "description": "Plan de compensación de dos piernas"
        })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// ==================== Health / Page Tests ====================

#[tokio::test]
async fn test_health() {
    let app = create_test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, false).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["defaultLocale"], "en");
    assert!(body["metrics"]["localeFallbacks"].is_number());
}

#[tokio::test]
async fn test_home_page_localized() {
    let app = create_test_app();
    let (status, body) = send(&app, Method::GET, "/es", None, false).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locale"], "es");
    assert_eq!(body["slug"], "home");
    assert!(body["hero"]["title"].as_str().unwrap().starts_with("Software MLM"));
}

#[tokio::test]
async fn test_unsupported_locale_falls_back() {
    let app = create_test_app();
    let (status, body) = send(&app, Method::GET, "/xx/pricing", None, false).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locale"], "en");
    assert_eq!(body["hero"]["title"], "Simple, Transparent Pricing");
}

#[tokio::test]
async fn test_unknown_page_is_404() {
    let app = create_test_app();
    let (status, body) = send(&app, Method::GET, "/en/careers", None, false).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("careers"));
}

#[tokio::test]
async fn test_privacy_policy() {
    let app = create_test_app();
    let (status, body) = send(&app, Method::GET, "/es/privacy-policy", None, false).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locale"], "es");
    assert_eq!(body["title"], "Política de privacidad");
    assert_eq!(body["lastUpdated"], "2024-03-01");
}

#[tokio::test]
async fn test_page_override_merges_over_defaults() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/pages?slug=pricing&locale=en",
        Some(json!({ "hero": { "title": "Pricing 2025" } })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, page) = send(&app, Method::GET, "/en/pricing", None, false).await;
    assert_eq!(page["hero"]["title"], "Pricing 2025");
    // Untouched fields keep their defaults
    assert_eq!(
        page["hero"]["description"],
        "Choose the edition that fits your business today and upgrade as your network grows."
    );
    assert_eq!(page["sections"].as_array().unwrap().len(), 3);

    // Other locales are unaffected
    let (_, es) = send(&app, Method::GET, "/es/pricing", None, false).await;
    assert_eq!(es["hero"]["title"], "Precios simples y transparentes");
}

#[tokio::test]
async fn test_page_override_requires_session() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/pages?slug=home&locale=en",
        Some(json!({ "hero": { "title": "Hacked" } })),
        false,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

// ==================== Authentication Tests ====================

#[tokio::test]
async fn test_admin_write_without_session_is_401() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/services",
        Some(json!({ "icon": "x", "title": "T", "description": "D" })),
        false,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_bearer_token_accepted() {
    let app = create_test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/faqs")
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "question": "Is there a demo?", "answer": "Yes" }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_wrong_token_rejected() {
    let app = create_test_app();
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/faqs?id=1")
        .header(header::COOKIE, "admin_session=wrong")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ==================== Collection Tests ====================

#[tokio::test]
async fn test_validation_error_is_400() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/services",
        Some(json!({ "icon": "x", "title": "", "description": "D" })),
        true,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title is required");
}

#[tokio::test]
async fn test_malformed_body_is_400_json() {
    let app = create_test_app();
    let (status, body) = send(&app, Method::POST, "/api/faqs", Some(json!({ "question": 1 })), true).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_get_unknown_id_is_404() {
    let app = create_test_app();
    let (status, body) = send(&app, Method::GET, "/api/services?id=12345", None, false).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "service 12345 not found");
}

#[tokio::test]
async fn test_fields_are_string_coerced() {
    let app = create_test_app();
    let (id, group_id) = create_service(&app).await;

    let (status, body) = send(&app, Method::GET, &format!("/api/services?id={}", id), None, false).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], Value::String(id));
    assert_eq!(body["groupId"], Value::String(group_id));
    assert!(body["createdAt"].is_string());
    assert_eq!(body["benefits"], json!(["Spillover", "Pairing bonus"]));
}

#[tokio::test]
async fn test_translation_inherits_shared_fields() {
    let app = create_test_app();
    let (_, group_id) = create_service(&app).await;
    let es_id = create_spanish(&app, &group_id).await;

    let (_, es) = send(&app, Method::GET, &format!("/api/services?id={}", es_id), None, false).await;

    assert_eq!(es["icon"], "layers");
    assert_eq!(es["showOnHome"], true);
    assert_eq!(es["image"], "/img/binary.png");
    assert_eq!(es["title"], "Plan Binario");
}

#[tokio::test]
async fn test_list_by_locale_and_all() {
    let app = create_test_app();
    let (_, group_id) = create_service(&app).await;
    create_spanish(&app, &group_id).await;

    let (_, es) = send(&app, Method::GET, "/api/services?locale=es", None, false).await;
    assert_eq!(es.as_array().unwrap().len(), 1);
    assert_eq!(es[0]["locale"], "es");

    let (_, default) = send(&app, Method::GET, "/api/services", None, false).await;
    assert_eq!(default.as_array().unwrap().len(), 1);
    assert_eq!(default[0]["locale"], "en");

    let (_, all) = send(&app, Method::GET, "/api/services?all=true", None, false).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    // Unknown locale silently serves the default
    let (status, fallback) = send(&app, Method::GET, "/api/services?locale=zz", None, false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fallback[0]["locale"], "en");
}

#[tokio::test]
async fn test_with_translations() {
    let app = create_test_app();
    let (id, group_id) = create_service(&app).await;
    let es_id = create_spanish(&app, &group_id).await;

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/services?id={}&withTranslations=true", id),
        None,
        false,
    )
    .await;

    let translations = body["translations"].as_array().unwrap();
    assert_eq!(translations.len(), 1);
    assert_eq!(translations[0]["id"], Value::String(es_id));

    let (_, plain) = send(&app, Method::GET, &format!("/api/services?id={}", id), None, false).await;
    assert!(plain.get("translations").is_none());
}

// ==================== Fan-out Tests ====================

#[tokio::test]
async fn test_canonical_update_propagates_to_siblings() {
    let app = create_test_app();
    let (id, group_id) = create_service(&app).await;
    let es_id = create_spanish(&app, &group_id).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/services?id={}", id),
        Some(json!({
            "locale": "en",
            "icon": "rocket",
            "image": "/img/rocket.png",
            "showOnHome": false,
            "title": "Binary Plan",
            "description": "Two-leg compensation plan"
        })),
        true,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["siblingsUpdated"], 1);
    assert_eq!(body["created"], false);

    let (_, es) = send(&app, Method::GET, &format!("/api/services?id={}", es_id), None, false).await;
    assert_eq!(es["icon"], "rocket");
    assert_eq!(es["image"], "/img/rocket.png");
    assert_eq!(es["showOnHome"], false);
    assert_eq!(es["title"], "Plan Binario");
}

#[tokio::test]
async fn test_partial_canonical_update_keeps_stored_shared_fields() {
    let app = create_test_app();
    let (status, en) = send(
        &app,
        Method::POST,
        "/api/faqs",
        Some(json!({
            "category": "payments",
            "sortOrder": 4,
            "isActive": false,
            "question": "Which gateways are supported?",
            "answer": "Stripe and PayPal"
        })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = en["id"].as_str().unwrap();

    let (status, es) = send(
        &app,
        Method::POST,
        "/api/faqs",
        Some(json!({
            "locale": "es",
            "groupId": en["groupId"],
            "question": "¿Qué pasarelas se admiten?",
            "answer": "Stripe y PayPal"
        })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/faqs?id={}", id),
        Some(json!({ "question": "Which gateways?", "answer": "Stripe, PayPal and crypto" })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "payments");
    assert_eq!(body["sortOrder"], 4);
    assert_eq!(body["isActive"], false);

    let (_, es_after) = send(
        &app,
        Method::GET,
        &format!("/api/faqs?id={}", es["id"].as_str().unwrap()),
        None,
        false,
    )
    .await;
    assert_eq!(es_after["category"], "payments");
    assert_eq!(es_after["isActive"], false);
}

#[tokio::test]
async fn test_update_into_new_locale_creates_translation() {
    let app = create_test_app();
    let (id, group_id) = create_service(&app).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/services?id={}", id),
        Some(json!({
            "locale": "pt",
            "icon": "ignored",
            "title": "Plano Binário",
            "description": "Plano de duas pernas"
        })),
        true,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], true);
    assert_eq!(body["locale"], "pt");
    assert_eq!(body["groupId"], Value::String(group_id));
    assert_eq!(body["icon"], "layers");
}

#[tokio::test]
async fn test_update_requires_id() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/faqs",
        Some(json!({ "question": "Q", "answer": "A" })),
        true,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "id is required");
}

#[tokio::test]
async fn test_delete_removes_every_locale() {
    let app = create_test_app();
    let (id, group_id) = create_service(&app).await;
    let es_id = create_spanish(&app, &group_id).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/api/services?id={}", id), None, true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], "2");

    for sibling in [id, es_id] {
        let (status, _) = send(&app, Method::GET, &format!("/api/services?id={}", sibling), None, false).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

// ==================== Simulator Tests ====================

#[tokio::test]
async fn test_simulator() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/simulator",
        Some(json!({
            "investment": 500,
            "dailyRoiPercent": 2,
            "durationDays": 30,
            "directReferrals": 2,
            "referralCommissionPercent": 10,
            "levelPercents": [5]
        })),
        false,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dailyReturn"], 10.0);
    assert_eq!(body["totalReturn"], 300.0);
    assert_eq!(body["referralIncome"], 100.0);
    assert_eq!(body["levelIncome"], json!([50.0]));
    assert_eq!(body["totalIncome"], 450.0);
}

#[tokio::test]
async fn test_simulator_out_of_range() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/simulator",
        Some(json!({ "investment": 1, "dailyRoiPercent": 2, "durationDays": 30 })),
        false,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("investment"));
}
