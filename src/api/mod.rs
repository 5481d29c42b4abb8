//! HTTP surface: public page content, admin collections and the simulator.

mod collections;
mod pages;

use crate::config::Config;
use crate::error::ApiError;
use crate::i18n::{ContentMetrics, LocaleRegistry};
use crate::models::{Faq, Service};
use crate::simulator::{self, PlanInput, PlanProjection};
use crate::store::ContentStore;
use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use collections::RecordView;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ContentStore>,
    pub locales: Arc<LocaleRegistry>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ContentStore>) -> Result<Self> {
        let locales = LocaleRegistry::new(&config.default_locale)?;
        Ok(Self {
            config: Arc::new(config),
            store,
            locales: Arc::new(locales),
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/services",
            get(collections::get_records::<Service>)
                .post(collections::create_record::<Service>)
                .put(collections::update_record::<Service>)
                .delete(collections::delete_record::<Service>),
        )
        .route(
            "/api/faqs",
            get(collections::get_records::<Faq>)
                .post(collections::create_record::<Faq>)
                .put(collections::update_record::<Faq>)
                .delete(collections::delete_record::<Faq>),
        )
        .route("/api/pages", get(pages::get_override).put(pages::put_override))
        .route("/api/simulator", post(simulate))
        .route("/:lang", get(pages::home))
        .route("/:lang/privacy-policy", get(pages::privacy))
        .route("/:lang/:slug", get(pages::page))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let locales: Vec<&str> = state
        .locales
        .list_enabled()
        .iter()
        .map(|locale| locale.code)
        .collect();

    Json(json!({
        "status": "ok",
        "defaultLocale": state.locales.default_locale().code,
        "locales": locales,
        "metrics": ContentMetrics::global().report(),
    }))
}

async fn simulate(
    payload: Result<Json<PlanInput>, JsonRejection>,
) -> Result<Json<PlanProjection>, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(simulator::project(&input)?))
}

/// Query flags arrive as strings; "true" and "1" enable them.
pub(crate) fn flag(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true") | Some("1"))
}

/// Parse a string-coerced record id.
pub(crate) fn parse_id(value: Option<&str>) -> Result<i64, ApiError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("id is required".to_string()))?;

    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid id: '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag() {
        assert!(flag(Some("true")));
        assert!(flag(Some("1")));
        assert!(!flag(Some("false")));
        assert!(!flag(Some("yes")));
        assert!(!flag(None));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(Some("42")).unwrap(), 42);
        assert_eq!(parse_id(Some(" 7 ")).unwrap(), 7);
        assert!(matches!(parse_id(None), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_id(Some("")), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_id(Some("abc")), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_app_state_rejects_unknown_default_locale() {
        let config = Config {
            default_locale: "xx".to_string(),
            ..Config::default()
        };
        let store: Arc<dyn ContentStore> = Arc::new(crate::store::MemoryContentStore::new());
        assert!(AppState::new(config, store).is_err());
    }
}
