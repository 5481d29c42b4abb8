//! Locale-prefixed page routes and editor overrides.

use super::AppState;
use crate::content::{self, merge_content, ContentOverride, PageContent, PrivacyPolicy};
use crate::error::ApiError;
use crate::i18n::{resolve_locale, Locale};
use crate::security::AdminSession;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub locale: Locale,
    pub slug: String,
    #[serde(flatten)]
    pub content: PageContent,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub slug: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideView {
    pub locale: Locale,
    pub slug: String,
    /// Stored override, `null` when the page only uses defaults
    pub stored: Option<ContentOverride>,
    pub content: PageContent,
}

/// Stored override for a page, if any. A storage failure is logged and the
/// page is served from defaults.
async fn load_override(state: &AppState, slug: &str, locale: Locale) -> Option<ContentOverride> {
    match state.store.page_override(slug, locale.code()).await {
        Ok(stored) => stored.and_then(ContentOverride::from_stored),
        Err(e) => {
            error!("Failed to load override for {}/{}: {}", locale, slug, e);
            None
        }
    }
}

async fn render(state: &AppState, lang: &str, slug: &str) -> Result<PageView, ApiError> {
    let locale = resolve_locale(&state.locales, lang);
    let canonical = Locale::canonical(&state.locales);

    let default = content::default_page(slug, locale, canonical)
        .ok_or_else(|| ApiError::NotFound(format!("page '{}' not found", slug)))?;
    let overrides = load_override(state, slug, locale).await;

    Ok(PageView {
        locale,
        slug: slug.to_string(),
        content: merge_content(&default, overrides.as_ref()),
    })
}

/// `GET /:lang`
pub async fn home(
    State(state): State<AppState>,
    Path(lang): Path<String>,
) -> Result<Json<PageView>, ApiError> {
    Ok(Json(render(&state, &lang, "home").await?))
}

/// `GET /:lang/:slug`
pub async fn page(
    State(state): State<AppState>,
    Path((lang, slug)): Path<(String, String)>,
) -> Result<Json<PageView>, ApiError> {
    Ok(Json(render(&state, &lang, &slug).await?))
}

/// `GET /:lang/privacy-policy`
pub async fn privacy(State(state): State<AppState>, Path(lang): Path<String>) -> Json<PrivacyPolicy> {
    let locale = resolve_locale(&state.locales, &lang);
    let policy = content::privacy_policy(locale, Locale::canonical(&state.locales));
    Json(PrivacyPolicy::clone(&policy))
}

fn page_target(state: &AppState, query: &PageQuery) -> Result<(String, Locale), ApiError> {
    let slug = query
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("slug is required".to_string()))?;

    if !content::is_known_slug(slug) {
        return Err(ApiError::NotFound(format!("page '{}' not found", slug)));
    }

    let locale = match query.locale.as_deref() {
        Some(code) => Locale::from_code(&state.locales, code.trim())
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Locale::canonical(&state.locales),
    };

    Ok((slug.to_string(), locale))
}

async fn override_view(state: &AppState, slug: String, locale: Locale) -> Result<OverrideView, ApiError> {
    let canonical = Locale::canonical(&state.locales);
    let default = content::default_page(&slug, locale, canonical)
        .ok_or_else(|| ApiError::NotFound(format!("page '{}' not found", slug)))?;

    let stored = state
        .store
        .page_override(&slug, locale.code())
        .await?
        .and_then(ContentOverride::from_stored);
    let content = merge_content(&default, stored.as_ref());

    Ok(OverrideView {
        locale,
        slug,
        stored,
        content,
    })
}

/// `GET /api/pages?slug=&locale=`
pub async fn get_override(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<OverrideView>, ApiError> {
    let (slug, locale) = page_target(&state, &query)?;
    Ok(Json(override_view(&state, slug, locale).await?))
}

/// `PUT /api/pages?slug=&locale=`: replace the stored override.
pub async fn put_override(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<PageQuery>,
    payload: Result<Json<ContentOverride>, JsonRejection>,
) -> Result<Json<OverrideView>, ApiError> {
    let (slug, locale) = page_target(&state, &query)?;
    let Json(overrides) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let value = serde_json::to_value(&overrides).map_err(|e| ApiError::Internal(e.to_string()))?;
    state.store.put_page_override(&slug, locale.code(), value).await?;
    info!("Stored content override for {}/{}", locale, slug);

    Ok(Json(override_view(&state, slug, locale).await?))
}
