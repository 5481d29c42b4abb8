//! Admin CRUD endpoints shared by every localized collection.

use super::{flag, parse_id, AppState};
use crate::error::ApiError;
use crate::fanout::{self, RecordInput};
use crate::i18n::{resolve_locale, Locale};
use crate::models::{ContentKind, LocalizedRecord};
use crate::security::AdminSession;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionQuery {
    pub id: Option<String>,
    pub locale: Option<String>,
    pub all: Option<String>,
    pub with_translations: Option<String>,
}

/// A record as returned to clients. Ids and timestamps are strings.
#[derive(Serialize)]
#[serde(rename_all = "camelCase", bound(serialize = ""))]
pub struct RecordView<K: ContentKind> {
    pub id: String,
    pub group_id: String,
    pub locale: String,
    #[serde(flatten)]
    pub shared: K::Shared,
    #[serde(flatten)]
    pub text: K::Text,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<Vec<RecordView<K>>>,
}

impl<K: ContentKind> From<LocalizedRecord<K>> for RecordView<K> {
    fn from(record: LocalizedRecord<K>) -> Self {
        Self {
            id: record.id.to_string(),
            group_id: record.group_id.to_string(),
            locale: record.locale,
            shared: record.shared,
            text: record.text,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
            translations: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase", bound(serialize = ""))]
struct UpdateView<K: ContentKind> {
    #[serde(flatten)]
    record: RecordView<K>,
    created: bool,
    siblings_updated: u64,
}

async fn with_translations<K: ContentKind>(
    state: &AppState,
    record: LocalizedRecord<K>,
) -> Result<RecordView<K>, ApiError> {
    let siblings = fanout::translations(state.store.as_ref(), &record).await?;
    let mut view = RecordView::from(record);
    view.translations = Some(siblings.into_iter().map(RecordView::from).collect());
    Ok(view)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// `GET`: one record by `id`, or a list in `locale` (every locale with
/// `all=true`). `withTranslations=true` attaches sibling rows.
pub async fn get_records<K: ContentKind>(
    State(state): State<AppState>,
    Query(query): Query<CollectionQuery>,
) -> Result<Response, ApiError> {
    let include_translations = flag(query.with_translations.as_deref());

    if query.id.is_some() {
        let id = parse_id(query.id.as_deref())?;
        let record = fanout::fetch::<K>(state.store.as_ref(), id).await?;
        let view = if include_translations {
            with_translations(&state, record).await?
        } else {
            RecordView::from(record)
        };
        return Ok(Json(view).into_response());
    }

    let locale = if flag(query.all.as_deref()) {
        None
    } else {
        Some(match query.locale.as_deref() {
            Some(requested) => resolve_locale(&state.locales, requested),
            None => Locale::fallback(&state.locales),
        })
    };

    let records = fanout::list::<K>(state.store.as_ref(), locale).await?;
    let mut views = Vec::with_capacity(records.len());
    for record in records {
        views.push(if include_translations {
            with_translations(&state, record).await?
        } else {
            RecordView::from(record)
        });
    }

    Ok(Json(views).into_response())
}

/// `POST`: create a canonical entry, or a translation when `groupId` is set.
pub async fn create_record<K: ContentKind>(
    State(state): State<AppState>,
    _session: AdminSession,
    payload: Result<Json<RecordInput<K>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input = json_body(payload)?;
    let record = fanout::create(state.store.as_ref(), &state.locales, input).await?;
    Ok((StatusCode::CREATED, Json(RecordView::from(record))).into_response())
}

/// `PUT ?id=`: update in the submitted locale, fanning canonical shared
/// fields out to every translation.
pub async fn update_record<K: ContentKind>(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<CollectionQuery>,
    payload: Result<Json<RecordInput<K>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(query.id.as_deref())?;
    let input = json_body(payload)?;

    let outcome = fanout::update(state.store.as_ref(), &state.locales, id, input).await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    let view = UpdateView {
        record: RecordView::from(outcome.record),
        created: outcome.created,
        siblings_updated: outcome.siblings_updated,
    };
    Ok((status, Json(view)).into_response())
}

/// `DELETE ?id=`: remove the entry in every locale.
pub async fn delete_record<K: ContentKind>(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<CollectionQuery>,
) -> Result<Response, ApiError> {
    let id = parse_id(query.id.as_deref())?;
    let removed = fanout::delete::<K>(state.store.as_ref(), id).await?;
    Ok(Json(json!({ "success": true, "deleted": removed.to_string() })).into_response())
}
