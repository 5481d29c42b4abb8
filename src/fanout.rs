//! Admin write path for localized collections.
//!
//! The canonical-locale row of a group owns the shared fields. Writes to the
//! canonical row are copied onto every sibling in one atomic store call;
//! writes to any other locale take their shared fields from the canonical
//! row inside the same store call and only contribute locale-specific text.

use crate::i18n::{Locale, LocaleRegistry};
use crate::models::{ContentKind, LocalizedRecord};
use crate::store::{
    merge_shared, ContentStore, NewRow, SharedWrite, StoreError, StoredRow, TranslationWrite,
};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ContentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => ContentError::Conflict(msg),
            other => ContentError::Store(other),
        }
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(e: serde_json::Error) -> Self {
        ContentError::Store(StoreError::Serialization(e))
    }
}

/// Submitted fields for a create or update.
///
/// Shared and text fields arrive flat in the same JSON object as `locale`
/// and `groupId`.
pub struct RecordInput<K: ContentKind> {
    pub locale: Option<String>,
    pub group_id: Option<i64>,
    pub shared: K::Shared,
    pub text: K::Text,
    /// Keys present in the request body. `None` treats every shared field
    /// as submitted.
    submitted: Option<BTreeSet<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = ""))]
struct RecordFields<K: ContentKind> {
    #[serde(default)]
    locale: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    group_id: Option<i64>,
    #[serde(flatten)]
    shared: K::Shared,
    #[serde(flatten)]
    text: K::Text,
}

impl<'de, K: ContentKind> Deserialize<'de> for RecordInput<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let body = Map::<String, Value>::deserialize(deserializer)?;
        let submitted = body.keys().cloned().collect();
        let fields: RecordFields<K> =
            serde_json::from_value(Value::Object(body)).map_err(de::Error::custom)?;

        Ok(Self {
            locale: fields.locale,
            group_id: fields.group_id,
            shared: fields.shared,
            text: fields.text,
            submitted: Some(submitted),
        })
    }
}

impl<K: ContentKind> RecordInput<K> {
    /// Input with every shared field treated as submitted.
    pub fn new(locale: Option<String>, group_id: Option<i64>, shared: K::Shared, text: K::Text) -> Self {
        Self {
            locale,
            group_id,
            shared,
            text,
            submitted: None,
        }
    }

    /// Shared fields as stored, plus the subset the caller actually sent.
    fn shared_write(&self) -> Result<SharedWrite, ContentError> {
        let full = encode(&self.shared)?;
        let Value::Object(fields) = &full else {
            return Err(ContentError::Validation(format!(
                "{} shared fields must be an object",
                K::LABEL
            )));
        };

        let patch = fields
            .iter()
            .filter(|(key, _)| self.submitted.as_ref().map_or(true, |keys| keys.contains(*key)))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(SharedWrite { full, patch })
    }
}

/// Ids are exchanged as strings but numbers are accepted too.
fn deserialize_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Int(i64),
        Str(String),
    }

    match Option::<IdRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IdRepr::Int(id)) => Ok(Some(id)),
        Some(IdRepr::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(IdRepr::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid id: '{}'", s))),
    }
}

/// Result of an update.
pub struct UpdateOutcome<K: ContentKind> {
    pub record: LocalizedRecord<K>,
    /// A new locale row was created for the group
    pub created: bool,
    /// Sibling rows that received the canonical shared fields
    pub siblings_updated: u64,
}

fn encode<T: Serialize>(value: &T) -> Result<Value, ContentError> {
    Ok(serde_json::to_value(value)?)
}

fn decode<K: ContentKind>(row: StoredRow) -> Result<LocalizedRecord<K>, ContentError> {
    Ok(LocalizedRecord::from_row(row)?)
}

fn target_locale(
    registry: &LocaleRegistry,
    requested: Option<&str>,
    default: Locale,
) -> Result<Locale, ContentError> {
    match requested.map(str::trim).filter(|code| !code.is_empty()) {
        Some(code) => Locale::from_code(registry, code)
            .map_err(|e| ContentError::Validation(e.to_string())),
        None => Ok(default),
    }
}

fn not_found<K: ContentKind>(id: i64) -> ContentError {
    ContentError::NotFound(format!("{} {} not found", K::LABEL, id))
}

/// Load one record.
pub async fn fetch<K: ContentKind>(
    store: &dyn ContentStore,
    id: i64,
) -> Result<LocalizedRecord<K>, ContentError> {
    match store.get(K::TABLE, id).await? {
        Some(row) => decode(row),
        None => Err(not_found::<K>(id)),
    }
}

/// Every other locale row of the record's group.
pub async fn translations<K: ContentKind>(
    store: &dyn ContentStore,
    record: &LocalizedRecord<K>,
) -> Result<Vec<LocalizedRecord<K>>, ContentError> {
    store
        .list_group(K::TABLE, record.group_id)
        .await?
        .into_iter()
        .filter(|row| row.id != record.id)
        .map(decode)
        .collect()
}

/// List records in one locale, or in every locale when `locale` is `None`.
pub async fn list<K: ContentKind>(
    store: &dyn ContentStore,
    locale: Option<Locale>,
) -> Result<Vec<LocalizedRecord<K>>, ContentError> {
    store
        .list(K::TABLE, locale.map(|l| l.code()))
        .await?
        .into_iter()
        .map(decode)
        .collect()
}

/// Create a record.
///
/// Without a `groupId` this starts a new entity, which must be written in the
/// canonical locale. With a `groupId` it adds a translation that inherits
/// the canonical row's shared fields verbatim; submitted shared values are
/// ignored.
pub async fn create<K: ContentKind>(
    store: &dyn ContentStore,
    registry: &LocaleRegistry,
    input: RecordInput<K>,
) -> Result<LocalizedRecord<K>, ContentError> {
    let canonical = Locale::canonical(registry);
    let locale = target_locale(registry, input.locale.as_deref(), canonical)?;
    K::validate_text(&input.text).map_err(ContentError::Validation)?;

    let row = match input.group_id {
        None => {
            if locale != canonical {
                return Err(ContentError::Validation(format!(
                    "new {} entries must be created in '{}'; pass groupId to add a translation",
                    K::LABEL,
                    canonical
                )));
            }
            K::validate_shared(&input.shared).map_err(ContentError::Validation)?;

            store
                .insert(
                    K::TABLE,
                    NewRow {
                        group_id: None,
                        locale: locale.code().to_string(),
                        shared: encode(&input.shared)?,
                        text: encode(&input.text)?,
                    },
                )
                .await?
        }
        Some(group_id) => {
            let write = TranslationWrite {
                group_id,
                locale: locale.code().to_string(),
                canonical_locale: canonical.code().to_string(),
                text: encode(&input.text)?,
                fallback_shared: None,
                insert_only: true,
            };

            store
                .write_translation(K::TABLE, write)
                .await?
                .ok_or_else(|| {
                    ContentError::NotFound(format!(
                        "{} group {} has no '{}' entry",
                        K::LABEL,
                        group_id,
                        canonical
                    ))
                })?
                .row
        }
    };

    let record = decode::<K>(row)?;
    info!(
        "Created {} {} (group {}, locale {})",
        K::LABEL,
        record.id,
        record.group_id,
        record.locale
    );
    Ok(record)
}

/// Update the record addressed by `id` in the requested locale.
///
/// * canonical locale: the submitted shared fields are merged over the
///   canonical row's (creating that row if the group lacks one) and copied
///   onto every sibling, atomically. Shared fields left out of the request
///   keep their stored values.
/// * other locales: the group's row for that locale is updated, or created
///   if missing, using the canonical row's shared fields.
///
/// An omitted locale targets the addressed row's own locale.
pub async fn update<K: ContentKind>(
    store: &dyn ContentStore,
    registry: &LocaleRegistry,
    id: i64,
    input: RecordInput<K>,
) -> Result<UpdateOutcome<K>, ContentError> {
    let existing = store
        .get(K::TABLE, id)
        .await?
        .ok_or_else(|| not_found::<K>(id))?;

    let own_locale = Locale::from_code(registry, &existing.locale)
        .map_err(|e| ContentError::Validation(e.to_string()))?;
    let locale = target_locale(registry, input.locale.as_deref(), own_locale)?;
    let canonical = Locale::canonical(registry);
    K::validate_text(&input.text).map_err(ContentError::Validation)?;

    let text = encode(&input.text)?;
    let group_id = existing.group_id;

    if locale == canonical {
        let shared = input.shared_write()?;

        // Validate what the canonical row will hold once the patch lands
        let current = if existing.locale == canonical.code() {
            Some(existing)
        } else {
            store.find_in_group(K::TABLE, group_id, canonical.code()).await?
        };
        let preview = match &current {
            Some(row) => merge_shared(&row.shared, &shared.patch),
            None => shared.full.clone(),
        };
        let preview: K::Shared = serde_json::from_value(preview)
            .map_err(|e| ContentError::Validation(e.to_string()))?;
        K::validate_shared(&preview).map_err(ContentError::Validation)?;

        let outcome = store
            .update_with_fanout(K::TABLE, group_id, canonical.code(), shared, text)
            .await?
            .ok_or_else(|| not_found::<K>(id))?;

        if outcome.created {
            warn!(
                "{} group {} had no '{}' entry, created it",
                K::LABEL,
                group_id,
                canonical
            );
        }
        info!(
            "{} {} {} and propagated shared fields to {} sibling(s)",
            if outcome.created { "Created" } else { "Updated" },
            K::LABEL,
            outcome.row.id,
            outcome.siblings_updated
        );

        return Ok(UpdateOutcome {
            record: decode(outcome.row)?,
            created: outcome.created,
            siblings_updated: outcome.siblings_updated,
        });
    }

    let write = TranslationWrite {
        group_id,
        locale: locale.code().to_string(),
        canonical_locale: canonical.code().to_string(),
        text,
        fallback_shared: Some(existing.shared),
        insert_only: false,
    };
    let outcome = store
        .write_translation(K::TABLE, write)
        .await?
        .ok_or_else(|| not_found::<K>(id))?;

    if encode(&input.shared)? != outcome.row.shared {
        debug!(
            "Ignoring submitted shared fields for {} {} in locale {}",
            K::LABEL,
            id,
            locale
        );
    }

    info!(
        "{} {} {} translation {}",
        if outcome.created { "Created" } else { "Updated" },
        locale,
        K::LABEL,
        outcome.row.id
    );

    Ok(UpdateOutcome {
        record: decode(outcome.row)?,
        created: outcome.created,
        siblings_updated: 0,
    })
}

/// Delete the record's whole group.
pub async fn delete<K: ContentKind>(store: &dyn ContentStore, id: i64) -> Result<u64, ContentError> {
    let row = store
        .get(K::TABLE, id)
        .await?
        .ok_or_else(|| not_found::<K>(id))?;

    let removed = store.delete_group(K::TABLE, row.group_id).await?;
    info!(
        "Deleted {} group {} ({} locale row(s))",
        K::LABEL,
        row.group_id,
        removed
    );
    Ok(removed)
}
