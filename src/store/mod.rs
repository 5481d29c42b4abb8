//! Persistence for localized content rows and page overrides.
//!
//! The store is schema-agnostic about collections: shared and text fields
//! travel as JSON documents and are typed by [`crate::models`].

mod memory;
mod postgres;

pub use memory::MemoryContentStore;
pub use postgres::PgContentStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Localized collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Services,
    Faqs,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Services => "services",
            Table::Faqs => "faqs",
        }
    }
}

/// A persisted locale row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: i64,
    pub group_id: i64,
    pub locale: String,
    pub shared: Value,
    pub text: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row to insert. `group_id: None` starts a new logical entity.
#[derive(Debug, Clone)]
pub struct NewRow {
    pub group_id: Option<i64>,
    pub locale: String,
    pub shared: Value,
    pub text: Value,
}

/// Shared fields for a canonical write.
#[derive(Debug, Clone)]
pub struct SharedWrite {
    /// Complete shared fields, used when the canonical row has to be created
    pub full: Value,
    /// Submitted fields, merged over the stored ones key by key
    pub patch: Map<String, Value>,
}

/// Result of an atomic canonical update.
#[derive(Debug, Clone)]
pub struct FanoutOutcome {
    pub row: StoredRow,
    /// The canonical row did not exist and was inserted
    pub created: bool,
    /// Number of sibling rows whose shared fields were rewritten
    pub siblings_updated: u64,
}

/// A locale-specific write. Shared fields are copied from the group's
/// canonical row within the same atomic operation.
#[derive(Debug, Clone)]
pub struct TranslationWrite {
    pub group_id: i64,
    pub locale: String,
    pub canonical_locale: String,
    pub text: Value,
    /// Shared fields to use when the group has no canonical row. With `None`
    /// a missing canonical row aborts the write.
    pub fallback_shared: Option<Value>,
    /// Refuse to overwrite an existing row for `locale` (`Conflict`)
    pub insert_only: bool,
}

#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub row: StoredRow,
    pub created: bool,
}

/// Top-level merge of `patch` over `base`, matching PostgreSQL's `jsonb || jsonb`.
pub fn merge_shared(base: &Value, patch: &Map<String, Value>) -> Value {
    let mut merged = match base {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    Value::Object(merged)
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get(&self, table: Table, id: i64) -> Result<Option<StoredRow>, StoreError>;

    /// Rows ordered by group then id; `None` lists every locale.
    async fn list(&self, table: Table, locale: Option<&str>) -> Result<Vec<StoredRow>, StoreError>;

    async fn list_group(&self, table: Table, group_id: i64) -> Result<Vec<StoredRow>, StoreError>;

    async fn find_in_group(
        &self,
        table: Table,
        group_id: i64,
        locale: &str,
    ) -> Result<Option<StoredRow>, StoreError>;

    /// Insert a row. Fails with `Conflict` if the group already has a row
    /// for the locale.
    async fn insert(&self, table: Table, row: NewRow) -> Result<StoredRow, StoreError>;

    /// Upsert the group's `locale` row, then copy its resulting shared fields
    /// onto every other row of the group, all or nothing. `None` if the group
    /// has no rows.
    async fn update_with_fanout(
        &self,
        table: Table,
        group_id: i64,
        locale: &str,
        shared: SharedWrite,
        text: Value,
    ) -> Result<Option<FanoutOutcome>, StoreError>;

    /// Insert or update a translation row with the canonical shared fields.
    /// `None` if the group has no rows, or has no canonical row and no
    /// fallback was given.
    async fn write_translation(
        &self,
        table: Table,
        write: TranslationWrite,
    ) -> Result<Option<TranslationOutcome>, StoreError>;

    /// Delete every row of a group, returning the number removed.
    async fn delete_group(&self, table: Table, group_id: i64) -> Result<u64, StoreError>;

    async fn page_override(&self, slug: &str, locale: &str) -> Result<Option<Value>, StoreError>;

    async fn put_page_override(&self, slug: &str, locale: &str, content: Value) -> Result<(), StoreError>;
}
