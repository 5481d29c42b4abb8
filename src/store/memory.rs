use super::{
    merge_shared, ContentStore, FanoutOutcome, NewRow, SharedWrite, StoreError, StoredRow, Table,
    TranslationOutcome, TranslationWrite,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-process store used when no database is configured, and by tests.
///
/// All operations run under one lock, so multi-row updates are atomic.
#[derive(Clone, Default)]
pub struct MemoryContentStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    next_group: i64,
    rows: HashMap<Table, Vec<StoredRow>>,
    pages: HashMap<(String, String), Value>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Internal("memory store lock poisoned".to_string()))
    }
}

impl MemoryState {
    fn table(&self, table: Table) -> &[StoredRow] {
        self.rows.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    fn table_mut(&mut self, table: Table) -> &mut Vec<StoredRow> {
        self.rows.entry(table).or_default()
    }

    fn has_group(&self, table: Table, group_id: i64) -> bool {
        self.table(table).iter().any(|row| row.group_id == group_id)
    }

    fn position(&self, table: Table, group_id: i64, locale: &str) -> Option<usize> {
        self.table(table)
            .iter()
            .position(|row| row.group_id == group_id && row.locale == locale)
    }

    fn push_row(
        &mut self,
        table: Table,
        group_id: i64,
        locale: String,
        shared: Value,
        text: Value,
        now: DateTime<Utc>,
    ) -> StoredRow {
        self.next_id += 1;
        let stored = StoredRow {
            id: self.next_id,
            group_id,
            locale,
            shared,
            text,
            created_at: now,
            updated_at: now,
        };
        self.table_mut(table).push(stored.clone());
        stored
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn get(&self, table: Table, id: i64) -> Result<Option<StoredRow>, StoreError> {
        let state = self.lock()?;
        Ok(state.table(table).iter().find(|row| row.id == id).cloned())
    }

    async fn list(&self, table: Table, locale: Option<&str>) -> Result<Vec<StoredRow>, StoreError> {
        let state = self.lock()?;
        let mut rows: Vec<StoredRow> = state
            .table(table)
            .iter()
            .filter(|row| locale.map_or(true, |l| row.locale == l))
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.group_id, row.id));
        Ok(rows)
    }

    async fn list_group(&self, table: Table, group_id: i64) -> Result<Vec<StoredRow>, StoreError> {
        let state = self.lock()?;
        let mut rows: Vec<StoredRow> = state
            .table(table)
            .iter()
            .filter(|row| row.group_id == group_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }

    async fn find_in_group(
        &self,
        table: Table,
        group_id: i64,
        locale: &str,
    ) -> Result<Option<StoredRow>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .table(table)
            .iter()
            .find(|row| row.group_id == group_id && row.locale == locale)
            .cloned())
    }

    async fn insert(&self, table: Table, row: NewRow) -> Result<StoredRow, StoreError> {
        let mut state = self.lock()?;

        let group_id = match row.group_id {
            Some(group_id) => {
                let taken = state
                    .table(table)
                    .iter()
                    .any(|r| r.group_id == group_id && r.locale == row.locale);
                if taken {
                    return Err(StoreError::Conflict(format!(
                        "group {} already has a '{}' row",
                        group_id, row.locale
                    )));
                }
                group_id
            }
            None => {
                state.next_group += 1;
                state.next_group
            }
        };

        Ok(state.push_row(table, group_id, row.locale, row.shared, row.text, Utc::now()))
    }

    async fn update_with_fanout(
        &self,
        table: Table,
        group_id: i64,
        locale: &str,
        shared: SharedWrite,
        text: Value,
    ) -> Result<Option<FanoutOutcome>, StoreError> {
        let mut state = self.lock()?;
        if !state.has_group(table, group_id) {
            return Ok(None);
        }

        let now = Utc::now();
        let (row, created) = match state.position(table, group_id, locale) {
            Some(idx) => {
                let row = &mut state.table_mut(table)[idx];
                row.shared = merge_shared(&row.shared, &shared.patch);
                row.text = text;
                row.updated_at = now;
                (row.clone(), false)
            }
            None => {
                let row = state.push_row(table, group_id, locale.to_string(), shared.full, text, now);
                (row, true)
            }
        };

        let mut siblings_updated = 0;
        for sibling in state
            .table_mut(table)
            .iter_mut()
            .filter(|r| r.group_id == group_id && r.id != row.id)
        {
            sibling.shared = row.shared.clone();
            sibling.updated_at = now;
            siblings_updated += 1;
        }

        Ok(Some(FanoutOutcome {
            row,
            created,
            siblings_updated,
        }))
    }

    async fn write_translation(
        &self,
        table: Table,
        write: TranslationWrite,
    ) -> Result<Option<TranslationOutcome>, StoreError> {
        let mut state = self.lock()?;
        if !state.has_group(table, write.group_id) {
            return Ok(None);
        }

        let canonical = state
            .position(table, write.group_id, &write.canonical_locale)
            .map(|idx| state.table(table)[idx].shared.clone());
        let Some(shared) = canonical.or(write.fallback_shared) else {
            return Ok(None);
        };

        let now = Utc::now();
        let outcome = match state.position(table, write.group_id, &write.locale) {
            Some(_) if write.insert_only => {
                return Err(StoreError::Conflict(format!(
                    "group {} already has a '{}' row",
                    write.group_id, write.locale
                )));
            }
            Some(idx) => {
                let row = &mut state.table_mut(table)[idx];
                row.shared = shared;
                row.text = write.text;
                row.updated_at = now;
                TranslationOutcome {
                    row: row.clone(),
                    created: false,
                }
            }
            None => TranslationOutcome {
                row: state.push_row(table, write.group_id, write.locale, shared, write.text, now),
                created: true,
            },
        };

        Ok(Some(outcome))
    }

    async fn delete_group(&self, table: Table, group_id: i64) -> Result<u64, StoreError> {
        let mut state = self.lock()?;
        let rows = state.table_mut(table);
        let before = rows.len();
        rows.retain(|row| row.group_id != group_id);
        Ok((before - rows.len()) as u64)
    }

    async fn page_override(&self, slug: &str, locale: &str) -> Result<Option<Value>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .pages
            .get(&(slug.to_string(), locale.to_string()))
            .cloned())
    }

    async fn put_page_override(&self, slug: &str, locale: &str, content: Value) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state
            .pages
            .insert((slug.to_string(), locale.to_string()), content);
        Ok(())
    }
}
