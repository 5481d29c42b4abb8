use super::{
    ContentStore, FanoutOutcome, NewRow, SharedWrite, StoreError, StoredRow, Table,
    TranslationOutcome, TranslationWrite,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;

const ROW_COLUMNS: &str = "id, group_id, locale, shared, body, created_at, updated_at";

/// PostgreSQL-backed content store.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    /// Connect and create the tables this service needs.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> Result<()> {
        sqlx::query("CREATE SEQUENCE IF NOT EXISTS content_group_seq")
            .execute(&self.pool)
            .await
            .context("Failed to create group sequence")?;

        for table in [Table::Services, Table::Faqs] {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id BIGSERIAL PRIMARY KEY,
                    group_id BIGINT NOT NULL,
                    locale TEXT NOT NULL,
                    shared JSONB NOT NULL,
                    body JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    UNIQUE (group_id, locale)
                )",
                table.name()
            );
            sqlx::query(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to create {} table", table.name()))?;
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS page_overrides (
                slug TEXT NOT NULL,
                locale TEXT NOT NULL,
                content JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (slug, locale)
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create page_overrides table")?;

        info!("✓ Database tables ready");
        Ok(())
    }
}

fn map_row(row: PgRow) -> Result<StoredRow, StoreError> {
    Ok(StoredRow {
        id: row.try_get("id")?,
        group_id: row.try_get("group_id")?,
        locale: row.try_get("locale")?,
        shared: row.try_get("shared")?,
        text: row.try_get("body")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_insert_error(e: sqlx::Error, group_id: Option<i64>, locale: &str) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(format!(
                "group {:?} already has a '{}' row",
                group_id, locale
            ));
        }
    }
    StoreError::Database(e)
}

/// Upsert keyed on `(group_id, locale)`. `inserted` tells a fresh row from
/// an updated one.
fn upsert_sql(table: Table, on_conflict: &str) -> String {
    format!(
        "INSERT INTO {table} (group_id, locale, shared, body)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (group_id, locale) DO UPDATE SET {on_conflict}, body = EXCLUDED.body, updated_at = NOW()
         RETURNING {columns}, (xmax = 0) AS inserted",
        table = table.name(),
        columns = ROW_COLUMNS,
    )
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn get(&self, table: Table, id: i64) -> Result<Option<StoredRow>, StoreError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", ROW_COLUMNS, table.name());
        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(map_row)
            .transpose()
    }

    async fn list(&self, table: Table, locale: Option<&str>) -> Result<Vec<StoredRow>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE ($1::TEXT IS NULL OR locale = $1) ORDER BY group_id, id",
            ROW_COLUMNS,
            table.name()
        );
        sqlx::query(&sql)
            .bind(locale)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(map_row)
            .collect()
    }

    async fn list_group(&self, table: Table, group_id: i64) -> Result<Vec<StoredRow>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE group_id = $1 ORDER BY id",
            ROW_COLUMNS,
            table.name()
        );
        sqlx::query(&sql)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(map_row)
            .collect()
    }

    async fn find_in_group(
        &self,
        table: Table,
        group_id: i64,
        locale: &str,
    ) -> Result<Option<StoredRow>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE group_id = $1 AND locale = $2",
            ROW_COLUMNS,
            table.name()
        );
        sqlx::query(&sql)
            .bind(group_id)
            .bind(locale)
            .fetch_optional(&self.pool)
            .await?
            .map(map_row)
            .transpose()
    }

    async fn insert(&self, table: Table, row: NewRow) -> Result<StoredRow, StoreError> {
        let sql = format!(
            "INSERT INTO {} (group_id, locale, shared, body)
             VALUES (COALESCE($1, nextval('content_group_seq')), $2, $3, $4)
             RETURNING {}",
            table.name(),
            ROW_COLUMNS
        );
        let inserted = sqlx::query(&sql)
            .bind(row.group_id)
            .bind(&row.locale)
            .bind(&row.shared)
            .bind(&row.text)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, row.group_id, &row.locale))?;

        map_row(inserted)
    }

    async fn update_with_fanout(
        &self,
        table: Table,
        group_id: i64,
        locale: &str,
        shared: SharedWrite,
        text: Value,
    ) -> Result<Option<FanoutOutcome>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Serializes against translation writes on the same group
        let sql = format!("SELECT id FROM {} WHERE group_id = $1 FOR UPDATE", table.name());
        let locked = sqlx::query(&sql).bind(group_id).fetch_all(&mut *tx).await?;
        if locked.is_empty() {
            tx.rollback().await?;
            return Ok(None);
        }

        let sql = upsert_sql(table, &format!("shared = {}.shared || $5", table.name()));
        let upserted = sqlx::query(&sql)
            .bind(group_id)
            .bind(locale)
            .bind(&shared.full)
            .bind(&text)
            .bind(Value::Object(shared.patch))
            .fetch_one(&mut *tx)
            .await?;
        let created: bool = upserted.try_get("inserted")?;
        let row = map_row(upserted)?;

        let sql = format!(
            "UPDATE {} SET shared = $2, updated_at = NOW() WHERE group_id = $1 AND id <> $3",
            table.name()
        );
        let siblings_updated = sqlx::query(&sql)
            .bind(group_id)
            .bind(&row.shared)
            .bind(row.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

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
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT locale, shared FROM {} WHERE group_id = $1 FOR UPDATE",
            table.name()
        );
        let group = sqlx::query(&sql)
            .bind(write.group_id)
            .fetch_all(&mut *tx)
            .await?;

        let mut canonical = None;
        for row in &group {
            let locale: String = row.try_get("locale")?;
            if locale == write.canonical_locale {
                canonical = Some(row.try_get::<Value, _>("shared")?);
            }
        }

        let shared = match canonical.or(write.fallback_shared) {
            Some(shared) if !group.is_empty() => shared,
            _ => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        let outcome = if write.insert_only {
            let sql = format!(
                "INSERT INTO {} (group_id, locale, shared, body) VALUES ($1, $2, $3, $4) RETURNING {}",
                table.name(),
                ROW_COLUMNS
            );
            let inserted = sqlx::query(&sql)
                .bind(write.group_id)
                .bind(&write.locale)
                .bind(&shared)
                .bind(&write.text)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_insert_error(e, Some(write.group_id), &write.locale))?;
            TranslationOutcome {
                row: map_row(inserted)?,
                created: true,
            }
        } else {
            let sql = upsert_sql(table, "shared = EXCLUDED.shared");
            let upserted = sqlx::query(&sql)
                .bind(write.group_id)
                .bind(&write.locale)
                .bind(&shared)
                .bind(&write.text)
                .fetch_one(&mut *tx)
                .await?;
            let created: bool = upserted.try_get("inserted")?;
            TranslationOutcome {
                row: map_row(upserted)?,
                created,
            }
        };

        tx.commit().await?;
        Ok(Some(outcome))
    }

    async fn delete_group(&self, table: Table, group_id: i64) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {} WHERE group_id = $1", table.name());
        let removed = sqlx::query(&sql)
            .bind(group_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(removed)
    }

    async fn page_override(&self, slug: &str, locale: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT content FROM page_overrides WHERE slug = $1 AND locale = $2")
            .bind(slug)
            .bind(locale)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.try_get::<Value, _>("content")).transpose()?)
    }

    async fn put_page_override(&self, slug: &str, locale: &str, content: Value) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO page_overrides (slug, locale, content, updated_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (slug, locale) DO UPDATE SET content = EXCLUDED.content, updated_at = NOW()",
        )
        .bind(slug)
        .bind(locale)
        .bind(&content)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
