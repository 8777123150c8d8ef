//! PostgreSQL implementation of EntryRepository.
//!
//! All four collections share one `entry` table: a UUID primary key, a
//! collection discriminator, and the flat field map as JSONB. Updates merge
//! the provided keys into the stored map with the `||` operator, which gives
//! field-level replace semantics without a read-modify-write cycle.

use async_trait::async_trait;
use larder_core::{strip_id, Collection, Entry, EntryRepository, Error, FieldMap, Result};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

pub struct PgEntryRepository {
    pool: Pool<Postgres>,
}

impl PgEntryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &sqlx::postgres::PgRow) -> Entry {
        let fields = row
            .try_get::<serde_json::Value, _>("fields")
            .ok()
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default();
        Entry {
            id: row.get("id"),
            fields,
        }
    }
}

#[async_trait]
impl EntryRepository for PgEntryRepository {
    async fn list(&self, collection: Collection) -> Result<Vec<Entry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, fields
            FROM entry
            WHERE collection = $1
            ORDER BY id
            "#,
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::row_to_entry).collect())
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Entry>> {
        let row = sqlx::query(
            r#"
            SELECT id, fields
            FROM entry
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::row_to_entry))
    }

    async fn insert(&self, collection: Collection, mut fields: FieldMap) -> Result<Uuid> {
        strip_id(&mut fields);
        // UUIDv7: ids sort by insertion time, so ORDER BY id is store order.
        let id = Uuid::now_v7();

        sqlx::query(
            r#"
            INSERT INTO entry (id, collection, fields)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(collection.as_str())
        .bind(serde_json::Value::Object(fields))
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn update(&self, collection: Collection, id: Uuid, mut fields: FieldMap) -> Result<()> {
        strip_id(&mut fields);

        let result = sqlx::query(
            r#"
            UPDATE entry
            SET fields = fields || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(serde_json::Value::Object(fields))
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::EntryNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM entry WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::EntryNotFound(id));
        }
        Ok(())
    }

    async fn insert_many(&self, collection: Collection, items: Vec<FieldMap>) -> Result<Vec<Uuid>> {
        // Per-document atomicity, matching the store's native batch insert:
        // no transaction spans the batch.
        let mut ids = Vec::with_capacity(items.len());
        for fields in items {
            ids.push(self.insert(collection, fields).await?);
        }
        Ok(ids)
    }
}
