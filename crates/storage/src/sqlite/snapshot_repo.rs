use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::repository::{SNAPSHOT_KEY, SnapshotRecord, SnapshotStore, StorageError};

use super::SqliteRepository;

#[async_trait]
impl SnapshotStore for SqliteRepository {
    async fn load(&self) -> Result<Option<SnapshotRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT value
            FROM session_snapshots
            WHERE key = ?1
            ",
        )
        .bind(SNAPSHOT_KEY)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        serde_json::from_str(&value)
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save(
        &self,
        record: &SnapshotRecord,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let value = serde_json::to_string(record)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO session_snapshots (key, value, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                saved_at = excluded.saved_at
            ",
        )
        .bind(SNAPSHOT_KEY)
        .bind(value)
        .bind(saved_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query(
            r"
            DELETE FROM session_snapshots
            WHERE key = ?1
            ",
        )
        .bind(SNAPSHOT_KEY)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
