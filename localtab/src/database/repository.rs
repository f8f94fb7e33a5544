//! Repository layer for database operations
//!
//! The storage gateway: generic get/put/delete over named collections.
//! Every value is stored as JSON in a `(key, value)` table. There is no
//! query language here; filtering and ordering belong to the services.
//! Each call runs in its own transaction scoped to one collection.

use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

/// Logical collections of the local database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Singleton settings under fixed keys
    System,
    Category,
    Link,
    /// Reserved for link groups
    LinkGroup,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::System,
        Collection::Category,
        Collection::Link,
        Collection::LinkGroup,
    ];

    /// Backing table name
    pub fn table(self) -> &'static str {
        match self {
            Collection::System => "system",
            Collection::Category => "category",
            Collection::Link => "link",
            Collection::LinkGroup => "link_group",
        }
    }
}

/// A value that carries its own primary key
pub trait Record {
    fn key(&self) -> &str;
}

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert a record keyed by its own identity
    pub async fn put<T>(&self, collection: Collection, record: &T) -> Result<()>
    where
        T: Record + Serialize,
    {
        self.put_with_key(collection, record.key(), record).await
    }

    /// Upsert an arbitrary value under an explicit key
    pub async fn put_with_key<T>(&self, collection: Collection, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value)?;

        sqlx::query(&upsert_sql(collection))
            .bind(key)
            .bind(&json)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Put {}[{}]", collection.table(), key);
        Ok(())
    }

    /// Upsert several records in a single transaction
    pub async fn put_many<T>(&self, collection: Collection, records: &[T]) -> Result<()>
    where
        T: Record + Serialize,
    {
        if records.is_empty() {
            return Ok(());
        }

        let sql = upsert_sql(collection);
        let mut tx = self.pool.begin().await?;

        for record in records {
            let json = serde_json::to_string(record)?;
            sqlx::query(&sql)
                .bind(record.key())
                .bind(&json)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!("Put {} records into {}", records.len(), collection.table());
        Ok(())
    }

    /// Point lookup; a missing key is `None`, not an error
    pub async fn get<T>(&self, collection: Collection, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let sql = format!("SELECT value FROM {} WHERE key = ?", collection.table());
        let value: Option<String> = sqlx::query_scalar(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        value
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(AppError::from)
    }

    /// Full scan in whatever order SQLite returns rows
    pub async fn get_all<T>(&self, collection: Collection) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let sql = format!("SELECT value FROM {}", collection.table());
        let values: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;

        values
            .iter()
            .map(|json| serde_json::from_str(json).map_err(AppError::from))
            .collect()
    }

    /// Batch point lookup; keys without a record are skipped
    pub async fn get_many<T>(&self, collection: Collection, keys: &[String]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("SELECT value FROM {} WHERE key = ?", collection.table());
        let mut tx = self.pool.begin().await?;
        let mut results = Vec::with_capacity(keys.len());

        for key in keys {
            let value: Option<String> = sqlx::query_scalar(&sql)
                .bind(key)
                .fetch_optional(&mut *tx)
                .await?;
            if let Some(json) = value {
                results.push(serde_json::from_str(&json)?);
            }
        }

        tx.commit().await?;
        Ok(results)
    }

    /// Number of records in a collection
    pub async fn count(&self, collection: Collection) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", collection.table());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count as usize)
    }

    /// Remove a record; removing a missing key is fine
    pub async fn delete(&self, collection: Collection, key: &str) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE key = ?", collection.table());
        sqlx::query(&sql).bind(key).execute(&self.pool).await?;

        tracing::debug!("Deleted {}[{}]", collection.table(), key);
        Ok(())
    }

    /// Remove several records in a single transaction
    pub async fn delete_many(&self, collection: Collection, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let sql = format!("DELETE FROM {} WHERE key = ?", collection.table());
        let mut tx = self.pool.begin().await?;

        for key in keys {
            sqlx::query(&sql).bind(key).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::debug!("Deleted {} records from {}", keys.len(), collection.table());
        Ok(())
    }

    /// Empty one collection
    pub async fn clear(&self, collection: Collection) -> Result<()> {
        let sql = format!("DELETE FROM {}", collection.table());
        sqlx::query(&sql).execute(&self.pool).await?;

        tracing::debug!("Cleared {}", collection.table());
        Ok(())
    }

    /// Empty every collection, one transaction per collection
    pub async fn clear_all(&self) -> Result<()> {
        for collection in Collection::ALL {
            self.clear(collection).await?;
        }
        Ok(())
    }
}

fn upsert_sql(collection: Collection) -> String {
    format!(
        "INSERT INTO {} (key, value) VALUES (?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        collection.table()
    )
}
