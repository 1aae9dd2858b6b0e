use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use super::datastore::{Filter, TaskDataStore};
use super::error::DataStoreError;
use crate::model::{Status, Task, TaskPatch};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// Durable backend: one row per task document, keyed by UUID, RFC 3339
/// timestamps. Every operation is a single statement, which is all the
/// atomicity the service relies on.
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    pub async fn connect(url: &str) -> Result<Self, DataStoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(DataStoreError::from)?
            .create_if_missing(true);

        // an in-memory database exists per connection, so the pool must not
        // fan out over several of them
        let mut pool_options = SqlitePoolOptions::new();
        if url.contains(":memory:") {
            pool_options = pool_options.max_connections(1);
        }

        let pool = pool_options.connect_with(options).await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        info!(url, "Connected to task storage.");
        Ok(Self { pool })
    }
}

fn task_from_row(row: &SqliteRow) -> Result<Task, DataStoreError> {
    let id: String = row.try_get("id")?;
    let title: String = row.try_get("title")?;
    let description: Option<String> = row.try_get("description")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Task {
        id: Uuid::parse_str(&id).map_err(|err| DataStoreError::Storage(err.to_string()))?,
        title,
        description,
        status: status
            .parse::<Status>()
            .map_err(|err| DataStoreError::Storage(err.to_string()))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DataStoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| DataStoreError::Storage(err.to_string()))
}

#[async_trait]
impl TaskDataStore for SqliteTaskStore {
    async fn insert(&self, task: Task) -> Result<Task, DataStoreError> {
        let result = sqlx::query(
            "INSERT INTO tasks (id, title, description, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(task.id.to_string())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.created_at.to_rfc3339())
        .bind(task.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(task),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(DataStoreError::Conflict(task.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn fetch(&self, id: &Uuid) -> Result<Option<Task>, DataStoreError> {
        let row = sqlx::query(
            "SELECT id, title, description, status, created_at, updated_at
             FROM tasks WHERE id = ?1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(task_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn items(&self, filter: &Filter) -> Result<Vec<Task>, DataStoreError> {
        let rows = sqlx::query(
            "SELECT id, title, description, status, created_at, updated_at
             FROM tasks
             WHERE (?1 IS NULL OR instr(lower(title), lower(?1)) > 0)
               AND (?2 IS NULL OR status = ?2)
             ORDER BY rowid",
        )
        .bind(&filter.keyword)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(task_from_row).collect()
    }

    async fn update(&self, id: &Uuid, patch: TaskPatch) -> Result<Option<Task>, DataStoreError> {
        let result = sqlx::query(
            "UPDATE tasks
             SET title = COALESCE(?1, title),
                 description = COALESCE(?2, description),
                 status = COALESCE(?3, status),
                 updated_at = ?4
             WHERE id = ?5",
        )
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(id).await
    }

    async fn remove(&self, id: &Uuid) -> Result<bool, DataStoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
