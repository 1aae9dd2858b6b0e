use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use super::error::ServiceError;
use crate::datastore::{Filter, TaskDataStore};
use crate::model::{Task, TaskDraft, TaskPatch};

/// The five operations over the task store. Translates store errors into
/// the service taxonomy; the HTTP layer maps that onto status codes.
pub struct TaskService<D> {
    store: Arc<D>,
}

impl<D> Clone for TaskService<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<D> TaskService<D>
where
    D: TaskDataStore,
{
    pub fn new(store: Arc<D>) -> Self {
        Self { store }
    }

    /// Persists a new task. Title must be present and non-empty; status
    /// defaults to pending.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, ServiceError> {
        let title = validate_title(draft.title)?;
        let task = Task::new(title, draft.description, draft.status.unwrap_or_default());

        let stored = self.store.insert(task).await.map_err(|err| {
            error!(reason = %err, "Unable to persist task.");
            ServiceError::from(err)
        })?;
        info!(id = %stored.id, "Task created.");
        Ok(stored)
    }

    pub async fn list(&self, filter: &Filter) -> Result<Vec<Task>, ServiceError> {
        Ok(self.store.items(filter).await?)
    }

    pub async fn get(&self, id: &Uuid) -> Result<Task, ServiceError> {
        self.store
            .fetch(id)
            .await?
            .ok_or(ServiceError::NotFound(*id))
    }

    /// Applies the provided fields only; the store refreshes the
    /// modification timestamp.
    pub async fn update(&self, id: &Uuid, patch: TaskPatch) -> Result<Task, ServiceError> {
        let patch = TaskPatch {
            title: patch.title.map(validate_title_value).transpose()?,
            description: patch.description,
            status: patch.status,
        };
        let updated = self
            .store
            .update(id, patch)
            .await?
            .ok_or(ServiceError::NotFound(*id))?;
        info!(id = %updated.id, "Task updated.");
        Ok(updated)
    }

    /// Removes the task. Deleting an already deleted id reports NotFound,
    /// not a no-op success.
    pub async fn delete(&self, id: &Uuid) -> Result<(), ServiceError> {
        if !self.store.remove(id).await? {
            return Err(ServiceError::NotFound(*id));
        }
        info!(id = %id, "Task deleted.");
        Ok(())
    }
}

fn validate_title(title: Option<String>) -> Result<String, ServiceError> {
    match title {
        Some(title) => validate_title_value(title),
        None => Err(ServiceError::Validation("title is required".to_string())),
    }
}

fn validate_title_value(title: String) -> Result<String, ServiceError> {
    if title.trim().is_empty() {
        return Err(ServiceError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    Ok(title)
}
