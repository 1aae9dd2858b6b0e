use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use super::datastore::{Filter, TaskDataStore};
use super::error::DataStoreError;
use crate::model::{Task, TaskPatch};

/// In-memory backend for development and tests. A Vec keeps the
/// store-insertion order the list operation promises.
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskDataStore for MemoryTaskStore {
    async fn insert(&self, task: Task) -> Result<Task, DataStoreError> {
        let mut tasks = self.tasks.lock().unwrap();
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(DataStoreError::Conflict(task.id));
        }
        tasks.push(task.clone());
        Ok(task)
    }

    async fn fetch(&self, id: &Uuid) -> Result<Option<Task>, DataStoreError> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.iter().find(|t| t.id == *id).cloned())
    }

    async fn items(&self, filter: &Filter) -> Result<Vec<Task>, DataStoreError> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn update(&self, id: &Uuid, patch: TaskPatch) -> Result<Option<Task>, DataStoreError> {
        let mut tasks = self.tasks.lock().unwrap();
        match tasks.iter_mut().find(|t| t.id == *id) {
            Some(task) => {
                task.apply(patch);
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, id: &Uuid) -> Result<bool, DataStoreError> {
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != *id);
        Ok(tasks.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    #[tokio::test]
    async fn test_insert_and_fetch() {
        // GIVEN
        let store = MemoryTaskStore::new();
        let task = Task::new("task".to_string(), None, Status::Pending);

        // WHEN
        let stored = store.insert(task.clone()).await.unwrap();

        // THEN
        assert_eq!(stored, task);
        assert_eq!(store.fetch(&task.id).await.unwrap(), Some(task.clone()));

        // re-inserting the same id is a conflict
        let res = store.insert(task).await.unwrap_err();
        assert!(matches!(res, DataStoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_items_filter_and_order() {
        // GIVEN
        let store = MemoryTaskStore::new();
        let task_a = Task::new("Buy groceries".to_string(), None, Status::Pending);
        let mut task_b = Task::new("File groceries receipt".to_string(), None, Status::Pending);
        task_b.status = Status::Completed;
        let task_c = Task::new("Walk the dog".to_string(), None, Status::Pending);
        store.insert(task_a.clone()).await.unwrap();
        store.insert(task_b.clone()).await.unwrap();
        store.insert(task_c.clone()).await.unwrap();

        // WHEN / THEN: empty filter yields everything in insertion order
        let all = store.items(&Filter::default()).await.unwrap();
        assert_eq!(
            all.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![task_a.id, task_b.id, task_c.id]
        );

        // keyword is case-insensitive
        let groceries = store.items(&Filter::with_keyword("GROCERIES")).await.unwrap();
        assert_eq!(groceries.len(), 2);

        // status equality
        let completed = store
            .items(&Filter::with_status(Status::Completed))
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, task_b.id);

        // AND of both criteria
        let both = store
            .items(&Filter {
                keyword: Some("groceries".to_string()),
                status: Some(Status::Completed),
            })
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].id, task_b.id);
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        // GIVEN
        let store = MemoryTaskStore::new();
        let task = Task::new(
            "task".to_string(),
            Some("details".to_string()),
            Status::Pending,
        );
        store.insert(task.clone()).await.unwrap();

        // WHEN
        let updated = store
            .update(&task.id, TaskPatch::status_only(Status::InProgress))
            .await
            .unwrap()
            .unwrap();

        // THEN
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.title, task.title);
        assert_eq!(updated.description, task.description);
        assert!(updated.updated_at >= task.updated_at);

        // unknown id reports back as None
        let missing = store
            .update(&Uuid::new_v4(), TaskPatch::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryTaskStore::new();
        let task = Task::new("task".to_string(), None, Status::Pending);
        store.insert(task.clone()).await.unwrap();

        assert!(store.remove(&task.id).await.unwrap());
        assert_eq!(store.fetch(&task.id).await.unwrap(), None);
        // re-delete is not a no-op success
        assert!(!store.remove(&task.id).await.unwrap());
    }
}
