use async_trait::async_trait;
use uuid::Uuid;

use super::error::DataStoreError;
use crate::model::{Status, Task, TaskPatch};

/// Store interface. The store is the source of truth: it assigns nothing
/// itself (ids and timestamps come with the task) but guarantees unique ids
/// and single-document atomic updates.
#[async_trait]
pub trait TaskDataStore: Send + Sync + 'static {
    async fn insert(&self, task: Task) -> Result<Task, DataStoreError>;
    async fn fetch(&self, id: &Uuid) -> Result<Option<Task>, DataStoreError>;
    async fn items(&self, filter: &Filter) -> Result<Vec<Task>, DataStoreError>;
    async fn update(&self, id: &Uuid, patch: TaskPatch) -> Result<Option<Task>, DataStoreError>;
    async fn remove(&self, id: &Uuid) -> Result<bool, DataStoreError>;
}

/// Narrows a list query: keyword substring on the title (case-insensitive)
/// AND status equality. Empty filter yields all tasks in insertion order.
#[derive(Debug, Default, Clone)]
pub struct Filter {
    pub keyword: Option<String>,
    pub status: Option<Status>,
}

impl Filter {
    pub fn with_status(status: Status) -> Self {
        Self {
            keyword: None,
            status: Some(status),
        }
    }

    pub fn with_keyword(keyword: &str) -> Self {
        Self {
            keyword: Some(keyword.to_string()),
            status: None,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(keyword) = &self.keyword {
            if !task
                .title
                .to_lowercase()
                .contains(&keyword.to_lowercase())
            {
                return false;
            }
        }
        match self.status {
            Some(status) => task.status == status,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    #[test]
    fn test_filter_matches() {
        let mut task = Task::new("Ship the Foo report".to_string(), None, Status::Pending);

        assert!(Filter::default().matches(&task));
        assert!(Filter::with_keyword("foo").matches(&task));
        assert!(Filter::with_keyword("FOO").matches(&task));
        assert!(!Filter::with_keyword("bar").matches(&task));
        assert!(Filter::with_status(Status::Pending).matches(&task));
        assert!(!Filter::with_status(Status::Completed).matches(&task));

        // both criteria are AND-ed
        task.status = Status::Completed;
        let filter = Filter {
            keyword: Some("foo".to_string()),
            status: Some(Status::Pending),
        };
        assert!(!filter.matches(&task));
    }
}
