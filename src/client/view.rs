use tracing::{error, info};
use uuid::Uuid;

use super::http::TaskClient;
use crate::model::{Status, Task, TaskDraft, TaskPatch};

/// Client-side view state: a mirror of the last successful list response,
/// the filter fields, and the create-form inputs. Every mutation goes
/// through the API and the mirror is re-fetched afterwards, never patched
/// optimistically.
///
/// On any failure the error is logged, the displayed list stays as it was
/// and the loading flag stays raised, which is all the surface a failure
/// gets.
pub struct TaskView {
    client: TaskClient,
    tasks: Vec<Task>,
    keyword: String,
    status: Option<Status>,
    title_input: String,
    description_input: String,
    loading: bool,
}

impl TaskView {
    pub fn new(client: TaskClient) -> Self {
        Self {
            client,
            tasks: Vec::new(),
            keyword: String::new(),
            status: None,
            title_input: String::new(),
            description_input: String::new(),
            loading: false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn set_title_input(&mut self, title: &str) {
        self.title_input = title.to_string();
    }

    pub fn set_description_input(&mut self, description: &str) {
        self.description_input = description.to_string();
    }

    /// Re-issues the list query with the current filter.
    pub async fn refresh(&mut self) {
        self.loading = true;
        let keyword = if self.keyword.is_empty() {
            None
        } else {
            Some(self.keyword.as_str())
        };
        match self.client.list(keyword, self.status).await {
            Ok(tasks) => {
                self.tasks = tasks;
                self.loading = false;
            }
            Err(err) => {
                error!(reason = %err, "Unable to refresh task list.");
            }
        }
    }

    pub async fn set_keyword(&mut self, keyword: &str) {
        self.keyword = keyword.to_string();
        self.refresh().await;
    }

    pub async fn set_status(&mut self, status: Option<Status>) {
        self.status = status;
        self.refresh().await;
    }

    /// Creates a task from the form inputs. The inputs are cleared only
    /// after the round trip succeeded.
    pub async fn submit(&mut self) {
        self.loading = true;
        let draft = TaskDraft {
            title: Some(self.title_input.clone()),
            description: if self.description_input.is_empty() {
                None
            } else {
                Some(self.description_input.clone())
            },
            status: None,
        };
        match self.client.create(&draft).await {
            Ok(task) => {
                info!(id = %task.id, "Task created.");
                self.title_input.clear();
                self.description_input.clear();
                self.refresh().await;
            }
            Err(err) => {
                error!(reason = %err, "Unable to create task.");
            }
        }
    }

    pub async fn set_task_status(&mut self, id: &Uuid, status: Status) {
        self.loading = true;
        match self
            .client
            .update(id, &TaskPatch::status_only(status))
            .await
        {
            Ok(_) => self.refresh().await,
            Err(err) => {
                error!(reason = %err, id = %id, "Unable to update task.");
            }
        }
    }

    pub async fn edit(&mut self, id: &Uuid, patch: TaskPatch) {
        self.loading = true;
        match self.client.update(id, &patch).await {
            Ok(_) => self.refresh().await,
            Err(err) => {
                error!(reason = %err, id = %id, "Unable to update task.");
            }
        }
    }

    pub async fn remove(&mut self, id: &Uuid) {
        self.loading = true;
        match self.client.delete(id).await {
            Ok(()) => self.refresh().await,
            Err(err) => {
                error!(reason = %err, id = %id, "Unable to delete task.");
            }
        }
    }
}
