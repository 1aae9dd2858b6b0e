use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::model::{CorrelationId, Status, Task, TaskDraft, TaskPatch};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Status { status: 404, .. })
    }
}

#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    message: String,
    data: Task,
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    message: String,
}

/// Typed client for the task API. Every request carries a fresh
/// correlation-id header so client and server logs line up.
pub struct TaskClient {
    base_url: String,
    http: reqwest::Client,
}

impl TaskClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()?,
        })
    }

    pub async fn create(&self, draft: &TaskDraft) -> Result<Task, ClientError> {
        let url = format!("{}/api/tasks", self.base_url);
        let response = self
            .http
            .post(url)
            .headers(request_headers())
            .json(draft)
            .send()
            .await?;
        let envelope: TaskEnvelope = parse(response).await?;
        debug!(message = %envelope.message, id = %envelope.data.id, "create acknowledged");
        Ok(envelope.data)
    }

    pub async fn list(
        &self,
        keyword: Option<&str>,
        status: Option<Status>,
    ) -> Result<Vec<Task>, ClientError> {
        let url = format!("{}/api/tasks", self.base_url);
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(keyword) = keyword {
            query.push(("keyword", keyword.to_string()));
        }
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        let response = self
            .http
            .get(url)
            .headers(request_headers())
            .query(&query)
            .send()
            .await?;
        parse(response).await
    }

    pub async fn get(&self, id: &Uuid) -> Result<Task, ClientError> {
        let url = format!("{}/api/tasks/{}", self.base_url, id);
        let response = self.http.get(url).headers(request_headers()).send().await?;
        parse(response).await
    }

    pub async fn update(&self, id: &Uuid, patch: &TaskPatch) -> Result<Task, ClientError> {
        let url = format!("{}/api/tasks/{}", self.base_url, id);
        let response = self
            .http
            .put(url)
            .headers(request_headers())
            .json(patch)
            .send()
            .await?;
        let envelope: TaskEnvelope = parse(response).await?;
        debug!(message = %envelope.message, id = %envelope.data.id, "update acknowledged");
        Ok(envelope.data)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), ClientError> {
        let url = format!("{}/api/tasks/{}", self.base_url, id);
        let response = self
            .http
            .delete(url)
            .headers(request_headers())
            .send()
            .await?;
        let envelope: MessageEnvelope = parse(response).await?;
        debug!(message = %envelope.message, id = %id, "delete acknowledged");
        Ok(())
    }
}

fn request_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    let cid = CorrelationId::from(Uuid::new_v4());
    // a hyphenated uuid is always a valid header value
    let _ = cid.insert_into_header_map(&mut headers);
    headers
}

async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    if response.status().is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{DELETE, GET, POST, PUT};
    use httpmock::MockServer;
    use serde_json::json;

    fn sample_task() -> Task {
        Task::new(
            "write report".to_string(),
            Some("quarterly numbers".to_string()),
            Status::Pending,
        )
    }

    #[tokio::test]
    async fn test_list_sends_filters() {
        // GIVEN
        let server = MockServer::start_async().await;
        let task = sample_task();
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/tasks")
                    .query_param("keyword", "foo")
                    .query_param("status", "pending")
                    .header_exists(CorrelationId::HEADER_NAME);
                then.status(200)
                    .header("content-type", "application/json")
                    .body(json!([task]).to_string());
            })
            .await;
        let client = TaskClient::new(&server.base_url()).unwrap();

        // WHEN
        let tasks = client.list(Some("foo"), Some(Status::Pending)).await.unwrap();

        // THEN
        mock.assert_async().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, task.id);
    }

    #[tokio::test]
    async fn test_create_unwraps_envelope() {
        // GIVEN
        let server = MockServer::start_async().await;
        let task = sample_task();
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/tasks");
                then.status(201)
                    .header("content-type", "application/json")
                    .body(
                        json!({ "message": "Task created successfully", "data": task })
                            .to_string(),
                    );
            })
            .await;
        let client = TaskClient::new(&server.base_url()).unwrap();

        // WHEN
        let created = client
            .create(&TaskDraft {
                title: Some("write report".to_string()),
                description: None,
                status: None,
            })
            .await
            .unwrap();

        // THEN
        assert_eq!(created.id, task.id);
        assert_eq!(created.title, task.title);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        // GIVEN
        let server = MockServer::start_async().await;
        let mut task = sample_task();
        task.status = Status::Completed;
        let update = server
            .mock_async(|when, then| {
                when.method(PUT).path(format!("/api/tasks/{}", task.id));
                then.status(200)
                    .header("content-type", "application/json")
                    .body(
                        json!({ "message": "Task updated successfully", "data": task })
                            .to_string(),
                    );
            })
            .await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path(format!("/api/tasks/{}", task.id));
                then.status(200)
                    .header("content-type", "application/json")
                    .body(json!({ "message": "Task deleted successfully" }).to_string());
            })
            .await;
        let client = TaskClient::new(&server.base_url()).unwrap();

        // WHEN / THEN
        let updated = client
            .update(&task.id, &TaskPatch::status_only(Status::Completed))
            .await
            .unwrap();
        assert_eq!(updated.status, Status::Completed);
        update.assert_async().await;

        client.delete(&task.id).await.unwrap();
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found() {
        // GIVEN
        let server = MockServer::start_async().await;
        let id = Uuid::new_v4();
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/tasks/{}", id));
                then.status(404)
                    .header("content-type", "application/json")
                    .body(json!({ "message": "Task not found" }).to_string());
            })
            .await;
        let client = TaskClient::new(&server.base_url()).unwrap();

        // WHEN
        let err = client.get(&id).await.unwrap_err();

        // THEN
        assert!(err.is_not_found());
    }
}
