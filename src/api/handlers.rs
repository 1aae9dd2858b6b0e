use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http::HeaderMap;
use serde_derive::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::datastore::{Filter, TaskDataStore};
use crate::model::{CorrelationId, Task, TaskDraft, TaskPatch};
use crate::service::{ServiceError, TaskService};

pub fn router<D>(service: TaskService<D>) -> Router
where
    D: TaskDataStore,
{
    Router::new()
        .route("/", get(handle_health))
        .route("/api/tasks", get(list_tasks::<D>).post(create_task::<D>))
        .route(
            "/api/tasks/:id",
            get(get_task::<D>)
                .put(update_task::<D>)
                .delete(delete_task::<D>),
        )
        .with_state(service)
}

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Internal {
        message: &'static str,
        reason: String,
    },
}

impl ApiError {
    /// Not-found keeps its own status code; everything else collapses to
    /// 500 with an operation-specific message and no granular codes.
    fn from_service(err: ServiceError, message: &'static str) -> Self {
        match err {
            ServiceError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Internal {
                message,
                reason: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Task not found" })),
            )
                .into_response(),
            ApiError::Internal { message, reason } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": message, "error": reason })),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub keyword: Option<String>,
    pub status: Option<String>,
}

pub async fn handle_health() -> &'static str {
    "API is working"
}

pub async fn create_task<D: TaskDataStore>(
    State(service): State<TaskService<D>>,
    headers: HeaderMap,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    log_request(&headers, "create");
    let task = service
        .create(draft)
        .await
        .map_err(|err| ApiError::from_service(err, "Error creating task"))?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Task created successfully", "data": task })),
    ))
}

pub async fn list_tasks<D: TaskDataStore>(
    State(service): State<TaskService<D>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    log_request(&headers, "list");
    let mut filter = Filter {
        keyword: query.keyword.filter(|k| !k.is_empty()),
        status: None,
    };
    if let Some(status) = query.status.filter(|s| !s.is_empty()) {
        match status.parse() {
            Ok(parsed) => filter.status = Some(parsed),
            Err(_) => {
                // no stored task carries an unknown status value
                debug!(status = %status, "Status filter matches nothing.");
                return Ok(Json(Vec::new()));
            }
        }
    }
    let tasks = service
        .list(&filter)
        .await
        .map_err(|err| ApiError::from_service(err, "Error fetching tasks"))?;
    Ok(Json(tasks))
}

pub async fn get_task<D: TaskDataStore>(
    State(service): State<TaskService<D>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    log_request(&headers, "get");
    let id = parse_id(&id, "Error fetching task")?;
    let task = service
        .get(&id)
        .await
        .map_err(|err| ApiError::from_service(err, "Error fetching task"))?;
    Ok(Json(task))
}

pub async fn update_task<D: TaskDataStore>(
    State(service): State<TaskService<D>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Value>, ApiError> {
    log_request(&headers, "update");
    let id = parse_id(&id, "Error updating task")?;
    let task = service
        .update(&id, patch)
        .await
        .map_err(|err| ApiError::from_service(err, "Error updating task"))?;
    Ok(Json(
        json!({ "message": "Task updated successfully", "data": task }),
    ))
}

pub async fn delete_task<D: TaskDataStore>(
    State(service): State<TaskService<D>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    log_request(&headers, "delete");
    let id = parse_id(&id, "Error deleting task")?;
    service
        .delete(&id)
        .await
        .map_err(|err| ApiError::from_service(err, "Error deleting task"))?;
    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

/// A malformed id never reaches the store; it reports on the same 500 path
/// the store's own id-cast failure used to.
fn parse_id(id: &str, message: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|err| ApiError::Internal {
        message,
        reason: err.to_string(),
    })
}

fn log_request(headers: &HeaderMap, operation: &'static str) {
    match CorrelationId::from_header_map(headers) {
        Ok(cid) => info!(correlation_id = %cid, operation, "Request received."),
        Err(_) => info!(operation, "Request received."),
    }
}
