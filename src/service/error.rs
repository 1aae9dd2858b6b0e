use thiserror::Error;
use uuid::Uuid;

use crate::datastore::DataStoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("task not found {0}")]
    NotFound(Uuid),

    #[error("store failure: {0}")]
    Store(String),
}

impl From<DataStoreError> for ServiceError {
    fn from(err: DataStoreError) -> Self {
        match err {
            DataStoreError::NotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::Store(other.to_string()),
        }
    }
}
