use thiserror::*;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("the item exists {0}")]
    Conflict(Uuid),

    #[error("the item not found {0}")]
    NotFound(Uuid),

    #[error("storage returned error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for DataStoreError {
    fn from(err: sqlx::Error) -> Self {
        DataStoreError::Storage(err.to_string())
    }
}
