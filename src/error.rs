use rmcp::ErrorData as RpcError;

use thiserror::Error;
use tokio::io;

pub type ServiceResult<T> = core::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to generate productivity tool: {0}")]
    Generation(String),
    #[error("Request text is empty")]
    EmptyRequest,
    #[error("A turn is already in progress")]
    TurnInProgress,
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("{0}")]
    RpcError(#[from] RpcError),
    #[error("{0}")]
    IoError(#[from] io::Error),
    #[error("{0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

impl From<ServiceError> for RpcError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::RpcError(inner) => inner,
            ServiceError::EmptyRequest | ServiceError::InvalidSettings(_) => {
                RpcError::invalid_params(err.to_string(), None)
            }
            other => RpcError::internal_error(other.to_string(), None),
        }
    }
}
