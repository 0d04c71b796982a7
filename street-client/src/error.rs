use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Unexpected response status: {0}")]
    Status(u16),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid login token: {0}")]
    InvalidToken(String),
}

impl ClientError {
    /// Map a non-success status to the error the session logic branches on.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 => ClientError::Unauthorized,
            503 => ClientError::ServiceUnavailable,
            other => ClientError::Status(other),
        }
    }
}
