use crate::models::{Street, User};
use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Unexpected(anyhow::Error::new(err))
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        StoreError::Unexpected(anyhow::Error::new(err))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(anyhow::anyhow!(what)),
            StoreError::Unexpected(err) => {
                tracing::error!(error = %err, "Store operation failed");
                AppError::DatabaseError(err)
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for streets, users and the namespaced-id counters.
#[async_trait]
pub trait StreetStore: Send + Sync {
    async fn find_street(&self, id: &str) -> StoreResult<Option<Street>>;
    async fn insert_street(&self, street: &Street) -> StoreResult<()>;
    /// Overwrite an existing street. Fails with `NotFound` if it vanished.
    async fn replace_street(&self, street: &Street) -> StoreResult<()>;
    /// Look up a street inside a namespace: a creator's, or the anonymous one
    /// when `creator_id` is `None`.
    async fn find_street_by_namespaced_id(
        &self,
        creator_id: Option<&str>,
        namespaced_id: i64,
    ) -> StoreResult<Option<Street>>;
    async fn count_active_streets(&self) -> StoreResult<u64>;
    /// Active streets, most recently updated first.
    async fn list_active_streets(&self, start: u64, count: u64) -> StoreResult<Vec<Street>>;

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_login_token(&self, token: &str) -> StoreResult<Option<User>>;
    /// Returns whether the token was present.
    async fn remove_login_token(&self, user_id: &str, token: &str) -> StoreResult<bool>;

    /// Atomically increment and return the user's street counter, creating
    /// the user record if needed.
    async fn next_user_street_id(&self, user_id: &str) -> StoreResult<i64>;
    /// Atomically increment and return the anonymous street counter.
    async fn next_global_street_id(&self) -> StoreResult<i64>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
