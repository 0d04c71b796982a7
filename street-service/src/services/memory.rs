//! In-memory implementation of the street store.
//!
//! Used for local development and the integration tests. Nothing is durable:
//! all state is lost when the process exits. Mutations take a write lock on
//! the map they touch, which is what makes the namespaced-id counters atomic
//! within one process.
use crate::models::{Street, User};
use crate::services::store::{StoreError, StoreResult, StreetStore};
use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryStore {
    streets: Arc<RwLock<HashMap<String, Street>>>,
    users: Arc<RwLock<HashMap<String, User>>>,
    /// Counter for streets without a creator.
    street_sequence: Arc<RwLock<i64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user. There is no HTTP route that creates users.
    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl StreetStore for InMemoryStore {
    async fn find_street(&self, id: &str) -> StoreResult<Option<Street>> {
        Ok(self.streets.read().await.get(id).cloned())
    }

    async fn insert_street(&self, street: &Street) -> StoreResult<()> {
        self.streets
            .write()
            .await
            .insert(street.id.clone(), street.clone());
        Ok(())
    }

    async fn replace_street(&self, street: &Street) -> StoreResult<()> {
        let mut streets = self.streets.write().await;
        match streets.get_mut(&street.id) {
            Some(existing) => {
                *existing = street.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("street {}", street.id))),
        }
    }

    async fn find_street_by_namespaced_id(
        &self,
        creator_id: Option<&str>,
        namespaced_id: i64,
    ) -> StoreResult<Option<Street>> {
        Ok(self
            .streets
            .read()
            .await
            .values()
            .find(|s| s.namespaced_id == namespaced_id && s.creator_id.as_deref() == creator_id)
            .cloned())
    }

    async fn count_active_streets(&self) -> StoreResult<u64> {
        Ok(self
            .streets
            .read()
            .await
            .values()
            .filter(|s| !s.is_deleted())
            .count() as u64)
    }

    async fn list_active_streets(&self, start: u64, count: u64) -> StoreResult<Vec<Street>> {
        let streets = self.streets.read().await;
        let mut active: Vec<&Street> = streets.values().filter(|s| !s.is_deleted()).collect();
        active.sort_by_key(|s| (Reverse(s.updated_at), s.id.clone()));

        Ok(active
            .into_iter()
            .skip(start as usize)
            .take(count as usize)
            .cloned()
            .collect())
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_user_by_login_token(&self, token: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.has_login_token(token))
            .cloned())
    }

    async fn remove_login_token(&self, user_id: &str, token: &str) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };
        let before = user.login_tokens.len();
        user.login_tokens.retain(|t| t != token);
        Ok(user.login_tokens.len() != before)
    }

    async fn next_user_street_id(&self, user_id: &str) -> StoreResult<i64> {
        let mut users = self.users.write().await;
        let user = users
            .entry(user_id.to_string())
            .or_insert_with(|| User::new(user_id));
        user.last_street_id += 1;
        Ok(user.last_street_id)
    }

    async fn next_global_street_id(&self) -> StoreResult<i64> {
        let mut seq = self.street_sequence.write().await;
        *seq += 1;
        Ok(*seq)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
