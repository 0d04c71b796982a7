use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A signed-up user.
///
/// Only `_id` is guaranteed to exist: the namespaced-id counter upserts a
/// bare document when it increments `last_street_id` for an unseen id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub login_tokens: Vec<String>,
    #[serde(default)]
    pub last_street_id: i64,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime>,
    #[serde(default)]
    pub updated_at: Option<DateTime>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        let now = DateTime::now();
        Self {
            id: id.into(),
            login_tokens: Vec::new(),
            last_street_id: 0,
            roles: Vec::new(),
            flags: BTreeMap::new(),
            profile_image_url: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn with_login_token(mut self, token: impl Into<String>) -> Self {
        self.login_tokens.push(token.into());
        self
    }

    pub fn has_login_token(&self, token: &str) -> bool {
        self.login_tokens.iter().any(|t| t == token)
    }
}
