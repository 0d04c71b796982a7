use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::analytics::Segment;
use crate::models::User;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreetStatus {
    Active,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Street {
    #[serde(rename = "_id")]
    pub id: String,
    pub namespaced_id: i64,
    pub name: Option<String>,
    pub data: Option<Value>,
    pub creator_id: Option<String>,
    pub original_street_id: Option<String>,
    pub status: StreetStatus,
    pub creator_ip: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Street {
    /// A fresh, active street. The namespaced id is assigned later, once the
    /// counter for its namespace has been incremented.
    pub fn new(name: Option<String>, data: Option<Value>, creator_ip: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            namespaced_id: 0,
            name,
            data,
            creator_id: None,
            original_street_id: None,
            status: StreetStatus::Active,
            creator_ip,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status == StreetStatus::Deleted
    }

    pub fn is_owned_by(&self, user: &User) -> bool {
        self.creator_id.as_deref() == Some(user.id.as_str())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Segments stored under `data.street.segments`. Entries that do not look
    /// like segments are skipped.
    pub fn segments(&self) -> Vec<Segment> {
        self.data
            .as_ref()
            .and_then(|data| data.pointer("/street/segments"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}
