use crate::models::Street;
use crate::services::PageLinks;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStreetRequest {
    #[validate(length(max = 256, message = "Street name must be at most 256 characters"))]
    pub name: Option<String>,
    pub data: Option<Value>,
    pub original_street_id: Option<String>,
}

/// Fields left out keep their current value.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStreetRequest {
    #[validate(length(max = 256, message = "Street name must be at most 256 characters"))]
    pub name: Option<String>,
    pub data: Option<Value>,
    pub original_street_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindStreetsParams {
    pub creator_id: Option<String>,
    pub namespaced_id: Option<String>,
    pub start: Option<String>,
    pub count: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetResponse {
    pub id: String,
    pub namespaced_id: i64,
    pub name: Option<String>,
    pub data: Option<Value>,
    pub creator_id: Option<String>,
    pub original_street_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Street> for StreetResponse {
    fn from(street: Street) -> Self {
        Self {
            id: street.id,
            namespaced_id: street.namespaced_id,
            name: street.name,
            data: street.data,
            creator_id: street.creator_id,
            original_street_id: street.original_street_id,
            created_at: street.created_at,
            updated_at: street.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub links: PageLinks,
}

#[derive(Debug, Serialize)]
pub struct StreetListResponse {
    pub meta: ListMeta,
    pub streets: Vec<StreetResponse>,
}
