use serde::{Deserialize, Serialize};

/// Key of the counter used for streets without a creator.
pub const STREETS_SEQUENCE_ID: &str = "streets";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(rename = "_id")]
    pub id: String,
    pub seq: i64,
}
