use crate::models::User;
use serde::Serialize;
use std::collections::BTreeMap;

/// Public profile; login tokens and counters stay server-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub roles: Vec<String>,
    pub flags: BTreeMap<String, bool>,
    pub profile_image_url: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            roles: user.roles,
            flags: user.flags,
            profile_image_url: user.profile_image_url,
        }
    }
}
