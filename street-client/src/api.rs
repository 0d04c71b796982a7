use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::observability::{TracedClientExt, TracedRequest};
use std::collections::BTreeMap;

/// Profile returned by `GET /v1/users/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    token: String,
}

/// HTTP access to the users and streets resources.
#[derive(Debug, Clone)]
pub struct StreetsApi {
    client: Client,
    api_url: String,
    refresh_url: String,
}

impl StreetsApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.api_url.clone(),
            refresh_url: config.refresh_url.clone(),
        }
    }

    pub async fn fetch_user(&self, user_id: &str, token: Option<&str>) -> ClientResult<UserDetails> {
        let url = format!("{}/v1/users/{}", self.api_url, user_id);
        let response = with_login_token(self.client.traced_get(&url), token)
            .send()
            .await?;
        Ok(expect_success(response, &url)?.json().await?)
    }

    /// Exchange a refresh token for a new login token.
    pub async fn refresh_login_token(&self, refresh_token: Option<&str>) -> ClientResult<String> {
        let response = self
            .client
            .traced_post(&self.refresh_url)
            .json(&serde_json::json!({ "token": refresh_token }))
            .send()
            .await?;
        let body: RefreshResponse = expect_success(response, &self.refresh_url)?.json().await?;
        Ok(body.token)
    }

    pub async fn delete_login_token(&self, user_id: &str, token: Option<&str>) -> ClientResult<()> {
        let url = format!("{}/v1/users/{}/login-token", self.api_url, user_id);
        let response = with_login_token(self.client.traced_delete(&url), token)
            .send()
            .await?;
        expect_success(response, &url)?;
        Ok(())
    }

    pub async fn fetch_street(&self, street_id: &str) -> ClientResult<Value> {
        let url = format!("{}/v1/streets/{}", self.api_url, street_id);
        let response = self.client.traced_get(&url).send().await?;
        Ok(expect_success(response, &url)?.json().await?)
    }

    /// Create a street, owned by the signed-in user when `token` is given.
    pub async fn create_street(&self, body: &Value, token: Option<&str>) -> ClientResult<Value> {
        let url = format!("{}/v1/streets", self.api_url);
        let response = with_login_token(self.client.traced_post(&url), token)
            .json(body)
            .send()
            .await?;
        Ok(expect_success(response, &url)?.json().await?)
    }
}

/// Authorization header in the Streetmix scheme.
pub fn authorization_header(token: &str) -> String {
    format!(r#"Streetmix realm="streetmix", loginToken="{}""#, token)
}

fn with_login_token(request: TracedRequest, token: Option<&str>) -> TracedRequest {
    match token {
        Some(token) => request.header("Authorization", &authorization_header(token)),
        None => request,
    }
}

fn expect_success(response: reqwest::Response, url: &str) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    tracing::debug!(%url, status = status.as_u16(), "Request rejected");
    Err(ClientError::from_status(status))
}
