#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use street_service::config::StreetConfig;
use street_service::models::User;
use street_service::services::InMemoryStore;
use street_service::{build_router, AppState};
use tower::util::ServiceExt;

pub const BASE_URI: &str = "http://streetmix.test";

pub const ALICE: &str = "alice";
pub const ALICE_TOKEN: &str = "alice-login-token";
pub const BOB: &str = "bob";
pub const BOB_TOKEN: &str = "bob-login-token";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl TestResponse {
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> &Value {
        self.body.as_ref().expect("response had no JSON body")
    }
}

#[derive(Clone)]
pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
}

impl TestApp {
    /// Router over a fresh in-memory store seeded with two signed-in users.
    pub async fn spawn() -> Self {
        let store = InMemoryStore::new();

        let mut alice = User::new(ALICE).with_login_token(ALICE_TOKEN);
        alice.roles = vec!["ADMIN".to_string()];
        alice.flags.insert("GEOTAG".to_string(), true);
        store.insert_user(alice).await;
        store
            .insert_user(User::new(BOB).with_login_token(BOB_TOKEN))
            .await;

        let state = AppState {
            config: StreetConfig::for_tests(BASE_URI),
            store: Arc::new(store.clone()),
        };

        TestApp {
            router: build_router(state),
            store,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(
                header::AUTHORIZATION,
                format!(r#"Streetmix realm="streetmix", loginToken="{}""#, token),
            );
        }
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).ok();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, None).await
    }

    /// Create a street and return its JSON, asserting 201.
    pub async fn create_street(&self, token: Option<&str>, body: Value) -> Value {
        let response = self
            .send(Method::POST, "/v1/streets", token, Some(&body.to_string()))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body.expect("created street body")
    }

    pub async fn delete_street(&self, id: &str, token: &str) -> StatusCode {
        self.send(Method::DELETE, &format!("/v1/streets/{}", id), Some(token), None)
            .await
            .status
    }
}

pub fn street_id(street: &Value) -> String {
    street["id"].as_str().expect("street id").to_string()
}
