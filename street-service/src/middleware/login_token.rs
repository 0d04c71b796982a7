//! Login token extraction.
//!
//! Clients send the token in the `Authorization` header, either in the
//! Streetmix scheme (`Streetmix realm="streetmix", loginToken="..."`) or as a
//! plain bearer token. A missing or unparseable header yields no token; each
//! handler decides whether a token is required.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use service_core::error::AppError;

pub const STREETMIX_SCHEME: &str = "Streetmix";

#[derive(Debug, Clone, Default)]
pub struct LoginToken(pub Option<String>);

impl LoginToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Pull the login token out of an `Authorization` header value.
pub fn parse_authorization(value: &str) -> Option<String> {
    let value = value.trim();

    if let Some(token) = value.strip_prefix("Bearer ") {
        let token = token.trim();
        return (!token.is_empty()).then(|| token.to_string());
    }

    let params = value.strip_prefix(STREETMIX_SCHEME)?;
    params
        .split(',')
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim() == "loginToken")
        .map(|(_, raw)| raw.trim().trim_matches('"').to_string())
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for LoginToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_authorization);

        Ok(LoginToken(token))
    }
}
