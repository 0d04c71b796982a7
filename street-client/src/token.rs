use crate::error::{ClientError, ClientResult};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// Read the `exp` claim of a login token without verifying its signature.
///
/// The API verifies tokens on every request; the client only needs to know
/// when to ask for a fresh one.
pub fn token_expiry(token: &str) -> ClientResult<DateTime<Utc>> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ClientError::InvalidToken("expected three segments".into()));
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| ClientError::InvalidToken(format!("payload is not base64: {}", e)))?;

    let claim: ExpiryClaim = serde_json::from_slice(&payload)
        .map_err(|e| ClientError::InvalidToken(format!("missing exp claim: {}", e)))?;

    Utc.timestamp_opt(claim.exp, 0)
        .single()
        .ok_or_else(|| ClientError::InvalidToken(format!("exp out of range: {}", claim.exp)))
}

/// Tokens are refreshed one day before they expire.
pub fn needs_refresh(token: &str, now: DateTime<Utc>) -> ClientResult<bool> {
    let expiry = token_expiry(token)?;
    let refresh_at = expiry
        .checked_sub_signed(Duration::days(1))
        .ok_or_else(|| ClientError::InvalidToken(format!("exp too early: {}", expiry)))?;
    Ok(now >= refresh_at)
}

#[cfg(test)]
pub(crate) fn token_with_exp(exp: i64) -> String {
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"alice","exp":{}}}"#, exp));
    format!("eyJhbGciOiJIUzI1NiJ9.{}.signature", payload)
}
