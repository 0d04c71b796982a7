use crate::analytics::{get_street_capacity, StreetCapacity};
use crate::dtos::{
    CreateStreetRequest, FindStreetsParams, ListMeta, StreetListResponse, StreetResponse,
    UpdateStreetRequest,
};
use crate::middleware::{ClientIp, LoginToken};
use crate::models::{Street, StreetStatus, User};
use crate::services::{PageLinks, PageRequest};
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::Validate;

pub async fn create_street(
    State(state): State<AppState>,
    token: LoginToken,
    ClientIp(client_ip): ClientIp,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let request: CreateStreetRequest = parse_json_body(&body)?.unwrap_or_default();
    request.validate()?;

    let creator = match token.as_deref() {
        Some(token) => Some(
            signed_in_user(&state, token)
                .await?
                .ok_or_else(|| AppError::unauthorized("User with that login token not found."))?,
        ),
        None => None,
    };

    let mut street = Street::new(request.name, request.data, client_ip);

    if let Some(original_id) = request.original_street_id.as_deref() {
        let original = state
            .store
            .find_street(original_id)
            .await?
            .ok_or_else(|| AppError::not_found("Original street not found."))?;
        if original.is_deleted() {
            return Err(AppError::gone("Original street not found."));
        }
        street.original_street_id = Some(original.id);
    }

    street.namespaced_id = match &creator {
        Some(user) => state.store.next_user_street_id(&user.id).await?,
        None => state.store.next_global_street_id().await?,
    };
    street.creator_id = creator.map(|user| user.id);

    state.store.insert_street(&street).await?;

    tracing::info!(
        street_id = %street.id,
        namespaced_id = street.namespaced_id,
        creator_id = ?street.creator_id,
        original_street_id = ?street.original_street_id,
        "New street created"
    );

    let location = street_uri(&state, &street.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(StreetResponse::from(street)),
    ))
}

/// Serves both GET and HEAD; HEAD answers 204 with headers only.
pub async fn get_street(
    State(state): State<AppState>,
    method: Method,
    Path(street_id): Path<String>,
) -> Result<Response, AppError> {
    let street = find_live_street(&state, &street_id).await?;
    let last_modified = http_date(&street.updated_at);

    if method == Method::HEAD {
        return Ok((StatusCode::NO_CONTENT, [(header::LAST_MODIFIED, last_modified)]).into_response());
    }

    let location = street_uri(&state, &street.id);
    Ok((
        StatusCode::OK,
        [
            (header::LAST_MODIFIED, last_modified),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            (header::LOCATION, location),
        ],
        Json(StreetResponse::from(street)),
    )
        .into_response())
}

pub async fn update_street(
    State(state): State<AppState>,
    token: LoginToken,
    Path(street_id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let request: UpdateStreetRequest = parse_json_body(&body)?
        .ok_or_else(|| AppError::bad_request("Street information not specified."))?;
    request.validate()?;

    let mut street = find_live_street(&state, &street_id).await?;

    // Anonymous streets are open to everyone; claimed ones only to the owner.
    if street.creator_id.is_some() {
        let token = token
            .as_deref()
            .ok_or_else(|| AppError::unauthorized("User is not signed-in."))?;
        let user = signed_in_user(&state, token)
            .await?
            .ok_or_else(|| AppError::unauthorized("User is not signed-in."))?;
        if !street.is_owned_by(&user) {
            return Err(AppError::forbidden(
                "Signed-in user cannot update this street.",
            ));
        }
    }

    if let Some(name) = request.name.filter(|name| !name.is_empty()) {
        street.name = Some(name);
    }
    if let Some(data) = request.data {
        street.data = Some(data);
    }
    if let Some(original_id) = request.original_street_id.as_deref() {
        let original = state
            .store
            .find_street(original_id)
            .await?
            .ok_or_else(|| AppError::not_found("Original street not found."))?;
        street.original_street_id = Some(original.id);
    }

    street.touch();
    state.store.replace_street(&street).await?;

    tracing::info!(street_id = %street.id, "Street updated");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_street(
    State(state): State<AppState>,
    token: LoginToken,
    Path(street_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let token = token
        .as_deref()
        .ok_or_else(|| AppError::unauthorized("User is not signed-in."))?;
    require_street_id(&street_id)?;

    let Some(mut street) = state.store.find_street(&street_id).await? else {
        return Ok(StatusCode::NO_CONTENT);
    };

    let user = signed_in_user(&state, token)
        .await?
        .ok_or_else(|| AppError::unauthorized("User is not signed-in."))?;
    if !street.is_owned_by(&user) {
        return Err(AppError::forbidden(
            "Signed-in user cannot delete this street.",
        ));
    }

    street.status = StreetStatus::Deleted;
    street.touch();
    state.store.replace_street(&street).await?;

    tracing::info!(street_id = %street.id, user_id = %user.id, "Street deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /v1/streets`: a single lookup by namespaced id (answered with a
/// redirect to the canonical URI), or the paginated listing.
pub async fn find_streets(
    State(state): State<AppState>,
    Query(params): Query<FindStreetsParams>,
) -> Result<Response, AppError> {
    let creator_id = params.creator_id.filter(|s| !s.is_empty());
    let namespaced_id = params
        .namespaced_id
        .filter(|s| !s.is_empty())
        .map(|raw| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| AppError::bad_request("Namespaced ID must be an integer."))
        })
        .transpose()?;

    match (creator_id, namespaced_id) {
        (Some(creator_id), Some(namespaced_id)) => {
            let user = state
                .store
                .find_user(&creator_id)
                .await?
                .ok_or_else(|| AppError::not_found("Creator not found."))?;
            let street = state
                .store
                .find_street_by_namespaced_id(Some(&user.id), namespaced_id)
                .await?;
            redirect_to_street(&state, street)
        }
        (Some(_), None) => Err(AppError::bad_request("Please provide namespaced ID.")),
        (None, Some(namespaced_id)) => {
            let street = state
                .store
                .find_street_by_namespaced_id(None, namespaced_id)
                .await?;
            redirect_to_street(&state, street)
        }
        (None, None) => {
            let page = PageRequest::from_query(params.start.as_deref(), params.count.as_deref());
            list_streets(&state, page).await.map(IntoResponse::into_response)
        }
    }
}

pub async fn get_capacity(
    State(state): State<AppState>,
    Path(street_id): Path<String>,
) -> Result<Json<StreetCapacity>, AppError> {
    let street = find_live_street(&state, &street_id).await?;
    Ok(Json(get_street_capacity(&street.segments())))
}

async fn list_streets(state: &AppState, page: PageRequest) -> Result<Json<StreetListResponse>, AppError> {
    let (total, streets) = tokio::try_join!(
        state.store.count_active_streets(),
        state.store.list_active_streets(page.start, page.count),
    )?;

    let links = PageLinks::compute(&collection_uri(state), page, streets.len() as u64, total);

    Ok(Json(StreetListResponse {
        meta: ListMeta { links },
        streets: streets.into_iter().map(StreetResponse::from).collect(),
    }))
}

fn redirect_to_street(state: &AppState, street: Option<Street>) -> Result<Response, AppError> {
    let street = street.ok_or_else(|| AppError::not_found("Could not find street."))?;
    if street.is_deleted() {
        return Err(AppError::gone("Could not find street."));
    }

    Ok((
        StatusCode::TEMPORARY_REDIRECT,
        [
            (header::LOCATION, street_uri(state, &street.id)),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            (header::CONTENT_LENGTH, "0".to_string()),
        ],
    )
        .into_response())
}

/// Fetch a street that has not been soft-deleted: absent is 404, deleted 410.
async fn find_live_street(state: &AppState, street_id: &str) -> Result<Street, AppError> {
    require_street_id(street_id)?;

    let street = state
        .store
        .find_street(street_id)
        .await?
        .ok_or_else(|| AppError::not_found("Could not find street."))?;

    if street.is_deleted() {
        return Err(AppError::gone("Could not find street."));
    }
    Ok(street)
}

async fn signed_in_user(state: &AppState, token: &str) -> Result<Option<User>, AppError> {
    Ok(state.store.find_user_by_login_token(token).await?)
}

fn require_street_id(street_id: &str) -> Result<(), AppError> {
    if street_id.trim().is_empty() {
        return Err(AppError::bad_request("Please provide street ID."));
    }
    Ok(())
}

/// An empty body is `None`; anything else must be valid JSON for `T`.
fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        AppError::bad_request("Could not parse body as JSON.")
    })
}

fn collection_uri(state: &AppState) -> String {
    format!("{}/v1/streets", state.config.restapi.baseuri)
}

fn street_uri(state: &AppState, street_id: &str) -> String {
    format!("{}/{}", collection_uri(state), street_id)
}

fn http_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_http_dates() {
        let ts = Utc.with_ymd_and_hms(2019, 3, 7, 14, 5, 9).unwrap();
        assert_eq!(http_date(&ts), "Thu, 07 Mar 2019 14:05:09 GMT");
    }

    #[test]
    fn empty_body_parses_to_none() {
        let parsed: Option<CreateStreetRequest> = parse_json_body(&Bytes::from_static(b"  \n")).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = parse_json_body::<CreateStreetRequest>(&Bytes::from_static(b"{name:"))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
