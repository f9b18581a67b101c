use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Uri},
    response::{IntoResponse, Json},
    Extension,
};
use modkit::{internal_error, Problem, ProblemResponse};
use tracing::{error, info};

use crate::api::rest::dto::{
    CreateMatchReq, MatchDto, ProfileDto, ProfileUpdateReq, SendMessageReq,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{AuthUser, ProfileForm, ValidJson, SESSION_COOKIE};
use crate::contract::SessionToken;
use crate::domain::service::Service;

#[utoipa::path(
    get,
    path = "/",
    tag = "general",
    responses((status = 200, description = "Greeting", body = String, content_type = "text/plain"))
)]
pub async fn welcome() -> &'static str {
    "Welcome to the dating app!"
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "general",
    responses((status = 200, description = "Placeholder", body = String, content_type = "text/plain"))
)]
pub async fn search() -> &'static str {
    "Search for other users here!"
}

#[utoipa::path(
    post,
    path = "/settings",
    tag = "general",
    responses((status = 200, description = "Placeholder", body = String, content_type = "text/plain"))
)]
pub async fn settings() -> &'static str {
    "Manage your account settings here!"
}

/// Current member's profile.
#[utoipa::path(
    get,
    path = "/profile",
    tag = "profile",
    responses(
        (status = 200, description = "Profile of the session owner", body = ProfileDto),
        (status = 401, description = "Missing or invalid session", body = Problem),
        (status = 500, description = "Internal error", body = Problem)
    )
)]
pub async fn get_profile(
    Extension(svc): Extension<Arc<Service>>,
    AuthUser(user_id): AuthUser,
    uri: Uri,
) -> Result<Json<ProfileDto>, ProblemResponse> {
    info!("Getting profile of {}", user_id);

    match svc.get_profile(&user_id).await {
        Ok(user) => Ok(Json(ProfileDto::from(user))),
        Err(e) => {
            error!("Failed to get profile {}: {}", user_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Update the current member's profile and rotate the session cookie.
#[utoipa::path(
    put,
    path = "/profile",
    tag = "profile",
    request_body(
        content = ProfileUpdateReq,
        content_type = "multipart/form-data",
        description = "Profile fields plus an optional `profilePicture` file; JSON is accepted without the file"
    ),
    responses(
        (status = 200, description = "Updated profile; sets the `token` cookie", body = ProfileDto),
        (status = 400, description = "Validation failed", body = Problem),
        (status = 401, description = "Missing or invalid session", body = Problem),
        (status = 500, description = "Internal error", body = Problem)
    )
)]
pub async fn update_profile(
    Extension(svc): Extension<Arc<Service>>,
    AuthUser(user_id): AuthUser,
    uri: Uri,
    form: ProfileForm,
) -> Result<impl IntoResponse, ProblemResponse> {
    info!("Updating profile {} with: {:?}", user_id, form.fields);

    let update = form.fields.into_update(form.avatar);
    match svc.update_profile(&user_id, update).await {
        Ok(updated) => {
            let cookie = session_cookie(&updated.session)?;
            Ok((
                [(header::SET_COOKIE, cookie)],
                Json(ProfileDto::from(updated.user)),
            ))
        }
        Err(e) => {
            error!("Failed to update profile {}: {}", user_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

fn session_cookie(session: &SessionToken) -> Result<HeaderValue, ProblemResponse> {
    let raw = format!(
        "{SESSION_COOKIE}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        session.value, session.max_age_secs
    );
    HeaderValue::from_str(&raw).map_err(|e| {
        error!("Session token is not a valid header value: {}", e);
        internal_error()
    })
}

/// Pairings that include the current member on either side.
#[utoipa::path(
    get,
    path = "/matches",
    tag = "matches",
    responses(
        (status = 200, description = "Pairings of the session owner", body = Vec<MatchDto>),
        (status = 401, description = "Missing or invalid session", body = Problem),
        (status = 500, description = "Internal error", body = Problem)
    )
)]
pub async fn list_matches(
    Extension(svc): Extension<Arc<Service>>,
    AuthUser(user_id): AuthUser,
    uri: Uri,
) -> Result<Json<Vec<MatchDto>>, ProblemResponse> {
    info!("Listing matches of {}", user_id);

    match svc.list_matches(&user_id).await {
        Ok(found) => Ok(Json(found.into_iter().map(MatchDto::from).collect())),
        Err(e) => {
            error!("Failed to list matches of {}: {}", user_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/matches",
    tag = "matches",
    request_body = CreateMatchReq,
    responses(
        (status = 200, description = "Created pairing", body = MatchDto),
        (status = 400, description = "Validation failed or pairing exists", body = Problem),
        (status = 401, description = "Missing or invalid session", body = Problem),
        (status = 500, description = "Internal error", body = Problem)
    )
)]
pub async fn create_match(
    Extension(svc): Extension<Arc<Service>>,
    AuthUser(caller): AuthUser,
    uri: Uri,
    ValidJson(req_body): ValidJson<CreateMatchReq>,
) -> Result<Json<MatchDto>, ProblemResponse> {
    info!("Creating match: {:?}", req_body);

    match svc.create_match(&caller, req_body.into()).await {
        Ok(created) => Ok(Json(MatchDto::from(created))),
        Err(e) => {
            error!("Failed to create match: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Log the intent to message a member. Nothing is delivered.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = SendMessageReq,
    responses(
        (status = 200, description = "Confirmation text", body = String, content_type = "text/plain"),
        (status = 400, description = "Validation failed", body = Problem),
        (status = 429, description = "Rate limit reached", body = Problem)
    )
)]
pub async fn send_message(
    Extension(svc): Extension<Arc<Service>>,
    ValidJson(req_body): ValidJson<SendMessageReq>,
) -> String {
    svc.send_message(req_body.into())
}
