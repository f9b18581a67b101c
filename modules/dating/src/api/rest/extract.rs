//! Request extractors: session identity, validated JSON and the profile form.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, FromRequestParts, Multipart, Request},
    http::{header, request::Parts, HeaderMap},
    Json,
};
use modkit::{internal_error, ProblemResponse};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use validator::Validate;

use crate::api::rest::dto::ProfileUpdateReq;
use crate::api::rest::error::{
    body_rejection, map_domain_error, unknown_field, validation_problem,
};
use crate::contract::AvatarUpload;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

pub const SESSION_COOKIE: &str = "token";

/// Member id resolved from the `token` cookie or an `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let instance = parts.uri.path().to_owned();
        let svc = parts
            .extensions
            .get::<Arc<Service>>()
            .cloned()
            .ok_or_else(|| {
                error!("dating service is not attached to the router");
                internal_error()
            })?;

        let token = session_token(&parts.headers).ok_or_else(|| {
            map_domain_error(
                &DomainError::unauthenticated("missing session token"),
                &instance,
            )
        })?;

        let user_id = svc
            .authenticate(&token)
            .map_err(|e| map_domain_error(&e, &instance))?;
        Ok(Self(user_id))
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_owned())
        })
        .next();

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
    })
}

/// JSON body that has passed its `validator` rules. Every failure is a 400 problem.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_owned();
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rej| body_rejection(rej.status(), rej.body_text(), &instance))?;
        value
            .validate()
            .map_err(|errs| validation_problem(&errs, &instance))?;
        Ok(Self(value))
    }
}

/// `PUT /profile` body: multipart form with an optional `profilePicture` file,
/// or plain JSON without a file.
#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub fields: ProfileUpdateReq,
    pub avatar: Option<AvatarUpload>,
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

impl<S> FromRequest<S> for ProfileForm
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(req.headers()) {
            let ValidJson(fields) = ValidJson::<ProfileUpdateReq>::from_request(req, state).await?;
            return Ok(Self {
                fields,
                avatar: None,
            });
        }

        let instance = req.uri().path().to_owned();
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rej| body_rejection(rej.status(), rej.body_text(), &instance))?;

        let mut fields = ProfileUpdateReq::default();
        let mut avatar = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| body_rejection(e.status(), e.body_text(), &instance))?
        {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "profilePicture" => {
                    let file_name = field.file_name().map(str::to_owned);
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| body_rejection(e.status(), e.body_text(), &instance))?;
                    // Browsers submit an empty part for an untouched file input.
                    if bytes.is_empty() && file_name.as_deref().unwrap_or_default().is_empty() {
                        continue;
                    }
                    avatar = Some(AvatarUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                "name" | "bio" | "dateOfBirth" | "password" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| body_rejection(e.status(), e.body_text(), &instance))?;
                    let slot = match name.as_str() {
                        "name" => &mut fields.name,
                        "bio" => &mut fields.bio,
                        "dateOfBirth" => &mut fields.date_of_birth,
                        _ => &mut fields.password,
                    };
                    *slot = Some(value);
                }
                other => {
                    debug!(field = other, "Unexpected profile form field");
                    return Err(unknown_field(other, &instance));
                }
            }
        }

        fields
            .validate()
            .map_err(|errs| validation_problem(&errs, &instance))?;

        Ok(Self { fields, avatar })
    }
}
