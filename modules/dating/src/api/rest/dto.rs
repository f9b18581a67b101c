use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::contract::{AvatarUpload, Match, MessageIntent, NewMatch, ProfileUpdate, User};

/// Public view of a member profile. The password hash is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `PUT /profile`, sent as JSON or as multipart form fields.
#[derive(Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdateReq {
    #[validate(
        required(message = "\"name\" is required"),
        length(min = 1, message = "\"name\" is not allowed to be empty")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "\"bio\" is required"),
        length(min = 1, message = "\"bio\" is not allowed to be empty")
    )]
    pub bio: Option<String>,
    /// `YYYY-MM-DD`; the member must be at least 18.
    #[validate(
        required(message = "\"dateOfBirth\" is required"),
        length(min = 1, message = "\"dateOfBirth\" is not allowed to be empty")
    )]
    pub date_of_birth: Option<String>,
    /// Replaces the stored hash when present.
    pub password: Option<String>,
}

impl std::fmt::Debug for ProfileUpdateReq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileUpdateReq")
            .field("name", &self.name)
            .field("bio", &self.bio)
            .field("date_of_birth", &self.date_of_birth)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchDto {
    pub id: Uuid,
    pub user: String,
    pub other_user: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateMatchReq {
    #[validate(
        required(message = "\"userId\" is required"),
        length(min = 1, message = "\"userId\" is not allowed to be empty")
    )]
    pub user_id: Option<String>,
    #[validate(
        required(message = "\"otherUserId\" is required"),
        length(min = 1, message = "\"otherUserId\" is not allowed to be empty")
    )]
    pub other_user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SendMessageReq {
    #[validate(
        required(message = "\"recipient\" is required"),
        length(min = 1, message = "\"recipient\" is not allowed to be empty")
    )]
    pub recipient: Option<String>,
    #[validate(
        required(message = "\"message\" is required"),
        length(min = 1, message = "\"message\" is not allowed to be empty")
    )]
    pub message: Option<String>,
}

impl From<User> for ProfileDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            bio: user.bio,
            date_of_birth: user.date_of_birth,
            profile_picture: user.profile_picture,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<Match> for MatchDto {
    fn from(m: Match) -> Self {
        Self {
            id: m.id,
            user: m.user,
            other_user: m.other_user,
            created_at: m.created_at,
        }
    }
}

// The conversions below run after `validate()`, so required fields are present.

impl ProfileUpdateReq {
    pub fn into_update(self, avatar: Option<AvatarUpload>) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name.unwrap_or_default(),
            bio: self.bio.unwrap_or_default(),
            date_of_birth: self.date_of_birth.unwrap_or_default(),
            password: self.password,
            avatar,
        }
    }
}

impl From<CreateMatchReq> for NewMatch {
    fn from(req: CreateMatchReq) -> Self {
        Self {
            user_id: req.user_id.unwrap_or_default(),
            other_user_id: req.other_user_id.unwrap_or_default(),
        }
    }
}

impl From<SendMessageReq> for MessageIntent {
    fn from(req: SendMessageReq) -> Self {
        Self {
            recipient: req.recipient.unwrap_or_default(),
            message: req.message.unwrap_or_default(),
        }
    }
}
