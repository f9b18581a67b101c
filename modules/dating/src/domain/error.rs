use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("Invalid date of birth: '{value}'")]
    InvalidDateOfBirth { value: String },

    #[error("Match already exists between {user} and {other_user}")]
    MatchAlreadyExists { user: String, other_user: String },

    #[error("A member cannot be matched with themselves: {id}")]
    SelfMatch { id: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Authentication required: {reason}")]
    Unauthenticated { reason: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::UserNotFound { id: id.into() }
    }

    pub fn invalid_date_of_birth(value: impl Into<String>) -> Self {
        Self::InvalidDateOfBirth {
            value: value.into(),
        }
    }

    pub fn match_already_exists(user: impl Into<String>, other_user: impl Into<String>) -> Self {
        Self::MatchAlreadyExists {
            user: user.into(),
            other_user: other_user.into(),
        }
    }

    pub fn self_match(id: impl Into<String>) -> Self {
        Self::SelfMatch { id: id.into() }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated {
            reason: reason.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
