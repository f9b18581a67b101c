use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::{Match, MessageIntent, NewMatch, ProfileUpdate, UpdatedProfile, User};
use crate::domain::error::DomainError;
use crate::domain::ports::{AvatarStore, PasswordHasher, SessionIssuer};
use crate::domain::repo::{MatchesRepository, UsersRepository};
use crate::domain::validation::{validate_date_of_birth, validate_text_length};

/// Domain service for profiles, pairings and chat intents.
/// Depends only on ports, never on infra types.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UsersRepository>,
    matches: Arc<dyn MatchesRepository>,
    hasher: Arc<dyn PasswordHasher>,
    sessions: Arc<dyn SessionIssuer>,
    avatars: Arc<dyn AvatarStore>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub min_age_years: u32,
    pub max_name_length: usize,
    pub max_bio_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_age_years: 18,
            max_name_length: 100,
            max_bio_length: 2000,
        }
    }
}

impl Service {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        matches: Arc<dyn MatchesRepository>,
        hasher: Arc<dyn PasswordHasher>,
        sessions: Arc<dyn SessionIssuer>,
        avatars: Arc<dyn AvatarStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            matches,
            hasher,
            sessions,
            avatars,
            config,
        }
    }

    /// Resolves a session token to the member id it was issued for.
    pub fn authenticate(&self, token: &str) -> Result<String, DomainError> {
        self.sessions.verify(token).map_err(|e| {
            debug!(error = %e, "Session token rejected");
            DomainError::unauthenticated("invalid or expired session token")
        })
    }

    #[instrument(name = "dating.service.get_profile", skip(self))]
    pub async fn get_profile(&self, user_id: &str) -> Result<User, DomainError> {
        debug!("Loading profile");
        self.users
            .find_by_id(user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(user_id))
    }

    #[instrument(
        name = "dating.service.update_profile",
        skip(self, update),
        fields(
            has_password = update.password.is_some(),
            has_avatar = update.avatar.is_some()
        )
    )]
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<UpdatedProfile, DomainError> {
        info!("Updating profile");

        let dob = validate_date_of_birth(
            &update.date_of_birth,
            Utc::now().date_naive(),
            self.config.min_age_years,
        )?;
        validate_text_length("name", &update.name, self.config.max_name_length)?;
        validate_text_length("bio", &update.bio, self.config.max_bio_length)?;

        let mut current = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(user_id))?;

        // An empty password field counts as omitted.
        if let Some(password) = update.password.as_deref().filter(|p| !p.is_empty()) {
            current.password_hash = self
                .hasher
                .hash(password)
                .await
                .map_err(|e| DomainError::internal(format!("password hashing failed: {e:#}")))?;
            debug!("Password hash rotated");
        }

        let mut new_avatar = None;
        if let Some(upload) = &update.avatar {
            let stored = self
                .avatars
                .store(upload)
                .await
                .map_err(|e| DomainError::internal(format!("avatar upload failed: {e:#}")))?;
            debug!(file = %stored, "Avatar stored");
            current.profile_picture = Some(stored.clone());
            new_avatar = Some(stored);
        }

        current.name = update.name;
        current.bio = update.bio;
        current.date_of_birth = Some(dob);
        current.updated_at = Utc::now();

        if let Err(e) = self.users.update(current.clone()).await {
            // The record never pointed at the new file.
            if let Some(file) = new_avatar {
                if let Err(rm) = self.avatars.remove(&file).await {
                    warn!(file = %file, error = %rm, "Failed to remove orphaned avatar");
                }
            }
            return Err(DomainError::database(e.to_string()));
        }

        let session = self
            .sessions
            .issue(&current.id)
            .map_err(|e| DomainError::internal(format!("session issue failed: {e:#}")))?;

        info!("Profile updated");
        Ok(UpdatedProfile {
            user: current,
            session,
        })
    }

    #[instrument(name = "dating.service.list_matches", skip(self))]
    pub async fn list_matches(&self, user_id: &str) -> Result<Vec<Match>, DomainError> {
        let found = self
            .matches
            .list_for_user(user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!(count = found.len(), "Listed matches");
        Ok(found)
    }

    #[instrument(
        name = "dating.service.create_match",
        skip(self, new_match),
        fields(user = %new_match.user_id, other_user = %new_match.other_user_id)
    )]
    pub async fn create_match(
        &self,
        caller: &str,
        new_match: NewMatch,
    ) -> Result<Match, DomainError> {
        info!("Creating match");

        let NewMatch {
            user_id,
            other_user_id,
        } = new_match;

        if user_id == other_user_id {
            return Err(DomainError::self_match(user_id));
        }

        let existing = self
            .matches
            .find_pair(&user_id, &other_user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if let Some(existing) = existing {
            debug!(match_id = %existing.id, "Pairing already present");
            return Err(DomainError::match_already_exists(user_id, other_user_id));
        }

        let created = Match {
            id: Uuid::new_v4(),
            user: user_id,
            other_user: other_user_id,
            created_at: Utc::now(),
        };
        if !created.involves(caller) {
            warn!(caller, "Pairing does not involve the authenticated member");
        }

        let inserted = self
            .matches
            .insert_if_absent(created.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !inserted {
            // Lost a race with a concurrent insert of the same pair.
            return Err(DomainError::match_already_exists(
                created.user,
                created.other_user,
            ));
        }

        info!(match_id = %created.id, "Match created");
        Ok(created)
    }

    /// Records the intent to message `recipient`; nothing is stored or delivered.
    #[instrument(
        name = "dating.service.send_message",
        skip(self, intent),
        fields(recipient = %intent.recipient)
    )]
    pub fn send_message(&self, intent: MessageIntent) -> String {
        info!(message = %intent.message, "Message intent recorded");
        format!("Message sent to {}: {}", intent.recipient, intent.message)
    }
}
