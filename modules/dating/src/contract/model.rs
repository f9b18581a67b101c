use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A member profile. Accounts are created by registration elsewhere;
/// this module only reads and updates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub date_of_birth: Option<NaiveDate>,
    /// bcrypt hash; the plaintext is never stored.
    pub password_hash: String,
    /// Generated file name under the uploads directory.
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changes requested through `PUT /profile`.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub bio: String,
    /// Raw `YYYY-MM-DD` text as submitted.
    pub date_of_birth: String,
    pub password: Option<String>,
    pub avatar: Option<AvatarUpload>,
}

#[derive(Clone, Default)]
pub struct AvatarUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for AvatarUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Result of a successful profile update: the stored record plus a fresh session.
#[derive(Debug, Clone)]
pub struct UpdatedProfile {
    pub user: User,
    pub session: SessionToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub value: String,
    pub max_age_secs: u64,
}

/// A pairing between two members. Unique regardless of side order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: Uuid,
    pub user: String,
    pub other_user: String,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Side-order independent key: `(min, max)` of the two member ids.
    pub fn pair_key(&self) -> (&str, &str) {
        pair_key(&self.user, &self.other_user)
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.user == user_id || self.other_user == user_id
    }
}

pub fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatch {
    pub user_id: String,
    pub other_user_id: String,
}

/// Chat message that is validated and logged, never stored or delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageIntent {
    pub recipient: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_order_independent() {
        assert_eq!(pair_key("u2", "u1"), ("u1", "u2"));
        assert_eq!(pair_key("u1", "u2"), ("u1", "u2"));
    }

    #[test]
    fn match_involves_either_side() {
        let m = Match {
            id: Uuid::new_v4(),
            user: "u1".into(),
            other_user: "u2".into(),
            created_at: Utc::now(),
        };
        assert!(m.involves("u1"));
        assert!(m.involves("u2"));
        assert!(!m.involves("u3"));
        assert_eq!(m.pair_key(), ("u1", "u2"));
    }

    #[test]
    fn avatar_debug_omits_bytes() {
        let upload = AvatarUpload {
            file_name: Some("me.png".into()),
            content_type: Some("image/png".into()),
            bytes: vec![1, 2, 3],
        };
        let rendered = format!("{upload:?}");
        assert!(rendered.contains("len: 3"));
        assert!(!rendered.contains("[1, 2, 3]"));
    }
}
