use crate::contract::{Match, User};
use crate::infra::storage::entity::{pairing, user};

impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            bio: m.bio,
            date_of_birth: m.date_of_birth,
            password_hash: m.password_hash,
            profile_picture: m.profile_picture,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<pairing::Model> for Match {
    fn from(m: pairing::Model) -> Self {
        Self {
            id: m.id,
            user: m.user_id,
            other_user: m.other_user_id,
            created_at: m.created_at,
        }
    }
}
