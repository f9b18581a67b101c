pub mod model;

pub use model::{
    AvatarUpload, Match, MessageIntent, NewMatch, ProfileUpdate, SessionToken, UpdatedProfile,
    User,
};
