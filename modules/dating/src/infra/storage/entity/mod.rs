pub mod pairing;
pub mod user;
