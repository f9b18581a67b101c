pub mod bcrypt_hasher;
pub mod jwt;

pub use bcrypt_hasher::BcryptHasher;
pub use jwt::JwtSessions;
