pub mod auth;
pub mod storage;
pub mod uploads;
