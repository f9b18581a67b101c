pub mod problem;
pub mod request_id;

pub use problem::{Problem, ProblemResponse, ValidationError};
pub use request_id::{current_request_id, scope_request_id};
