//! # ModKit
//!
//! Shared contracts for Amora modules: the phase traits a module implements
//! (init → migrate → REST), the context a module is handed during wiring, and
//! RFC 9457 Problem Details used by every HTTP error path.
//!
//! ## Example
//!
//! ```rust,ignore
//! use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
//!
//! #[derive(Default)]
//! pub struct Profiles;
//!
//! // Implement the phases the module needs...
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod api;
pub mod context;
pub mod contracts;
pub mod runtime;

pub use api::problem::{
    internal_error, not_found, too_many_requests, Problem, ProblemResponse, ValidationError,
    APPLICATION_PROBLEM_JSON,
};
pub use api::request_id::{current_request_id, scope_request_id};
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};
pub use contracts::*;
