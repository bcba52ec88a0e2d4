//! Core library for the tourdesk admin dashboard.
//!
//! Everything that is not terminal rendering lives here: the REST client,
//! entity models, the per-resource TTL caches, resource services with their
//! notifications, form drafts and validation, the session manager and the
//! route gate.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod form;
pub mod models;
pub mod resource;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{SessionEvent, SessionManager};
pub use cache::KeyedCache;
pub use config::Config;
pub use resource::{Notice, Resource, ResourceService};
