//! REST API client for the booking platform.
//!
//! `ApiClient` covers authentication (`/login`, `/me`) and the CRUD
//! endpoints for users, cities, destinations and appointments. Responses
//! arrive wrapped in an envelope (`{"cities": [...]}`, `{"data": {...}}`)
//! that the client unwraps per endpoint.
//!
//! Authentication is a bearer token owned by `auth::SessionManager`; a 401
//! on any call expires that session.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
