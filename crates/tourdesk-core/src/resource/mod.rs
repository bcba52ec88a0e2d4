//! Resource services: the layer between the API client and the screens.
//!
//! A `Resource` is one REST collection (users, cities, destinations,
//! appointments). `ResourceService` wraps it with the shared list cache,
//! loading/error state and user-facing `Notice`s, and never returns an
//! error to the caller.

pub mod endpoints;
pub mod service;

use anyhow::Result;
use async_trait::async_trait;

pub use endpoints::{AppointmentsApi, CitiesApi, DestinationsApi, UsersApi};
pub use service::{failure_message, Notice, ResourceService, UNKNOWN_ERROR};

/// Wording used when a failed call carries no server `message`.
#[derive(Debug, Clone, Copy)]
pub struct FailureText {
    pub list: &'static str,
    pub fetch_one: &'static str,
    pub create: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
}

/// One CRUD collection on the platform API.
#[async_trait]
pub trait Resource: Send + Sync {
    type Item: Clone + Send + Sync + 'static;
    type Create: Send + Sync;
    type Update: Send + Sync;

    /// Capitalized singular, used in success messages ("City").
    const SINGULAR: &'static str;
    /// Lowercase plural, used in fetch messages ("cities").
    const PLURAL: &'static str;
    const FAILURES: FailureText;

    /// Record id used to match cached entries.
    fn key(item: &Self::Item) -> i64;

    async fn list(&self) -> Result<Vec<Self::Item>>;

    /// Fetch one record. `Ok(None)` when the API has no single-record
    /// endpoint for this collection.
    async fn get(&self, _id: i64) -> Result<Option<Self::Item>> {
        Ok(None)
    }

    async fn create(&self, data: &Self::Create) -> Result<Self::Item>;

    async fn update(&self, id: i64, data: &Self::Update) -> Result<Self::Item>;

    async fn delete(&self, id: i64) -> Result<()>;
}
