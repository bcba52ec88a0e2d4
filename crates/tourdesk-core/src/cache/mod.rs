//! In-memory TTL caches for resource collections.
//!
//! One `KeyedCache<T>` per resource, created by the application and shared
//! as `Arc` with the services that read and patch it. A collection is reused
//! until it is older than the configured TTL (five minutes by default).

pub mod keyed;

pub use keyed::{upsert_by_key, CachedData, FetchTicket, KeyedCache};
