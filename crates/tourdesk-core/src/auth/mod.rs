//! Authentication: session lifecycle, stored credentials and the route gate.
//!
//! This module provides:
//! - `SessionManager`: bearer token storage with a 7-day expiry and
//!   subscribe/notify semantics for login, logout and server-side expiry
//! - `CredentialStore`: optional "remember me" via the OS keychain
//! - `gate`: the check that keeps protected screens behind the login screen

pub mod credentials;
pub mod gate;
pub mod session;

pub use credentials::CredentialStore;
pub use gate::{GateDecision, Route};
pub use session::{SessionData, SessionEvent, SessionManager};
