use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Token lifetime in days. Matches the login cookie lifetime of the web dashboard.
const TOKEN_EXPIRY_DAYS: i64 = 7;

/// Capacity of the session event channel. Events are rare (login/logout/expiry).
const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: String, email: String) -> Self {
        Self {
            token,
            email,
            created_at: Utc::now(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::days(TOKEN_EXPIRY_DAYS)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at()
    }

    /// Get days remaining until expiry (for display)
    pub fn days_until_expiry(&self) -> i64 {
        (self.expires_at() - Utc::now()).num_days().max(0)
    }
}

/// Changes in session state, broadcast to every subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    LoggedOut,
    /// The server rejected the token (HTTP 401). Consumers should show the login screen.
    Expired,
}

/// Owns the bearer token: where it is stored, when it is valid, and who
/// hears about it changing.
///
/// Shared as `Arc<SessionManager>` between the API client (which reads the
/// token and reports 401s) and the UI (which subscribes to events).
pub struct SessionManager {
    cache_dir: PathBuf,
    data: Mutex<Option<SessionData>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new(cache_dir: PathBuf) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            cache_dir,
            data: Mutex::new(None),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<SessionData>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load session from disk. Returns true when a valid, unexpired session was found.
    pub fn load(&self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read session file")?;
            let data: SessionData = serde_json::from_str(&contents)
                .context("Failed to parse session file")?;

            if !data.is_expired() {
                debug!(email = %data.email, days_left = data.days_until_expiry(), "Session restored");
                *self.lock() = Some(data);
                return Ok(true);
            }
            debug!("Stored session has expired");
        }
        Ok(false)
    }

    /// Store a freshly issued token and persist it.
    pub fn establish(&self, token: String, email: String) -> Result<()> {
        let data = SessionData::new(token, email);
        self.save(&data)?;
        *self.lock() = Some(data);
        info!("Session established");
        self.notify(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Explicit logout from the UI.
    pub fn logout(&self) -> Result<()> {
        self.clear()?;
        info!("Logged out");
        self.notify(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Called by the API client when the server answers 401. Never fails:
    /// a session file that cannot be removed is logged and the in-memory
    /// token is dropped regardless.
    pub fn expire(&self) {
        let had_session = self.lock().is_some();
        if let Err(e) = self.clear() {
            warn!(error = %e, "Failed to remove session file");
        }
        if had_session {
            warn!("Session rejected by server, login required");
        }
        self.notify(SessionEvent::Expired);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Get the bearer token if the session is valid
    pub fn token(&self) -> Option<String> {
        self.lock()
            .as_ref()
            .filter(|d| !d.is_expired())
            .map(|d| d.token.clone())
    }

    pub fn data(&self) -> Option<SessionData> {
        self.lock().clone()
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.lock().as_ref().map(|d| !d.is_expired()).unwrap_or(false)
    }

    fn clear(&self) -> Result<()> {
        *self.lock() = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn notify(&self, event: SessionEvent) {
        // No receivers is fine: nothing is listening yet during startup.
        let _ = self.events.send(event);
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_data_expiry() {
        let fresh = SessionData::new("tok".to_string(), "a@b.co".to_string());
        assert!(!fresh.is_expired());
        assert_eq!(fresh.days_until_expiry(), 6);

        let mut old = fresh.clone();
        old.created_at = Utc::now() - Duration::days(8);
        assert!(old.is_expired());
        assert_eq!(old.days_until_expiry(), 0);
    }

    #[test]
    fn test_establish_persists_and_reloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = SessionManager::new(dir.path().to_path_buf());
        session
            .establish("secret".to_string(), "admin@example.com".to_string())
            .expect("establish");
        assert_eq!(session.token().as_deref(), Some("secret"));

        let restored = SessionManager::new(dir.path().to_path_buf());
        assert!(restored.load().expect("load"));
        assert_eq!(restored.token().as_deref(), Some("secret"));
    }

    #[test]
    fn test_expired_file_is_not_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut data = SessionData::new("old".to_string(), "a@b.co".to_string());
        data.created_at = Utc::now() - Duration::days(30);
        std::fs::write(
            dir.path().join(SESSION_FILE),
            serde_json::to_string(&data).expect("serialize"),
        )
        .expect("write");

        let session = SessionManager::new(dir.path().to_path_buf());
        assert!(!session.load().expect("load"));
        assert!(!session.is_valid());
    }

    #[test]
    fn test_expire_clears_token_and_notifies() {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = SessionManager::new(dir.path().to_path_buf());
        session
            .establish("secret".to_string(), "admin@example.com".to_string())
            .expect("establish");
        let mut events = session.subscribe();

        session.expire();

        assert!(session.token().is_none());
        assert!(!dir.path().join(SESSION_FILE).exists());
        assert_eq!(events.try_recv().expect("event"), SessionEvent::Expired);
    }

    #[test]
    fn test_logout_notifies() {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = SessionManager::new(dir.path().to_path_buf());
        let mut events = session.subscribe();
        session
            .establish("secret".to_string(), "admin@example.com".to_string())
            .expect("establish");
        session.logout().expect("logout");

        assert_eq!(events.try_recv().expect("event"), SessionEvent::LoggedIn);
        assert_eq!(events.try_recv().expect("event"), SessionEvent::LoggedOut);
        assert!(!session.is_valid());
    }
}
