//! Route-level authentication check.

use super::SessionManager;

/// Screens of the dashboard. Everything except `Login` needs a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Travelers,
    TourGuides,
    Cities,
    Destinations,
    Appointments,
}

impl Route {
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow(Route),
    Redirect(Route),
}

/// Decide whether `route` may be shown. Runs before any protected content
/// is rendered, so a missing or expired token never flashes data.
pub fn check(route: Route, session: &SessionManager) -> GateDecision {
    if route.is_protected() && !session.is_valid() {
        GateDecision::Redirect(Route::Login)
    } else {
        GateDecision::Allow(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_route_without_session_redirects() {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = SessionManager::new(dir.path().to_path_buf());
        assert_eq!(
            check(Route::Cities, &session),
            GateDecision::Redirect(Route::Login)
        );
    }

    #[test]
    fn test_login_route_always_allowed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = SessionManager::new(dir.path().to_path_buf());
        assert_eq!(check(Route::Login, &session), GateDecision::Allow(Route::Login));
    }

    #[test]
    fn test_protected_route_with_session_allowed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = SessionManager::new(dir.path().to_path_buf());
        session
            .establish("tok".to_string(), "admin@example.com".to_string())
            .expect("establish");
        assert_eq!(
            check(Route::Appointments, &session),
            GateDecision::Allow(Route::Appointments)
        );
    }
}
