use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::cache::{upsert_by_key, KeyedCache};

use super::Resource;

/// Shown when a request never produced an HTTP response.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// A transient message for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Pick the user-facing message for a failed call: the server's `message`
/// field, else `fallback` for HTTP failures, else `UNKNOWN_ERROR`.
pub fn failure_message(err: &anyhow::Error, fallback: &str) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api) if api.is_http_response() => api
            .user_message()
            .unwrap_or_else(|| fallback.to_string()),
        _ => UNKNOWN_ERROR.to_string(),
    }
}

/// CRUD state for one resource screen.
///
/// Reads go through the shared `KeyedCache`; successful mutations patch both
/// the local list and the cache. Failures become a `Notice::Error` and the
/// `error` string, and the call returns `None`, `false` or an empty list.
pub struct ResourceService<R: Resource> {
    resource: R,
    cache: Arc<KeyedCache<R::Item>>,
    notices: mpsc::UnboundedSender<Notice>,
    items: Arc<Vec<R::Item>>,
    loading: bool,
    error: Option<String>,
}

impl<R: Resource> ResourceService<R> {
    pub fn new(
        resource: R,
        cache: Arc<KeyedCache<R::Item>>,
        notices: mpsc::UnboundedSender<Notice>,
    ) -> Self {
        Self {
            resource,
            cache,
            notices,
            items: Arc::new(Vec::new()),
            loading: false,
            error: None,
        }
    }

    pub fn items(&self) -> &[R::Item] {
        &self.items
    }

    pub fn find(&self, id: i64) -> Option<&R::Item> {
        self.items.iter().find(|item| R::key(item) == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cache(&self) -> &Arc<KeyedCache<R::Item>> {
        &self.cache
    }

    /// Load the collection, from the cache when it is still fresh.
    pub async fn load(&mut self) -> Arc<Vec<R::Item>> {
        self.begin();
        let resource = &self.resource;
        let mut fetched = false;
        let result = self
            .cache
            .get_or_fetch(|| {
                fetched = true;
                resource.list()
            })
            .await;
        self.loading = false;

        match result {
            Ok(items) => {
                if fetched {
                    info!(resource = R::PLURAL, count = items.len(), "Fetched collection");
                    self.notify(Notice::Success(format!("Successfully fetched all {}", R::PLURAL)));
                } else {
                    debug!(resource = R::PLURAL, "Served from cache");
                }
                self.items = Arc::clone(&items);
                items
            }
            Err(e) => {
                self.fail(e, R::FAILURES.list);
                Arc::new(Vec::new())
            }
        }
    }

    /// Drop the cached collection and fetch it again.
    pub async fn refresh(&mut self) -> Arc<Vec<R::Item>> {
        self.cache.invalidate();
        self.load().await
    }

    /// Fetch a single record and patch it into the list. Falls back to the
    /// loaded copy when the API has no single-record endpoint.
    pub async fn fetch_one(&mut self, id: i64) -> Option<R::Item> {
        self.begin();
        let result = self.resource.get(id).await;
        self.loading = false;

        match result {
            Ok(Some(item)) => {
                self.patch(item.clone());
                Some(item)
            }
            Ok(None) => self.find(id).cloned(),
            Err(e) => {
                self.fail(e, R::FAILURES.fetch_one);
                None
            }
        }
    }

    pub async fn create(&mut self, data: &R::Create) -> Option<R::Item> {
        self.begin();
        let result = self.resource.create(data).await;
        self.loading = false;

        match result {
            Ok(item) => {
                info!(resource = R::PLURAL, id = R::key(&item), "Created");
                self.patch(item.clone());
                self.notify(Notice::Success(format!("{} created successfully", R::SINGULAR)));
                Some(item)
            }
            Err(e) => {
                self.fail(e, R::FAILURES.create);
                None
            }
        }
    }

    pub async fn update(&mut self, id: i64, data: &R::Update) -> Option<R::Item> {
        self.begin();
        let result = self.resource.update(id, data).await;
        self.loading = false;

        match result {
            Ok(item) => {
                info!(resource = R::PLURAL, id, "Updated");
                self.patch(item.clone());
                self.notify(Notice::Success(format!("{} updated successfully", R::SINGULAR)));
                Some(item)
            }
            Err(e) => {
                self.fail(e, R::FAILURES.update);
                None
            }
        }
    }

    pub async fn delete(&mut self, id: i64) -> bool {
        self.begin();
        let result = self.resource.delete(id).await;
        self.loading = false;

        match result {
            Ok(()) => {
                info!(resource = R::PLURAL, id, "Deleted");
                self.cache.remove(id);
                Arc::make_mut(&mut self.items).retain(|item| R::key(item) != id);
                self.notify(Notice::Success(format!("{} deleted successfully", R::SINGULAR)));
                true
            }
            Err(e) => {
                self.fail(e, R::FAILURES.delete);
                false
            }
        }
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn patch(&mut self, item: R::Item) {
        self.cache.upsert(item.clone());
        upsert_by_key(Arc::make_mut(&mut self.items), item, R::key);
    }

    fn fail(&mut self, err: anyhow::Error, fallback: &str) {
        let message = failure_message(&err, fallback);
        warn!(resource = R::PLURAL, error = %err, "{}", message);
        self.error = Some(message.clone());
        self.notify(Notice::Error(message));
    }

    fn notify(&self, notice: Notice) {
        // The receiver only goes away during shutdown.
        let _ = self.notices.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration as StdDuration;

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::Duration;
    use reqwest::StatusCode;

    use crate::api::ApiClient;
    use crate::auth::{SessionEvent, SessionManager};
    use crate::config::Endpoints;
    use crate::models::{City, CityData};
    use crate::resource::FailureText;

    #[derive(Clone, Copy)]
    enum Failure {
        Http(StatusCode, &'static str),
        Transport,
    }

    /// In-memory `/cities` that counts list calls and can be told to fail.
    struct FakeCities {
        client: ApiClient,
        rows: Mutex<Vec<City>>,
        list_calls: Arc<AtomicUsize>,
        next_id: AtomicI64,
        failure: Mutex<Option<Failure>>,
    }

    impl FakeCities {
        fn check(&self) -> Result<()> {
            match *self.failure.lock().expect("lock") {
                None => Ok(()),
                Some(Failure::Http(status, body)) => Err(self.client.classify_failure(status, body).into()),
                Some(Failure::Transport) => Err(anyhow::anyhow!("connection refused")),
            }
        }
    }

    #[async_trait]
    impl Resource for FakeCities {
        type Item = City;
        type Create = CityData;
        type Update = CityData;

        const SINGULAR: &'static str = "City";
        const PLURAL: &'static str = "cities";
        const FAILURES: FailureText = FailureText {
            list: "Failed to fetch cities data",
            fetch_one: "Failed to fetch city data",
            create: "Failed to create a new city",
            update: "Failed to update city data",
            delete: "Failed to delete city data",
        };

        fn key(item: &City) -> i64 {
            item.id
        }

        async fn list(&self) -> Result<Vec<City>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self.rows.lock().expect("lock").clone())
        }

        async fn create(&self, data: &CityData) -> Result<City> {
            self.check()?;
            let city = City {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                name: data.name.clone(),
            };
            self.rows.lock().expect("lock").push(city.clone());
            Ok(city)
        }

        async fn update(&self, id: i64, data: &CityData) -> Result<City> {
            self.check()?;
            Ok(City {
                id,
                name: data.name.clone(),
            })
        }

        async fn delete(&self, id: i64) -> Result<()> {
            self.check()?;
            self.rows.lock().expect("lock").retain(|c| c.id != id);
            Ok(())
        }
    }

    struct Harness {
        service: ResourceService<FakeCities>,
        notices: mpsc::UnboundedReceiver<Notice>,
        list_calls: Arc<AtomicUsize>,
        session: Arc<SessionManager>,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        fn fail_with(&self, failure: Failure) {
            *self.service.resource.failure.lock().expect("lock") = Some(failure);
        }

        fn last_notice(&mut self) -> Option<Notice> {
            let mut last = None;
            while let Ok(notice) = self.notices.try_recv() {
                last = Some(notice);
            }
            last
        }
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = Arc::new(SessionManager::new(dir.path().to_path_buf()));
        session
            .establish("tok".to_string(), "admin@example.com".to_string())
            .expect("establish");
        let endpoints = Endpoints {
            api_url: "http://localhost:8000/api".to_string(),
            auth_url: "http://localhost:8000/api".to_string(),
        };
        let client = ApiClient::new(endpoints, Arc::clone(&session), StdDuration::from_secs(10))
            .expect("client");

        let list_calls = Arc::new(AtomicUsize::new(0));
        let fake = FakeCities {
            client,
            rows: Mutex::new(vec![
                City { id: 1, name: "Bandung".to_string() },
                City { id: 2, name: "Yogyakarta".to_string() },
            ]),
            list_calls: Arc::clone(&list_calls),
            next_id: AtomicI64::new(3),
            failure: Mutex::new(None),
        };
        let cache = Arc::new(KeyedCache::new("cities", Duration::minutes(5), FakeCities::key));
        let (tx, rx) = mpsc::unbounded_channel();

        Harness {
            service: ResourceService::new(fake, cache, tx),
            notices: rx,
            list_calls,
            session,
            _dir: dir,
        }
    }

    fn city(name: &str) -> CityData {
        CityData {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_second_load_within_ttl_hits_cache() {
        let mut h = harness();

        let first = h.service.load().await;
        let second = h.service.load().await;

        assert_eq!(h.list_calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(h.service.items().len(), 2);
    }

    #[tokio::test]
    async fn test_load_after_ttl_refetches() {
        let mut h = harness();

        h.service.load().await;
        h.service.cache().backdate(Duration::minutes(6));
        h.service.load().await;

        assert_eq!(h.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_always_refetches() {
        let mut h = harness();

        h.service.load().await;
        h.service.refresh().await;

        assert_eq!(h.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_appears_once_in_state_and_cache() {
        let mut h = harness();
        h.service.load().await;

        let created = h.service.create(&city("Malang")).await.expect("created");

        let in_state = h.service.items().iter().filter(|c| c.id == created.id).count();
        let cached = h.service.cache().snapshot().expect("cached");
        let in_cache = cached.iter().filter(|c| c.id == created.id).count();
        assert_eq!(in_state, 1);
        assert_eq!(in_cache, 1);
        assert_eq!(
            h.last_notice(),
            Some(Notice::Success("City created successfully".to_string()))
        );
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let mut h = harness();
        h.service.load().await;

        h.service.update(2, &city("Jogja")).await.expect("updated");

        assert_eq!(h.service.find(2).map(|c| c.name.as_str()), Some("Jogja"));
        assert_eq!(h.service.items().len(), 2);
        let cached = h.service.cache().snapshot().expect("cached");
        assert!(cached.iter().any(|c| c.id == 2 && c.name == "Jogja"));
    }

    #[tokio::test]
    async fn test_delete_removes_from_state_and_cache() {
        let mut h = harness();
        h.service.load().await;

        assert!(h.service.delete(1).await);

        assert!(h.service.find(1).is_none());
        let cached = h.service.cache().snapshot().expect("cached");
        assert!(cached.iter().all(|c| c.id != 1));
    }

    #[tokio::test]
    async fn test_mutation_before_load_leaves_cache_empty() {
        let mut h = harness();

        h.service.create(&city("Malang")).await.expect("created");

        assert!(h.service.cache().snapshot().is_none());
        assert_eq!(h.service.items().len(), 1);
    }

    #[tokio::test]
    async fn test_server_message_wins() {
        let mut h = harness();
        h.fail_with(Failure::Http(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"The name has already been taken."}"#,
        ));

        assert!(h.service.create(&city("Bandung")).await.is_none());

        assert_eq!(h.service.error(), Some("The name has already been taken."));
        assert_eq!(
            h.last_notice(),
            Some(Notice::Error("The name has already been taken.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_fallback_message_without_server_message() {
        let mut h = harness();
        h.fail_with(Failure::Http(StatusCode::INTERNAL_SERVER_ERROR, ""));

        let items = h.service.load().await;

        assert!(items.is_empty());
        assert_eq!(h.service.error(), Some("Failed to fetch cities data"));
        assert!(!h.service.is_loading());
    }

    #[tokio::test]
    async fn test_html_error_body_uses_fallback() {
        let mut h = harness();
        h.fail_with(Failure::Http(
            StatusCode::BAD_GATEWAY,
            "<html><body>502 Bad Gateway</body></html>",
        ));

        h.service.load().await;

        assert_eq!(h.service.error(), Some("Failed to fetch cities data"));
    }

    #[tokio::test]
    async fn test_json_body_without_message_uses_fallback() {
        let mut h = harness();
        h.fail_with(Failure::Http(StatusCode::NOT_FOUND, r#"{"error":"nope"}"#));

        assert!(h.service.create(&city("Malang")).await.is_none());
        assert_eq!(h.service.error(), Some("Failed to create a new city"));

        assert!(!h.service.delete(1).await);
        assert_eq!(
            h.last_notice(),
            Some(Notice::Error("Failed to delete city data".to_string()))
        );
    }

    #[test]
    fn test_failure_message_never_shows_raw_body() {
        let err = anyhow::Error::from(ApiError::from_status(StatusCode::NOT_FOUND, r#"{"error":"nope"}"#));
        assert_eq!(failure_message(&err, "Failed to delete city"), "Failed to delete city");

        let err = anyhow::Error::from(ApiError::from_status(StatusCode::FORBIDDEN, r#"{"message":"Forbidden."}"#));
        assert_eq!(failure_message(&err, "Failed to delete city"), "Forbidden.");
    }

    #[tokio::test]
    async fn test_transport_failure_is_unknown_error() {
        let mut h = harness();
        h.fail_with(Failure::Transport);

        assert!(!h.service.delete(1).await);

        assert_eq!(h.service.error(), Some(UNKNOWN_ERROR));
    }

    #[tokio::test]
    async fn test_unauthorized_expires_session() {
        let mut h = harness();
        let mut events = h.session.subscribe();
        h.fail_with(Failure::Http(StatusCode::UNAUTHORIZED, r#"{"message":"Unauthenticated."}"#));

        let items = h.service.load().await;

        assert!(items.is_empty());
        assert!(!h.session.is_valid());
        assert_eq!(events.try_recv().expect("event"), SessionEvent::Expired);
        assert!(h.last_notice().map(|n| n.is_error()).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_error_cleared_on_next_success() {
        let mut h = harness();
        h.fail_with(Failure::Transport);
        h.service.load().await;
        assert!(h.service.error().is_some());

        *h.service.resource.failure.lock().expect("lock") = None;
        h.service.load().await;

        assert!(h.service.error().is_none());
    }
}
