//! HTTP client for the booking platform's REST API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::SessionManager;
use crate::config::Endpoints;
use crate::models::{
    Appointment, City, CityData, CreateAppointment, CreateDestination, CreateUser, Destination,
    PhotoUpload, UpdateAppointment, UpdateDestination, UpdateUser, User,
};
use crate::utils::format_time;

use super::ApiError;

/// Maximum number of retries for rate-limited (429) GET requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the booking platform.
///
/// The bearer token is read from the shared `SessionManager` on every request,
/// and any 401 expires that session. Clone is cheap: reqwest pools connections
/// behind an `Arc`.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints, session: Arc<SessionManager>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoints,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoints.api_url, path)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoints.auth_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = self.session.token() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Turn a non-2xx response into an `ApiError`. A 401 from any endpoint
    /// expires the session so subscribers can show the login screen.
    pub fn classify_failure(&self, status: StatusCode, body: &str) -> ApiError {
        let err = ApiError::from_status(status, body);
        if matches!(err, ApiError::Unauthorized { .. }) {
            self.session.expire();
        }
        err
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should
    /// retry), or Err for other errors.
    async fn check_response_for_retry(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Ok(None);
        }
        self.check_response(response).await.map(Some)
    }

    async fn check_response(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, "Request failed");
            Err(self.classify_failure(status, &body).into())
        }
    }

    async fn read_json(response: reqwest::Response, url: &str) -> Result<Value> {
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn get_value(&self, url: &str) -> Result<Value> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .headers(self.auth_headers()?)
                .send()
                .await
                .map_err(ApiError::from)?;

            match self.check_response_for_retry(response).await? {
                Some(response) => return Self::read_json(response, url).await,
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited { message: None }.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, key: &str) -> Result<T> {
        let body = self.get_value(url).await?;
        envelope(body, key)
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: &B,
        key: &str,
    ) -> Result<T> {
        let response = self
            .client
            .request(method, url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)?;
        let response = self.check_response(response).await?;
        envelope(Self::read_json(response, url).await?, key)
    }

    async fn send_multipart<T: DeserializeOwned>(&self, url: &str, form: Form, key: &str) -> Result<T> {
        let response = self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::from)?;
        let response = self.check_response(response).await?;
        envelope(Self::read_json(response, url).await?, key)
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .delete(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)?;
        let response = self.check_response(response).await?;
        confirm_deleted(&Self::read_json(response, url).await?)
    }

    // ===== Authentication =====

    /// Exchange credentials for a bearer token. Rejected credentials are a
    /// validation failure, not a session expiry.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let url = self.auth_url("/login");
        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY => ApiError::validation(
                    ApiError::server_message(&body)
                        .unwrap_or_else(|| "Invalid email or password".to_string()),
                ),
                _ => ApiError::from_status(status, &body),
            }
            .into());
        }

        envelope(Self::read_json(response, &url).await?, "token")
    }

    /// The account the current token belongs to.
    pub async fn me(&self) -> Result<User> {
        self.get(&self.auth_url("/me"), "data").await
    }

    // ===== Users =====

    pub async fn fetch_users(&self) -> Result<Vec<User>> {
        self.get(&self.api_url("/users"), "data").await
    }

    pub async fn fetch_user(&self, id: i64) -> Result<User> {
        self.get(&self.api_url(&format!("/users/{}", id)), "data").await
    }

    pub async fn create_user(&self, data: &CreateUser) -> Result<User> {
        let form = multipart_form(create_user_fields(data), data.photo_profile.as_ref())?;
        self.send_multipart(&self.api_url("/users"), form, "user").await
    }

    /// Updates go through POST: PHP backends only parse multipart bodies on POST.
    pub async fn update_user(&self, id: i64, data: &UpdateUser) -> Result<User> {
        let form = multipart_form(update_user_fields(data), data.photo_profile.as_ref())?;
        self.send_multipart(&self.api_url(&format!("/users/{}", id)), form, "data")
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        self.delete(&self.api_url(&format!("/users/{}", id))).await
    }

    // ===== Cities =====

    pub async fn fetch_cities(&self) -> Result<Vec<City>> {
        self.get(&self.api_url("/cities"), "cities").await
    }

    pub async fn fetch_city(&self, id: i64) -> Result<City> {
        self.get(&self.api_url(&format!("/cities/{}", id)), "city").await
    }

    pub async fn create_city(&self, data: &CityData) -> Result<City> {
        let form = multipart_form(vec![("name", data.name.clone())], None)?;
        self.send_multipart(&self.api_url("/cities"), form, "city").await
    }

    pub async fn update_city(&self, id: i64, data: &CityData) -> Result<City> {
        let form = multipart_form(vec![("name", data.name.clone())], None)?;
        self.send_multipart(&self.api_url(&format!("/cities/{}", id)), form, "city")
            .await
    }

    pub async fn delete_city(&self, id: i64) -> Result<()> {
        self.delete(&self.api_url(&format!("/cities/{}", id))).await
    }

    // ===== Destinations =====

    pub async fn fetch_destinations(&self) -> Result<Vec<Destination>> {
        self.get(&self.api_url("/destinations"), "destinations").await
    }

    pub async fn create_destination(&self, data: &CreateDestination) -> Result<Destination> {
        self.send_json(Method::POST, &self.api_url("/destinations"), data, "destination")
            .await
    }

    pub async fn update_destination(&self, id: i64, data: &UpdateDestination) -> Result<Destination> {
        let url = self.api_url(&format!("/destinations/{}", id));
        self.send_json(Method::PATCH, &url, data, "destination").await
    }

    pub async fn delete_destination(&self, id: i64) -> Result<()> {
        self.delete(&self.api_url(&format!("/destinations/{}", id))).await
    }

    // ===== Appointments =====

    pub async fn fetch_appointments(&self) -> Result<Vec<Appointment>> {
        self.get(&self.api_url("/appointments"), "data").await
    }

    pub async fn create_appointment(&self, data: &CreateAppointment) -> Result<Appointment> {
        self.send_json(Method::POST, &self.api_url("/appointments"), data, "appointment")
            .await
    }

    pub async fn update_appointment(&self, id: i64, data: &UpdateAppointment) -> Result<Appointment> {
        let url = self.api_url(&format!("/appointments/{}", id));
        let payload = trim_appointment_times(data);
        self.send_json(Method::PATCH, &url, &payload, "appointment").await
    }

    pub async fn delete_appointment(&self, id: i64) -> Result<()> {
        self.delete(&self.api_url(&format!("/appointments/{}", id))).await
    }
}

/// Pull `key` out of a response envelope such as `{"cities": [...]}`.
fn envelope<T: DeserializeOwned>(mut body: Value, key: &str) -> Result<T> {
    let value = body
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| ApiError::InvalidResponse(format!("Response is missing `{}`", key)))?;
    serde_json::from_value(value).with_context(|| format!("Failed to decode `{}` from response", key))
}

/// Deletes answer `{"success": true}`; an explicit `false` is a failure.
fn confirm_deleted(body: &Value) -> Result<()> {
    match body.get("success").and_then(Value::as_bool) {
        Some(false) => {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Delete was not confirmed by the server");
            Err(ApiError::server_error(message).into())
        }
        _ => Ok(()),
    }
}

fn create_user_fields(data: &CreateUser) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("name", data.name.clone()),
        ("email", data.email.clone()),
        ("role_id", data.role_id.to_string()),
        ("password", data.password.clone()),
        ("password_confirmation", data.password_confirmation.clone()),
    ];
    push_optional(&mut fields, "city_id", data.city_id.clone());
    push_optional(&mut fields, "description", data.description.clone());
    push_optional(&mut fields, "is_active", data.is_active.map(|v| v.to_string()));
    push_optional(&mut fields, "price", data.price.clone());
    fields
}

/// Only fields that are set are sent; the server keeps the rest.
fn update_user_fields(data: &UpdateUser) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    push_optional(&mut fields, "name", data.name.clone());
    push_optional(&mut fields, "email", data.email.clone());
    push_optional(&mut fields, "city_id", data.city_id.clone());
    push_optional(&mut fields, "is_active", data.is_active.map(|v| v.to_string()));
    push_optional(&mut fields, "description", data.description.clone());
    push_optional(&mut fields, "price", data.price.clone());
    fields
}

fn push_optional(fields: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        fields.push((name, value));
    }
}

fn multipart_form(fields: Vec<(&'static str, String)>, photo: Option<&PhotoUpload>) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    if let Some(photo) = photo {
        let part = Part::bytes(photo.bytes.clone())
            .file_name(photo.file_name.clone())
            .mime_str(&photo.mime_type)
            .context("Invalid photo MIME type")?;
        form = form.part("photo_profile", part);
    }
    Ok(form)
}

/// The appointments endpoint accepts `HH:MM` only; stored values carry seconds.
fn trim_appointment_times(data: &UpdateAppointment) -> UpdateAppointment {
    UpdateAppointment {
        start_time: data.start_time.as_deref().map(format_time),
        end_time: data.end_time.as_deref().map(format_time),
        ..data.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionEvent;
    use crate::models::AppointmentStatus;

    fn client(dir: &tempfile::TempDir) -> ApiClient {
        let session = Arc::new(SessionManager::new(dir.path().to_path_buf()));
        let endpoints = Endpoints {
            api_url: "http://localhost:8000/api".to_string(),
            auth_url: "http://localhost:8000/api".to_string(),
        };
        ApiClient::new(endpoints, session, Duration::from_secs(10)).expect("client")
    }

    #[test]
    fn test_unauthorized_expires_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = client(&dir);
        client
            .session()
            .establish("tok".to_string(), "admin@example.com".to_string())
            .expect("establish");
        let mut events = client.session().subscribe();

        let err = client.classify_failure(StatusCode::UNAUTHORIZED, r#"{"message":"Unauthenticated."}"#);

        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert!(client.session().token().is_none());
        assert_eq!(events.try_recv().expect("event"), SessionEvent::Expired);
    }

    /// Answer one request on a local port with a canned response.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    fn client_at(dir: &tempfile::TempDir, base: String) -> ApiClient {
        let session = Arc::new(SessionManager::new(dir.path().to_path_buf()));
        session
            .establish("tok".to_string(), "admin@example.com".to_string())
            .expect("establish");
        let endpoints = Endpoints {
            api_url: base.clone(),
            auth_url: base,
        };
        ApiClient::new(endpoints, session, Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn test_unauthorized_response_expires_session() {
        let base = serve_once("401 Unauthorized", r#"{"message":"Unauthenticated."}"#).await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = client_at(&dir, base);
        let mut events = client.session().subscribe();

        let err = client.fetch_cities().await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Unauthorized { .. })
        ));
        assert!(client.session().token().is_none());
        assert_eq!(events.try_recv().expect("event"), SessionEvent::Expired);
    }

    #[tokio::test]
    async fn test_html_error_page_is_not_user_facing() {
        let base = serve_once("502 Bad Gateway", "<html><body>502 Bad Gateway</body></html>").await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = client_at(&dir, base);

        let err = client.delete_city(4).await.unwrap_err();

        let api = err.downcast_ref::<ApiError>().expect("api error");
        assert!(matches!(api, ApiError::ServerError { .. }));
        assert_eq!(api.user_message(), None);
        assert_eq!(client.session().token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_other_failures_keep_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = client(&dir);
        client
            .session()
            .establish("tok".to_string(), "admin@example.com".to_string())
            .expect("establish");

        let err = client.classify_failure(StatusCode::UNPROCESSABLE_ENTITY, r#"{"message":"Name taken"}"#);

        assert_eq!(err.user_message().as_deref(), Some("Name taken"));
        assert_eq!(client.session().token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_auth_headers_carry_current_token() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = client(&dir);
        assert!(client.auth_headers().expect("headers").get(header::AUTHORIZATION).is_none());

        client
            .session()
            .establish("abc".to_string(), "admin@example.com".to_string())
            .expect("establish");
        let headers = client.auth_headers().expect("headers");
        assert_eq!(
            headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer abc")
        );
    }

    #[test]
    fn test_envelope_extracts_key() {
        let body = serde_json::json!({"cities": [{"id": 1, "name": "Bandung"}]});
        let cities: Vec<City> = envelope(body, "cities").expect("cities");
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].name, "Bandung");
    }

    #[test]
    fn test_envelope_missing_key_is_invalid_response() {
        let err = envelope::<Vec<City>>(serde_json::json!({"data": []}), "cities").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_confirm_deleted() {
        assert!(confirm_deleted(&serde_json::json!({"success": true})).is_ok());
        assert!(confirm_deleted(&serde_json::json!({})).is_ok());
        let err = confirm_deleted(&serde_json::json!({"success": false, "message": "In use"}))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ApiError>().and_then(ApiError::user_message).as_deref(),
            Some("In use")
        );
    }

    #[test]
    fn test_update_user_fields_only_present() {
        let data = UpdateUser {
            name: Some("Rina".to_string()),
            price: Some("  ".to_string()),
            is_active: Some(1),
            ..Default::default()
        };
        let fields = update_user_fields(&data);
        assert_eq!(
            fields,
            vec![("name", "Rina".to_string()), ("is_active", "1".to_string())]
        );
    }

    #[test]
    fn test_create_user_fields_required_first() {
        let data = CreateUser {
            role_id: 3,
            name: "Budi".to_string(),
            email: "budi@example.com".to_string(),
            password: "secret".to_string(),
            password_confirmation: "secret".to_string(),
            photo_profile: None,
            city_id: None,
            description: None,
            is_active: None,
            price: None,
        };
        let names: Vec<_> = create_user_fields(&data).into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["name", "email", "role_id", "password", "password_confirmation"]
        );
    }

    #[test]
    fn test_update_appointment_trims_times() {
        let data = UpdateAppointment {
            start_time: Some("09:30:00".to_string()),
            end_time: Some("11:00".to_string()),
            status: Some(AppointmentStatus::Confirmed),
            ..Default::default()
        };
        let trimmed = trim_appointment_times(&data);
        assert_eq!(trimmed.start_time.as_deref(), Some("09:30"));
        assert_eq!(trimmed.end_time.as_deref(), Some("11:00"));
        assert_eq!(trimmed.status, Some(AppointmentStatus::Confirmed));
    }
}
