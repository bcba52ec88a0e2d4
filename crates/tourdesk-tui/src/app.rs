//! Application state management for the tourdesk dashboard.
//!
//! This module contains the core `App` struct that owns the session, the API
//! client, one resource service per collection and all UI state (current tab,
//! paging, search, the open form and pending confirmations).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use tourdesk_core::auth::gate::{self, GateDecision, Route};
use tourdesk_core::auth::{CredentialStore, SessionEvent, SessionManager};
use tourdesk_core::form::{
    AppointmentDraft, CityDraft, DestinationDraft, Draft, FieldKind, FieldSpec, Form,
    UserCreateDraft, UserUpdateDraft,
};
use tourdesk_core::models::{
    Appointment, City, Destination, Role, UpdateAppointment, UpdateDestination, User,
};
use tourdesk_core::resource::{
    failure_message, AppointmentsApi, CitiesApi, DestinationsApi, Notice, ResourceService,
    UsersApi,
};
use tourdesk_core::utils::{contains_ignore_case, Pager, APPOINTMENT_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use tourdesk_core::{ApiClient, ApiError, Config, KeyedCache};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for email input.
const MAX_EMAIL_LENGTH: usize = 100;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a single form field.
const MAX_FIELD_LENGTH: usize = 255;

pub const EMAIL_ENV: &str = "TOURDESK_EMAIL";
pub const PASSWORD_ENV: &str = "TOURDESK_PASSWORD";

// ============================================================================
// Tabs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Travelers,
    TourGuides,
    Cities,
    Destinations,
    Appointments,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Travelers,
        Tab::TourGuides,
        Tab::Cities,
        Tab::Destinations,
        Tab::Appointments,
    ];

    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Travelers => "Travelers",
            Tab::TourGuides => "Tour Guides",
            Tab::Cities => "Cities",
            Tab::Destinations => "Destinations",
            Tab::Appointments => "Appointments",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Travelers => Tab::TourGuides,
            Tab::TourGuides => Tab::Cities,
            Tab::Cities => Tab::Destinations,
            Tab::Destinations => Tab::Appointments,
            Tab::Appointments => Tab::Travelers,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Travelers => Tab::Appointments,
            Tab::TourGuides => Tab::Travelers,
            Tab::Cities => Tab::TourGuides,
            Tab::Destinations => Tab::Cities,
            Tab::Appointments => Tab::Destinations,
        }
    }

    pub fn route(&self) -> Route {
        match self {
            Tab::Travelers => Route::Travelers,
            Tab::TourGuides => Route::TourGuides,
            Tab::Cities => Route::Cities,
            Tab::Destinations => Route::Destinations,
            Tab::Appointments => Route::Appointments,
        }
    }

    fn index(&self) -> usize {
        match self {
            Tab::Travelers => 0,
            Tab::TourGuides => 1,
            Tab::Cities => 2,
            Tab::Destinations => 3,
            Tab::Appointments => 4,
        }
    }

    fn page_size(&self) -> usize {
        match self {
            Tab::Appointments => APPOINTMENT_PAGE_SIZE,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    /// The role a users tab lists, if it is one.
    pub fn role(&self) -> Option<Role> {
        match self {
            Tab::Travelers => Some(Role::Traveler),
            Tab::TourGuides => Some(Role::TourGuide),
            _ => None,
        }
    }
}

/// Paging and row selection for one table. `selection` is relative to the
/// current page.
#[derive(Debug, Clone, Copy)]
pub struct TableView {
    pub pager: Pager,
    pub selection: usize,
}

impl TableView {
    fn new(page_size: usize) -> Self {
        Self {
            pager: Pager::new(page_size),
            selection: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    EditingForm,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Remember,
    Button,
}

// ============================================================================
// Form modal
// ============================================================================

/// The parts of a `Form` the modal needs, independent of the draft type.
pub trait FormView {
    fn fields(&self) -> Vec<FieldSpec>;
    fn input(&self, key: &str) -> String;
    fn error(&self, key: &str) -> Option<&str>;
    fn update_field(&mut self, key: &str, input: &str);
    fn cycle_choice(&mut self, key: &str, forward: bool);
    fn is_submitting(&self) -> bool;
}

impl<D: Draft> FormView for Form<D> {
    fn fields(&self) -> Vec<FieldSpec> {
        Form::fields(self)
    }

    fn input(&self, key: &str) -> String {
        Form::input(self, key)
    }

    fn error(&self, key: &str) -> Option<&str> {
        Form::error(self, key)
    }

    fn update_field(&mut self, key: &str, input: &str) {
        Form::update_field(self, key, input)
    }

    fn cycle_choice(&mut self, key: &str, forward: bool) {
        Form::cycle_choice(self, key, forward)
    }

    fn is_submitting(&self) -> bool {
        Form::is_submitting(self)
    }
}

/// Which record a modal creates or edits. Edits carry the record id.
pub enum FormKind {
    CreateUser(Form<UserCreateDraft>),
    EditUser(i64, Form<UserUpdateDraft>),
    CreateCity(Form<CityDraft>),
    EditCity(i64, Form<CityDraft>),
    CreateDestination(Form<DestinationDraft>),
    EditDestination(i64, Form<DestinationDraft>),
    CreateAppointment(Form<AppointmentDraft>),
    EditAppointment(i64, Form<AppointmentDraft>),
}

/// An open create/update form plus the focused row. Focus one past the
/// last field is the Save button.
pub struct FormModal {
    pub kind: FormKind,
    pub focus: usize,
}

impl FormModal {
    pub fn new(kind: FormKind) -> Self {
        Self { kind, focus: 0 }
    }

    pub fn title(&self) -> String {
        match &self.kind {
            FormKind::CreateUser(form) => match form.draft().role {
                Role::TourGuide => "New Tour Guide".to_string(),
                _ => "New Traveler".to_string(),
            },
            FormKind::EditUser(id, _) => format!("Edit User #{}", id),
            FormKind::CreateCity(_) => "New City".to_string(),
            FormKind::EditCity(id, _) => format!("Edit City #{}", id),
            FormKind::CreateDestination(_) => "New Destination".to_string(),
            FormKind::EditDestination(id, _) => format!("Edit Destination #{}", id),
            FormKind::CreateAppointment(_) => "New Appointment".to_string(),
            FormKind::EditAppointment(id, _) => format!("Edit Appointment #{}", id),
        }
    }

    pub fn form(&self) -> &dyn FormView {
        match &self.kind {
            FormKind::CreateUser(form) => form,
            FormKind::EditUser(_, form) => form,
            FormKind::CreateCity(form) | FormKind::EditCity(_, form) => form,
            FormKind::CreateDestination(form) | FormKind::EditDestination(_, form) => form,
            FormKind::CreateAppointment(form) | FormKind::EditAppointment(_, form) => form,
        }
    }

    pub fn form_mut(&mut self) -> &mut dyn FormView {
        match &mut self.kind {
            FormKind::CreateUser(form) => form,
            FormKind::EditUser(_, form) => form,
            FormKind::CreateCity(form) | FormKind::EditCity(_, form) => form,
            FormKind::CreateDestination(form) | FormKind::EditDestination(_, form) => form,
            FormKind::CreateAppointment(form) | FormKind::EditAppointment(_, form) => form,
        }
    }

    pub fn on_button(&self) -> bool {
        self.focus >= self.form().fields().len()
    }

    pub fn focused_field(&self) -> Option<FieldSpec> {
        self.form().fields().get(self.focus).copied()
    }

    pub fn focus_next(&mut self) {
        let stops = self.form().fields().len() + 1;
        self.focus = (self.focus.min(stops - 1) + 1) % stops;
    }

    pub fn focus_prev(&mut self) {
        let stops = self.form().fields().len() + 1;
        self.focus = (self.focus.min(stops - 1) + stops - 1) % stops;
    }

    /// Append to the focused text field. Choice fields ignore typing.
    pub fn push_char(&mut self, c: char) {
        let Some(field) = self.focused_field() else {
            return;
        };
        if matches!(field.kind, FieldKind::Choice(_)) {
            return;
        }
        let mut text = self.form().input(field.key);
        if can_add_field_char(text.chars().count(), c) {
            text.push(c);
            self.form_mut().update_field(field.key, &text);
        }
    }

    pub fn pop_char(&mut self) {
        let Some(field) = self.focused_field() else {
            return;
        };
        if matches!(field.kind, FieldKind::Choice(_)) {
            return;
        }
        let mut text = self.form().input(field.key);
        if text.pop().is_some() {
            self.form_mut().update_field(field.key, &text);
        }
    }

    /// Step the focused choice field. Returns false on other field kinds.
    pub fn cycle(&mut self, forward: bool) -> bool {
        match self.focused_field() {
            Some(field) if matches!(field.kind, FieldKind::Choice(_)) => {
                self.form_mut().cycle_choice(field.key, forward);
                // Switching role can shrink the field list under the cursor.
                let stops = self.form().fields().len() + 1;
                self.focus = self.focus.min(stops - 1);
                true
            }
            _ => false,
        }
    }
}

/// A record waiting on delete confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub tab: Tab,
    pub id: i64,
    pub label: String,
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub config: Config,
    pub session: Arc<SessionManager>,
    pub api: ApiClient,

    // Resource services. Both user tabs share `users`.
    pub users: ResourceService<UsersApi>,
    pub cities: ResourceService<CitiesApi>,
    pub destinations: ResourceService<DestinationsApi>,
    pub appointments: ResourceService<AppointmentsApi>,

    notices: mpsc::UnboundedReceiver<Notice>,
    session_events: broadcast::Receiver<SessionEvent>,

    /// The logged-in admin, from `/me`.
    pub current_user: Option<User>,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    views: [TableView; 5],
    pub search_query: String,
    pub modal: Option<FormModal>,
    pub delete_target: Option<DeleteTarget>,
    pub status: Option<Notice>,

    // Login form
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
    pub remember_password: bool,
}

impl App {
    pub async fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        let mut app = Self::with_config(config, cache_dir)?;

        match app.session.load() {
            Ok(true) => debug!("Session loaded"),
            Ok(false) => debug!("No stored session"),
            Err(e) => warn!(error = %e, "Failed to load session"),
        }

        // Get credentials from env vars, then config and the keychain
        app.login_email = std::env::var(EMAIL_ENV)
            .ok()
            .or_else(|| app.config.last_email.clone())
            .unwrap_or_default();
        app.login_password = std::env::var(PASSWORD_ENV).ok().unwrap_or_else(|| {
            if app.remember_password && !app.login_email.is_empty() {
                CredentialStore::get_password(&app.login_email).unwrap_or_default()
            } else {
                String::new()
            }
        });

        Ok(app)
    }

    /// Wire up the session, client, caches and services without touching
    /// the network or the stored session file.
    pub fn with_config(config: Config, cache_dir: PathBuf) -> Result<Self> {
        let session = Arc::new(SessionManager::new(cache_dir));
        let session_events = session.subscribe();
        let api = ApiClient::new(config.endpoints(), Arc::clone(&session), config.request_timeout())?;
        let ttl = config.cache_ttl();
        let (tx, notices) = mpsc::unbounded_channel();

        let users = ResourceService::new(
            UsersApi(api.clone()),
            Arc::new(KeyedCache::new("users", ttl, |u: &User| u.id)),
            tx.clone(),
        );
        let cities = ResourceService::new(
            CitiesApi(api.clone()),
            Arc::new(KeyedCache::new("cities", ttl, |c: &City| c.id)),
            tx.clone(),
        );
        let destinations = ResourceService::new(
            DestinationsApi(api.clone()),
            Arc::new(KeyedCache::new("destinations", ttl, |d: &Destination| d.id)),
            tx.clone(),
        );
        let appointments = ResourceService::new(
            AppointmentsApi(api.clone()),
            Arc::new(KeyedCache::new("appointments", ttl, |a: &Appointment| a.id)),
            tx,
        );

        let remember_password = config.remember_password;

        Ok(Self {
            config,
            session,
            api,
            users,
            cities,
            destinations,
            appointments,
            notices,
            session_events,
            current_user: None,
            state: AppState::Normal,
            current_tab: Tab::Travelers,
            views: Tab::ALL.map(|tab| TableView::new(tab.page_size())),
            search_query: String::new(),
            modal: None,
            delete_target: None,
            status: None,
            login_email: String::new(),
            login_password: String::new(),
            login_focus: LoginFocus::Email,
            login_error: None,
            remember_password,
        })
    }

    // ------------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------------

    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    /// Gate decision for the current tab.
    pub fn gate(&self) -> GateDecision {
        gate::check(self.current_tab.route(), &self.session)
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.modal = None;
        self.delete_target = None;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }

        self.login_error = None;

        match self.api.login(&email, &password).await {
            Ok(token) => {
                if let Err(e) = self.session.establish(token, email.clone()) {
                    error!(error = %e, "Failed to persist session");
                    self.login_error = Some("Could not save session".to_string());
                    return Err(e);
                }

                self.remember_credentials(&email, &password);
                self.config.last_email = Some(email);
                self.config.remember_password = self.remember_password;
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");

                self.after_login().await;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(login_failure_message(&e));
                Err(e)
            }
        }
    }

    fn remember_credentials(&self, email: &str, password: &str) {
        if self.remember_password {
            if let Err(e) = CredentialStore::store(email, password) {
                warn!(error = %e, "Failed to store credentials");
            }
        } else if let Err(e) = CredentialStore::delete(email) {
            debug!(error = %e, "No stored credentials to remove");
        }
    }

    /// Fetch the admin profile and every collection.
    pub async fn after_login(&mut self) {
        match self.api.me().await {
            Ok(user) => {
                debug!(user = %user.email, "Current user loaded");
                self.current_user = Some(user);
            }
            Err(e) => warn!(error = %e, "Failed to load current user"),
        }
        if self.is_authenticated() {
            self.load_all().await;
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            warn!(error = %e, "Failed to clear session");
        }
        // The LoggedOut event shows the login overlay on the next poll.
    }

    fn clear_session_data(&mut self) {
        self.current_user = None;
        self.modal = None;
        self.delete_target = None;
        self.users.cache().invalidate();
        self.cities.cache().invalidate();
        self.destinations.cache().invalidate();
        self.appointments.cache().invalidate();
    }

    /// Drain notices and session events. Called once per frame.
    pub fn poll_events(&mut self) {
        while let Ok(notice) = self.notices.try_recv() {
            self.status = Some(notice);
        }

        loop {
            match self.session_events.try_recv() {
                Ok(event) => self.on_session_event(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed session events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn on_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LoggedIn => debug!("Session event: logged in"),
            SessionEvent::LoggedOut => {
                info!("Logged out, showing login");
                self.clear_session_data();
                self.start_login();
                self.status = Some(Notice::Success("Logged out".to_string()));
            }
            SessionEvent::Expired => {
                info!("Session expired, showing login");
                self.clear_session_data();
                self.start_login();
                self.login_error = ApiError::Unauthorized { message: None }.user_message();
            }
        }
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Load all four collections at once.
    pub async fn load_all(&mut self) {
        futures::join!(
            self.users.load(),
            self.cities.load(),
            self.destinations.load(),
            self.appointments.load()
        );
        for tab in Tab::ALL {
            self.clamp_view(tab);
        }
    }

    pub async fn load_tab(&mut self, tab: Tab) {
        match gate::check(tab.route(), &self.session) {
            GateDecision::Allow(_) => {}
            GateDecision::Redirect(_) => {
                self.start_login();
                return;
            }
        }
        match tab {
            Tab::Travelers | Tab::TourGuides => {
                self.users.load().await;
            }
            Tab::Cities => {
                self.cities.load().await;
            }
            Tab::Destinations => {
                self.destinations.load().await;
            }
            Tab::Appointments => {
                self.appointments.load().await;
            }
        }
        self.clamp_view(tab);
    }

    /// Drop the cache for the current tab and fetch again.
    pub async fn refresh_current_tab(&mut self) {
        let tab = self.current_tab;
        if self.is_busy(tab) {
            return;
        }
        match tab {
            Tab::Travelers | Tab::TourGuides => {
                self.users.refresh().await;
            }
            Tab::Cities => {
                self.cities.refresh().await;
            }
            Tab::Destinations => {
                self.destinations.refresh().await;
            }
            Tab::Appointments => {
                self.appointments.refresh().await;
            }
        }
        self.clamp_view(tab);
    }

    pub async fn switch_tab(&mut self, tab: Tab) {
        if tab != self.current_tab {
            self.current_tab = tab;
            self.search_query.clear();
        }
        self.load_tab(tab).await;
    }

    pub fn is_busy(&self, tab: Tab) -> bool {
        match tab {
            Tab::Travelers | Tab::TourGuides => self.users.is_loading(),
            Tab::Cities => self.cities.is_loading(),
            Tab::Destinations => self.destinations.is_loading(),
            Tab::Appointments => self.appointments.is_loading(),
        }
    }

    pub fn tab_error(&self, tab: Tab) -> Option<&str> {
        match tab {
            Tab::Travelers | Tab::TourGuides => self.users.error(),
            Tab::Cities => self.cities.error(),
            Tab::Destinations => self.destinations.error(),
            Tab::Appointments => self.appointments.error(),
        }
    }

    /// How long ago the tab's collection was fetched.
    pub fn cache_age(&self, tab: Tab) -> Option<String> {
        match tab {
            Tab::Travelers | Tab::TourGuides => self.users.cache().age_display(),
            Tab::Cities => self.cities.cache().age_display(),
            Tab::Destinations => self.destinations.cache().age_display(),
            Tab::Appointments => self.appointments.cache().age_display(),
        }
    }

    // ------------------------------------------------------------------------
    // Filtering and selection
    // ------------------------------------------------------------------------

    pub fn filtered_users(&self, role: Role) -> Vec<&User> {
        let query = self.search_query.as_str();
        self.users
            .items()
            .iter()
            .filter(|u| u.role_id == role.id())
            .filter(|u| {
                query.is_empty()
                    || contains_ignore_case(&u.name, query)
                    || contains_ignore_case(&u.email, query)
            })
            .collect()
    }

    pub fn filtered_cities(&self) -> Vec<&City> {
        let query = self.search_query.as_str();
        self.cities
            .items()
            .iter()
            .filter(|c| query.is_empty() || contains_ignore_case(&c.name, query))
            .collect()
    }

    pub fn filtered_destinations(&self) -> Vec<&Destination> {
        let query = self.search_query.as_str();
        self.destinations
            .items()
            .iter()
            .filter(|d| {
                query.is_empty()
                    || contains_ignore_case(&d.destination_name, query)
                    || contains_ignore_case(&d.address, query)
                    || contains_ignore_case(d.city_name(), query)
            })
            .collect()
    }

    pub fn filtered_appointments(&self) -> Vec<&Appointment> {
        let query = self.search_query.as_str();
        self.appointments
            .items()
            .iter()
            .filter(|a| {
                query.is_empty()
                    || contains_ignore_case(&a.traveler_name(), query)
                    || contains_ignore_case(&a.tour_guide_name(), query)
                    || contains_ignore_case(&a.destination_name(), query)
                    || contains_ignore_case(a.status.as_str(), query)
            })
            .collect()
    }

    /// Ids of the rows a tab shows, in display order.
    fn row_ids(&self, tab: Tab) -> Vec<i64> {
        match tab {
            Tab::Travelers => self.filtered_users(Role::Traveler).iter().map(|u| u.id).collect(),
            Tab::TourGuides => self.filtered_users(Role::TourGuide).iter().map(|u| u.id).collect(),
            Tab::Cities => self.filtered_cities().iter().map(|c| c.id).collect(),
            Tab::Destinations => self.filtered_destinations().iter().map(|d| d.id).collect(),
            Tab::Appointments => self.filtered_appointments().iter().map(|a| a.id).collect(),
        }
    }

    pub fn view(&self, tab: Tab) -> &TableView {
        &self.views[tab.index()]
    }

    fn view_mut(&mut self, tab: Tab) -> &mut TableView {
        &mut self.views[tab.index()]
    }

    /// Id of the highlighted row on the current tab.
    pub fn selected_id(&self) -> Option<i64> {
        let tab = self.current_tab;
        let ids = self.row_ids(tab);
        let view = self.view(tab);
        ids[view.pager.range(ids.len())].get(view.selection).copied()
    }

    /// Keep page and selection inside the list after it changed.
    pub fn clamp_view(&mut self, tab: Tab) {
        let total = self.row_ids(tab).len();
        let view = self.view_mut(tab);
        view.pager.clamp(total);
        let on_page = view.pager.range(total).len();
        view.selection = view.selection.min(on_page.saturating_sub(1));
    }

    /// Move down one row, continuing onto the next page.
    pub fn select_next(&mut self) {
        let tab = self.current_tab;
        let total = self.row_ids(tab).len();
        let view = self.view_mut(tab);
        let on_page = view.pager.range(total).len();
        if view.selection + 1 < on_page {
            view.selection += 1;
        } else if view.pager.page() < view.pager.total_pages(total) {
            view.pager.next(total);
            view.selection = 0;
        }
    }

    /// Move up one row, continuing onto the previous page.
    pub fn select_prev(&mut self) {
        let tab = self.current_tab;
        let view = self.view_mut(tab);
        if view.selection > 0 {
            view.selection -= 1;
        } else if view.pager.page() > 1 {
            view.pager.prev();
            view.selection = view.pager.page_size() - 1;
        }
    }

    pub fn next_page(&mut self) {
        let tab = self.current_tab;
        let total = self.row_ids(tab).len();
        let view = self.view_mut(tab);
        view.pager.next(total);
        view.selection = 0;
    }

    pub fn prev_page(&mut self) {
        let view = self.view_mut(self.current_tab);
        view.pager.prev();
        view.selection = 0;
    }

    /// Search text changed: back to the first row.
    pub fn reset_view(&mut self) {
        let view = self.view_mut(self.current_tab);
        view.pager.reset();
        view.selection = 0;
    }

    // ------------------------------------------------------------------------
    // Forms
    // ------------------------------------------------------------------------

    pub fn open_create_form(&mut self) {
        let kind = match self.current_tab {
            Tab::Travelers => FormKind::CreateUser(Form::new(UserCreateDraft::for_role(Role::Traveler))),
            Tab::TourGuides => FormKind::CreateUser(Form::new(UserCreateDraft::for_role(Role::TourGuide))),
            Tab::Cities => FormKind::CreateCity(Form::new(CityDraft::default())),
            Tab::Destinations => FormKind::CreateDestination(Form::new(DestinationDraft::default())),
            Tab::Appointments => FormKind::CreateAppointment(Form::new(AppointmentDraft::default())),
        };
        self.modal = Some(FormModal::new(kind));
        self.state = AppState::EditingForm;
    }

    /// Open the edit form for the selected row, refetching it first where
    /// the API serves single records.
    pub async fn open_edit_form(&mut self) {
        let tab = self.current_tab;
        if self.is_busy(tab) {
            return;
        }
        let Some(id) = self.selected_id() else {
            return;
        };

        let kind = match tab {
            Tab::Travelers | Tab::TourGuides => self
                .users
                .fetch_one(id)
                .await
                .map(|user| FormKind::EditUser(id, Form::new(UserUpdateDraft::from_user(&user)))),
            Tab::Cities => self
                .cities
                .fetch_one(id)
                .await
                .map(|city| FormKind::EditCity(id, Form::new(CityDraft::from_city(&city)))),
            Tab::Destinations => self.destinations.fetch_one(id).await.map(|destination| {
                FormKind::EditDestination(id, Form::new(DestinationDraft::from_destination(&destination)))
            }),
            Tab::Appointments => self.appointments.fetch_one(id).await.map(|appointment| {
                FormKind::EditAppointment(id, Form::new(AppointmentDraft::from_appointment(&appointment)))
            }),
        };

        if let Some(kind) = kind {
            self.modal = Some(FormModal::new(kind));
            self.state = AppState::EditingForm;
        }
    }

    pub fn close_form(&mut self) {
        self.modal = None;
        self.state = AppState::Normal;
    }

    /// Validate and submit the open form. The modal closes on success and
    /// stays open (with field errors or a notice) on failure.
    pub async fn submit_form(&mut self) {
        let Some(mut modal) = self.modal.take() else {
            return;
        };

        let users = &mut self.users;
        let cities = &mut self.cities;
        let destinations = &mut self.destinations;
        let appointments = &mut self.appointments;

        let saved = match &mut modal.kind {
            FormKind::CreateUser(form) => form
                .submit(move |payload| async move { users.create(&payload).await })
                .await
                .is_some(),
            FormKind::EditUser(id, form) => {
                let id = *id;
                form.submit(move |payload| async move { users.update(id, &payload).await })
                    .await
                    .is_some()
            }
            FormKind::CreateCity(form) => form
                .submit(move |payload| async move { cities.create(&payload).await })
                .await
                .is_some(),
            FormKind::EditCity(id, form) => {
                let id = *id;
                form.submit(move |payload| async move { cities.update(id, &payload).await })
                    .await
                    .is_some()
            }
            FormKind::CreateDestination(form) => form
                .submit(move |payload| async move { destinations.create(&payload).await })
                .await
                .is_some(),
            FormKind::EditDestination(id, form) => {
                let id = *id;
                form.submit(move |payload| async move {
                    destinations.update(id, &UpdateDestination::from(payload)).await
                })
                .await
                .is_some()
            }
            FormKind::CreateAppointment(form) => form
                .submit(move |payload| async move { appointments.create(&payload).await })
                .await
                .is_some(),
            FormKind::EditAppointment(id, form) => {
                let id = *id;
                form.submit(move |payload| async move {
                    appointments.update(id, &UpdateAppointment::from(payload)).await
                })
                .await
                .is_some()
            }
        };

        if saved {
            self.state = AppState::Normal;
            for tab in Tab::ALL {
                self.clamp_view(tab);
            }
        } else if self.state == AppState::EditingForm {
            // Still editing: keep the draft and its errors on screen.
            modal.focus = modal.focus.min(modal.form().fields().len());
            self.modal = Some(modal);
        }
    }

    // ------------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------------

    pub fn request_delete(&mut self) {
        let tab = self.current_tab;
        let Some(id) = self.selected_id() else {
            return;
        };
        let label = match tab {
            Tab::Travelers | Tab::TourGuides => self.users.find(id).map(|u| u.name.clone()),
            Tab::Cities => self.cities.find(id).map(|c| c.name.clone()),
            Tab::Destinations => self.destinations.find(id).map(|d| d.destination_name.clone()),
            Tab::Appointments => self
                .appointments
                .find(id)
                .map(|a| format!("{} with {}", a.traveler_name(), a.tour_guide_name())),
        }
        .unwrap_or_else(|| format!("#{}", id));

        self.delete_target = Some(DeleteTarget { tab, id, label });
        self.state = AppState::ConfirmingDelete;
    }

    pub async fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(target) = self.delete_target.take() else {
            return;
        };
        if self.is_busy(target.tab) {
            return;
        }
        match target.tab {
            Tab::Travelers | Tab::TourGuides => {
                self.users.delete(target.id).await;
            }
            Tab::Cities => {
                self.cities.delete(target.id).await;
            }
            Tab::Destinations => {
                self.destinations.delete(target.id).await;
            }
            Tab::Appointments => {
                self.appointments.delete(target.id).await;
            }
        }
        self.clamp_view(target.tab);
    }

    pub fn cancel_delete(&mut self) {
        self.delete_target = None;
        self.state = AppState::Normal;
    }
}

/// Turn a login failure into something to show under the form.
pub fn login_failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Validation { message: Some(message), .. }) => message.clone(),
        Some(ApiError::NetworkError(e)) if e.is_timeout() => {
            "Connection timed out. Please try again.".to_string()
        }
        Some(ApiError::NetworkError(_)) => {
            "Unable to connect to server. Check the API URL.".to_string()
        }
        _ => failure_message(err, "Login failed"),
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a form field character should be accepted
pub fn can_add_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
