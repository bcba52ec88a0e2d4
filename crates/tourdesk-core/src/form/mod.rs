//! Form state for the create/update modals.
//!
//! A `Form<D>` wraps a `Draft`: the editable record plus its validation
//! rules. Field input arrives as text (the terminal has no typed widgets);
//! each draft parses its own fields. `submit` validates first and only calls
//! the submission callback when every field passes.

pub mod appointment;
pub mod city;
pub mod destination;
pub mod rules;
pub mod user;

use std::collections::BTreeMap;
use std::future::Future;

pub use appointment::AppointmentDraft;
pub use city::CityDraft;
pub use destination::DestinationDraft;
pub use user::{UserCreateDraft, UserUpdateDraft};

/// How a field is edited in the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Masked on screen
    Secret,
    /// Cycled with left/right through fixed options
    Choice(&'static [&'static str]),
    /// A path on disk
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { key, label, kind }
    }
}

/// Validation messages keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, message: impl Into<String>) {
        self.0.insert(key.to_string(), message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// An editable record with its own field parsing and validation.
pub trait Draft: Clone {
    /// What a valid draft submits.
    type Payload;

    /// Fields in display order. May depend on the draft's state (a tour
    /// guide has more fields than a traveler).
    fn fields(&self) -> Vec<FieldSpec>;

    /// Current value of `key` as text.
    fn value(&self, key: &str) -> String;

    /// Parse `input` into field `key`. An `Err` is shown under the field
    /// and leaves the previous value in place.
    fn set(&mut self, key: &str, input: &str) -> Result<(), String>;

    fn validate(&self) -> FieldErrors;

    fn payload(&self) -> Self::Payload;
}

pub struct Form<D: Draft> {
    initial: D,
    draft: D,
    /// Raw text per edited field, so partial input ("-6.") survives re-render.
    inputs: BTreeMap<String, String>,
    /// Parse failures from `update_field`, kept until the field is fixed.
    input_errors: FieldErrors,
    errors: FieldErrors,
    submitting: bool,
}

impl<D: Draft> Form<D> {
    pub fn new(draft: D) -> Self {
        Self {
            initial: draft.clone(),
            draft,
            inputs: BTreeMap::new(),
            input_errors: FieldErrors::new(),
            errors: FieldErrors::new(),
            submitting: false,
        }
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn fields(&self) -> Vec<FieldSpec> {
        self.draft.fields()
    }

    /// Text shown in the field's input box.
    pub fn input(&self, key: &str) -> String {
        self.inputs
            .get(key)
            .cloned()
            .unwrap_or_else(|| self.draft.value(key))
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Set a field from text input. Clears that field's error, or records a
    /// new one when the input does not parse.
    pub fn update_field(&mut self, key: &str, input: &str) {
        self.inputs.insert(key.to_string(), input.to_string());
        match self.draft.set(key, input) {
            Ok(()) => {
                self.input_errors.remove(key);
                self.errors.remove(key);
            }
            Err(message) => {
                self.input_errors.insert(key, message.clone());
                self.errors.insert(key, message);
            }
        }
    }

    /// Move a choice field to its next (or previous) option.
    pub fn cycle_choice(&mut self, key: &str, forward: bool) {
        let options = match self.fields().into_iter().find(|f| f.key == key) {
            Some(FieldSpec {
                kind: FieldKind::Choice(options),
                ..
            }) if !options.is_empty() => options,
            _ => return,
        };
        let current = self.input(key);
        let index = options.iter().position(|o| *o == current).unwrap_or(0);
        let next = if forward {
            (index + 1) % options.len()
        } else {
            (index + options.len() - 1) % options.len()
        };
        self.update_field(key, options[next]);
    }

    /// Run the draft's rules. Unparsed input keeps its own message.
    pub fn validate(&mut self) -> bool {
        let mut errors = self.draft.validate();
        for (key, message) in self.input_errors.iter() {
            errors.insert(key, message);
        }
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validate, then hand the payload to `on_submit`. Invalid drafts never
    /// reach the callback. When the callback yields a record the draft is
    /// reset and the record returned.
    pub async fn submit<F, Fut, T>(&mut self, on_submit: F) -> Option<T>
    where
        F: FnOnce(D::Payload) -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        if !self.validate() {
            return None;
        }

        self.submitting = true;
        let result = on_submit(self.draft.payload()).await;
        self.submitting = false;

        if result.is_some() {
            self.reset();
        }
        result
    }

    /// Back to the initial draft (empty, or the record being edited).
    pub fn reset(&mut self) {
        self.draft = self.initial.clone();
        self.inputs.clear();
        self.input_errors.clear();
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, CityData, Role};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_password_mismatch_blocks_submit() {
        let mut form = Form::new(UserCreateDraft::default());
        form.update_field("name", "Sari");
        form.update_field("email", "sari@example.com");
        form.update_field("password", "secret123");
        form.update_field("password_confirmation", "secret124");
        let calls = AtomicUsize::new(0);

        let result = form
            .submit(|_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Some(())
            })
            .await;

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            form.error("password_confirmation"),
            Some("Password and Password Confirmation must be match")
        );
    }

    #[tokio::test]
    async fn test_end_time_before_start_blocks_submit() {
        let mut form = Form::new(AppointmentDraft::default());
        form.update_field("tourguide_id", "2");
        form.update_field("user_id", "7");
        form.update_field("destination_id", "4");
        form.update_field("appointment_date", "2025-06-01");
        form.update_field("start_time", "14:00");
        form.update_field("end_time", "09:00");
        let calls = AtomicUsize::new(0);

        let result = form
            .submit(|_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Some(())
            })
            .await;

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(form.error("end_time"), Some("End time must be after start time"));
    }

    #[tokio::test]
    async fn test_successful_submit_resets_draft() {
        let mut form = Form::new(CityDraft::default());
        form.update_field("name", "  Malang ");

        let submitted = form
            .submit(|payload: CityData| async move { Some(payload.name) })
            .await;

        assert_eq!(submitted.as_deref(), Some("Malang"));
        assert_eq!(form.input("name"), "");
        assert!(form.errors().is_empty());
    }

    #[tokio::test]
    async fn test_failed_callback_keeps_draft() {
        let mut form = Form::new(CityDraft::default());
        form.update_field("name", "Malang");

        let submitted: Option<()> = form.submit(|_| async { None }).await;

        assert!(submitted.is_none());
        assert_eq!(form.input("name"), "Malang");
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_update_field_clears_error() {
        let mut form = Form::new(CityDraft::default());
        assert!(!form.validate());
        assert_eq!(form.error("name"), Some("Name is required"));

        form.update_field("name", "Solo");

        assert!(form.error("name").is_none());
    }

    #[test]
    fn test_unparseable_input_is_kept_and_blocks() {
        let mut form = Form::new(DestinationDraft::default());
        form.update_field("latitude", "-6.9abc");

        assert_eq!(form.input("latitude"), "-6.9abc");
        assert_eq!(form.error("latitude"), Some("Must be a number"));
        assert!(!form.validate());
        assert_eq!(form.error("latitude"), Some("Must be a number"));
    }

    #[test]
    fn test_reset_restores_initial_record() {
        let mut form = Form::new(CityDraft::from_city(&crate::models::City {
            id: 9,
            name: "Bogor".to_string(),
        }));
        form.update_field("name", "");
        form.validate();

        form.reset();

        assert_eq!(form.input("name"), "Bogor");
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_cycle_choice() {
        let mut form = Form::new(AppointmentDraft::default());
        assert_eq!(form.input("status"), "pending");

        form.cycle_choice("status", true);
        assert_eq!(form.draft().status, AppointmentStatus::Confirmed);

        form.cycle_choice("status", false);
        form.cycle_choice("status", false);
        assert_eq!(form.draft().status, AppointmentStatus::Canceled);
    }

    #[test]
    fn test_role_choice_changes_fields() {
        let mut form = Form::new(UserCreateDraft::default());
        assert!(!form.fields().iter().any(|f| f.key == "price"));

        form.cycle_choice("role", true);

        assert_eq!(form.draft().role, Role::TourGuide);
        assert!(form.fields().iter().any(|f| f.key == "price"));
    }
}
