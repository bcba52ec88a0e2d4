use std::path::Path;

use crate::models::{CreateUser, PhotoUpload, Role, UpdateUser, User};

use super::rules::{email_error, is_blank, load_photo, photo_error};
use super::{Draft, FieldErrors, FieldKind, FieldSpec};

const ROLE_OPTIONS: &[&str] = &["traveler", "tour guide"];
const ACTIVE_OPTIONS: &[&str] = &["-", "active", "inactive"];

const TOUR_GUIDE_FIELDS: [FieldSpec; 4] = [
    FieldSpec::new("city_id", "City ID", FieldKind::Text),
    FieldSpec::new("description", "Description", FieldKind::Text),
    FieldSpec::new("price", "Price", FieldKind::Text),
    FieldSpec::new("is_active", "Status", FieldKind::Choice(ACTIVE_OPTIONS)),
];

fn role_label(role: Role) -> &'static str {
    match role {
        Role::TourGuide => "tour guide",
        _ => "traveler",
    }
}

fn parse_role(input: &str) -> Result<Role, String> {
    match input.trim().to_lowercase().as_str() {
        "traveler" => Ok(Role::Traveler),
        "tour guide" => Ok(Role::TourGuide),
        other => Err(format!("Unknown role: {}", other)),
    }
}

fn active_label(is_active: Option<i64>) -> &'static str {
    match is_active {
        Some(0) => "inactive",
        Some(_) => "active",
        None => "-",
    }
}

fn parse_active(input: &str) -> Result<Option<i64>, String> {
    match input.trim() {
        "" | "-" => Ok(None),
        "active" | "1" => Ok(Some(1)),
        "inactive" | "0" => Ok(Some(0)),
        other => Err(format!("Unknown status: {}", other)),
    }
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn photo_input(input: &str) -> Result<Option<PhotoUpload>, String> {
    let path = input.trim();
    if path.is_empty() {
        Ok(None)
    } else {
        load_photo(Path::new(path)).map(Some)
    }
}

fn check_photo(errors: &mut FieldErrors, photo: &Option<PhotoUpload>) {
    if let Some(message) = photo.as_ref().and_then(photo_error) {
        errors.insert("photo_profile", message);
    }
}

/// New traveler or tour guide account.
#[derive(Debug, Clone, PartialEq)]
pub struct UserCreateDraft {
    pub role: Role,
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub photo_path: String,
    pub photo: Option<PhotoUpload>,
    pub city_id: String,
    pub description: String,
    pub price: String,
    pub is_active: Option<i64>,
}

impl Default for UserCreateDraft {
    fn default() -> Self {
        Self::for_role(Role::Traveler)
    }
}

impl UserCreateDraft {
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            password_confirmation: String::new(),
            photo_path: String::new(),
            photo: None,
            city_id: String::new(),
            description: String::new(),
            price: String::new(),
            is_active: None,
        }
    }

    fn is_tour_guide(&self) -> bool {
        self.role == Role::TourGuide
    }
}

impl Draft for UserCreateDraft {
    type Payload = CreateUser;

    fn fields(&self) -> Vec<FieldSpec> {
        let mut fields = vec![
            FieldSpec::new("role", "Role", FieldKind::Choice(ROLE_OPTIONS)),
            FieldSpec::new("name", "Name", FieldKind::Text),
            FieldSpec::new("email", "Email", FieldKind::Text),
            FieldSpec::new("password", "Password", FieldKind::Secret),
            FieldSpec::new("password_confirmation", "Confirm password", FieldKind::Secret),
            FieldSpec::new("photo_profile", "Photo (path)", FieldKind::File),
        ];
        if self.is_tour_guide() {
            fields.extend(TOUR_GUIDE_FIELDS);
        }
        fields
    }

    fn value(&self, key: &str) -> String {
        match key {
            "role" => role_label(self.role).to_string(),
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "password" => self.password.clone(),
            "password_confirmation" => self.password_confirmation.clone(),
            "photo_profile" => self.photo_path.clone(),
            "city_id" => self.city_id.clone(),
            "description" => self.description.clone(),
            "price" => self.price.clone(),
            "is_active" => active_label(self.is_active).to_string(),
            _ => String::new(),
        }
    }

    fn set(&mut self, key: &str, input: &str) -> Result<(), String> {
        match key {
            "role" => self.role = parse_role(input)?,
            "name" => self.name = input.to_string(),
            "email" => self.email = input.to_string(),
            "password" => self.password = input.to_string(),
            "password_confirmation" => self.password_confirmation = input.to_string(),
            "photo_profile" => {
                self.photo = photo_input(input)?;
                self.photo_path = input.trim().to_string();
            }
            "city_id" => self.city_id = input.to_string(),
            "description" => self.description = input.to_string(),
            "price" => self.price = input.to_string(),
            "is_active" => self.is_active = parse_active(input)?,
            _ => {}
        }
        Ok(())
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if is_blank(&self.name) {
            errors.insert("name", "Name is required");
        }
        if let Some(message) = email_error(&self.email) {
            errors.insert("email", message);
        }
        if is_blank(&self.password) {
            errors.insert("password", "Password is required");
        }
        if is_blank(&self.password_confirmation) {
            errors.insert("password_confirmation", "Password confirmation is required");
        }
        if self.password != self.password_confirmation {
            errors.insert(
                "password_confirmation",
                "Password and Password Confirmation must be match",
            );
        }
        check_photo(&mut errors, &self.photo);
        errors
    }

    fn payload(&self) -> CreateUser {
        let guide = self.is_tour_guide();
        let extra = |value: &str| if guide { optional_text(value) } else { None };
        CreateUser {
            role_id: self.role.id(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            password_confirmation: self.password_confirmation.clone(),
            photo_profile: self.photo.clone(),
            city_id: extra(&self.city_id),
            description: extra(&self.description),
            price: extra(&self.price),
            is_active: if guide { self.is_active } else { None },
        }
    }
}

/// Edit an existing account. Role and password are not editable here.
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdateDraft {
    pub tour_guide: bool,
    pub name: String,
    pub email: String,
    pub photo_path: String,
    pub photo: Option<PhotoUpload>,
    pub city_id: String,
    pub description: String,
    pub price: String,
    pub is_active: Option<i64>,
}

impl UserUpdateDraft {
    pub fn from_user(user: &User) -> Self {
        Self {
            tour_guide: user.is_tour_guide(),
            name: user.name.clone(),
            email: user.email.clone(),
            photo_path: String::new(),
            photo: None,
            city_id: user.city_id.clone().unwrap_or_default(),
            description: user.description.clone().unwrap_or_default(),
            price: user.price.clone().unwrap_or_default(),
            is_active: user.is_active,
        }
    }
}

impl Draft for UserUpdateDraft {
    type Payload = UpdateUser;

    fn fields(&self) -> Vec<FieldSpec> {
        let mut fields = vec![
            FieldSpec::new("name", "Name", FieldKind::Text),
            FieldSpec::new("email", "Email", FieldKind::Text),
            FieldSpec::new("photo_profile", "New photo (path)", FieldKind::File),
        ];
        if self.tour_guide {
            fields.extend(TOUR_GUIDE_FIELDS);
        }
        fields
    }

    fn value(&self, key: &str) -> String {
        match key {
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "photo_profile" => self.photo_path.clone(),
            "city_id" => self.city_id.clone(),
            "description" => self.description.clone(),
            "price" => self.price.clone(),
            "is_active" => active_label(self.is_active).to_string(),
            _ => String::new(),
        }
    }

    fn set(&mut self, key: &str, input: &str) -> Result<(), String> {
        match key {
            "name" => self.name = input.to_string(),
            "email" => self.email = input.to_string(),
            "photo_profile" => {
                self.photo = photo_input(input)?;
                self.photo_path = input.trim().to_string();
            }
            "city_id" => self.city_id = input.to_string(),
            "description" => self.description = input.to_string(),
            "price" => self.price = input.to_string(),
            "is_active" => self.is_active = parse_active(input)?,
            _ => {}
        }
        Ok(())
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if is_blank(&self.name) {
            errors.insert("name", "Name is required");
        }
        if let Some(message) = email_error(&self.email) {
            errors.insert("email", message);
        }
        check_photo(&mut errors, &self.photo);
        errors
    }

    fn payload(&self) -> UpdateUser {
        let guide = self.tour_guide;
        let extra = |value: &str| if guide { optional_text(value) } else { None };
        UpdateUser {
            name: Some(self.name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            photo_profile: self.photo.clone(),
            city_id: extra(&self.city_id),
            description: extra(&self.description),
            price: extra(&self.price),
            is_active: if guide { self.is_active } else { None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guide() -> User {
        User {
            id: 5,
            role_id: Role::TOUR_GUIDE_ID,
            name: "Dewi".to_string(),
            email: "dewi@example.com".to_string(),
            photo_url: None,
            fcm_token: None,
            tourguide_id: Some("5".to_string()),
            city_id: Some("1".to_string()),
            description: Some("Temple tours".to_string()),
            is_active: Some(1),
            price: Some("150000".to_string()),
        }
    }

    #[test]
    fn test_create_requires_fields() {
        let errors = UserCreateDraft::default().validate();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
        assert_eq!(
            errors.get("password_confirmation"),
            Some("Password confirmation is required")
        );
    }

    #[test]
    fn test_traveler_payload_drops_guide_fields() {
        let mut draft = UserCreateDraft::default();
        draft.set("name", "Budi").expect("name");
        draft.set("price", "90000").expect("price");

        let payload = draft.payload();

        assert_eq!(payload.role_id, Role::TRAVELER_ID);
        assert!(payload.price.is_none());
    }

    #[test]
    fn test_guide_payload_keeps_guide_fields() {
        let mut draft = UserCreateDraft::for_role(Role::TourGuide);
        draft.set("price", " 90000 ").expect("price");
        draft.set("is_active", "active").expect("active");

        let payload = draft.payload();

        assert_eq!(payload.role_id, Role::TOUR_GUIDE_ID);
        assert_eq!(payload.price.as_deref(), Some("90000"));
        assert_eq!(payload.is_active, Some(1));
    }

    #[test]
    fn test_bad_photo_path_is_input_error() {
        let mut draft = UserCreateDraft::default();
        let err = draft.set("photo_profile", "/definitely/not/here.png");
        assert!(err.is_err());
        assert!(draft.photo.is_none());
    }

    #[test]
    fn test_update_from_guide() {
        let draft = UserUpdateDraft::from_user(&guide());
        assert!(draft.fields().iter().any(|f| f.key == "is_active"));
        assert_eq!(draft.value("is_active"), "active");

        let payload = draft.payload();
        assert_eq!(payload.name.as_deref(), Some("Dewi"));
        assert_eq!(payload.city_id.as_deref(), Some("1"));
        assert!(payload.photo_profile.is_none());
    }

    #[test]
    fn test_update_invalid_email() {
        let mut draft = UserUpdateDraft::from_user(&guide());
        draft.set("email", "dewi-at-example").expect("email");
        assert_eq!(draft.validate().get("email"), Some("Email is invalid"));
    }
}
