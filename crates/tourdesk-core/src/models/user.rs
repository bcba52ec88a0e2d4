use serde::{Deserialize, Deserializer, Serialize};

/// Role identifiers as assigned by the platform API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    TourGuide,
    Traveler,
}

impl Role {
    pub const ADMIN_ID: i64 = 1;
    pub const TOUR_GUIDE_ID: i64 = 2;
    pub const TRAVELER_ID: i64 = 3;

    pub fn from_id(role_id: i64) -> Option<Self> {
        match role_id {
            Self::ADMIN_ID => Some(Role::Admin),
            Self::TOUR_GUIDE_ID => Some(Role::TourGuide),
            Self::TRAVELER_ID => Some(Role::Traveler),
            _ => None,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Role::Admin => Self::ADMIN_ID,
            Role::TourGuide => Self::TOUR_GUIDE_ID,
            Role::Traveler => Self::TRAVELER_ID,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::TourGuide => write!(f, "Tour Guide"),
            Role::Traveler => write!(f, "Traveler"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub role_id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Push notification token, only set for travelers.
    #[serde(default)]
    pub fcm_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tourguide_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    pub fn is_traveler(&self) -> bool {
        self.role_id == Role::TRAVELER_ID
    }

    pub fn is_tour_guide(&self) -> bool {
        self.role_id == Role::TOUR_GUIDE_ID
    }

    pub fn role_display(&self) -> String {
        self.role()
            .map(|r| r.to_string())
            .unwrap_or_else(|| format!("Role {}", self.role_id))
    }

    /// "Active" / "Inactive" for tour guides, "-" when the flag was never set.
    pub fn active_display(&self) -> &'static str {
        match self.is_active {
            Some(0) => "Inactive",
            Some(_) => "Active",
            None => "-",
        }
    }
}

/// Some endpoints return numeric columns as numbers, others as strings.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// An image picked for upload as a profile photo.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateUser {
    pub role_id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub photo_profile: Option<PhotoUpload>,
    pub city_id: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<i64>,
    pub price: Option<String>,
}

/// Partial update; `None` fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo_profile: Option<PhotoUpload>,
    pub city_id: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<i64>,
    pub price: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_id() {
        assert_eq!(Role::from_id(2), Some(Role::TourGuide));
        assert_eq!(Role::from_id(3), Some(Role::Traveler));
        assert_eq!(Role::from_id(1), Some(Role::Admin));
        assert_eq!(Role::from_id(9), None);
        assert_eq!(Role::Traveler.id(), 3);
    }

    #[test]
    fn test_parse_tour_guide_with_numeric_columns() {
        let json = r#"{"id": 7, "role_id": 2, "name": "Ayu", "email": "ayu@example.com",
            "photo_url": null, "tourguide_id": 4, "city_id": 12, "description": "Local guide",
            "is_active": 1, "price": 150000}"#;
        let user: User = serde_json::from_str(json).expect("parse user");
        assert!(user.is_tour_guide());
        assert_eq!(user.city_id.as_deref(), Some("12"));
        assert_eq!(user.price.as_deref(), Some("150000"));
        assert_eq!(user.active_display(), "Active");
        assert_eq!(user.role_display(), "Tour Guide");
    }

    #[test]
    fn test_parse_traveler_minimal() {
        let json = r#"{"id": 1, "role_id": 3, "name": "Budi", "email": "budi@example.com"}"#;
        let user: User = serde_json::from_str(json).expect("parse user");
        assert!(user.is_traveler());
        assert_eq!(user.city_id, None);
        assert_eq!(user.active_display(), "-");
    }
}
