use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Canceled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Canceled => "canceled",
        }
    }

    /// Next status in display order, wrapping around. Used by the status picker.
    pub fn next(&self) -> Self {
        match self {
            AppointmentStatus::Pending => AppointmentStatus::Confirmed,
            AppointmentStatus::Confirmed => AppointmentStatus::Completed,
            AppointmentStatus::Completed => AppointmentStatus::Canceled,
            AppointmentStatus::Canceled => AppointmentStatus::Pending,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "Pending"),
            AppointmentStatus::Confirmed => write!(f, "Confirmed"),
            AppointmentStatus::Completed => write!(f, "Completed"),
            AppointmentStatus::Canceled => write!(f, "Canceled"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            // Accept the British spelling too; the API only ever sends "canceled".
            "canceled" | "cancelled" => Ok(AppointmentStatus::Canceled),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// Embedded person summary (traveler or tour guide) on an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentParty {
    pub id: Option<i64>,
    pub name: Option<String>,
}

/// Embedded destination summary on an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDestination {
    pub id: Option<i64>,
    pub destination_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub user_id: i64,
    pub tourguide_id: i64,
    pub destination_id: i64,
    pub appointment_date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub user: Option<AppointmentParty>,
    #[serde(default)]
    pub tourguide: Option<AppointmentParty>,
    #[serde(default)]
    pub destination: Option<AppointmentDestination>,
}

impl Appointment {
    pub fn traveler_name(&self) -> String {
        self.user
            .as_ref()
            .and_then(|u| u.name.clone())
            .unwrap_or_else(|| format!("#{}", self.user_id))
    }

    pub fn tour_guide_name(&self) -> String {
        self.tourguide
            .as_ref()
            .and_then(|u| u.name.clone())
            .unwrap_or_else(|| format!("#{}", self.tourguide_id))
    }

    pub fn destination_name(&self) -> String {
        self.destination
            .as_ref()
            .and_then(|d| d.destination_name.clone())
            .unwrap_or_else(|| format!("#{}", self.destination_id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateAppointment {
    pub tourguide_id: i64,
    pub user_id: i64,
    pub destination_id: i64,
    pub appointment_date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateAppointment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tourguide_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}

impl From<CreateAppointment> for UpdateAppointment {
    fn from(data: CreateAppointment) -> Self {
        Self {
            tourguide_id: Some(data.tourguide_id),
            user_id: Some(data.user_id),
            destination_id: Some(data.destination_id),
            appointment_date: Some(data.appointment_date),
            start_time: Some(data.start_time),
            end_time: Some(data.end_time),
            status: Some(data.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("pending".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Pending));
        assert_eq!("Confirmed".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Confirmed));
        assert_eq!(" completed ".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Completed));
        assert_eq!("cancelled".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Canceled));
        assert!("done".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_status_next_wraps() {
        assert_eq!(AppointmentStatus::Canceled.next(), AppointmentStatus::Pending);
        assert_eq!(AppointmentStatus::Pending.next(), AppointmentStatus::Confirmed);
    }

    #[test]
    fn test_parse_appointment_with_embedded_parties() {
        let json = r#"{"id": 10, "user_id": 1, "tourguide_id": 2, "destination_id": 3,
            "appointment_date": "2026-11-02", "start_time": "09:00:00", "end_time": "11:00:00",
            "status": "confirmed", "user": {"id": 1, "name": "Budi"},
            "tourguide": {"id": 2, "name": "Ayu"},
            "destination": {"id": 3, "destination_name": "Borobudur"}}"#;
        let appt: Appointment = serde_json::from_str(json).expect("parse appointment");
        assert_eq!(appt.status, AppointmentStatus::Confirmed);
        assert_eq!(appt.traveler_name(), "Budi");
        assert_eq!(appt.tour_guide_name(), "Ayu");
        assert_eq!(appt.destination_name(), "Borobudur");
    }

    #[test]
    fn test_missing_embedded_falls_back_to_ids() {
        let json = r#"{"id": 10, "user_id": 1, "tourguide_id": 2, "destination_id": 3,
            "appointment_date": "2026-11-02", "start_time": "09:00", "end_time": "11:00",
            "status": "pending"}"#;
        let appt: Appointment = serde_json::from_str(json).expect("parse appointment");
        assert_eq!(appt.traveler_name(), "#1");
        assert_eq!(appt.destination_name(), "#3");
    }
}
