use crate::models::{Appointment, AppointmentStatus, CreateAppointment};
use crate::utils::format_time;

use super::rules::{
    is_blank, is_time_ordered, parse_date, parse_number, time_error, END_TIME_ORDER_ERROR,
};
use super::{Draft, FieldErrors, FieldKind, FieldSpec};

const STATUS_OPTIONS: &[&str] = &["pending", "confirmed", "completed", "canceled"];

const FIELDS: [FieldSpec; 7] = [
    FieldSpec::new("tourguide_id", "Tour guide ID", FieldKind::Text),
    FieldSpec::new("user_id", "Traveler ID", FieldKind::Text),
    FieldSpec::new("destination_id", "Destination ID", FieldKind::Text),
    FieldSpec::new("appointment_date", "Date (YYYY-MM-DD)", FieldKind::Text),
    FieldSpec::new("start_time", "Start (HH:MM)", FieldKind::Text),
    FieldSpec::new("end_time", "End (HH:MM)", FieldKind::Text),
    FieldSpec::new("status", "Status", FieldKind::Choice(STATUS_OPTIONS)),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentDraft {
    pub tourguide_id: i64,
    pub user_id: i64,
    pub destination_id: i64,
    pub appointment_date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: AppointmentStatus,
}

impl AppointmentDraft {
    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            tourguide_id: appointment.tourguide_id,
            user_id: appointment.user_id,
            destination_id: appointment.destination_id,
            appointment_date: appointment.appointment_date.clone(),
            start_time: format_time(&appointment.start_time),
            end_time: format_time(&appointment.end_time),
            status: appointment.status,
        }
    }
}

fn id_text(id: i64) -> String {
    if id == 0 {
        String::new()
    } else {
        id.to_string()
    }
}

impl Draft for AppointmentDraft {
    type Payload = CreateAppointment;

    fn fields(&self) -> Vec<FieldSpec> {
        FIELDS.to_vec()
    }

    fn value(&self, key: &str) -> String {
        match key {
            "tourguide_id" => id_text(self.tourguide_id),
            "user_id" => id_text(self.user_id),
            "destination_id" => id_text(self.destination_id),
            "appointment_date" => self.appointment_date.clone(),
            "start_time" => self.start_time.clone(),
            "end_time" => self.end_time.clone(),
            "status" => self.status.as_str().to_string(),
            _ => String::new(),
        }
    }

    fn set(&mut self, key: &str, input: &str) -> Result<(), String> {
        match key {
            "tourguide_id" => self.tourguide_id = parse_number(input)?,
            "user_id" => self.user_id = parse_number(input)?,
            "destination_id" => self.destination_id = parse_number(input)?,
            "appointment_date" => self.appointment_date = input.trim().to_string(),
            "start_time" => self.start_time = input.trim().to_string(),
            "end_time" => self.end_time = input.trim().to_string(),
            "status" => {
                if is_blank(input) {
                    return Err("Status is required".to_string());
                }
                self.status = input.parse()?;
            }
            _ => {}
        }
        Ok(())
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.tourguide_id == 0 {
            errors.insert("tourguide_id", "Tour guide is required");
        }
        if self.user_id == 0 {
            errors.insert("user_id", "User is required");
        }
        if self.destination_id == 0 {
            errors.insert("destination_id", "Destination is required");
        }
        if is_blank(&self.appointment_date) {
            errors.insert("appointment_date", "Appointment date is required");
        } else if parse_date(&self.appointment_date).is_none() {
            errors.insert("appointment_date", "Appointment date must be YYYY-MM-DD");
        }
        let start_error = time_error(&self.start_time, "Start time is required");
        if let Some(message) = start_error {
            errors.insert("start_time", message);
        }
        if let Some(message) = time_error(&self.end_time, "End time is required") {
            errors.insert("end_time", message);
        } else if start_error.is_none() && !is_time_ordered(&self.start_time, &self.end_time) {
            errors.insert("end_time", END_TIME_ORDER_ERROR);
        }
        errors
    }

    fn payload(&self) -> CreateAppointment {
        CreateAppointment {
            tourguide_id: self.tourguide_id,
            user_id: self.user_id,
            destination_id: self.destination_id,
            appointment_date: self.appointment_date.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::rules::TIME_FORMAT_ERROR;

    fn filled() -> AppointmentDraft {
        AppointmentDraft {
            tourguide_id: 2,
            user_id: 7,
            destination_id: 4,
            appointment_date: "2025-06-01".to_string(),
            start_time: "09:00".to_string(),
            end_time: "11:30".to_string(),
            status: AppointmentStatus::Pending,
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(filled().validate().is_empty());
    }

    #[test]
    fn test_equal_times_rejected() {
        let draft = AppointmentDraft {
            end_time: "09:00".to_string(),
            ..filled()
        };
        assert_eq!(draft.validate().get("end_time"), Some(END_TIME_ORDER_ERROR));
    }

    #[test]
    fn test_out_of_range_times_rejected() {
        let draft = AppointmentDraft {
            start_time: "25:00".to_string(),
            end_time: "26:00".to_string(),
            ..filled()
        };
        let errors = draft.validate();
        assert_eq!(errors.get("start_time"), Some(TIME_FORMAT_ERROR));
        assert_eq!(errors.get("end_time"), Some(TIME_FORMAT_ERROR));

        let text = AppointmentDraft {
            start_time: "abc".to_string(),
            end_time: "abd".to_string(),
            ..filled()
        };
        assert!(!text.validate().is_empty());
    }

    #[test]
    fn test_bad_date_rejected() {
        let draft = AppointmentDraft {
            appointment_date: "01/06/2025".to_string(),
            ..filled()
        };
        assert!(draft.validate().contains("appointment_date"));
    }

    #[test]
    fn test_status_input() {
        let mut draft = filled();
        assert_eq!(draft.set("status", ""), Err("Status is required".to_string()));
        assert!(draft.set("status", "bogus").is_err());
        draft.set("status", "completed").expect("status");
        assert_eq!(draft.status, AppointmentStatus::Completed);
    }
}
