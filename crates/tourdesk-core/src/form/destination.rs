use crate::models::{CreateDestination, Destination};

use super::rules::{is_blank, parse_number};
use super::{Draft, FieldErrors, FieldKind, FieldSpec};

const FIELDS: [FieldSpec; 8] = [
    FieldSpec::new("city_id", "City ID", FieldKind::Text),
    FieldSpec::new("destination_name", "Name", FieldKind::Text),
    FieldSpec::new("address", "Address", FieldKind::Text),
    FieldSpec::new("latitude", "Latitude", FieldKind::Text),
    FieldSpec::new("longitude", "Longitude", FieldKind::Text),
    FieldSpec::new("description", "Description", FieldKind::Text),
    FieldSpec::new("entry_fee", "Entry fee", FieldKind::Text),
    FieldSpec::new("operational_hours", "Hours", FieldKind::Text),
];

/// Shared by create and update; an update sends every field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationDraft {
    pub city_id: i64,
    pub destination_name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub entry_fee: f64,
    pub operational_hours: String,
}

impl DestinationDraft {
    pub fn from_destination(destination: &Destination) -> Self {
        Self {
            city_id: destination.city_id,
            destination_name: destination.destination_name.clone(),
            address: destination.address.clone(),
            latitude: destination.latitude,
            longitude: destination.longitude,
            description: destination.description.clone(),
            entry_fee: destination.entry_fee,
            operational_hours: destination.operational_hours.clone(),
        }
    }
}

/// Zero means "not entered" for the numeric fields.
fn number_text<T: PartialEq + Default + ToString>(value: T) -> String {
    if value == T::default() {
        String::new()
    } else {
        value.to_string()
    }
}

impl Draft for DestinationDraft {
    type Payload = CreateDestination;

    fn fields(&self) -> Vec<FieldSpec> {
        FIELDS.to_vec()
    }

    fn value(&self, key: &str) -> String {
        match key {
            "city_id" => number_text(self.city_id),
            "destination_name" => self.destination_name.clone(),
            "address" => self.address.clone(),
            "latitude" => number_text(self.latitude),
            "longitude" => number_text(self.longitude),
            "description" => self.description.clone(),
            "entry_fee" => number_text(self.entry_fee),
            "operational_hours" => self.operational_hours.clone(),
            _ => String::new(),
        }
    }

    fn set(&mut self, key: &str, input: &str) -> Result<(), String> {
        match key {
            "city_id" => self.city_id = parse_number(input)?,
            "destination_name" => self.destination_name = input.to_string(),
            "address" => self.address = input.to_string(),
            "latitude" => self.latitude = parse_number(input)?,
            "longitude" => self.longitude = parse_number(input)?,
            "description" => self.description = input.to_string(),
            "entry_fee" => self.entry_fee = parse_number(input)?,
            "operational_hours" => self.operational_hours = input.to_string(),
            _ => {}
        }
        Ok(())
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.city_id == 0 {
            errors.insert("city_id", "City is required");
        }
        if self.latitude == 0.0 {
            errors.insert("latitude", "Latitude is required");
        }
        if self.longitude == 0.0 {
            errors.insert("longitude", "Longitude is required");
        }
        if self.entry_fee == 0.0 {
            errors.insert("entry_fee", "Entry fee is required");
        }
        if is_blank(&self.destination_name) {
            errors.insert("destination_name", "Destination name is required");
        }
        if is_blank(&self.address) {
            errors.insert("address", "Destination address is required");
        }
        if is_blank(&self.operational_hours) {
            errors.insert("operational_hours", "Destination operational hours is required");
        }
        errors
    }

    fn payload(&self) -> CreateDestination {
        CreateDestination {
            city_id: self.city_id,
            destination_name: self.destination_name.trim().to_string(),
            address: self.address.trim().to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            description: self.description.trim().to_string(),
            entry_fee: self.entry_fee,
            operational_hours: self.operational_hours.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_draft_reports_required_fields() {
        let errors = DestinationDraft::default().validate();
        for key in [
            "city_id",
            "latitude",
            "longitude",
            "entry_fee",
            "destination_name",
            "address",
            "operational_hours",
        ] {
            assert!(errors.contains(key), "missing error for {}", key);
        }
        assert!(!errors.contains("description"));
    }

    #[test]
    fn test_filled_draft_is_valid() {
        let mut draft = DestinationDraft::default();
        draft.set("city_id", "1").expect("city");
        draft.set("destination_name", "Kawah Putih").expect("name");
        draft.set("address", "Ciwidey").expect("address");
        draft.set("latitude", "-7.166").expect("lat");
        draft.set("longitude", "107.402").expect("long");
        draft.set("entry_fee", "25000").expect("fee");
        draft.set("operational_hours", "07:00 - 17:00").expect("hours");

        assert!(draft.validate().is_empty());
        assert_eq!(draft.payload().latitude, -7.166);
        assert_eq!(draft.value("entry_fee"), "25000");
    }
}
