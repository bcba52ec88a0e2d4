use crate::models::{City, CityData};

use super::rules::is_blank;
use super::{Draft, FieldErrors, FieldKind, FieldSpec};

const FIELDS: [FieldSpec; 1] = [FieldSpec::new("name", "Name", FieldKind::Text)];

/// Create and rename share one draft: a city is only a name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityDraft {
    pub name: String,
}

impl CityDraft {
    pub fn from_city(city: &City) -> Self {
        Self {
            name: city.name.clone(),
        }
    }
}

impl Draft for CityDraft {
    type Payload = CityData;

    fn fields(&self) -> Vec<FieldSpec> {
        FIELDS.to_vec()
    }

    fn value(&self, key: &str) -> String {
        match key {
            "name" => self.name.clone(),
            _ => String::new(),
        }
    }

    fn set(&mut self, key: &str, input: &str) -> Result<(), String> {
        if key == "name" {
            self.name = input.to_string();
        }
        Ok(())
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if is_blank(&self.name) {
            errors.insert("name", "Name is required");
        }
        errors
    }

    fn payload(&self) -> CityData {
        CityData {
            name: self.name.trim().to_string(),
        }
    }
}
