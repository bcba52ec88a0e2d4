use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
}

/// Payload for both creating and renaming a city.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CityData {
    pub name: String,
}
