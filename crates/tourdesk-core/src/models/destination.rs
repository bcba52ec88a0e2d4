use serde::{Deserialize, Deserializer, Serialize};

use super::City;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationImage {
    pub id: i64,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: i64,
    pub city_id: i64,
    pub destination_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub longitude: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub entry_fee: f64,
    #[serde(default)]
    pub operational_hours: String,
    #[serde(default)]
    pub images: Vec<DestinationImage>,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub rating: f64,
    #[serde(default)]
    pub review_count: i64,
    #[serde(default)]
    pub city: Option<City>,
}

impl Destination {
    pub fn city_name(&self) -> &str {
        self.city.as_ref().map(|c| c.name.as_str()).unwrap_or("-")
    }

    pub fn rating_display(&self) -> String {
        if self.review_count == 0 {
            "no reviews".to_string()
        } else {
            format!("{:.1} ({})", self.rating, self.review_count)
        }
    }
}

/// Decimal columns arrive as numbers or as strings like `"25000.00"`.
/// Null and empty strings read as zero.
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct DecimalVisitor;

    impl<'de> de::Visitor<'de> for DecimalVisitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number or numeric string")
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v as f64)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v as f64)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let v = v.trim();
            if v.is_empty() {
                return Ok(0.0);
            }
            v.parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(0.0)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(0.0)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(DecimalVisitor)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateDestination {
    pub city_id: i64,
    pub destination_name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub entry_fee: f64,
    pub operational_hours: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateDestination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operational_hours: Option<String>,
}

/// A full form submission sent as a PATCH: every field is present.
impl From<CreateDestination> for UpdateDestination {
    fn from(data: CreateDestination) -> Self {
        Self {
            city_id: Some(data.city_id),
            destination_name: Some(data.destination_name),
            address: Some(data.address),
            latitude: Some(data.latitude),
            longitude: Some(data.longitude),
            description: Some(data.description),
            entry_fee: Some(data.entry_fee),
            operational_hours: Some(data.operational_hours),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_destination_with_city() {
        let json = r#"{"id": 3, "city_id": 1, "destination_name": "Prambanan",
            "address": "Jl. Raya Solo", "latitude": -7.75, "longitude": 110.49,
            "description": "Temple", "entry_fee": 50000, "operational_hours": "06:00-17:00",
            "images": [{"id": 1, "image_url": "https://cdn.example.com/p.jpg"}],
            "rating": 4.75, "review_count": 12, "city": {"id": 1, "name": "Yogyakarta"}}"#;
        let dest: Destination = serde_json::from_str(json).expect("parse destination");
        assert_eq!(dest.city_name(), "Yogyakarta");
        assert_eq!(dest.images.len(), 1);
        assert_eq!(dest.rating_display(), "4.8 (12)");
    }

    #[test]
    fn test_parse_string_decimals() {
        let json = r#"[{"id": 1, "city_id": 2, "destination_name": "Kawah Ijen",
            "latitude": "-7.166", "longitude": "114.05", "entry_fee": "25000.00",
            "rating": "4.5", "review_count": 3},
            {"id": 2, "city_id": 2, "destination_name": "Baluran",
            "latitude": -7.84, "longitude": 114.37, "entry_fee": null, "rating": ""}]"#;
        let dests: Vec<Destination> = serde_json::from_str(json).expect("parse destinations");
        assert_eq!(dests.len(), 2);
        assert_eq!(dests[0].latitude, -7.166);
        assert_eq!(dests[0].entry_fee, 25000.0);
        assert_eq!(dests[0].rating_display(), "4.5 (3)");
        assert_eq!(dests[1].entry_fee, 0.0);
        assert_eq!(dests[1].rating, 0.0);
    }

    #[test]
    fn test_parse_rejects_non_numeric_decimal() {
        let json = r#"{"id": 1, "city_id": 2, "destination_name": "X", "latitude": "north"}"#;
        assert!(serde_json::from_str::<Destination>(json).is_err());
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let patch = UpdateDestination {
            entry_fee: Some(25000.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(json, serde_json::json!({"entry_fee": 25000.0}));
    }
}
