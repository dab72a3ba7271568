use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use foundation::{GeoPoint, Located};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    #[serde(rename = "city", alias = "name")]
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, deserialize_with = "population")]
    pub population: Option<u64>,
}

impl CityRecord {
    pub fn new(name: impl Into<String>, country: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            lat,
            lng,
            population: None,
        }
    }

    pub fn with_population(mut self, population: u64) -> Self {
        self.population = Some(population);
        self
    }
}

impl Located for CityRecord {
    fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lng, self.lat)
    }
}

/// Accepts integers, floats (truncated), numeric strings, `""` and null.
fn population<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let count = match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().and_then(whole_count)),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                let parsed: f64 = s.parse().map_err(serde::de::Error::custom)?;
                whole_count(parsed)
            }
        }
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "population must be a number, got {other}"
            )));
        }
    };
    Ok(count)
}

fn whole_count(v: f64) -> Option<u64> {
    (v.is_finite() && v >= 0.0).then(|| v.trunc() as u64)
}

#[derive(Debug, thiserror::Error)]
pub enum CityDatasetError {
    #[error("city dataset parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("city dataset must be a JSON array of records")]
    NotAnArray,
}

/// The session's city list, immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityDataset {
    pub cities: Vec<CityRecord>,
    /// Records dropped because they could not be read.
    pub skipped: usize,
}

impl CityDataset {
    pub fn from_json_str(payload: &str) -> Result<Self, CityDatasetError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_json_value(value)
    }

    /// Reads an array of city records, dropping (and logging) records that
    /// are missing coordinates or otherwise malformed.
    pub fn from_json_value(value: Value) -> Result<Self, CityDatasetError> {
        let Value::Array(items) = value else {
            return Err(CityDatasetError::NotAnArray);
        };

        let mut cities = Vec::with_capacity(items.len());
        let mut skipped = 0;
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<CityRecord>(item) {
                Ok(city) => cities.push(city),
                Err(err) => {
                    warn!(index, %err, "skipping malformed city record");
                    skipped += 1;
                }
            }
        }

        Ok(Self { cities, skipped })
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{CityDataset, CityDatasetError, CityRecord};
    use foundation::{GeoPoint, Located};
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_worldcities_records() {
        let payload = r#"[
            {"city": "Tokyo", "country": "Japan", "lat": 35.6897, "lng": 139.6922, "population": 37732000},
            {"city": "Reykjavik", "country": "Iceland", "lat": 64.1475, "lng": -21.935, "population": 135688.0},
            {"name": "Nowhere", "country": "", "lat": 0, "lng": 0, "population": null},
            {"city": "Blank", "country": "X", "lat": 1, "lng": 2, "population": ""},
            {"city": "Text", "country": "Y", "lat": 1, "lng": 2, "population": " 1200 "}
        ]"#;
        let ds = CityDataset::from_json_str(payload).expect("cities");
        assert_eq!(ds.len(), 5);
        assert_eq!(ds.skipped, 0);
        assert_eq!(
            ds.cities[0],
            CityRecord::new("Tokyo", "Japan", 35.6897, 139.6922).with_population(37_732_000)
        );
        assert_eq!(ds.cities[1].population, Some(135_688));
        assert_eq!(ds.cities[2].name, "Nowhere");
        assert_eq!(ds.cities[2].population, None);
        assert_eq!(ds.cities[3].population, None);
        assert_eq!(ds.cities[4].population, Some(1200));
        assert_eq!(ds.cities[0].location(), GeoPoint::new(139.6922, 35.6897));
    }

    #[test]
    fn skips_records_without_coordinates() {
        let payload = r#"[
            {"city": "Good", "country": "A", "lat": 1, "lng": 1},
            {"city": "NoLat", "country": "B", "lng": 1},
            {"city": "BadPop", "country": "C", "lat": 1, "lng": 1, "population": [1]}
        ]"#;
        let ds = CityDataset::from_json_str(payload).expect("cities");
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped, 2);
    }

    #[test]
    fn rejects_non_array_payload() {
        let err = CityDataset::from_json_str(r#"{"city": "Solo"}"#).unwrap_err();
        assert!(matches!(err, CityDatasetError::NotAnArray));
        assert!(matches!(
            CityDataset::from_json_str("[").unwrap_err(),
            CityDatasetError::Json(_)
        ));
    }
}
