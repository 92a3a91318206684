use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::MeasurementSeries;
use crate::utils::coordinates::deserialize_coordinate;

/// Identity of a leaf entity (district) with resolved coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EntityMetadata {
    #[validate(length(min = 1))]
    pub entity_name: String,

    #[validate(length(min = 1))]
    pub parent_name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl EntityMetadata {
    pub fn new(entity_name: String, parent_name: String, latitude: f64, longitude: f64) -> Self {
        Self {
            entity_name,
            parent_name,
            latitude,
            longitude,
        }
    }
}

/// Contents of `{entity}_{Frequency}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(alias = "kab_name")]
    pub entity_name: String,

    #[serde(alias = "prov_name")]
    pub parent_name: String,

    #[serde(deserialize_with = "deserialize_coordinate")]
    pub latitude: f64,

    #[serde(deserialize_with = "deserialize_coordinate")]
    pub longitude: f64,

    pub data: MeasurementSeries,
}

impl EntityRecord {
    pub fn new(metadata: &EntityMetadata, data: MeasurementSeries) -> Self {
        Self {
            entity_name: metadata.entity_name.clone(),
            parent_name: metadata.parent_name.clone(),
            latitude: metadata.latitude,
            longitude: metadata.longitude,
            data,
        }
    }
}

/// Contents of `{parent}_{Frequency}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentAggregateRecord {
    #[serde(alias = "prov_name")]
    pub parent_name: String,

    #[serde(alias = "num_kab")]
    pub num_children: usize,

    pub aggregated: bool,
    pub data: MeasurementSeries,
}

impl ParentAggregateRecord {
    pub fn new(parent_name: &str, num_children: usize, data: MeasurementSeries) -> Self {
        Self {
            parent_name: parent_name.to_string(),
            num_children,
            aggregated: true,
            data,
        }
    }
}

/// Either kind of output file, for tools that inspect files without knowing which they hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeriesFile {
    Aggregate(ParentAggregateRecord),
    Entity(EntityRecord),
}

impl SeriesFile {
    pub fn name(&self) -> &str {
        match self {
            SeriesFile::Aggregate(r) => &r.parent_name,
            SeriesFile::Entity(r) => &r.entity_name,
        }
    }

    pub fn data(&self) -> &MeasurementSeries {
        match self {
            SeriesFile::Aggregate(r) => &r.data,
            SeriesFile::Entity(r) => &r.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_validation() {
        let jakarta = EntityMetadata::new(
            "KOTA JAKARTA PUSAT".to_string(),
            "DKI JAKARTA".to_string(),
            -6.1805,
            106.8284,
        );
        assert!(jakarta.validate().is_ok());

        let invalid = EntityMetadata::new(
            "Nowhere".to_string(),
            "DKI JAKARTA".to_string(),
            -91.0,
            106.8,
        );
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_legacy_keys_accepted() {
        let json = r#"{
            "kab_name": "KABUPATEN BOGOR",
            "prov_name": "JAWA BARAT",
            "latitude": -6.55,
            "longitude": 106.63,
            "data": { "time": ["2020"], "shortwave_radiation": [210.5] }
        }"#;
        let record: EntityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.entity_name, "KABUPATEN BOGOR");
        assert_eq!(record.parent_name, "JAWA BARAT");

        let json = r#"{
            "prov_name": "JAWA BARAT",
            "num_kab": 27,
            "aggregated": true,
            "data": { "time": [] }
        }"#;
        let record: ParentAggregateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.num_children, 27);
    }

    #[test]
    fn test_geocoder_string_coordinates_accepted() {
        let json = r#"{
            "kab_name": "KOTA DENPASAR",
            "prov_name": "BALI",
            "latitude": "-8.65",
            "longitude": "115.2167",
            "data": { "time": ["2020-01-01"], "shortwave_radiation": [210.5] }
        }"#;
        let record: EntityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.latitude, -8.65);
        assert_eq!(record.longitude, 115.2167);

        // Written back as plain numbers
        let written = serde_json::to_value(&record).unwrap();
        assert_eq!(written["latitude"], serde_json::json!(-8.65));

        let file: SeriesFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.name(), "KOTA DENPASAR");

        let bad = json.replace("\"-8.65\"", "\"somewhere\"");
        assert!(serde_json::from_str::<EntityRecord>(&bad).is_err());
    }

    #[test]
    fn test_series_file_detection() {
        let entity = r#"{"entity_name":"A","parent_name":"P","latitude":0.0,"longitude":0.0,"data":{"time":[]}}"#;
        let aggregate = r#"{"parent_name":"P","num_children":2,"aggregated":true,"data":{"time":[]}}"#;

        assert!(matches!(
            serde_json::from_str::<SeriesFile>(entity).unwrap(),
            SeriesFile::Entity(_)
        ));
        assert!(matches!(
            serde_json::from_str::<SeriesFile>(aggregate).unwrap(),
            SeriesFile::Aggregate(_)
        ));
    }
}
