use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// An uploaded original image, staged on the local filesystem.
///
/// Created once on upload, never mutated; the staged file is removed
/// after the archival pipeline has uploaded the converted copy.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub original_filename: String,
    pub file_stem: String,
    pub path: PathBuf,
}

/// Location and time metadata derived once from an uploaded image's
/// embedded EXIF tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Capture date as `dd.mm.yyyy`, when the image carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_date: Option<String>,
}

/// Reverse-geocoding result for a pair of coordinates.
///
/// `name` may be empty; the user can override it manually before
/// submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationEnrichment {
    pub name: String,
    pub town: String,
    pub country: String,
    pub country_code: String,
}

/// Current weather at the capture location. Display-only, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub description: String,
    pub wind_speed: f64,
}

/// A raw Overpass element: tagged node, way or relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<PlaceMember>,
}

/// A member entry of an Overpass relation element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceMember {
    #[serde(rename = "type")]
    pub member_type: String,
    #[serde(rename = "ref")]
    pub reference: i64,
    pub role: String,
}

impl PlaceElement {
    /// The element's `name` tag, if present and non-empty.
    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str).filter(|n| !n.is_empty())
    }
}

/// Route/tourism buckets a named place element can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceCategory {
    Hiking,
    Bicycle,
    MountainBike,
    Attraction,
}

/// Nearby places bucketed by category. Elements without a name tag or
/// outside the known buckets are dropped during classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedPlaces {
    pub hiking: Vec<PlaceElement>,
    pub bicycle: Vec<PlaceElement>,
    pub mountain_bike: Vec<PlaceElement>,
    pub attractions: Vec<PlaceElement>,
}

/// The user-approved record persisted to the spreadsheet: capture
/// metadata plus location enrichment plus manual overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub name: String,
    pub town: String,
    pub country: String,
    pub country_code: String,
    pub file_name_without_extension: String,
    pub date_time_original: String,
    pub end_date: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
}

impl SubmissionRecord {
    /// Spreadsheet row in the fixed column order of the target sheet.
    pub fn to_row(&self) -> Vec<serde_json::Value> {
        vec![
            serde_json::Value::String(self.name.clone()),
            serde_json::Value::String(self.town.clone()),
            serde_json::Value::String(self.date_time_original.clone()),
            serde_json::Value::String(self.end_date.clone()),
            serde_json::Value::String(self.file_name_without_extension.clone()),
            serde_json::json!(self.latitude),
            serde_json::json!(self.longitude),
            serde_json::Value::String(self.country.clone()),
            serde_json::Value::String(self.country_code.clone()),
            self.altitude
                .map(|a| serde_json::json!(a))
                .unwrap_or(serde_json::Value::String(String::new())),
        ]
    }
}

/// Combined result of the sequenced enrichment lookups.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentResult {
    pub location: LocationEnrichment,
    pub weather: WeatherSnapshot,
    pub places: ClassifiedPlaces,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            name: "Ridge Trail".into(),
            town: "Garmisch".into(),
            country: "Deutschland".into(),
            country_code: "de".into(),
            file_name_without_extension: "IMG_0042".into(),
            date_time_original: "04.07.2023".into(),
            end_date: "06.07.2023".into(),
            latitude: 47.49,
            longitude: 11.09,
            altitude: Some(712.0),
        }
    }

    #[test]
    fn row_column_order_matches_sheet_layout() {
        let row = record().to_row();
        assert_eq!(row[0], "Ridge Trail");
        assert_eq!(row[1], "Garmisch");
        assert_eq!(row[2], "04.07.2023");
        assert_eq!(row[3], "06.07.2023");
        assert_eq!(row[4], "IMG_0042");
        assert_eq!(row[5], serde_json::json!(47.49));
        assert_eq!(row[6], serde_json::json!(11.09));
        assert_eq!(row[7], "Deutschland");
        assert_eq!(row[8], "de");
        assert_eq!(row[9], serde_json::json!(712.0));
    }

    #[test]
    fn missing_altitude_serializes_as_empty_cell() {
        let mut r = record();
        r.altitude = None;
        assert_eq!(r.to_row()[9], serde_json::Value::String(String::new()));
    }

    #[test]
    fn submission_record_uses_camel_case_field_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert!(json.get("fileNameWithoutExtension").is_some());
        assert!(json.get("dateTimeOriginal").is_some());
        assert!(json.get("endDate").is_some());
        assert!(json.get("countryCode").is_some());
    }

    #[test]
    fn place_element_name_filters_empty_tag() {
        let mut el = PlaceElement {
            element_type: "node".into(),
            id: 1,
            lat: None,
            lon: None,
            tags: HashMap::new(),
            nodes: vec![],
            members: vec![],
        };
        assert_eq!(el.name(), None);
        el.tags.insert("name".into(), String::new());
        assert_eq!(el.name(), None);
        el.tags.insert("name".into(), "Old Mill".into());
        assert_eq!(el.name(), Some("Old Mill"));
    }
}
