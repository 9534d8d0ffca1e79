use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gtfs::Row;

/// `locations.geojson`, the GTFS-Flex zone file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsLocations {
    #[serde(default)]
    pub features: Vec<GtfsLocationFeature>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsLocationFeature {
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: Option<GtfsLocationProperties>,
    pub geometry: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GtfsLocationProperties {
    pub stop_name: Option<String>,
    pub stop_desc: Option<String>,
    pub zone_id: Option<String>,
    pub stop_url: Option<String>,
}

impl From<GtfsLocationFeature> for Row {
    fn from(value: GtfsLocationFeature) -> Self {
        let mut row = Row::new();
        match value.id {
            Some(Value::String(id)) => row.push("location_id", id),
            Some(Value::Number(id)) => row.push("location_id", id.to_string()),
            _ => (),
        }
        let properties = value.properties.unwrap_or_default();
        let optional = [
            ("stop_name", properties.stop_name),
            ("stop_desc", properties.stop_desc),
            ("zone_id", properties.zone_id),
            ("stop_url", properties.stop_url),
        ];
        for (column, value) in optional {
            if let Some(value) = value {
                row.push(column, value);
            }
        }
        if let Some(geometry) = value.geometry {
            row.push("geometry", geometry.to_string());
        }
        row
    }
}

#[test]
fn feature_becomes_location_row() {
    let json = r#"{
        "type": "FeatureCollection",
        "features": [{
            "id": "area_1074",
            "type": "Feature",
            "properties": { "stop_name": "Tillicum" },
            "geometry": { "type": "Polygon", "coordinates": [] }
        }, {
            "id": 17,
            "type": "Feature",
            "properties": null,
            "geometry": null
        }]
    }"#;
    let locations: GtfsLocations = serde_json::from_str(json).unwrap();
    let rows: Vec<Row> = locations.features.into_iter().map(Row::from).collect();
    assert_eq!(rows[0].get("location_id"), Some("area_1074"));
    assert_eq!(rows[0].get("stop_name"), Some("Tillicum"));
    assert!(rows[0].get("geometry").unwrap().contains("Polygon"));
    assert_eq!(rows[1].get("location_id"), Some("17"));
    assert_eq!(rows[1].get("stop_name"), None);
}
