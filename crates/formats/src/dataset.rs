use serde_json::Value;

use crate::geojson::GeoJsonError;
use crate::geometry::FeatureCollection;
use crate::topojson::{Topology, TopologyError};

/// Object holding country outlines in the world-atlas topologies.
pub const DEFAULT_BORDER_OBJECT: &str = "countries";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("border dataset parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    GeoJson(#[from] GeoJsonError),
    #[error("unrecognised border dataset type {0:?}")]
    UnknownType(Option<String>),
}

/// Reads country borders from either a TopoJSON topology (taking the named
/// object) or a plain GeoJSON FeatureCollection.
pub fn borders_from_json_str(
    payload: &str,
    object: &str,
) -> Result<FeatureCollection, DatasetError> {
    let value: Value = serde_json::from_str(payload)?;
    match value.get("type").and_then(|v| v.as_str()) {
        Some("Topology") => Ok(Topology::from_value(value)?.feature_collection(object)?),
        Some("FeatureCollection") => Ok(FeatureCollection::from_geojson_value(&value)?),
        other => Err(DatasetError::UnknownType(other.map(str::to_string))),
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BORDER_OBJECT, DatasetError, borders_from_json_str};

    #[test]
    fn detects_topology_and_geojson() {
        let topo = r#"{
            "type": "Topology",
            "objects": {"countries": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "arcs": [[0]]}
            ]}},
            "arcs": [[[0, 0], [1, 0], [1, 1], [0, 0]]]
        }"#;
        let fc = borders_from_json_str(topo, DEFAULT_BORDER_OBJECT).expect("topology");
        assert_eq!(fc.ring_count(), 1);

        let geo = r#"{"type":"FeatureCollection","features":[]}"#;
        let fc = borders_from_json_str(geo, DEFAULT_BORDER_OBJECT).expect("geojson");
        assert!(fc.is_empty());
    }

    #[test]
    fn unknown_types_are_rejected() {
        let err = borders_from_json_str(r#"{"type":"Feature"}"#, "x").unwrap_err();
        assert!(matches!(err, DatasetError::UnknownType(Some(t)) if t == "Feature"));
        let err = borders_from_json_str(r#"[1,2]"#, "x").unwrap_err();
        assert!(matches!(err, DatasetError::UnknownType(None)));
    }
}
