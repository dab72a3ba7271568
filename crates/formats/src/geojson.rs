use foundation::GeoPoint;
use serde_json::Value;

use crate::geometry::{Feature, FeatureCollection, Geometry, PolygonRing, feature_id};

#[derive(Debug, thiserror::Error)]
pub enum GeoJsonError {
    #[error("GeoJSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
}

impl FeatureCollection {
    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_geojson_value(&value)
    }

    /// Reads a GeoJSON FeatureCollection.
    ///
    /// Features whose `geometry` is null or absent are kept with
    /// `geometry: None`; consumers skip them.
    pub fn from_geojson_value(value: &Value) -> Result<Self, GeoJsonError> {
        let obj = value
            .as_object()
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(GeoJsonError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let feat_obj = feat_val
                .as_object()
                .ok_or_else(|| GeoJsonError::InvalidFeature {
                    index,
                    reason: "feature must be an object".to_string(),
                })?;

            let feat_type = feat_obj
                .get("type")
                .and_then(|v| v.as_str())
                .ok_or_else(|| GeoJsonError::InvalidFeature {
                    index,
                    reason: "feature missing type".to_string(),
                })?;
            if feat_type != "Feature" {
                return Err(GeoJsonError::InvalidFeature {
                    index,
                    reason: format!("unexpected feature type: {feat_type}"),
                });
            }

            let properties = feat_obj
                .get("properties")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default();

            let geometry = match feat_obj.get("geometry") {
                None | Some(Value::Null) => None,
                Some(g) => match parse_geometry(g) {
                    Ok(geometry) => Some(geometry),
                    Err(reason) => return Err(GeoJsonError::InvalidFeature { index, reason }),
                },
            };

            features.push(Feature {
                id: feature_id(feat_obj.get("id")),
                properties,
                geometry,
            });
        }

        Ok(Self { features })
    }
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(Geometry::Point(parse_point(coords)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_points(coords)?)),
        "LineString" => Ok(Geometry::LineString(parse_points(coords)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_lines(coords)?)),
        "Polygon" => Ok(Geometry::Polygon(parse_polygon(coords)?)),
        "MultiPolygon" => Ok(Geometry::MultiPolygon(parse_multi_polygon(coords)?)),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoPoint::new(lon, lat))
}

fn parse_points(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    arr.iter().map(parse_point).collect()
}

fn parse_lines(coords: &Value) -> Result<Vec<Vec<GeoPoint>>, String> {
    let arr = coords
        .as_array()
        .ok_or("MultiLineString coordinates must be an array".to_string())?;
    arr.iter().map(parse_points).collect()
}

fn parse_polygon(coords: &Value) -> Result<Vec<PolygonRing>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    rings.iter().map(parse_points).collect()
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<PolygonRing>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    polys.iter().map(parse_polygon).collect()
}
