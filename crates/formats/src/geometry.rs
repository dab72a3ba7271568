use foundation::GeoPoint;
use serde_json::{Map, Value};

/// Closed boundary line; the last position repeats the first.
pub type PolygonRing = Vec<GeoPoint>;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Vec<GeoPoint>),
    MultiLineString(Vec<Vec<GeoPoint>>),
    Polygon(Vec<PolygonRing>),
    MultiPolygon(Vec<Vec<PolygonRing>>),
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Every ring of a polygonal geometry, outer rings and holes alike, in
    /// document order. Non-polygonal geometries have no rings.
    pub fn polygon_rings(&self) -> Vec<&PolygonRing> {
        match self {
            Geometry::Polygon(rings) => rings.iter().collect(),
            Geometry::MultiPolygon(polys) => polys.iter().flatten().collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    /// `None` when the source carried a null or missing geometry.
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn ring_count(&self) -> usize {
        self.features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .map(|g| g.polygon_rings().len())
            .sum()
    }

    pub fn without_geometry(&self) -> usize {
        self.features
            .iter()
            .filter(|f| f.geometry.is_none())
            .count()
    }
}

pub(crate) fn feature_id(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Feature, FeatureCollection, Geometry};
    use foundation::GeoPoint;
    use serde_json::Map;

    fn square(offset: f64) -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(offset, 0.0),
            GeoPoint::new(offset + 1.0, 0.0),
            GeoPoint::new(offset + 1.0, 1.0),
            GeoPoint::new(offset, 0.0),
        ]
    }

    #[test]
    fn multipolygon_rings_are_flattened_in_order() {
        let polys = vec![vec![square(0.0), square(0.2)], vec![square(5.0)]];
        let geom = Geometry::MultiPolygon(polys);
        let rings = geom.polygon_rings();
        assert_eq!(rings.len(), 3);
        assert_eq!(rings[2][0].longitude, 5.0);
        let line = Geometry::LineString(square(0.0));
        assert!(line.polygon_rings().is_empty());
    }

    #[test]
    fn counts_skip_missing_geometry() {
        let fc = FeatureCollection {
            features: vec![
                Feature {
                    id: Some("1".to_string()),
                    properties: Map::new(),
                    geometry: Some(Geometry::Polygon(vec![square(0.0)])),
                },
                Feature {
                    id: None,
                    properties: Map::new(),
                    geometry: None,
                },
            ],
        };
        assert_eq!(fc.ring_count(), 1);
        assert_eq!(fc.without_geometry(), 1);
    }
}
