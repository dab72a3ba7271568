//! TopoJSON topology decoding.
//!
//! A topology stores each shared boundary once as an *arc*; geometries refer
//! to arcs by index, with `~i` (that is `-i - 1`) meaning arc `i` reversed.
//! Quantized topologies delta-encode arc positions and carry a `transform`
//! that maps integer positions back to longitude/latitude.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use foundation::GeoPoint;

use crate::geometry::{Feature, FeatureCollection, Geometry, PolygonRing, feature_id};

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("topology parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a TopoJSON Topology, found type {0:?}")]
    NotATopology(String),
    #[error("topology has no object named {0:?}")]
    MissingObject(String),
    #[error("arc {arc} position {position} has fewer than two coordinates")]
    InvalidPosition { arc: usize, position: usize },
    #[error("arc reference {reference} is out of range ({count} arcs)")]
    ArcOutOfRange { reference: i64, count: usize },
    #[error("invalid geometry at index {index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },
}

/// Quantization transform: `position * scale + translate`.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64) -> GeoPoint {
        GeoPoint::new(
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        )
    }
}

#[derive(Deserialize)]
struct RawTopology {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    objects: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct Topology {
    transform: Option<Transform>,
    /// Arcs with positions already decoded to absolute coordinates.
    arcs: Vec<Vec<GeoPoint>>,
    objects: Map<String, Value>,
}

impl Topology {
    pub fn from_json_str(payload: &str) -> Result<Self, TopologyError> {
        let raw: RawTopology = serde_json::from_str(payload)?;
        Self::from_raw(raw)
    }

    pub fn from_value(value: Value) -> Result<Self, TopologyError> {
        let raw: RawTopology = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawTopology) -> Result<Self, TopologyError> {
        if raw.ty != "Topology" {
            return Err(TopologyError::NotATopology(raw.ty));
        }

        let mut arcs = Vec::with_capacity(raw.arcs.len());
        for (arc_index, arc) in raw.arcs.iter().enumerate() {
            arcs.push(decode_arc(arc_index, arc, raw.transform.as_ref())?);
        }

        Ok(Self {
            transform: raw.transform,
            arcs,
            objects: raw.objects,
        })
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Converts the named object into features.
    ///
    /// A `GeometryCollection` yields one feature per member geometry; any
    /// other object yields a single feature. Members with a null type decode
    /// to `geometry: None`.
    pub fn feature_collection(&self, object: &str) -> Result<FeatureCollection, TopologyError> {
        let value = self
            .objects
            .get(object)
            .ok_or_else(|| TopologyError::MissingObject(object.to_string()))?;

        let is_collection =
            value.get("type").and_then(|v| v.as_str()) == Some("GeometryCollection");
        if !is_collection {
            return Ok(FeatureCollection {
                features: vec![self.feature(0, value)?],
            });
        }

        let members = value
            .get("geometries")
            .and_then(|v| v.as_array())
            .ok_or_else(|| TopologyError::InvalidGeometry {
                index: 0,
                reason: "GeometryCollection missing geometries".to_string(),
            })?;

        let mut features = Vec::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            features.push(self.feature(index, member)?);
        }
        Ok(FeatureCollection { features })
    }

    fn feature(&self, index: usize, value: &Value) -> Result<Feature, TopologyError> {
        let obj = value
            .as_object()
            .ok_or_else(|| TopologyError::InvalidGeometry {
                index,
                reason: "geometry must be an object".to_string(),
            })?;

        let properties = obj
            .get("properties")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();

        let geometry = self.geometry(obj).map_err(|reason| match reason {
            GeometryFault::Arc(err) => err,
            GeometryFault::Shape(reason) => TopologyError::InvalidGeometry { index, reason },
        })?;

        Ok(Feature {
            id: feature_id(obj.get("id")),
            properties,
            geometry,
        })
    }

    fn geometry(&self, obj: &Map<String, Value>) -> Result<Option<Geometry>, GeometryFault> {
        let Some(ty) = obj.get("type").and_then(|v| v.as_str()) else {
            return Ok(None);
        };

        let geometry = match ty {
            "Point" => Geometry::Point(self.position(coordinates(obj)?)?),
            "MultiPoint" => Geometry::MultiPoint(self.positions(coordinates(obj)?)?),
            "LineString" => Geometry::LineString(self.line(&arc_list(arcs(obj)?)?)?),
            "MultiLineString" => Geometry::MultiLineString(
                nested(arcs(obj)?)?
                    .iter()
                    .map(|a| self.line(&arc_list(a)?))
                    .collect::<Result<_, _>>()?,
            ),
            "Polygon" => Geometry::Polygon(self.polygon(arcs(obj)?)?),
            "MultiPolygon" => Geometry::MultiPolygon(
                nested(arcs(obj)?)?
                    .iter()
                    .map(|p| self.polygon(p))
                    .collect::<Result<_, _>>()?,
            ),
            other => {
                debug!(
                    geometry_type = other,
                    "skipping unsupported topology geometry"
                );
                return Ok(None);
            }
        };
        Ok(Some(geometry))
    }

    fn polygon(&self, value: &Value) -> Result<Vec<PolygonRing>, GeometryFault> {
        nested(value)?
            .iter()
            .map(|ring| self.ring(&arc_list(ring)?))
            .collect()
    }

    /// Stitches arcs end to end; the shared endpoint between consecutive arcs
    /// appears once.
    fn line(&self, refs: &[i64]) -> Result<Vec<GeoPoint>, GeometryFault> {
        let mut points: Vec<GeoPoint> = Vec::new();
        for (k, &reference) in refs.iter().enumerate() {
            if k > 0 {
                points.pop();
            }
            self.push_arc(reference, &mut points)?;
        }
        if points.len() == 1 {
            points.push(points[0]);
        }
        Ok(points)
    }

    /// Like [`Topology::line`], padded to the four positions a valid ring needs.
    fn ring(&self, refs: &[i64]) -> Result<PolygonRing, GeometryFault> {
        let mut points = self.line(refs)?;
        if let Some(&first) = points.first() {
            while points.len() < 4 {
                points.push(first);
            }
        }
        Ok(points)
    }

    fn push_arc(&self, reference: i64, out: &mut Vec<GeoPoint>) -> Result<(), GeometryFault> {
        let (index, reversed) = if reference < 0 {
            (!reference, true)
        } else {
            (reference, false)
        };
        let arc = usize::try_from(index)
            .ok()
            .and_then(|i| self.arcs.get(i))
            .ok_or(GeometryFault::Arc(TopologyError::ArcOutOfRange {
                reference,
                count: self.arcs.len(),
            }))?;

        if reversed {
            out.extend(arc.iter().rev().copied());
        } else {
            out.extend(arc.iter().copied());
        }
        Ok(())
    }

    fn position(&self, value: &Value) -> Result<GeoPoint, GeometryFault> {
        let arr = value
            .as_array()
            .filter(|a| a.len() >= 2)
            .ok_or_else(|| GeometryFault::shape("position must have [x, y]"))?;
        let x = arr[0]
            .as_f64()
            .ok_or_else(|| GeometryFault::shape("position x must be a number"))?;
        let y = arr[1]
            .as_f64()
            .ok_or_else(|| GeometryFault::shape("position y must be a number"))?;
        Ok(match &self.transform {
            Some(t) => t.apply(x, y),
            None => GeoPoint::new(x, y),
        })
    }

    fn positions(&self, value: &Value) -> Result<Vec<GeoPoint>, GeometryFault> {
        nested(value)?.iter().map(|p| self.position(p)).collect()
    }
}

enum GeometryFault {
    Arc(TopologyError),
    Shape(String),
}

impl GeometryFault {
    fn shape(reason: &str) -> Self {
        GeometryFault::Shape(reason.to_string())
    }
}

fn coordinates(obj: &Map<String, Value>) -> Result<&Value, GeometryFault> {
    obj.get("coordinates")
        .ok_or_else(|| GeometryFault::shape("geometry missing coordinates"))
}

fn arcs(obj: &Map<String, Value>) -> Result<&Value, GeometryFault> {
    obj.get("arcs")
        .ok_or_else(|| GeometryFault::shape("geometry missing arcs"))
}

fn nested(value: &Value) -> Result<&Vec<Value>, GeometryFault> {
    value
        .as_array()
        .ok_or_else(|| GeometryFault::shape("expected an array"))
}

fn arc_list(value: &Value) -> Result<Vec<i64>, GeometryFault> {
    nested(value)?
        .iter()
        .map(|v| {
            v.as_i64()
                .ok_or_else(|| GeometryFault::shape("arc reference must be an integer"))
        })
        .collect()
}

fn decode_arc(
    arc_index: usize,
    arc: &[Vec<f64>],
    transform: Option<&Transform>,
) -> Result<Vec<GeoPoint>, TopologyError> {
    let mut out = Vec::with_capacity(arc.len());
    let (mut x, mut y) = (0.0, 0.0);
    for (position, p) in arc.iter().enumerate() {
        if p.len() < 2 {
            return Err(TopologyError::InvalidPosition {
                arc: arc_index,
                position,
            });
        }
        match transform {
            Some(t) => {
                x += p[0];
                y += p[1];
                out.push(t.apply(x, y));
            }
            None => out.push(GeoPoint::new(p[0], p[1])),
        }
    }
    Ok(out)
}
