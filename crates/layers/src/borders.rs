use formats::FeatureCollection;
use foundation::math::Vec3;
use foundation::math::sphere::{GLOBE_RADIUS, project};
use tracing::debug;

use crate::layer::{Layer, LayerId};
use crate::symbology::Color;

/// Country outlines drawn as polylines on the globe surface.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderLayer {
    id: LayerId,
    radius: f64,
    color: Color,
    snapshot: BorderSnapshot,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BorderSnapshot {
    /// One polyline per polygon ring, in feature order.
    pub lines: Vec<Vec<Vec3>>,
    /// Features skipped because they carried no geometry.
    pub skipped_features: usize,
}

impl BorderSnapshot {
    pub fn vertex_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    /// Polylines expanded into independent segments, `[x0,y0,z0, x1,y1,z1]`
    /// per segment, for line-list primitives.
    pub fn segment_vertices(&self) -> Vec<f32> {
        let mut out = Vec::new();
        for line in &self.lines {
            for pair in line.windows(2) {
                out.extend_from_slice(&pair[0].to_f32());
                out.extend_from_slice(&pair[1].to_f32());
            }
        }
        out
    }
}

impl BorderLayer {
    pub fn new(id: u64) -> Self {
        Self {
            id: LayerId(id),
            radius: GLOBE_RADIUS,
            color: Color::BORDER_BLUE,
            snapshot: BorderSnapshot::default(),
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn snapshot(&self) -> &BorderSnapshot {
        &self.snapshot
    }

    /// Rebuilds the outlines from `features`. Only polygon rings are drawn;
    /// features without geometry are counted and skipped.
    pub fn extract(&mut self, features: &FeatureCollection) -> &BorderSnapshot {
        let mut out = BorderSnapshot::default();
        for feature in &features.features {
            let Some(geometry) = &feature.geometry else {
                out.skipped_features += 1;
                continue;
            };
            for ring in geometry.polygon_rings() {
                out.lines.push(
                    ring.iter()
                        .map(|p| project(p.longitude, p.latitude, self.radius))
                        .collect(),
                );
            }
        }
        debug!(
            lines = out.lines.len(),
            vertices = out.vertex_count(),
            skipped = out.skipped_features,
            "border layer rebuilt"
        );
        self.snapshot = out;
        &self.snapshot
    }
}

impl Layer for BorderLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn vertex_count(&self) -> usize {
        self.snapshot.vertex_count()
    }
}
