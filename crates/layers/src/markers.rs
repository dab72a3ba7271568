use formats::CityRecord;
use foundation::math::Vec3;
use foundation::math::sphere::{GLOBE_RADIUS, Located, MARKER_LIFT};
use tracing::debug;

use crate::layer::{Layer, LayerId};
use crate::symbology::{MarkerStyle, PopulationScale};

/// Radial segments around each marker cylinder.
pub const CYLINDER_SEGMENTS: u32 = 12;

/// Indexed triangle mesh with per-vertex colours, laid out flat for upload.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MarkerMesh {
    /// `[x, y, z]` per vertex.
    pub positions: Vec<f32>,
    /// `[r, g, b]` per vertex, 0..1.
    pub colors: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MarkerMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Appends a capped cylinder whose axis runs from `base` along `axis`
    /// (unit length) for `style.height`.
    pub fn push_cylinder(&mut self, base: Vec3, axis: Vec3, style: &MarkerStyle) {
        let Some(axis) = axis.normalize() else {
            return;
        };
        let (u, v) = perpendicular_basis(axis);
        let top = base + axis * style.height;
        let rgb = style.color.to_rgb_f32();
        let first = self.vertex_count() as u32;
        let n = CYLINDER_SEGMENTS;

        // Bottom ring, top ring, then the two cap centres.
        for centre in [base, top] {
            for i in 0..n {
                let a = std::f64::consts::TAU * i as f64 / n as f64;
                let offset = u * (style.radius * a.cos()) + v * (style.radius * a.sin());
                self.push_vertex(centre + offset, rgb);
            }
        }
        self.push_vertex(base, rgb);
        self.push_vertex(top, rgb);

        let bottom_centre = first + 2 * n;
        let top_centre = bottom_centre + 1;
        for i in 0..n {
            let j = (i + 1) % n;
            let (b0, b1) = (first + i, first + j);
            let (t0, t1) = (first + n + i, first + n + j);
            self.indices.extend_from_slice(&[b0, b1, t1, b0, t1, t0]);
            self.indices.extend_from_slice(&[bottom_centre, b1, b0]);
            self.indices.extend_from_slice(&[top_centre, t0, t1]);
        }
    }

    fn push_vertex(&mut self, p: Vec3, rgb: [f32; 3]) {
        self.positions.extend_from_slice(&p.to_f32());
        self.colors.extend_from_slice(&rgb);
    }
}

fn perpendicular_basis(axis: Vec3) -> (Vec3, Vec3) {
    let helper = if axis.y.abs() < 0.99 { Vec3::Y } else { Vec3::X };
    let u = helper.cross(axis).normalize().unwrap_or(Vec3::X);
    let v = axis.cross(u);
    (u, v)
}

/// One merged mesh holding a population marker per city.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLayer {
    id: LayerId,
    scale: PopulationScale,
    globe_radius: f64,
    lift: f64,
    mesh: MarkerMesh,
}

impl MarkerLayer {
    pub fn new(id: u64) -> Self {
        Self {
            id: LayerId(id),
            scale: PopulationScale::default(),
            globe_radius: GLOBE_RADIUS,
            lift: MARKER_LIFT,
            mesh: MarkerMesh::default(),
        }
    }

    pub fn with_scale(mut self, scale: PopulationScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_globe(mut self, globe_radius: f64, lift: f64) -> Self {
        self.globe_radius = globe_radius;
        self.lift = lift;
        self
    }

    pub fn scale(&self) -> &PopulationScale {
        &self.scale
    }

    pub fn mesh(&self) -> &MarkerMesh {
        &self.mesh
    }

    /// Rebuilds the merged mesh: each marker stands on the lifted sphere and
    /// extends outward along the radial direction.
    pub fn extract(&mut self, cities: &[CityRecord]) -> &MarkerMesh {
        let mut mesh = MarkerMesh::default();
        for city in cities {
            let base = city.location().to_sphere(self.globe_radius + self.lift);
            let style = self.scale.encode(city.population);
            mesh.push_cylinder(base, base, &style);
        }
        debug!(
            cities = cities.len(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "marker layer rebuilt"
        );
        self.mesh = mesh;
        &self.mesh
    }
}

impl Layer for MarkerLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }
}

/// Blue cylinder marking the selected city, centred on its surface point.
pub fn cursor_mesh(
    surface_point: Vec3,
    population: Option<u64>,
    scale: &PopulationScale,
) -> MarkerMesh {
    let mut mesh = MarkerMesh::default();
    let Some(axis) = surface_point.normalize() else {
        return mesh;
    };
    let style = scale.cursor(population);
    let base = surface_point - axis * (style.height / 2.0);
    mesh.push_cylinder(base, axis, &style);
    mesh
}

#[cfg(test)]
mod tests {
    use super::{CYLINDER_SEGMENTS, MarkerLayer, MarkerMesh, cursor_mesh};
    use crate::symbology::{Color, PopulationScale, encode};
    use formats::CityRecord;
    use foundation::math::Vec3;
    use foundation::math::sphere::project;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn vertex(mesh: &MarkerMesh, i: usize) -> Vec3 {
        let p = &mesh.positions[i * 3..i * 3 + 3];
        Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
    }

    #[test]
    fn cylinder_topology() {
        let mut mesh = MarkerMesh::default();
        mesh.push_cylinder(Vec3::ZERO, Vec3::Y, &encode(Some(5_000_000)));
        let n = CYLINDER_SEGMENTS as usize;
        assert_eq!(mesh.vertex_count(), 2 * n + 2);
        assert_eq!(mesh.triangle_count(), 4 * n);
        assert_eq!(mesh.colors.len(), mesh.positions.len());
        let vertices = mesh.vertex_count();
        assert!(mesh.indices.iter().all(|&i| (i as usize) < vertices));

        mesh.push_cylinder(Vec3::ZERO, Vec3::ZERO, &encode(None));
        assert_eq!(mesh.vertex_count(), 2 * n + 2);
    }

    #[test]
    fn markers_stand_on_lifted_sphere() {
        let tokyo = CityRecord::new("Tokyo", "Japan", 35.6897, 139.6922);
        let tokyo = tokyo.with_population(37_732_000);
        let hamlet = CityRecord::new("Hamlet", "Nowhere", -10.0, 20.0);
        let mut layer = MarkerLayer::new(2);
        let mesh = layer.extract(&[tokyo, hamlet]).clone();

        let n = CYLINDER_SEGMENTS as usize;
        let per_city = 2 * n + 2;
        assert_eq!(mesh.vertex_count(), 2 * per_city);

        let style = encode(Some(37_732_000));
        let base_centre = vertex(&mesh, 2 * n);
        let top_centre = vertex(&mesh, 2 * n + 1);
        assert_close(base_centre.length(), 5.01, 1e-5);
        assert_close(top_centre.length(), 5.01 + style.height, 1e-5);
        let expected = project(139.6922, 35.6897, 5.01);
        assert_close(base_centre.distance(expected), 0.0, 1e-5);

        // Bottom ring sits `radius` away from the base centre.
        assert_close(vertex(&mesh, 0).distance(base_centre), style.radius, 1e-5);

        let violet = Color::VIOLET.to_rgb_f32();
        assert_eq!(&mesh.colors[per_city * 3..per_city * 3 + 3], &violet);
        assert_eq!(&mesh.colors[0..3], &Color::DEEP_RED.to_rgb_f32());
    }

    #[test]
    fn cursor_is_centred_on_the_city() {
        let scale = PopulationScale::default();
        let point = project(2.35, 48.85, 5.0);
        let mesh = cursor_mesh(point, Some(11_000_000), &scale);
        let n = CYLINDER_SEGMENTS as usize;
        let base = vertex(&mesh, 2 * n);
        let top = vertex(&mesh, 2 * n + 1);
        let mid = (base + top) * 0.5;
        assert_close(mid.distance(point), 0.0, 1e-5);
        let height = scale.cursor(Some(11_000_000)).height;
        assert_close(top.distance(base), height, 1e-5);
        assert_eq!(&mesh.colors[0..3], &Color::CURSOR_BLUE.to_rgb_f32());

        assert!(cursor_mesh(Vec3::ZERO, None, &scale).is_empty());
    }
}
