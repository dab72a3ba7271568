//! Geographic coordinates on the display sphere.
//!
//! The globe is a sphere centred at the origin in a right-handed frame with
//! +Y through the north pole. Longitude 0 on the equator lands on +X,
//! longitude 90°E on -Z.

use super::Vec3;

/// Radius of the rendered globe in world units.
pub const GLOBE_RADIUS: f64 = 5.0;
/// Height above the globe at which city markers are rooted.
pub const MARKER_LIFT: f64 = 0.01;
/// Mean Earth radius used to turn world-unit chords into kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A longitude/latitude pair in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn to_sphere(self, radius: f64) -> Vec3 {
        project(self.longitude, self.latitude, radius)
    }
}

/// Anything with a fixed place on the globe.
pub trait Located {
    fn location(&self) -> GeoPoint;
}

impl Located for GeoPoint {
    fn location(&self) -> GeoPoint {
        *self
    }
}

/// Maps degrees of longitude/latitude onto a sphere of `radius`.
///
/// Out-of-range inputs are not rejected; they wrap around the sphere the way
/// the trigonometry dictates.
pub fn project(longitude: f64, latitude: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - latitude).to_radians();
    let theta = (longitude + 180.0).to_radians();

    let x = -(radius * phi.sin() * theta.cos());
    let y = radius * phi.cos();
    let z = radius * phi.sin() * theta.sin();

    Vec3::new(x, y, z)
}

/// Inverse of [`project`]. The radius of `point` is ignored.
///
/// Returns longitude in (-180, 180] and latitude in [-90, 90]. The origin maps
/// to (0, 0).
pub fn unproject(point: Vec3) -> GeoPoint {
    let r = point.length();
    if r <= 0.0 {
        return GeoPoint::default();
    }

    let phi = (point.y / r).clamp(-1.0, 1.0).acos();
    let latitude = 90.0 - phi.to_degrees();

    // theta = atan2(z, -x); undefined at the poles where we report 0.
    let longitude = if point.x == 0.0 && point.z == 0.0 {
        0.0
    } else {
        let theta = point.z.atan2(-point.x).to_degrees();
        let mut lon = theta - 180.0;
        if lon <= -180.0 {
            lon += 360.0;
        }
        lon
    };

    GeoPoint::new(longitude, latitude)
}

/// Straight-line distance between two sphere points, scaled to kilometres.
pub fn chord_km(a: Vec3, b: Vec3, sphere_radius: f64, earth_radius_km: f64) -> f64 {
    a.distance(b) * (earth_radius_km / sphere_radius)
}

#[cfg(test)]
mod tests {
    use super::{EARTH_RADIUS_KM, GLOBE_RADIUS, GeoPoint, chord_km, project, unproject};
    use proptest::prelude::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn north_pole_maps_to_positive_y() {
        let p = project(0.0, 90.0, GLOBE_RADIUS);
        assert_close(p.x, 0.0, 1e-9);
        assert_close(p.y, GLOBE_RADIUS, 1e-9);
        assert_close(p.z, 0.0, 1e-9);
    }

    #[test]
    fn south_pole_maps_to_negative_y() {
        let p = project(0.0, -90.0, GLOBE_RADIUS);
        assert_close(p.x, 0.0, 1e-9);
        assert_close(p.y, -GLOBE_RADIUS, 1e-9);
        assert_close(p.z, 0.0, 1e-9);
    }

    #[test]
    fn equator_axes() {
        let greenwich = project(0.0, 0.0, 1.0);
        assert_close(greenwich.x, 1.0, 1e-12);
        assert_close(greenwich.z, 0.0, 1e-12);

        let east = project(90.0, 0.0, 1.0);
        assert_close(east.x, 0.0, 1e-12);
        assert_close(east.z, -1.0, 1e-12);
    }

    #[test]
    fn unproject_inverts_project() {
        for (lon, lat) in [(37.6, 55.7), (-74.0, 40.7), (139.7, 35.7), (-58.4, -34.6)] {
            let g = unproject(project(lon, lat, GLOBE_RADIUS));
            assert_close(g.longitude, lon, 1e-9);
            assert_close(g.latitude, lat, 1e-9);
        }
        assert_eq!(unproject(project(0.0, 90.0, 2.0)).longitude, 0.0);
    }

    #[test]
    fn chord_between_antipodes_is_earth_diameter() {
        let a = GeoPoint::new(0.0, 0.0).to_sphere(GLOBE_RADIUS);
        let b = GeoPoint::new(180.0, 0.0).to_sphere(GLOBE_RADIUS);
        assert_close(
            chord_km(a, b, GLOBE_RADIUS, EARTH_RADIUS_KM),
            2.0 * EARTH_RADIUS_KM,
            1e-6,
        );
    }

    proptest! {
        #[test]
        fn projected_points_lie_on_the_sphere(
            lon in -180.0f64..=180.0,
            lat in -90.0f64..=90.0,
            radius in 0.1f64..100.0,
        ) {
            let len = project(lon, lat, radius).length();
            prop_assert!(((len - radius) / radius).abs() < 1e-6);
        }
    }
}
