use foundation::math::Vec3;

use crate::camera::OrbitCamera;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Closest point where `origin + t * direction` (t > 0) meets the sphere of
/// `radius` centred at the origin.
///
/// Solves `|O + tD|² = R²`. When the ray starts inside the sphere only the
/// far root is positive and that exit point is returned. A sphere entirely
/// behind the origin, a miss, or a zero direction yield `None`.
pub fn intersect_sphere(origin: Vec3, direction: Vec3, radius: f64) -> Option<Vec3> {
    let a = direction.dot(direction);
    if a <= 0.0 {
        return None;
    }
    let b = 2.0 * origin.dot(direction);
    let c = origin.dot(origin) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }

    let sqrt_disc = disc.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);
    let t = if t1 > 0.0 {
        t1
    } else if t2 > 0.0 {
        t2
    } else {
        return None;
    };

    Some(origin + direction * t)
}

impl Ray {
    pub fn intersect_sphere(&self, radius: f64) -> Option<Vec3> {
        intersect_sphere(self.origin, self.dir, radius)
    }
}

/// Point on the globe under pixel `(x_px, y_px)`, if the pixel covers it.
pub fn pick_globe(camera: &OrbitCamera, x_px: f64, y_px: f64, radius: f64) -> Option<Vec3> {
    camera.screen_ray(x_px, y_px).intersect_sphere(radius)
}

#[cfg(test)]
mod tests {
    use super::{Ray, intersect_sphere, pick_globe};
    use crate::camera::OrbitCamera;
    use foundation::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn ray_through_centre_hits_near_side() {
        let origin = Vec3::new(0.0, 0.0, 10.0);
        let hit = intersect_sphere(origin, Vec3::new(0.0, 0.0, -1.0), 5.0).expect("hit");
        assert_eq!(hit, Vec3::new(0.0, 0.0, 5.0));
        assert_close(origin.distance(hit), 10.0 - 5.0, 1e-12);
    }

    #[test]
    fn unnormalized_direction_gives_same_point() {
        let origin = Vec3::new(0.0, 0.0, 10.0);
        let hit = intersect_sphere(origin, Vec3::new(0.0, 0.0, -7.5), 5.0).expect("hit");
        assert_close(hit.z, 5.0, 1e-12);
    }

    #[test]
    fn ray_aimed_away_misses() {
        let origin = Vec3::new(0.0, 0.0, 10.0);
        let away = intersect_sphere(origin, Vec3::new(0.0, 0.0, 1.0), 5.0);
        assert_eq!(away, None);
    }

    #[test]
    fn ray_passing_beside_sphere_misses() {
        let beside = Vec3::new(0.0, 6.0, 10.0);
        let miss = intersect_sphere(beside, Vec3::new(0.0, 0.0, -1.0), 5.0);
        assert_eq!(miss, None);

        let stalled = intersect_sphere(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 5.0);
        assert_eq!(stalled, None);
    }

    #[test]
    fn ray_from_inside_exits_through_far_root() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let hit = ray.intersect_sphere(5.0).expect("exit point");
        assert_close(hit.x, 5.0, 1e-12);
    }

    #[test]
    fn grazing_ray_touches_once() {
        let origin = Vec3::new(0.0, 5.0, 10.0);
        let hit = intersect_sphere(origin, Vec3::new(0.0, 0.0, -1.0), 5.0).expect("tangent");
        assert_close(hit.y, 5.0, 1e-12);
        assert_close(hit.z, 0.0, 1e-12);
    }

    #[test]
    fn picking_centre_pixel_hits_globe_facing_camera() {
        let mut cam = OrbitCamera::default();
        cam.set_viewport(640.0, 480.0);
        let p = pick_globe(&cam, 320.0, 240.0, 5.0).expect("hit");
        assert_close(p.z, 5.0, 1e-9);
        assert_close(p.length(), 5.0, 1e-9);

        // Corner pixels look past the globe at the default distance.
        assert_eq!(pick_globe(&cam, 0.0, 0.0, 5.0), None);
    }
}
