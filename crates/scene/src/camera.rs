//! Orbit camera around the globe.
//!
//! The camera sits on a sphere around a fixed target (the globe centre) and
//! is parameterised by azimuth, polar angle and distance, with +Y up. Drag
//! input accumulates a rotation delta that is bled off over several frames
//! by the damping factor; wheel input scales the distance immediately.
//! Rotate and zoom speeds shrink as the camera approaches the surface.

use serde::{Deserialize, Serialize};

use foundation::math::Vec3;

/// Keeps the polar angle off the poles so the view basis stays defined.
const POLAR_EPSILON: f64 = 1e-6;

/// Slowest rotate/zoom speed reached at the minimum distance.
const MIN_SPEED: f64 = 0.01;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
    /// Starting distance from the globe centre, looking down -Z.
    pub distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Fraction of the pending rotation applied per frame.
    pub damping_factor: f64,
    pub base_rotate_speed: f64,
    pub base_zoom_speed: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_y_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 10.0,
            min_distance: 5.15,
            max_distance: 50.0,
            damping_factor: 0.05,
            base_rotate_speed: 7.0,
            base_zoom_speed: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    settings: CameraSettings,
    /// Azimuth around +Y, measured from +Z towards +X.
    theta: f64,
    /// Polar angle from +Y.
    phi: f64,
    distance: f64,
    target: Vec3,
    /// Rotation still to be applied by damping, as (theta, phi).
    pending: (f64, f64),
    rotate_speed: f64,
    zoom_speed: f64,
    viewport_width: f64,
    viewport_height: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}

impl OrbitCamera {
    pub fn new(settings: CameraSettings) -> Self {
        let mut camera = Self {
            settings,
            theta: 0.0,
            phi: std::f64::consts::FRAC_PI_2,
            distance: settings
                .distance
                .clamp(settings.min_distance, settings.max_distance),
            target: Vec3::ZERO,
            pending: (0.0, 0.0),
            rotate_speed: settings.base_rotate_speed,
            zoom_speed: settings.base_zoom_speed,
            viewport_width: 1280.0,
            viewport_height: 720.0,
        };
        camera.begin_interaction();
        camera
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn rotate_speed(&self) -> f64 {
        self.rotate_speed
    }

    pub fn zoom_speed(&self) -> f64 {
        self.zoom_speed
    }

    pub fn viewport(&self) -> [f64; 2] {
        [self.viewport_width, self.viewport_height]
    }

    pub fn aspect(&self) -> f64 {
        (self.viewport_width / self.viewport_height).max(1e-6)
    }

    /// Resize handling: updates the viewport and therefore the aspect ratio.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width.max(1.0);
        self.viewport_height = height.max(1.0);
    }

    /// Recomputes rotate and zoom speeds from the current distance.
    ///
    /// Called at the start of every drag or wheel gesture so that the globe
    /// moves slower under the pointer the closer the camera is.
    pub fn begin_interaction(&mut self) {
        let s = &self.settings;
        let span = (s.max_distance - s.min_distance).max(f64::EPSILON);
        let closeness = (self.distance - s.min_distance) / span;
        self.zoom_speed = (s.base_zoom_speed * closeness).max(MIN_SPEED);
        self.rotate_speed = (s.base_rotate_speed * closeness).max(MIN_SPEED);
    }

    /// Queues an orbit for a pointer drag of `(dx_px, dy_px)`.
    ///
    /// A drag across the full viewport height turns the globe one full
    /// revolution at rotate speed 1.
    pub fn rotate(&mut self, dx_px: f64, dy_px: f64) {
        let per_px = std::f64::consts::TAU * self.rotate_speed / self.viewport_height;
        self.pending.0 -= dx_px * per_px;
        self.pending.1 -= dy_px * per_px;
    }

    /// Wheel zoom. Negative `delta_y` moves towards the globe.
    pub fn zoom(&mut self, delta_y: f64) {
        let step = 0.95f64.powf(self.zoom_speed);
        if delta_y < 0.0 {
            self.distance *= step;
        } else if delta_y > 0.0 {
            self.distance /= step;
        }
        self.distance = self
            .distance
            .clamp(self.settings.min_distance, self.settings.max_distance);
    }

    /// Applies one frame of damped rotation.
    pub fn update(&mut self) {
        let f = self.settings.damping_factor;
        self.theta += self.pending.0 * f;
        self.phi = (self.phi + self.pending.1 * f)
            .clamp(POLAR_EPSILON, std::f64::consts::PI - POLAR_EPSILON);
        self.pending.0 *= 1.0 - f;
        self.pending.1 *= 1.0 - f;
    }

    pub fn eye(&self) -> Vec3 {
        let r = self.distance;
        let offset = Vec3::new(
            r * self.phi.sin() * self.theta.sin(),
            r * self.phi.cos(),
            r * self.phi.sin() * self.theta.cos(),
        );
        self.target + offset
    }

    /// Right, up and forward unit vectors of the view.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let eye = self.eye();
        let forward = (self.target - eye).normalize().unwrap_or(-Vec3::Z);
        let right = forward.cross(Vec3::Y).normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);
        (right, up, forward)
    }

    fn tan_half_fov(&self) -> f64 {
        (0.5 * self.settings.fov_y_deg.to_radians()).tan()
    }

    /// Ray from the eye through pixel `(x_px, y_px)` (origin top-left).
    pub fn screen_ray(&self, x_px: f64, y_px: f64) -> crate::picking::Ray {
        let ndc_x = (x_px / self.viewport_width) * 2.0 - 1.0;
        let ndc_y = -(y_px / self.viewport_height) * 2.0 + 1.0;
        let t = self.tan_half_fov();
        let (right, up, forward) = self.basis();

        let dir = right * (ndc_x * t * self.aspect()) + up * (ndc_y * t) + forward;
        crate::picking::Ray::new(self.eye(), dir.normalize().unwrap_or(forward))
    }

    /// Pixel position of a world point, or `None` when it lies behind the
    /// near plane.
    pub fn world_to_screen(&self, point: Vec3) -> Option<[f64; 2]> {
        let (right, up, forward) = self.basis();
        let v = point - self.eye();
        let depth = v.dot(forward);
        if depth < self.settings.near {
            return None;
        }
        let t = self.tan_half_fov();
        let ndc_x = v.dot(right) / (depth * t * self.aspect());
        let ndc_y = v.dot(up) / (depth * t);
        Some([
            (ndc_x * 0.5 + 0.5) * self.viewport_width,
            (-ndc_y * 0.5 + 0.5) * self.viewport_height,
        ])
    }

    /// Column-major view-projection matrix (right-handed, depth in [0, 1]).
    pub fn view_proj_matrix(&self) -> [[f32; 4]; 4] {
        let view = mat4_look_at_rh(self.eye(), self.target, Vec3::Y);
        let proj = mat4_perspective_rh_z0(
            self.settings.fov_y_deg.to_radians(),
            self.aspect(),
            self.settings.near,
            self.settings.far,
        );
        mat4_mul(proj, view)
    }
}

fn mat4_mul(a: [[f32; 4]; 4], b: [[f32; 4]; 4]) -> [[f32; 4]; 4] {
    // Column-major matrix multiply: c = a * b
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

fn mat4_perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> [[f32; 4]; 4] {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let m00 = (f / aspect) as f32;
    let m11 = f as f32;
    let m22 = (far / (near - far)) as f32;
    let m23 = ((near * far) / (near - far)) as f32;

    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

fn mat4_look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> [[f32; 4]; 4] {
    let f = (target - eye).normalize().unwrap_or(-Vec3::Z);
    let s = f.cross(up).normalize().unwrap_or(Vec3::X);
    let u = s.cross(f);

    let ex = -s.dot(eye);
    let ey = -u.dot(eye);
    let ez = f.dot(eye);

    [
        [s.x as f32, u.x as f32, -f.x as f32, 0.0],
        [s.y as f32, u.y as f32, -f.y as f32, 0.0],
        [s.z as f32, u.z as f32, -f.z as f32, 0.0],
        [ex as f32, ey as f32, ez as f32, 1.0],
    ]
}
