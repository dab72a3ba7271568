pub mod camera;
pub mod picking;
pub mod query;
pub mod spatial;

pub use camera::{CameraSettings, OrbitCamera};
pub use picking::{Ray, intersect_sphere, pick_globe};
pub use query::{NearestCity, NearestOptions, SphereIndex, nearest_city};
