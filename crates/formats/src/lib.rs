pub mod cities;
pub mod dataset;
pub mod geojson;
pub mod geometry;
pub mod topojson;

pub use cities::*;
pub use dataset::*;
pub use geojson::GeoJsonError;
pub use geometry::*;
pub use topojson::{Topology, TopologyError, Transform};
