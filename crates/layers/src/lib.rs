pub mod borders;
pub mod layer;
pub mod markers;
pub mod stars;
pub mod symbology;

pub use borders::{BorderLayer, BorderSnapshot};
pub use layer::*;
pub use markers::{MarkerLayer, MarkerMesh, cursor_mesh};
pub use stars::{StarLayer, StarfieldSettings};
pub use symbology::{Color, MarkerStyle, PopulationScale, encode};
