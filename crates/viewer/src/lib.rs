pub mod click;
pub mod config;
pub mod panel;
pub mod state;
pub mod view_model;

pub use click::ClickTracker;
pub use config::{ConfigError, ViewerConfig};
pub use panel::InfoPanel;
pub use state::{DatasetKind, LoadState, Overlay};
pub use view_model::{ClickOutcome, GlobeViewModel, Selection, Severity, ViewerEvent};
