//! The globe view-model.
//!
//! All session state lives here: configuration, the orbit camera, both
//! datasets with their load states, the derived layers, and at most one
//! selection (info panel plus cursor marker). The web surface only forwards
//! host events into it and reads buffers back out.

use std::fmt;

use formats::{CityDataset, CityDatasetError, CityRecord, DatasetError, FeatureCollection};
use foundation::GeoPoint;
use foundation::math::Vec3;
use foundation::math::sphere::unproject;
use layers::{BorderLayer, BorderSnapshot, MarkerLayer, MarkerMesh, StarLayer, cursor_mesh};
use runtime::{Event, EventBus, Frame, FrameClock};
use scene::{OrbitCamera, SphereIndex, pick_globe};
use tracing::{debug, info, warn};

use crate::click::ClickTracker;
use crate::config::{ConfigError, ViewerConfig};
use crate::panel::InfoPanel;
use crate::state::{DatasetKind, LoadState, Overlay, overlay_for};

const BORDER_LAYER_ID: u64 = 1;
const MARKER_LAYER_ID: u64 = 2;
const STAR_LAYER_ID: u64 = 3;

/// Notifications for the presentation side, stamped with their frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    DatasetReady {
        kind: DatasetKind,
        items: usize,
        /// Records or features dropped while building the layer.
        skipped: usize,
    },
    DatasetFailed { kind: DatasetKind, reason: String },
    CitySelected {
        index: usize,
        name: String,
        distance_km: f64,
    },
    /// The previous selection's panel and cursor were torn down.
    SelectionDisposed { index: usize, name: String },
    PanelClosed,
}

/// Console level an event is reported at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl ViewerEvent {
    pub fn severity(&self) -> Severity {
        match self {
            ViewerEvent::DatasetFailed { .. } => Severity::Error,
            ViewerEvent::DatasetReady { skipped, .. } if *skipped > 0 => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for ViewerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerEvent::DatasetReady {
                kind,
                items,
                skipped,
            } => {
                write!(f, "{kind} ready: {items} items")?;
                if *skipped > 0 {
                    write!(f, " ({skipped} skipped)")?;
                }
                Ok(())
            }
            ViewerEvent::DatasetFailed { kind, reason } => {
                write!(f, "{kind} failed to load: {reason}")
            }
            ViewerEvent::CitySelected {
                name,
                distance_km,
                ..
            } => write!(f, "selected {name}, {distance_km:.1} km from the click"),
            ViewerEvent::SelectionDisposed { name, .. } => write!(f, "deselected {name}"),
            ViewerEvent::PanelClosed => f.write_str("info panel closed"),
        }
    }
}

/// Result of a completed click.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The ray missed the globe.
    Missed,
    /// The globe was hit but no city lies within the search radius.
    NoCityInRange { pick: GeoPoint },
    Selected { index: usize, distance_km: f64 },
}

/// The city currently being inspected.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub index: usize,
    pub city: CityRecord,
    /// City position on the globe surface.
    pub surface: Vec3,
    /// Geographic location of the click that chose it.
    pub pick: GeoPoint,
    pub distance_km: f64,
    pub cursor: MarkerMesh,
    /// `None` once the user closed the panel; the cursor stays.
    pub panel: Option<InfoPanel>,
}

#[derive(Debug)]
pub struct GlobeViewModel {
    config: ViewerConfig,
    camera: OrbitCamera,
    clock: FrameClock,
    events: EventBus<ViewerEvent>,
    clicks: ClickTracker,
    last_pointer: Option<[f64; 2]>,
    fetch_started: bool,
    borders_state: LoadState,
    cities_state: LoadState,
    cities: CityDataset,
    index: SphereIndex,
    borders: BorderLayer,
    markers: MarkerLayer,
    stars: StarLayer,
    selection: Option<Selection>,
}

impl Default for GlobeViewModel {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl GlobeViewModel {
    pub fn new(config: ViewerConfig) -> Self {
        let borders = BorderLayer::new(BORDER_LAYER_ID).with_radius(config.globe_radius);
        let markers = MarkerLayer::new(MARKER_LAYER_ID)
            .with_scale(config.population_scale())
            .with_globe(config.globe_radius, config.marker_lift);
        let stars = StarLayer::generate(STAR_LAYER_ID, &config.stars);
        Self {
            camera: OrbitCamera::new(config.camera),
            clock: FrameClock::new(),
            events: EventBus::new(),
            clicks: ClickTracker::new(),
            last_pointer: None,
            fetch_started: false,
            borders_state: LoadState::Loading,
            cities_state: LoadState::Loading,
            cities: CityDataset::default(),
            index: SphereIndex::default(),
            borders,
            markers,
            stars,
            selection: None,
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Rebuilds the view around `config`, keeping the viewport. Refused once
    /// the datasets were requested.
    pub fn reconfigure(&mut self, config: ViewerConfig) -> Result<(), ConfigError> {
        if self.fetch_started {
            return Err(ConfigError::Locked);
        }
        config.validate()?;
        let [width, height] = self.camera.viewport();
        *self = Self::new(config);
        self.set_viewport(width, height);
        Ok(())
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.camera.set_viewport(width, height);
        self.reanchor_panel();
    }

    // -- datasets --

    pub fn load_state(&self, kind: DatasetKind) -> &LoadState {
        match kind {
            DatasetKind::Borders => &self.borders_state,
            DatasetKind::Cities => &self.cities_state,
        }
    }

    pub fn overlay(&self) -> Overlay {
        overlay_for(&self.borders_state, &self.cities_state)
    }

    /// Marks the dataset requests as issued; false when they already were.
    pub fn begin_fetch(&mut self) -> bool {
        !std::mem::replace(&mut self.fetch_started, true)
    }

    /// Settles one dataset request. Transport failures are recorded against
    /// `kind` with `source` named in the reason; payloads go through the
    /// matching loader, which records its own parse failures.
    pub fn finish_fetch(
        &mut self,
        kind: DatasetKind,
        source: &str,
        fetched: Result<String, String>,
    ) {
        let payload = match fetched {
            Ok(payload) => payload,
            Err(reason) => {
                self.fail_dataset(kind, format!("fetching {source}: {reason}"));
                return;
            }
        };
        let loaded = match kind {
            DatasetKind::Borders => self.load_borders_json(&payload).map_err(|e| e.to_string()),
            DatasetKind::Cities => self.load_cities_json(&payload).map_err(|e| e.to_string()),
        };
        if let Err(err) = loaded {
            debug!(%kind, source, %err, "dataset payload rejected");
        }
    }

    /// Parses a border payload (TopoJSON or GeoJSON). A parse failure marks
    /// the dataset failed and is also returned.
    pub fn load_borders_json(&mut self, payload: &str) -> Result<(), DatasetError> {
        match formats::borders_from_json_str(payload, &self.config.border_object) {
            Ok(features) => {
                self.set_borders(&features);
                Ok(())
            }
            Err(err) => {
                self.fail_dataset(DatasetKind::Borders, err.to_string());
                Err(err)
            }
        }
    }

    pub fn set_borders(&mut self, features: &FeatureCollection) {
        let snapshot = self.borders.extract(features);
        let (lines, skipped) = (snapshot.lines.len(), snapshot.skipped_features);
        self.borders_state = LoadState::Ready;
        info!(features = features.len(), lines, skipped, "borders ready");
        self.emit(ViewerEvent::DatasetReady {
            kind: DatasetKind::Borders,
            items: features.len(),
            skipped,
        });
    }

    pub fn load_cities_json(&mut self, payload: &str) -> Result<(), CityDatasetError> {
        match CityDataset::from_json_str(payload) {
            Ok(dataset) => {
                self.set_cities(dataset);
                Ok(())
            }
            Err(err) => {
                self.fail_dataset(DatasetKind::Cities, err.to_string());
                Err(err)
            }
        }
    }

    pub fn set_cities(&mut self, dataset: CityDataset) {
        self.markers.extract(&dataset.cities);
        self.index = SphereIndex::build(&dataset.cities);
        self.cities = dataset;
        self.cities_state = LoadState::Ready;
        info!(
            cities = self.cities.len(),
            skipped = self.cities.skipped,
            "cities ready"
        );
        self.emit(ViewerEvent::DatasetReady {
            kind: DatasetKind::Cities,
            items: self.cities.len(),
            skipped: self.cities.skipped,
        });
    }

    /// Records a fetch or parse failure for `kind`.
    pub fn fail_dataset(&mut self, kind: DatasetKind, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(%kind, %reason, "dataset failed to load");
        let state = LoadState::Failed(reason.clone());
        match kind {
            DatasetKind::Borders => self.borders_state = state,
            DatasetKind::Cities => self.cities_state = state,
        }
        self.emit(ViewerEvent::DatasetFailed { kind, reason });
    }

    pub fn cities(&self) -> &[CityRecord] {
        &self.cities.cities
    }

    // -- layers --

    pub fn border_snapshot(&self) -> &BorderSnapshot {
        self.borders.snapshot()
    }

    pub fn marker_mesh(&self) -> &MarkerMesh {
        self.markers.mesh()
    }

    pub fn stars(&self) -> &StarLayer {
        &self.stars
    }

    pub fn cursor_mesh(&self) -> Option<&MarkerMesh> {
        self.selection.as_ref().map(|s| &s.cursor)
    }

    // -- input --

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.clicks.pointer_down(x, y);
        self.last_pointer = Some([x, y]);
        self.camera.begin_interaction();
    }

    /// Orbits the camera while a button is held.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if !self.clicks.is_pressed() {
            return;
        }
        if let Some([lx, ly]) = self.last_pointer {
            self.camera.rotate(x - lx, y - ly);
        }
        self.last_pointer = Some([x, y]);
    }

    /// Ends a gesture; runs the pick when it was a click rather than a drag.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<ClickOutcome> {
        self.last_pointer = None;
        let [cx, cy] = self.clicks.pointer_up(x, y)?;
        Some(self.click(cx, cy))
    }

    pub fn wheel(&mut self, delta_y: f64) {
        self.camera.begin_interaction();
        self.camera.zoom(delta_y);
    }

    /// Picks the globe at a pixel and selects the nearest city, replacing
    /// the previous selection. Misses leave the selection untouched.
    pub fn click(&mut self, x: f64, y: f64) -> ClickOutcome {
        let Some(pick) = pick_globe(&self.camera, x, y, self.config.globe_radius) else {
            debug!(x, y, "click missed the globe");
            return ClickOutcome::Missed;
        };
        let pick_geo = unproject(pick);

        let opts = self.config.nearest_options();
        let Some(hit) = self.index.nearest(pick, &self.cities.cities, &opts) else {
            debug!(
                lon = pick_geo.longitude,
                lat = pick_geo.latitude,
                "no city within search radius"
            );
            return ClickOutcome::NoCityInRange { pick: pick_geo };
        };

        let city = hit.city.clone();
        let (index, distance_km, surface) = (hit.index, hit.distance_km, hit.position);
        let cursor = cursor_mesh(surface, city.population, self.markers.scale());
        let panel = InfoPanel::for_city(&city, self.camera.world_to_screen(surface));

        info!(index, name = %city.name, distance_km, "city selected");
        let name = city.name.clone();
        let previous = self.selection.replace(Selection {
            index,
            city,
            surface,
            pick: pick_geo,
            distance_km,
            cursor,
            panel: Some(panel),
        });
        if let Some(prev) = previous {
            self.emit(ViewerEvent::SelectionDisposed {
                index: prev.index,
                name: prev.city.name,
            });
        }
        self.emit(ViewerEvent::CitySelected {
            index,
            name,
            distance_km,
        });

        ClickOutcome::Selected { index, distance_km }
    }

    // -- selection --

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn info_panel(&self) -> Option<&InfoPanel> {
        self.selection.as_ref().and_then(|s| s.panel.as_ref())
    }

    /// Hides the info panel; the cursor marker stays on the city.
    pub fn close_info_panel(&mut self) -> bool {
        let closed = self
            .selection
            .as_mut()
            .and_then(|s| s.panel.take())
            .is_some();
        if closed {
            self.emit(ViewerEvent::PanelClosed);
        }
        closed
    }

    // -- frame --

    /// Advances one display frame: applies camera damping and keeps the
    /// panel anchored to its city.
    pub fn advance_frame(&mut self, dt_s: f64) -> Frame {
        let frame = self.clock.advance(dt_s);
        self.camera.update();
        self.reanchor_panel();
        frame
    }

    pub fn drain_events(&mut self) -> Vec<Event<ViewerEvent>> {
        self.events.drain()
    }

    fn reanchor_panel(&mut self) {
        let camera = &self.camera;
        if let Some(sel) = self.selection.as_mut() {
            if let Some(panel) = sel.panel.as_mut() {
                panel.screen = camera.world_to_screen(sel.surface);
            }
        }
    }

    fn emit(&mut self, event: ViewerEvent) {
        let frame = self.clock.current();
        self.events.emit(frame, event);
    }
}
