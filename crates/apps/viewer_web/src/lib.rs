use console_error_panic_hook::set_once;
use js_sys::{Float32Array, Uint32Array};
use std::cell::RefCell;
use viewer::{ClickOutcome, ConfigError, DatasetKind, GlobeViewModel, Severity, ViewerConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::console;

mod dom;
mod fetch;
use dom::Dom;

struct WebState {
    vm: GlobeViewModel,
    dom: Dom,
}

thread_local! {
    static STATE: RefCell<WebState> = RefCell::new(WebState {
        vm: GlobeViewModel::default(),
        dom: Dom::default(),
    });
}

fn with_state<R>(f: impl FnOnce(&mut WebState) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

/// Writes queued view-model events to the browser console.
fn report_events(state: &mut WebState) {
    for event in state.vm.drain_events() {
        let line = JsValue::from_str(&format!("[frame {}] {}", event.frame_index, event.payload));
        match event.payload.severity() {
            Severity::Info => console::info_1(&line),
            Severity::Warn => console::warn_1(&line),
            Severity::Error => console::error_1(&line),
        }
    }
}

/// Brings the console, the loading box and the info panel in line with the
/// view-model.
fn sync_dom(state: &mut WebState) {
    report_events(state);
    let overlay = state.vm.overlay();
    let panel = state
        .vm
        .selection()
        .and_then(|s| s.panel.as_ref().map(|p| (s.index, p)));

    let result = state
        .dom
        .sync_overlay(&overlay)
        .and_then(|()| state.dom.sync_panel(panel, close_from_button));
    if let Err(err) = result {
        console::error_1(&err);
    }
}

// The button's own closure must not drop itself, so the element is removed
// on the next frame rather than here.
fn close_from_button() {
    with_state(|s| {
        s.vm.close_info_panel();
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Replaces the view with one built from a JSON config override. Only
/// accepted before `load_datasets`.
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    let to_js = |e: ConfigError| JsValue::from_str(&e.to_string());
    let config = ViewerConfig::from_json_str(json).map_err(to_js)?;
    with_state(|s| {
        let result = s.vm.reconfigure(config).map_err(to_js);
        sync_dom(s);
        result
    })
}

/// Starts both dataset fetches; each updates the view when it settles.
/// Later calls are ignored.
#[wasm_bindgen]
pub fn load_datasets() {
    let config = with_state(|s| {
        let first = s.vm.begin_fetch();
        sync_dom(s);
        first.then(|| s.vm.config().clone())
    });
    let Some(config) = config else {
        console::warn_1(&JsValue::from_str("datasets were already requested"));
        return;
    };
    let timeout = config.fetch_timeout();

    let requests = [
        (DatasetKind::Borders, config.borders_url),
        (DatasetKind::Cities, config.cities_url),
    ];
    for (kind, url) in requests {
        spawn_local(async move {
            let fetched = fetch::fetch_text(&url, timeout).await;
            with_state(|s| {
                s.vm.finish_fetch(kind, &url, fetched);
                sync_dom(s);
            });
        });
    }
}

#[wasm_bindgen]
pub fn set_canvas_size(width: f64, height: f64) {
    with_state(|s| {
        s.vm.set_viewport(width, height);
        sync_dom(s);
    });
}

#[wasm_bindgen]
pub fn pointer_down(x: f64, y: f64) {
    with_state(|s| s.vm.pointer_down(x, y));
}

#[wasm_bindgen]
pub fn pointer_move(x: f64, y: f64) {
    with_state(|s| s.vm.pointer_move(x, y));
}

/// Returns true when the release selected a city.
#[wasm_bindgen]
pub fn pointer_up(x: f64, y: f64) -> bool {
    with_state(|s| {
        let outcome = s.vm.pointer_up(x, y);
        sync_dom(s);
        matches!(outcome, Some(ClickOutcome::Selected { .. }))
    })
}

#[wasm_bindgen]
pub fn wheel(delta_y: f64) {
    with_state(|s| s.vm.wheel(delta_y));
}

/// Call once per display refresh; returns the elapsed time in seconds.
#[wasm_bindgen]
pub fn advance_frame(dt_s: f64) -> f64 {
    with_state(|s| {
        let frame = s.vm.advance_frame(dt_s);
        sync_dom(s);
        frame.elapsed_s
    })
}

/// Column-major view-projection matrix, 16 floats.
#[wasm_bindgen]
pub fn camera_view_proj() -> Float32Array {
    let m = with_state(|s| s.vm.camera().view_proj_matrix());
    let flat: Vec<f32> = m.iter().flatten().copied().collect();
    Float32Array::from(flat.as_slice())
}

/// Border polylines as a line list, two vertices per segment.
#[wasm_bindgen]
pub fn border_vertices() -> Float32Array {
    with_state(|s| Float32Array::from(s.vm.border_snapshot().segment_vertices().as_slice()))
}

#[wasm_bindgen]
pub fn marker_positions() -> Float32Array {
    with_state(|s| Float32Array::from(s.vm.marker_mesh().positions.as_slice()))
}

#[wasm_bindgen]
pub fn marker_colors() -> Float32Array {
    with_state(|s| Float32Array::from(s.vm.marker_mesh().colors.as_slice()))
}

#[wasm_bindgen]
pub fn marker_indices() -> Uint32Array {
    with_state(|s| Uint32Array::from(s.vm.marker_mesh().indices.as_slice()))
}

/// Empty when nothing is selected.
#[wasm_bindgen]
pub fn cursor_positions() -> Float32Array {
    with_state(|s| match s.vm.cursor_mesh() {
        Some(mesh) => Float32Array::from(mesh.positions.as_slice()),
        None => Float32Array::new_with_length(0),
    })
}

#[wasm_bindgen]
pub fn cursor_indices() -> Uint32Array {
    with_state(|s| match s.vm.cursor_mesh() {
        Some(mesh) => Uint32Array::from(mesh.indices.as_slice()),
        None => Uint32Array::new_with_length(0),
    })
}

#[wasm_bindgen]
pub fn star_positions() -> Float32Array {
    with_state(|s| Float32Array::from(s.vm.stars().flat_positions().as_slice()))
}

#[wasm_bindgen]
pub fn close_info_panel() {
    with_state(|s| {
        s.vm.close_info_panel();
        sync_dom(s);
    });
}
