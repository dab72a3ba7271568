use viewer::{InfoPanel, Overlay};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

const OVERLAY_STYLE: &str = "position:fixed;top:50%;left:50%;transform:translate(-50%,-50%);\
    background:rgba(30,30,30,0.95);color:#fff;padding:24px 40px;border-radius:12px;\
    font-size:1.3em;font-family:sans-serif;z-index:2000;white-space:pre-line";
const PANEL_STYLE: &str = "position:absolute;background:rgba(255,255,255,0.95);\
    border:1px solid #888;border-radius:8px;padding:12px 18px;\
    box-shadow:0 2px 12px rgba(0,0,0,0.2);z-index:1000;min-width:180px;font-family:sans-serif";
const CLOSE_STYLE: &str = "position:absolute;top:6px;right:8px;background:transparent;\
    border:none;font-size:18px;cursor:pointer";

struct PanelDom {
    root: Element,
    selection: usize,
    // Kept alive for as long as the button exists.
    _on_close: Closure<dyn FnMut()>,
}

/// DOM elements mirroring the view-model's overlay and info panel.
#[derive(Default)]
pub struct Dom {
    overlay: Option<(Element, Overlay)>,
    panel: Option<PanelDom>,
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

impl Dom {
    pub fn sync_overlay(&mut self, overlay: &Overlay) -> Result<(), JsValue> {
        let unchanged = matches!(&self.overlay, Some((_, shown)) if shown == overlay);
        if unchanged {
            return Ok(());
        }
        if let Some((el, _)) = self.overlay.take() {
            el.remove();
        }
        let text = match overlay {
            Overlay::Hidden => return Ok(()),
            Overlay::Loading(msg) | Overlay::Error(msg) => msg,
        };

        let doc = document()?;
        let el = doc.create_element("div")?;
        el.set_attribute("style", OVERLAY_STYLE)?;
        el.set_text_content(Some(text));
        append_to_body(&doc, &el)?;
        self.overlay = Some((el, overlay.clone()));
        Ok(())
    }

    /// Rebuilds the panel when the selection changed, otherwise moves it to
    /// the city's current screen position. `on_close` runs when the close
    /// button is pressed.
    pub fn sync_panel(
        &mut self,
        panel: Option<(usize, &InfoPanel)>,
        on_close: impl FnMut() + 'static,
    ) -> Result<(), JsValue> {
        let Some((selection, info)) = panel else {
            if let Some(old) = self.panel.take() {
                old.root.remove();
            }
            return Ok(());
        };

        if let Some(current) = &self.panel {
            if current.selection == selection {
                return position(&current.root, info);
            }
        }
        if let Some(old) = self.panel.take() {
            old.root.remove();
        }

        let doc = document()?;
        let root = doc.create_element("div")?;
        position(&root, info)?;

        let close = doc.create_element("button")?;
        close.set_attribute("style", CLOSE_STYLE)?;
        close.set_text_content(Some("\u{2716}"));
        let on_close = Closure::<dyn FnMut()>::new(on_close);
        close.add_event_listener_with_callback("click", on_close.as_ref().unchecked_ref())?;
        root.append_child(&close)?;

        for (i, line) in info.lines().iter().enumerate() {
            let div = doc.create_element(if i == 0 { "b" } else { "div" })?;
            div.set_text_content(Some(line));
            root.append_child(&div)?;
        }

        append_to_body(&doc, &root)?;
        self.panel = Some(PanelDom {
            root,
            selection,
            _on_close: on_close,
        });
        Ok(())
    }
}

fn position(root: &Element, info: &InfoPanel) -> Result<(), JsValue> {
    let style = match info.screen {
        Some([x, y]) => format!("{PANEL_STYLE};left:{x}px;top:{y}px"),
        None => format!("{PANEL_STYLE};display:none"),
    };
    root.set_attribute("style", &style)
}

fn append_to_body(doc: &Document, el: &Element) -> Result<(), JsValue> {
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
    body.append_child(el)?;
    Ok(())
}
