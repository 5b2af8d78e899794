//! JavaScript bindings. The exported class keeps the embedding API's
//! camelCase names; render output crosses the boundary as JSON.

use std::cell::RefCell;
use std::rc::Rc;

use icicle_core::viewer::{CtrlClickHandler, SelectionHandler};
use icicle_core::{
    CallTreeNode, Click, ClickAction, FrameOutput, Modifiers, Overlay, ProfileForest,
    ProportionalMetrics, StyleRegistry, SurfaceSize, ViewerConfig,
};
use icicle_protocol::{RenderCommand, Viewport};
use serde::Serialize;
use wasm_bindgen::prelude::*;

thread_local! {
    // Shared by every viewer on the page.
    static STYLES: StyleRegistry = StyleRegistry::default();
    static LOGGER_READY: RefCell<bool> = const { RefCell::new(false) };
}

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[icicle] {}", record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn init_logging() {
    LOGGER_READY.with(|ready| {
        if !ready.replace(true) && log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Info);
        }
    });
}

fn js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// What the ctrl-click handler receives.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeInfo<'a> {
    func: &'a str,
    file: &'a str,
    path: &'a str,
    line: i64,
    count: f64,
}

impl<'a> From<&'a CallTreeNode> for NodeInfo<'a> {
    fn from(node: &'a CallTreeNode) -> Self {
        Self {
            func: &node.func,
            file: &node.file,
            path: &node.path,
            line: node.line,
            count: node.count,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameJson<'a> {
    canvas: Option<Viewport>,
    base: Option<&'a [RenderCommand]>,
    overlay: Option<&'a Overlay>,
}

impl<'a> From<&'a FrameOutput> for FrameJson<'a> {
    fn from(out: &'a FrameOutput) -> Self {
        Self {
            canvas: out.canvas,
            base: out.base.as_deref(),
            overlay: out.overlay.as_ref(),
        }
    }
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = queueMicrotask)]
    fn queue_microtask(callback: &js_sys::Function);
}

/// Argument of a recorded handler call.
#[derive(Debug, Clone, PartialEq)]
enum Payload {
    Key(String),
    /// Serialized [`NodeInfo`], parsed into an object on delivery.
    Node(String),
}

impl Payload {
    fn to_js(&self) -> JsValue {
        match self {
            Self::Key(key) => JsValue::from_str(key),
            Self::Node(json) => js_sys::JSON::parse(json).unwrap_or(JsValue::NULL),
        }
    }
}

/// Handler calls made while the viewer is borrowed.
///
/// wasm-bindgen keeps the exported object borrowed until an exported method
/// returns, so calls are recorded here and delivered afterwards.
struct Outbox<H> {
    calls: Rc<RefCell<Vec<(H, Payload)>>>,
}

impl<H> Default for Outbox<H> {
    fn default() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<H: Clone + 'static> Outbox<H> {
    fn selection_recorder(&self, handler: H) -> SelectionHandler {
        let calls = Rc::clone(&self.calls);
        Box::new(move |key: &str| {
            calls
                .borrow_mut()
                .push((handler.clone(), Payload::Key(key.to_owned())));
        })
    }

    fn node_recorder(&self, handler: H) -> CtrlClickHandler {
        let calls = Rc::clone(&self.calls);
        Box::new(move |node: &CallTreeNode| match serde_json::to_string(&NodeInfo::from(node)) {
            Ok(json) => calls.borrow_mut().push((handler.clone(), Payload::Node(json))),
            Err(e) => log::warn!("ctrl-click payload: {e}"),
        })
    }

    /// Hand every recorded call to `deliver`, oldest first.
    fn flush(&self, mut deliver: impl FnMut(H, Payload)) {
        let calls = std::mem::take(&mut *self.calls.borrow_mut());
        for (handler, payload) in calls {
            deliver(handler, payload);
        }
    }
}

#[wasm_bindgen(js_name = ProfileViewer)]
pub struct WasmViewer {
    inner: icicle_core::ProfileViewer,
    outbox: Outbox<js_sys::Function>,
}

impl WasmViewer {
    fn deliver(&self) {
        self.outbox.flush(|handler, payload| {
            queue_microtask(handler.bind1(&JsValue::NULL, &payload.to_js()).unchecked_ref());
        });
    }
}

#[wasm_bindgen(js_class = ProfileViewer)]
impl WasmViewer {
    /// `ascent` and `descent` are the label font's metrics per pixel of font
    /// size, as measured by the page (`measureText`); typical sans-serif
    /// proportions are used when absent.
    #[wasm_bindgen(constructor)]
    pub fn new(
        css_width: f64,
        css_height: f64,
        dpr: f64,
        ascent: Option<f64>,
        descent: Option<f64>,
    ) -> Result<WasmViewer, JsError> {
        init_logging();
        let metrics = ProportionalMetrics {
            ascent: ascent.unwrap_or(ProportionalMetrics::SANS.ascent),
            descent: descent.unwrap_or(ProportionalMetrics::SANS.descent),
        };
        let surface = SurfaceSize {
            css_width,
            css_height,
            dpr,
        };
        let inner = STYLES
            .with(|styles| {
                icicle_core::ProfileViewer::new(
                    surface,
                    styles,
                    ViewerConfig::default(),
                    Box::new(metrics),
                )
            })
            .map_err(js_error)?;
        Ok(Self {
            inner,
            outbox: Outbox::default(),
        })
    }

    /// Replace the profile with a `{ selectionKey: node }` JSON document, or
    /// clear the viewer with `null`.
    #[wasm_bindgen(js_name = setData)]
    pub fn set_data(&mut self, json: Option<String>) -> Result<(), JsError> {
        let forest = json
            .map(|text| ProfileForest::from_json(text.as_bytes()))
            .transpose()
            .map_err(js_error)?;
        self.inner.set_data(forest);
        Ok(())
    }

    #[wasm_bindgen(js_name = setSelectorLabel)]
    pub fn set_selector_label(&mut self, label: String) {
        self.inner.set_selector_label(label);
    }

    #[wasm_bindgen(getter, js_name = selectorLabel)]
    pub fn selector_label(&self) -> String {
        self.inner.selector_label().to_string()
    }

    pub fn selections(&self) -> Vec<String> {
        self.inner.selections().into_iter().map(str::to_owned).collect()
    }

    #[wasm_bindgen(getter, js_name = currentSelection)]
    pub fn current_selection(&self) -> Option<String> {
        self.inner.current_selection().map(str::to_owned)
    }

    pub fn select(&mut self, key: &str) -> Result<(), JsError> {
        let result = self.inner.select(key).map_err(js_error);
        self.deliver();
        result
    }

    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&mut self) {
        self.inner.reset_view();
    }

    /// The handler gets `{ func, file, path, line, count }` of the clicked
    /// node. `null` unregisters.
    ///
    /// Handlers run in a microtask after the triggering call has returned,
    /// so they may call back into this viewer.
    #[wasm_bindgen(js_name = registerCtrlClickHandler)]
    pub fn register_ctrl_click_handler(&mut self, handler: Option<js_sys::Function>) {
        let handler = handler.map(|f| self.outbox.node_recorder(f));
        self.inner.register_ctrl_click_handler(handler);
    }

    /// The handler gets the new selection key, in a microtask after the
    /// switch. `null` unregisters.
    #[wasm_bindgen(js_name = registerSelectionHandler)]
    pub fn register_selection_handler(&mut self, handler: Option<js_sys::Function>) {
        let handler = handler.map(|f| self.outbox.selection_recorder(f));
        self.inner.register_selection_handler(handler);
    }

    /// Old name of `registerSelectionHandler`.
    #[wasm_bindgen(js_name = registerThreadSelectorHandler)]
    pub fn register_thread_selector_handler(&mut self, handler: Option<js_sys::Function>) {
        let handler = handler.map(|f| self.outbox.selection_recorder(f));
        #[allow(deprecated)]
        self.inner.register_thread_selector_handler(handler);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn destroy(&mut self) {
        self.inner.destroy();
    }

    #[wasm_bindgen(js_name = isDestroyed)]
    pub fn is_destroyed(&self) -> bool {
        self.inner.is_destroyed()
    }

    // ── events ─────────────────────────────────────────────────────────

    /// `deltaY` of a wheel event. Returns whether the event was consumed
    /// (the page should then `preventDefault`).
    #[wasm_bindgen(js_name = onWheel)]
    pub fn on_wheel(&mut self, delta_y: f64) -> bool {
        self.inner.on_wheel(delta_y)
    }

    /// `detail` is the DOM click count. Returns `"ignored"`, `"inspected"`,
    /// `"zoomed"` or `"reset"`.
    #[wasm_bindgen(js_name = onClick)]
    pub fn on_click(&mut self, x: f64, y: f64, ctrl: bool, meta: bool, detail: u32) -> String {
        let click = Click {
            x,
            y,
            modifiers: Modifiers { ctrl, meta },
            count: detail.max(1),
        };
        let action = self.inner.on_click(click);
        self.deliver();
        match action {
            ClickAction::Ignored => "ignored",
            ClickAction::Inspected(_) => "inspected",
            ClickAction::ZoomedIn(_) => "zoomed",
            ClickAction::Reset => "reset",
        }
        .to_string()
    }

    #[wasm_bindgen(js_name = onPointerMove)]
    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.inner.on_pointer_move(x, y);
    }

    #[wasm_bindgen(js_name = onPointerLeave)]
    pub fn on_pointer_leave(&mut self) {
        self.inner.on_pointer_leave();
    }

    #[wasm_bindgen(js_name = onResize)]
    pub fn on_resize(&mut self, css_width: f64, css_height: f64, dpr: f64) {
        self.inner.on_resize(css_width, css_height, dpr);
    }

    /// Whether a `requestAnimationFrame` callback should call `frame()`.
    #[wasm_bindgen(js_name = needsFrame)]
    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame()
    }

    /// Drain pending work. JSON `{ canvas, base, overlay }`; `null` members
    /// are unchanged since the previous frame.
    pub fn frame(&mut self) -> Result<String, JsError> {
        let out = self.inner.frame();
        serde_json::to_string(&FrameJson::from(&out)).map_err(js_error)
    }
}
