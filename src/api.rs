use crate::error;
use crate::interop::to_js;
use crate::FlowMap;
use flowmap::{Direction, Display, FlowMapOptions, HoverInfo, SelectionEvent, Tooltip};
use js_sys::Function;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Routes `log` output to the browser console. Safe to call more than once.
#[wasm_bindgen]
pub fn init() {
    set_panic_hook();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Points of an absolute `M/L/Q/C/Z` path, e.g. a flow's `flow_path`, as `[[x, y], ...]`.
#[wasm_bindgen]
pub fn path_points_res(d: &str) -> JsValue {
    let commands = match flowmap::parse_path(d) {
        Ok(c) => c,
        Err(e) => return error::from_core(&e),
    };
    let points: Vec<[f64; 2]> = flowmap::geometry::path::path_points(&commands).iter().map(|p| [p.x, p.y]).collect();
    match to_js(&points) {
        Ok(v) => error::ok(v),
        Err(e) => error::serialize(e.to_string()),
    }
}

/// Forwards tooltip notifications to three JS callbacks. The callbacks run
/// while the map is mutably borrowed: calling back into the same `FlowMap`
/// from one throws; left uncaught, that is reported as a failed callback.
struct JsTooltip {
    show: Function,
    move_to: Function,
    hide: Function,
}

impl JsTooltip {
    fn report(what: &str, result: Result<JsValue, JsValue>) {
        if let Err(e) = result {
            web_sys::console::warn_1(&JsValue::from_str(&format!("tooltip {} callback failed: {:?}", what, e)));
        }
    }
}

impl Tooltip for JsTooltip {
    fn show(&mut self, flow: &HoverInfo, outbound: bool) {
        let info = match to_js(flow) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("tooltip payload for {} not serializable: {}", flow.id, e);
                return;
            }
        };
        Self::report("show", self.show.call2(&JsValue::NULL, &info, &JsValue::from_bool(outbound)));
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let r = self.move_to.call2(&JsValue::NULL, &JsValue::from_f64(x), &JsValue::from_f64(y));
        Self::report("move", r);
    }

    fn hide(&mut self) {
        Self::report("hide", self.hide.call0(&JsValue::NULL));
    }
}

fn view_result(view: flowmap::Result<&flowmap::FlowView>) -> JsValue {
    match view {
        Ok(v) => match to_js(v) {
            Ok(js) => error::ok(js),
            Err(e) => error::serialize(e.to_string()),
        },
        Err(e) => error::from_core(&e),
    }
}

impl FlowMap {
    fn rs_new(options: JsValue) -> Result<FlowMap, JsValue> {
        let options: FlowMapOptions =
            serde_wasm_bindgen::from_value(options).map_err(|e| error::invalid_options(e.to_string()))?;
        let inner = flowmap::FlowMap::new(options).map_err(|e| error::from_core(&e))?;
        Ok(FlowMap { inner })
    }
}

#[wasm_bindgen]
impl FlowMap {
    /// Throws the same `{ ok: false, error }` object `create_res` returns.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<FlowMap, JsValue> {
        FlowMap::rs_new(options)
    }

    pub fn create_res(options: JsValue) -> JsValue {
        match FlowMap::rs_new(options) {
            Ok(map) => error::ok(map.into()),
            Err(e) => e,
        }
    }

    /// Same as `create_res` but takes the options as a JSON string.
    pub fn from_json_res(json: &str) -> JsValue {
        let options: FlowMapOptions = match serde_json::from_str(json) {
            Ok(o) => o,
            Err(e) => return error::invalid_options(e.to_string()),
        };
        match flowmap::FlowMap::new(options) {
            Ok(inner) => error::ok(FlowMap { inner }.into()),
            Err(e) => error::from_core(&e),
        }
    }

    /// `show(info, outbound)`, `move_to(x, y)` and `hide()` are called
    /// synchronously from `hover_res`, `hover_move_res`, `hover_end` and the
    /// selection changes. They must not call methods on this map; defer such
    /// work (e.g. `queueMicrotask`) instead.
    pub fn set_tooltip(&mut self, show: Function, move_to: Function, hide: Function) {
        self.inner.set_tooltip(Box::new(JsTooltip { show, move_to, hide }));
    }

    // Selection
    pub fn on_location_change_res(&mut self, id: &str) -> JsValue {
        view_result(self.inner.on_location_change(id))
    }
    pub fn on_direction_change_res(&mut self, direction: &str) -> JsValue {
        match direction.parse::<Direction>() {
            Ok(d) => view_result(self.inner.on_direction_change(d)),
            Err(e) => error::from_core(&e),
        }
    }
    pub fn on_display_change_res(&mut self, display: &str) -> JsValue {
        match display.parse::<Display>() {
            Ok(d) => view_result(self.inner.on_display_change(d)),
            Err(e) => error::from_core(&e),
        }
    }
    /// Accepts `{ type: "LocationChanged" | "DirectionChanged" | "DisplayChanged", value }`.
    pub fn dispatch_res(&mut self, event: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<SelectionEvent>(event) {
            Ok(ev) => view_result(self.inner.dispatch(ev)),
            Err(e) => error::invalid_options(e.to_string()),
        }
    }
    pub fn view_res(&self) -> JsValue {
        view_result(Ok(self.inner.view()))
    }
    pub fn selection_res(&self) -> JsValue {
        match to_js(self.inner.selection()) {
            Ok(v) => error::ok(v),
            Err(e) => error::serialize(e.to_string()),
        }
    }

    // Viewport
    pub fn resize_res(&mut self, width: f64) -> JsValue {
        match self.inner.resize(width) {
            Ok(()) => error::ok(JsValue::UNDEFINED),
            Err(e) => error::from_core(&e),
        }
    }
    pub fn width(&self) -> f64 {
        self.inner.size().0
    }
    pub fn height(&self) -> f64 {
        self.inner.size().1
    }

    // Hover
    pub fn hover_res(&mut self, flow_id: &str) -> JsValue {
        match self.inner.hover(flow_id) {
            Some(info) => match to_js(&info) {
                Ok(v) => error::ok(v),
                Err(e) => error::serialize(e.to_string()),
            },
            None => error::ok(JsValue::NULL),
        }
    }
    pub fn hover_move_res(&mut self, x: f64, y: f64) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        self.inner.hover_move(x, y);
        error::ok(JsValue::UNDEFINED)
    }
    pub fn hover_end(&mut self) {
        self.inner.hover_end();
    }

    // Frames
    /// Advances every transition; `true` while something is still moving.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        if !dt_ms.is_finite() || dt_ms < 0.0 {
            return self.inner.scene().is_animating();
        }
        self.inner.tick(dt_ms)
    }
    pub fn to_svg(&self) -> String {
        self.inner.to_svg()
    }
}
