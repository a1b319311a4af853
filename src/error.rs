use crate::interop::{new_obj, set_kv};
use wasm_bindgen::prelude::*;

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data {
        set_kv(&e, "data", &d);
    }
    set_kv(&root, "error", &e.into());
    root.into()
}

/// Maps a core error onto `{ ok: false, error: { code, message, data } }`.
pub fn from_core(e: &flowmap::Error) -> JsValue {
    let data = match e {
        flowmap::Error::UnknownLocation { id } => {
            let d = new_obj();
            set_kv(&d, "id", &JsValue::from_str(id));
            Some(d.into())
        }
        flowmap::Error::InvalidDirection { got } | flowmap::Error::InvalidDisplay { got } => {
            let d = new_obj();
            set_kv(&d, "got", &JsValue::from_str(got));
            Some(d.into())
        }
        flowmap::Error::InvalidViewport { width } => {
            let d = new_obj();
            set_kv(&d, "width", &JsValue::from_f64(*width));
            Some(d.into())
        }
        flowmap::Error::PathParse { offset, .. } => {
            let d = new_obj();
            set_kv(&d, "offset", &JsValue::from_f64(*offset as f64));
            Some(d.into())
        }
        flowmap::Error::Config(_) => None,
    };
    err(e.code(), e.to_string(), data)
}

#[inline]
pub fn invalid_options(message: impl Into<String>) -> JsValue {
    err("invalid_options", message, None)
}

#[inline]
pub fn serialize(message: impl Into<String>) -> JsValue {
    err("serialize", message, None)
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be finite", param), Some(d.into()))
}
