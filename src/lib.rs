use wasm_bindgen::prelude::*;

mod api;
mod error;
mod interop;

pub use api::{init, path_points_res, set_panic_hook};

/// A flow map driven from JavaScript.
#[wasm_bindgen]
pub struct FlowMap {
    pub(crate) inner: flowmap::FlowMap,
}
