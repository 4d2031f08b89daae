//! WASM bindings for afk-player
//!
//! Browser implementations of the capability traits, plus the start function
//! that wires the page's DOM events into a [`PlayerSession`](crate::PlayerSession).

mod controls;
mod entry;
mod media;
mod storage;
mod timer;
mod visits;

pub use controls::WebPageControls;
pub use media::WebMediaSink;
pub use storage::WebStorage;
pub use timer::{JsClock, WebTicker};
pub use visits::HttpVisitCounter;

use wasm_bindgen::{JsCast, JsValue};

/// Best-effort text for a thrown JS value
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(exception) = value.dyn_ref::<web_sys::DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
