//! `<audio>` element as the media sink

use super::js_message;
use crate::sink::{MediaError, MediaSink};
use async_trait::async_trait;
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{DomException, HtmlAudioElement};

pub struct WebMediaSink {
    audio: HtmlAudioElement,
}

impl WebMediaSink {
    pub fn new(audio: HtmlAudioElement) -> Self {
        audio.set_preload("auto");
        Self { audio }
    }

    /// A detached `new Audio()` element
    pub fn detached() -> Result<Self, JsValue> {
        Ok(Self::new(HtmlAudioElement::new()?))
    }

    /// The element, for attaching `ended`/`loadedmetadata` listeners
    pub fn element(&self) -> &HtmlAudioElement {
        &self.audio
    }

    async fn start(&self) -> Result<(), MediaError> {
        let promise = self.audio.play().map_err(media_error)?;
        JsFuture::from(promise).await.map_err(media_error)?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl MediaSink for WebMediaSink {
    async fn play(&mut self, source: &str) -> Result<(), MediaError> {
        self.audio.set_src(&encode_source(source));
        self.start().await
    }

    async fn resume(&mut self) -> Result<(), MediaError> {
        self.start().await
    }

    fn pause(&mut self) {
        if let Err(e) = self.audio.pause() {
            debug!("pause() threw: {}", js_message(&e));
        }
    }

    fn seek(&mut self, position_secs: f64) -> Result<(), MediaError> {
        self.audio.set_current_time(position_secs);
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.audio.current_time()
    }

    fn duration(&self) -> Option<f64> {
        let duration = self.audio.duration();
        (duration.is_finite() && duration > 0.0).then_some(duration)
    }

    fn release(&mut self) {
        self.pause();
        if self.audio.remove_attribute("src").is_ok() {
            self.audio.load();
        }
    }
}

/// `encodeURI`, except for object URLs which are already encoded
fn encode_source(source: &str) -> String {
    if source.starts_with("blob:") {
        return source.to_string();
    }
    String::from(js_sys::encode_uri(source))
}

fn media_error(value: JsValue) -> MediaError {
    match value.dyn_ref::<DomException>() {
        Some(exception) => match exception.name().as_str() {
            "NotAllowedError" => MediaError::NotAllowed(exception.message()),
            "AbortError" => MediaError::Aborted,
            "NotSupportedError" => MediaError::Unsupported(exception.message()),
            _ => MediaError::Other(js_message(&value)),
        },
        None => MediaError::Other(js_message(&value)),
    }
}
