//! Overlay, resume button and file input

use super::js_message;
use crate::platform::PageControls;
use crate::types::PageIds;
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, HtmlInputElement};

/// Page affordances looked up by element id
///
/// The overlay is part of the page markup. The resume button and file input
/// are created (hidden) when the page does not provide them.
pub struct WebPageControls {
    document: Document,
    ids: PageIds,
}

impl WebPageControls {
    pub fn new(document: Document, ids: PageIds) -> Result<Self, JsValue> {
        let controls = Self { document, ids };
        controls.ensure_resume_button()?;
        controls.ensure_file_input()?;
        Ok(controls)
    }

    pub fn ids(&self) -> &PageIds {
        &self.ids
    }

    pub fn element(&self, id: &str) -> Option<HtmlElement> {
        self.document.get_element_by_id(id)?.dyn_into().ok()
    }

    pub fn file_input(&self) -> Option<HtmlInputElement> {
        self.document
            .get_element_by_id(&self.ids.file_input)?
            .dyn_into()
            .ok()
    }

    fn ensure_resume_button(&self) -> Result<(), JsValue> {
        if self.element(&self.ids.resume_button).is_some() {
            return Ok(());
        }
        let button: HtmlElement = self.document.create_element("button")?.dyn_into()?;
        button.set_id(&self.ids.resume_button);
        button.set_attribute("type", "button")?;
        button.set_text_content(Some("Resume audio"));
        button.style().set_property("display", "none")?;
        self.append(&button)
    }

    fn ensure_file_input(&self) -> Result<(), JsValue> {
        if self.file_input().is_some() {
            return Ok(());
        }
        let input: HtmlInputElement = self.document.create_element("input")?.dyn_into()?;
        input.set_id(&self.ids.file_input);
        input.set_type("file");
        input.set_accept("audio/*");
        input.set_multiple(false);
        input.style().set_property("display", "none")?;
        self.append(&input)
    }

    fn append(&self, element: &HtmlElement) -> Result<(), JsValue> {
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(element)?;
        Ok(())
    }

    fn set_visible(&self, id: &str, visible: bool) {
        let Some(element) = self.element(id) else {
            debug!(id, "Element not on page");
            return;
        };
        let style = element.style();
        let result = if visible {
            style.remove_property("display").map(|_| ())
        } else {
            style.set_property("display", "none")
        };
        if let Err(e) = result {
            debug!(id, "Could not change visibility: {}", js_message(&e));
        }
    }
}

impl PageControls for WebPageControls {
    fn show_overlay(&mut self) {
        self.set_visible(&self.ids.overlay, true);
    }

    fn hide_overlay(&mut self) {
        self.set_visible(&self.ids.overlay, false);
    }

    fn show_resume(&mut self) {
        self.set_visible(&self.ids.resume_button, true);
    }

    fn hide_resume(&mut self) {
        self.set_visible(&self.ids.resume_button, false);
    }

    fn open_file_picker(&mut self) {
        match self.file_input() {
            Some(input) => input.click(),
            None => debug!("No file input to open"),
        }
    }
}
